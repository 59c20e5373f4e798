//! Output formatting and persistence for graded courses.
//!
//! Supports results CSV (optionally gzip-compressed), boundary tables, a JSON
//! report and the blank input template.

use chrono::{DateTime, Utc};
use csv::{Writer, WriterBuilder};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::GradingConfig;
use crate::error::Result;
use crate::grading::{Boundaries, CourseOutcome, GradingEvent};
use crate::parser::REQUIRED_COLUMNS;
use crate::record::GradedStudent;
use crate::stats::CohortStats;
use crate::summary::CourseSummary;

/// Everything known about one grading run, serialized as the JSON report.
#[derive(Debug, Serialize)]
pub struct CourseReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub config: &'a GradingConfig,
    pub summary: &'a CourseSummary,
    pub boundaries: &'a Boundaries,
    pub cohort: &'a CohortStats,
    pub events: &'a [GradingEvent],
}

impl<'a> CourseReport<'a> {
    pub fn new(
        config: &'a GradingConfig,
        outcome: &'a CourseOutcome,
        summary: &'a CourseSummary,
    ) -> Self {
        CourseReport {
            generated_at: Utc::now(),
            config,
            summary,
            boundaries: &outcome.boundaries,
            cohort: &outcome.cohort,
            events: &outcome.events,
        }
    }
}

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &CourseReport<'_>) {
    debug!("{:#?}", report);
}

/// Writes a report as pretty-printed JSON.
pub fn write_json(path: impl AsRef<Path>, report: &CourseReport<'_>) -> Result<()> {
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, report)?;
    info!(path = %path.as_ref().display(), "JSON report written");
    Ok(())
}

/// Writes graded students as CSV: required columns, extra columns, then
/// `final_grade`.
pub fn write_results<W: Write>(
    writer: W,
    extra_columns: &[String],
    students: &[GradedStudent],
) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    let header = REQUIRED_COLUMNS
        .iter()
        .copied()
        .chain(extra_columns.iter().map(String::as_str))
        .chain(std::iter::once("final_grade"));
    wtr.write_record(header)?;

    for student in students {
        let r = &student.record;
        let row = [
            r.id.clone(),
            r.marks.to_string(),
            r.attendance.to_string(),
            r.ese.to_string(),
        ]
        .into_iter()
        .chain(r.extra.iter().cloned())
        .chain(std::iter::once(student.grade.to_string()));
        wtr.write_record(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the results CSV to `path`, or `path.gz` when `gzip` is set.
///
/// Returns the path actually written.
pub fn write_results_file(
    path: impl AsRef<Path>,
    extra_columns: &[String],
    students: &[GradedStudent],
    gzip: bool,
) -> Result<PathBuf> {
    let path = path.as_ref();

    let written = if gzip {
        let mut gz_path = path.as_os_str().to_owned();
        gz_path.push(".gz");
        let gz_path = PathBuf::from(gz_path);

        let mut encoder = GzEncoder::new(File::create(&gz_path)?, Compression::default());
        write_results(&mut encoder, extra_columns, students)?;
        encoder.finish()?;
        gz_path
    } else {
        write_results(File::create(path)?, extra_columns, students)?;
        path.to_path_buf()
    };

    info!(path = %written.display(), gzip, rows = students.len(), "Results written");
    Ok(written)
}

/// Writes the results CSV to stdout, gzip-compressed when `gzip` is set.
pub fn write_results_stdout(
    extra_columns: &[String],
    students: &[GradedStudent],
    gzip: bool,
) -> Result<()> {
    let stdout = std::io::stdout().lock();
    if gzip {
        let mut encoder = GzEncoder::new(stdout, Compression::default());
        write_results(&mut encoder, extra_columns, students)?;
        encoder.finish()?.flush()?;
    } else {
        write_results(stdout, extra_columns, students)?;
    }

    info!(path = "-", gzip, rows = students.len(), "Results written");
    Ok(())
}

/// Writes the cut-off table as `grade,min_marks`.
pub fn write_boundaries(path: impl AsRef<Path>, boundaries: &Boundaries) -> Result<()> {
    #[derive(Serialize)]
    struct Row {
        grade: &'static str,
        min_marks: f64,
    }

    let mut wtr = WriterBuilder::new().from_path(path.as_ref())?;
    for (grade, min_marks) in boundaries.cutoffs() {
        wtr.serialize(Row {
            grade: grade.as_str(),
            min_marks,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a five-student sample sheet showing the expected columns.
pub fn write_template<W: Write>(writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(REQUIRED_COLUMNS)?;
    for row in [
        ["1", "82", "90", "40"],
        ["2", "65", "85", "30"],
        ["3", "45", "80", "AB"],
        ["4", "32", "76", "10"],
        ["5", "91", "95", "50"],
    ] {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}
