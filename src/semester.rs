//! Multi-subject semester results: per-subject grading, grace marks and SGPA.
//!
//! Each subject is graded independently by the [`GradingEngine`] under the
//! run-wide protocol. Grace is then applied per student across subjects:
//!
//! 1. the student cleared the ESE hurdle in every subject;
//! 2. a candidate subject is graded `F` and short of its D cut-off by more
//!    than 0 and at most [`GRACE_MARGIN`] marks;
//! 3. with one or two candidates ([`MAX_GRACED_SUBJECTS`]) each becomes `D*`.

use csv::{ReaderBuilder, Trim, Writer};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::config::{CourseType, GradingConfig, Protocol};
use crate::error::{GradeError, Result};
use crate::grade::Grade;
use crate::grading::GradingEngine;
use crate::parser::{field, line_of, locate_columns, normalize_headers, parse_number};
use crate::record::{EseMarks, StudentRecord};

pub const GRACE_MARGIN: f64 = 3.0;
pub const MAX_GRACED_SUBJECTS: usize = 2;

const SEMESTER_COLUMNS: [&str; 9] = [
    "student_id",
    "subject_code",
    "marks",
    "attendance",
    "ese_marks",
    "total_max",
    "ese_max",
    "course_type",
    "credits",
];

/// One student's entry for one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SemesterRow {
    pub subject_code: String,
    /// `record.id` holds the student id.
    pub record: StudentRecord,
    pub total_max: f64,
    pub ese_max: f64,
    pub course_type: CourseType,
    pub credits: f64,
}

/// A graded subject entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectResult {
    pub subject_code: String,
    pub record: StudentRecord,
    pub credits: f64,
    pub grade: Grade,
    pub graced: bool,
    /// D cut-off of the subject.
    pub boundary_d: f64,
    /// ESE hurdle of the subject.
    pub min_ese_required: f64,
}

impl SubjectResult {
    pub fn student_id(&self) -> &str {
        &self.record.id
    }

    fn cleared_ese(&self) -> bool {
        self.record.ese.score() >= self.min_ese_required
    }

    fn grace_gap(&self) -> f64 {
        self.boundary_d - self.record.marks
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    pub student_id: String,
    pub earned_credits: f64,
    pub sgpa: f64,
    pub failed_subjects: Vec<String>,
    pub graced_count: usize,
}

#[derive(Debug, Clone)]
pub struct SemesterOutcome {
    /// Sorted subject codes.
    pub subjects: Vec<String>,
    pub results: Vec<SubjectResult>,
    /// One entry per student, sorted by id.
    pub summaries: Vec<StudentSummary>,
}

pub fn read_semester_file(path: impl AsRef<Path>) -> Result<Vec<SemesterRow>> {
    read_semester(File::open(path.as_ref())?)
}

/// Reads a semester sheet. Headers are matched case-insensitively.
pub fn read_semester<R: Read>(reader: R) -> Result<Vec<SemesterRow>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = normalize_headers(rdr.headers()?)?;
    let idx = locate_columns(&headers, &SEMESTER_COLUMNS)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let line = line_of(&row);

        let ese_raw = field(&row, idx[4]);
        let ese = EseMarks::parse(ese_raw).ok_or_else(|| GradeError::InvalidNumber {
            line,
            column: "ese_marks".into(),
            value: ese_raw.to_string(),
        })?;

        let course_raw = field(&row, idx[7]);
        let course_type = CourseType::parse_lenient(course_raw).ok_or_else(|| {
            GradeError::InvalidConfig(format!("line {line}: unknown course type '{course_raw}'"))
        })?;

        rows.push(SemesterRow {
            subject_code: field(&row, idx[1]).to_string(),
            record: StudentRecord::new(
                field(&row, idx[0]),
                parse_number(&row, idx[2], "marks")?,
                parse_number(&row, idx[3], "attendance")?,
                ese,
            ),
            total_max: parse_number(&row, idx[5], "total_max")?,
            ese_max: parse_number(&row, idx[6], "ese_max")?,
            course_type,
            credits: parse_number(&row, idx[8], "credits")?,
        });
    }

    if rows.is_empty() {
        return Err(GradeError::EmptyInput);
    }

    debug!(rows = rows.len(), "Semester sheet parsed");
    Ok(rows)
}

/// Grades every subject, applies grace and computes per-student summaries.
#[tracing::instrument(skip_all, fields(rows = rows.len(), protocol = %protocol))]
pub fn grade_semester(rows: Vec<SemesterRow>, protocol: Protocol) -> Result<SemesterOutcome> {
    let mut by_subject: BTreeMap<String, Vec<SemesterRow>> = BTreeMap::new();
    for row in rows {
        by_subject.entry(row.subject_code.clone()).or_default().push(row);
    }

    let mut results = Vec::new();
    for (code, subject_rows) in by_subject.iter_mut() {
        let mut seen = BTreeSet::new();
        for row in subject_rows.iter() {
            if !seen.insert(row.record.id.as_str()) {
                return Err(GradeError::DuplicateEntry {
                    student_id: row.record.id.clone(),
                    subject_code: code.clone(),
                });
            }
        }

        // A subject's policy comes from its first row.
        let first = &subject_rows[0];
        let config = GradingConfig {
            total_max_marks: first.total_max,
            ese_max_marks: Some(first.ese_max),
            course_type: first.course_type,
            protocol,
            ..Default::default()
        };
        let engine = GradingEngine::new(config)?;
        let hurdle = engine.config().ese_hurdle();

        let credits: Vec<f64> = subject_rows.iter().map(|r| r.credits).collect();
        let records: Vec<StudentRecord> = subject_rows.drain(..).map(|r| r.record).collect();

        let span = tracing::info_span!("subject", subject_code = %code);
        let outcome = span.in_scope(|| engine.process(records));

        results.extend(outcome.students.into_iter().zip(credits).map(
            |(student, credits)| SubjectResult {
                subject_code: code.clone(),
                record: student.record,
                credits,
                grade: student.grade,
                graced: false,
                boundary_d: outcome.boundaries.d,
                min_ese_required: hurdle,
            },
        ));
    }

    let graced = apply_grace(&mut results);
    let summaries = summarize(&results);
    let subjects: Vec<String> = by_subject.into_keys().collect();

    info!(
        subjects = subjects.len(),
        students = summaries.len(),
        graced,
        "Semester graded"
    );

    Ok(SemesterOutcome {
        subjects,
        results,
        summaries,
    })
}

/// Turns near-miss failures into `D*`. Returns the number of subjects graced.
pub fn apply_grace(results: &mut [SubjectResult]) -> usize {
    let mut by_student: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, result) in results.iter().enumerate() {
        by_student
            .entry(result.student_id().to_string())
            .or_default()
            .push(i);
    }

    let mut total = 0;
    for (student_id, indices) in by_student {
        if !indices.iter().all(|&i| results[i].cleared_ese()) {
            continue;
        }

        let candidates: Vec<usize> = indices
            .into_iter()
            .filter(|&i| {
                let gap = results[i].grace_gap();
                results[i].grade == Grade::F && gap > 0.0 && gap <= GRACE_MARGIN
            })
            .collect();

        if candidates.is_empty() || candidates.len() > MAX_GRACED_SUBJECTS {
            continue;
        }

        for &i in &candidates {
            results[i].grade = Grade::DGrace;
            results[i].graced = true;
        }
        debug!(student_id = %student_id, graced = candidates.len(), "Grace applied");
        total += candidates.len();
    }

    total
}

/// Earned credits, SGPA and failures per student, sorted by student id.
pub fn summarize(results: &[SubjectResult]) -> Vec<StudentSummary> {
    let mut by_student: BTreeMap<&str, Vec<&SubjectResult>> = BTreeMap::new();
    for result in results {
        by_student.entry(result.student_id()).or_default().push(result);
    }

    by_student
        .into_iter()
        .map(|(student_id, subjects)| {
            let total_credits: f64 = subjects.iter().map(|s| s.credits).sum();
            let earned_credits: f64 = subjects
                .iter()
                .filter(|s| !s.grade.is_fail())
                .map(|s| s.credits)
                .sum();
            let points: f64 = subjects
                .iter()
                .map(|s| s.credits * f64::from(s.grade.points()))
                .sum();
            // Two decimals, ties to even.
            let sgpa = if total_credits > 0.0 {
                (points / total_credits * 100.0).round_ties_even() / 100.0
            } else {
                0.0
            };

            StudentSummary {
                student_id: student_id.to_string(),
                earned_credits,
                sgpa,
                failed_subjects: subjects
                    .iter()
                    .filter(|s| s.grade.is_fail())
                    .map(|s| s.subject_code.clone())
                    .collect(),
                graced_count: subjects.iter().filter(|s| s.graced).count(),
            }
        })
        .collect()
}

/// Writes one row per student: grades per subject, then the summary columns.
pub fn write_master_sheet<W: Write>(writer: W, outcome: &SemesterOutcome) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    let header = std::iter::once("student_id")
        .chain(outcome.subjects.iter().map(String::as_str))
        .chain(["earned_credits", "sgpa", "failed_subjects", "graced_count"]);
    wtr.write_record(header)?;

    let mut grades: BTreeMap<(&str, &str), Grade> = BTreeMap::new();
    for r in &outcome.results {
        grades.insert((r.student_id(), r.subject_code.as_str()), r.grade);
    }

    for summary in &outcome.summaries {
        let failed = if summary.failed_subjects.is_empty() {
            "None".to_string()
        } else {
            summary.failed_subjects.join(", ")
        };

        let row = std::iter::once(summary.student_id.clone())
            .chain(outcome.subjects.iter().map(|code| {
                grades
                    .get(&(summary.student_id.as_str(), code.as_str()))
                    .map(Grade::to_string)
                    .unwrap_or_default()
            }))
            .chain([
                summary.earned_credits.to_string(),
                summary.sgpa.to_string(),
                failed,
                summary.graced_count.to_string(),
            ]);
        wtr.write_record(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes every subject entry with its grade point and the thresholds used.
pub fn write_detailed<W: Write>(writer: W, outcome: &SemesterOutcome) -> Result<()> {
    #[derive(Serialize)]
    struct Row<'a> {
        student_id: &'a str,
        subject_code: &'a str,
        marks: f64,
        attendance: f64,
        ese_marks: String,
        credits: f64,
        final_grade: Grade,
        grade_point: u8,
        boundary_d: f64,
        min_ese_required: f64,
        graced: bool,
    }

    let mut wtr = Writer::from_writer(writer);
    for r in &outcome.results {
        wtr.serialize(Row {
            student_id: r.student_id(),
            subject_code: &r.subject_code,
            marks: r.record.marks,
            attendance: r.record.attendance,
            ese_marks: r.record.ese.to_string(),
            credits: r.credits,
            final_grade: r.grade,
            grade_point: r.grade.points(),
            boundary_d: r.boundary_d,
            min_ese_required: r.min_ese_required,
            graced: r.graced,
        })?;
    }
    wtr.flush()?;
    Ok(())
}
