//! CSV ingest for class mark sheets.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{GradeError, Result};
use crate::record::{EseMarks, StudentRecord};

/// Columns every class sheet must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = ["id", "marks", "attendance", "ese_marks"];

/// A parsed class sheet.
#[derive(Debug, Clone, Default)]
pub struct ClassSheet {
    /// Normalized names of the non-required columns, in sheet order.
    pub extra_columns: Vec<String>,
    pub students: Vec<StudentRecord>,
}

/// Reads a class sheet from a CSV file.
pub fn read_class_file(path: impl AsRef<Path>) -> Result<ClassSheet> {
    let file = File::open(path.as_ref())?;
    read_class(file)
}

/// Reads a class sheet from any CSV source.
///
/// # Errors
///
/// Fails with [`GradeError::MissingColumns`] when a required column is absent,
/// [`GradeError::DuplicateColumn`] when two headers normalize to the same name,
/// [`GradeError::InvalidNumber`] on the first malformed value and
/// [`GradeError::EmptyInput`] when there are no rows.
pub fn read_class<R: Read>(reader: R) -> Result<ClassSheet> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = normalize_headers(rdr.headers()?)?;
    let idx = locate_columns(&headers, &REQUIRED_COLUMNS)?;

    let extra_idx: Vec<usize> = (0..headers.len()).filter(|i| !idx.contains(i)).collect();
    let extra_columns = extra_idx.iter().map(|&i| headers[i].clone()).collect();

    let mut students = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let line = line_of(&row);

        let ese_raw = field(&row, idx[3]);
        let ese = EseMarks::parse(ese_raw).ok_or_else(|| GradeError::InvalidNumber {
            line,
            column: "ese_marks".into(),
            value: ese_raw.to_string(),
        })?;

        students.push(StudentRecord {
            id: field(&row, idx[0]).to_string(),
            marks: parse_number(&row, idx[1], "marks")?,
            attendance: parse_number(&row, idx[2], "attendance")?,
            ese,
            extra: extra_idx
                .iter()
                .map(|&i| field(&row, i).to_string())
                .collect(),
        });
    }

    if students.is_empty() {
        return Err(GradeError::EmptyInput);
    }

    debug!(
        students = students.len(),
        extra_columns = ?extra_columns,
        "Class sheet parsed"
    );

    Ok(ClassSheet {
        extra_columns,
        students,
    })
}

/// Trims and lower-cases header names. Names that collide afterwards are rejected.
pub(crate) fn normalize_headers(headers: &StringRecord) -> Result<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(headers.len());
    for header in headers {
        let name = header.trim().to_lowercase();
        if normalized.contains(&name) {
            return Err(GradeError::DuplicateColumn(name));
        }
        normalized.push(name);
    }
    Ok(normalized)
}

/// Returns the position of each `required` column, or every missing name at once.
pub(crate) fn locate_columns(headers: &[String], required: &[&str]) -> Result<Vec<usize>> {
    let mut missing: Vec<String> = required
        .iter()
        .filter(|name| !headers.iter().any(|h| h == *name))
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        missing.sort();
        return Err(GradeError::MissingColumns(missing));
    }

    Ok(required
        .iter()
        .filter_map(|name| headers.iter().position(|h| h == name))
        .collect())
}

pub(crate) fn field(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("")
}

pub(crate) fn line_of(row: &StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or(0)
}

pub(crate) fn parse_number(row: &StringRecord, idx: usize, column: &str) -> Result<f64> {
    let raw = field(row, idx);
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GradeError::InvalidNumber {
            line: line_of(row),
            column: column.to_string(),
            value: raw.to_string(),
        })
}
