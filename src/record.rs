use std::fmt;

use crate::grade::Grade;

/// End-semester exam result as written in the sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EseMarks {
    Marks(f64),
    /// `AB` in the sheet.
    Absent,
}

impl EseMarks {
    /// Accepts a number or `AB` (any case).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("ab") {
            return Some(EseMarks::Absent);
        }
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(EseMarks::Marks)
    }

    /// Score used for hurdle checks. Absent counts as zero.
    pub fn score(&self) -> f64 {
        match self {
            EseMarks::Marks(m) => *m,
            EseMarks::Absent => 0.0,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, EseMarks::Absent)
    }
}

impl fmt::Display for EseMarks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EseMarks::Marks(m) => write!(f, "{m}"),
            EseMarks::Absent => f.write_str("AB"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub id: String,
    /// Total course marks.
    pub marks: f64,
    /// Attendance percentage.
    pub attendance: f64,
    pub ese: EseMarks,
    /// Values of any non-required columns, in sheet order.
    pub extra: Vec<String>,
}

impl StudentRecord {
    pub fn new(id: impl Into<String>, marks: f64, attendance: f64, ese: EseMarks) -> Self {
        Self {
            id: id.into(),
            marks,
            attendance,
            ese,
            extra: Vec::new(),
        }
    }
}

/// A student together with the grade the engine settled on.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedStudent {
    pub record: StudentRecord,
    pub grade: Grade,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absent_any_case() {
        assert_eq!(EseMarks::parse("AB"), Some(EseMarks::Absent));
        assert_eq!(EseMarks::parse(" ab "), Some(EseMarks::Absent));
        assert_eq!(EseMarks::parse("Ab"), Some(EseMarks::Absent));
    }

    #[test]
    fn test_parse_numeric_and_garbage() {
        assert_eq!(EseMarks::parse("40"), Some(EseMarks::Marks(40.0)));
        assert_eq!(EseMarks::parse("12.5"), Some(EseMarks::Marks(12.5)));
        assert_eq!(EseMarks::parse("absent"), None);
        assert_eq!(EseMarks::parse(""), None);
        assert_eq!(EseMarks::parse("NaN"), None);
    }

    #[test]
    fn test_absent_scores_zero() {
        assert_eq!(EseMarks::Absent.score(), 0.0);
        assert_eq!(EseMarks::Marks(33.0).score(), 33.0);
    }

    #[test]
    fn test_display_round_trips_sheet_text() {
        assert_eq!(EseMarks::Absent.to_string(), "AB");
        assert_eq!(EseMarks::Marks(40.0).to_string(), "40");
        assert_eq!(EseMarks::Marks(12.5).to_string(), "12.5");
    }
}
