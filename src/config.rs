//! Grading policy for a single course.
//!
//! A [`GradingConfig`] starts from built-in defaults, may be loaded from a JSON
//! file, and is finally patched with command-line values through
//! [`ConfigOverrides`]:
//!
//! ```json
//! {
//!   "total_max_marks": 150,
//!   "ese_max_marks": 90,
//!   "course_type": "practical",
//!   "protocol": "b"
//! }
//! ```

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::error::{GradeError, Result};

/// Kind of course. Decides the pass mark and the absolute grading table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    #[default]
    #[serde(alias = "Theory")]
    Theory,
    #[serde(alias = "Practical")]
    Practical,
}

impl CourseType {
    /// Parses the free-text course type used in semester sheets.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "theory" => Some(CourseType::Theory),
            "practical" => Some(CourseType::Practical),
            _ => None,
        }
    }

    /// Fraction of the total marks needed to pass the course.
    pub fn pass_fraction(&self) -> f64 {
        match self {
            CourseType::Theory => 0.40,
            CourseType::Practical => 0.50,
        }
    }
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseType::Theory => f.write_str("Theory"),
            CourseType::Practical => f.write_str("Practical"),
        }
    }
}

/// Which students feed the cohort mean and standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Protocol {
    /// Protocol A: ESE failures and absentees are left out of the statistics.
    #[default]
    #[value(name = "a", alias = "exclusive")]
    #[serde(rename = "a", alias = "A", alias = "exclusive")]
    Exclusive,
    /// Protocol B: ESE failures count with their (possibly zero) marks.
    #[value(name = "b", alias = "inclusive")]
    #[serde(rename = "b", alias = "B", alias = "inclusive")]
    Inclusive,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Exclusive => f.write_str("Protocol A (Exclusive)"),
            Protocol::Inclusive => f.write_str("Protocol B (Inclusive)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GradingConfig {
    /// Total course marks, internal plus ESE.
    pub total_max_marks: f64,
    /// ESE maximum. Defaults to 60% of the total when unset.
    pub ese_max_marks: Option<f64>,
    pub course_type: CourseType,
    pub protocol: Protocol,
    /// Minimum attendance percentage. Below it a student gets `I`.
    pub attendance_threshold: f64,
    /// Smallest cohort graded on the relative curve.
    pub relative_min_batch: usize,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            total_max_marks: 100.0,
            ese_max_marks: None,
            course_type: CourseType::Theory,
            protocol: Protocol::Exclusive,
            attendance_threshold: 75.0,
            relative_min_batch: 30,
        }
    }
}

impl GradingConfig {
    /// Loads a config from a JSON file at `path`. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: GradingConfig = serde_json::from_str(&content)?;
        debug!(path = %path.as_ref().display(), ?config, "Loaded grading config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.total_max_marks.is_finite() && self.total_max_marks > 0.0) {
            return Err(GradeError::InvalidConfig(format!(
                "total_max_marks must be positive, got {}",
                self.total_max_marks
            )));
        }
        let ese_max = self.ese_max();
        if !(ese_max.is_finite() && ese_max > 0.0) {
            return Err(GradeError::InvalidConfig(format!(
                "ese_max_marks must be positive, got {ese_max}"
            )));
        }
        if !(0.0..=100.0).contains(&self.attendance_threshold) {
            return Err(GradeError::InvalidConfig(format!(
                "attendance_threshold must be within 0..=100, got {}",
                self.attendance_threshold
            )));
        }
        if self.relative_min_batch == 0 {
            return Err(GradeError::InvalidConfig(
                "relative_min_batch must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// ESE maximum, falling back to 60% of the total (truncated to whole marks).
    pub fn ese_max(&self) -> f64 {
        self.ese_max_marks
            .unwrap_or_else(|| (0.60 * self.total_max_marks).floor())
    }

    /// Course pass mark `P`.
    pub fn pass_marks(&self) -> f64 {
        self.course_type.pass_fraction() * self.total_max_marks
    }

    /// ESE marks below this fail the student outright.
    pub fn ese_hurdle(&self) -> f64 {
        0.20 * self.ese_max()
    }

    /// Lowest D cut-off the relative curve may produce.
    pub fn floor_marks(&self) -> f64 {
        0.30 * self.total_max_marks
    }
}

/// Values given on the command line. `None` leaves the config untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub total_max_marks: Option<f64>,
    pub ese_max_marks: Option<f64>,
    pub course_type: Option<CourseType>,
    pub protocol: Option<Protocol>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: GradingConfig) -> GradingConfig {
        if let Some(total) = self.total_max_marks {
            config.total_max_marks = total;
        }
        if let Some(ese) = self.ese_max_marks {
            config.ese_max_marks = Some(ese);
        }
        if let Some(course_type) = self.course_type {
            config.course_type = course_type;
        }
        if let Some(protocol) = self.protocol {
            config.protocol = protocol;
        }
        config
    }
}
