use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::config::Protocol;

/// Something noteworthy that happened while grading a course.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GradingEvent {
    Absentees {
        count: usize,
    },
    EseFailures {
        count: usize,
        hurdle: f64,
    },
    ProtocolApplied {
        protocol: Protocol,
        hurdle: f64,
    },
    BatchStatistics {
        count: usize,
        mean: f64,
        sd: f64,
    },
    AbsoluteFallback {
        count: usize,
        minimum: usize,
    },
    Moderation {
        raw_d: f64,
        pass_marks: f64,
    },
    FloorShift {
        raw_d: f64,
        floor: f64,
        delta: f64,
    },
    UpperCap {
        max_marks: f64,
    },
}

impl GradingEvent {
    /// Curve adjustments and failures are warnings, the rest is informational.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            GradingEvent::Absentees { .. }
                | GradingEvent::EseFailures { .. }
                | GradingEvent::Moderation { .. }
                | GradingEvent::FloorShift { .. }
        )
    }

    /// Emits the event through `tracing`.
    pub fn log(&self) {
        if self.is_warning() {
            warn!(event = ?self, "{}", self);
        } else {
            info!(event = ?self, "{}", self);
        }
    }
}

impl fmt::Display for GradingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradingEvent::Absentees { count } => {
                write!(f, "{count} students marked 'AB' (Absent) in ESE. Assigned grade 'Z'.")
            }
            GradingEvent::EseFailures { count, hurdle } => write!(
                f,
                "{count} students failed ESE (scored < {hurdle:.1}). Grade 'F' assigned."
            ),
            GradingEvent::ProtocolApplied { protocol, hurdle } => match protocol {
                Protocol::Exclusive => write!(
                    f,
                    "{protocol} active: statistics use only students who passed ESE (>= {hurdle:.1})."
                ),
                Protocol::Inclusive => write!(
                    f,
                    "{protocol} active: statistics include students who failed ESE."
                ),
            },
            GradingEvent::BatchStatistics { count, mean, sd } => write!(
                f,
                "Batch statistics over {count} students: mean (X)={mean:.2}, SD (sigma)={sd:.2}"
            ),
            GradingEvent::AbsoluteFallback { count, minimum } => write!(
                f,
                "Batch size {count} < {minimum}. Switched to absolute grading."
            ),
            GradingEvent::Moderation { raw_d, pass_marks } => write!(
                f,
                "Moderation triggered: raw D ({raw_d:.2}) > pass mark ({pass_marks}). Capping D at {pass_marks}."
            ),
            GradingEvent::FloorShift { raw_d, floor, delta } => write!(
                f,
                "Min cut-off protection triggered: raw D ({raw_d:.2}) < {floor}. Shifting curve up by {delta:.2}."
            ),
            GradingEvent::UpperCap { max_marks } => {
                write!(f, "Upper bound protection: A+ capped at {max_marks}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_classification() {
        assert!(GradingEvent::Moderation { raw_d: 45.0, pass_marks: 40.0 }.is_warning());
        assert!(GradingEvent::EseFailures { count: 1, hurdle: 12.0 }.is_warning());
        assert!(!GradingEvent::UpperCap { max_marks: 100.0 }.is_warning());
        assert!(
            !GradingEvent::BatchStatistics {
                count: 30,
                mean: 60.0,
                sd: 10.0
            }
            .is_warning()
        );
    }

    #[test]
    fn test_display_messages() {
        let event = GradingEvent::EseFailures {
            count: 3,
            hurdle: 12.0,
        };
        assert_eq!(
            event.to_string(),
            "3 students failed ESE (scored < 12.0). Grade 'F' assigned."
        );

        let event = GradingEvent::AbsoluteFallback {
            count: 5,
            minimum: 30,
        };
        assert_eq!(
            event.to_string(),
            "Batch size 5 < 30. Switched to absolute grading."
        );
    }

    #[test]
    fn test_serializes_with_tag() {
        let json = serde_json::to_value(GradingEvent::Absentees { count: 2 }).unwrap();
        assert_eq!(json["event"], "absentees");
        assert_eq!(json["count"], 2);
    }
}
