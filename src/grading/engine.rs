use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::config::GradingConfig;
use crate::error::Result;
use crate::grade::Grade;
use crate::grading::boundaries::Boundaries;
use crate::grading::events::GradingEvent;
use crate::grading::protocol::cohort_marks;
use crate::record::{GradedStudent, StudentRecord};
use crate::stats::CohortStats;

/// How the cut-offs of a course were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradingMethod {
    /// Curve derived from cohort statistics.
    Relative,
    /// Fixed table, used for small cohorts.
    Absolute,
}

impl fmt::Display for GradingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradingMethod::Relative => f.write_str("Relative"),
            GradingMethod::Absolute => f.write_str("Absolute"),
        }
    }
}

/// Result of grading one course.
#[derive(Debug, Clone)]
pub struct CourseOutcome {
    /// Graded students, in input order.
    pub students: Vec<GradedStudent>,
    pub boundaries: Boundaries,
    pub method: GradingMethod,
    /// Statistics of the protocol-selected cohort.
    pub cohort: CohortStats,
    pub events: Vec<GradingEvent>,
}

/// Grades a single course under a fixed [`GradingConfig`].
#[derive(Debug, Clone)]
pub struct GradingEngine {
    config: GradingConfig,
}

impl GradingEngine {
    pub fn new(config: GradingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// Classifies every student and assigns the remaining grades from the
    /// course cut-offs.
    ///
    /// Precedence: attendance shortfall (`I`), then ESE absence (`Z`), then
    /// the ESE hurdle (`F`). Only students that pass all three are graded on
    /// the curve.
    #[tracing::instrument(skip_all, fields(students = records.len(), protocol = %self.config.protocol))]
    pub fn process(&self, records: Vec<StudentRecord>) -> CourseOutcome {
        let config = &self.config;
        let hurdle = config.ese_hurdle();
        let mut events = Vec::new();

        let mut grades: Vec<Option<Grade>> = records
            .iter()
            .map(|r| (r.attendance < config.attendance_threshold).then_some(Grade::I))
            .collect();

        let absent = records.iter().filter(|r| r.ese.is_absent()).count();
        if absent > 0 {
            events.push(GradingEvent::Absentees { count: absent });
        }
        for (grade, record) in grades.iter_mut().zip(&records) {
            if grade.is_none() && record.ese.is_absent() {
                *grade = Some(Grade::Z);
            }
        }

        let mut ese_failures = 0;
        for (grade, record) in grades.iter_mut().zip(&records) {
            if grade.is_none() && record.ese.score() < hurdle {
                *grade = Some(Grade::F);
                ese_failures += 1;
            }
        }
        if ese_failures > 0 {
            events.push(GradingEvent::EseFailures {
                count: ese_failures,
                hurdle,
            });
        }

        events.push(GradingEvent::ProtocolApplied {
            protocol: config.protocol,
            hurdle,
        });

        let cohort = CohortStats::from_marks(&cohort_marks(&records, config));
        debug!(?cohort, "Cohort selected");

        let (boundaries, method) = if cohort.count >= config.relative_min_batch {
            events.push(GradingEvent::BatchStatistics {
                count: cohort.count,
                mean: cohort.mean,
                sd: cohort.sd,
            });
            let (boundaries, adjustments) = Boundaries::relative(&cohort, config);
            events.extend(adjustments);
            (boundaries, GradingMethod::Relative)
        } else {
            events.push(GradingEvent::AbsoluteFallback {
                count: cohort.count,
                minimum: config.relative_min_batch,
            });
            (
                Boundaries::absolute(config.course_type),
                GradingMethod::Absolute,
            )
        };

        for event in &events {
            event.log();
        }

        let students: Vec<GradedStudent> = records
            .into_iter()
            .zip(grades)
            .map(|(record, grade)| GradedStudent {
                grade: grade.unwrap_or_else(|| boundaries.assign(record.marks)),
                record,
            })
            .collect();

        info!(
            method = %method,
            cohort = cohort.count,
            graded = students.len(),
            "Course graded"
        );

        CourseOutcome {
            students,
            boundaries,
            method,
            cohort,
            events,
        }
    }
}
