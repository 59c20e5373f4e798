//! Headline metrics for a graded course.

use serde::Serialize;

use crate::grade::Grade;
use crate::grading::{CourseOutcome, GradingMethod};
use crate::stats::{mean, pct};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeCount {
    pub grade: Grade,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummary {
    pub total_students: usize,
    /// Mean marks of students meeting the attendance threshold.
    pub raw_average: f64,
    pub method: GradingMethod,
    pub pass_percentage: f64,
    /// Non-zero counts in display order.
    pub distribution: Vec<GradeCount>,
}

impl CourseSummary {
    pub fn from_outcome(outcome: &CourseOutcome, attendance_threshold: f64) -> Self {
        let regular: Vec<f64> = outcome
            .students
            .iter()
            .filter(|s| s.record.attendance >= attendance_threshold)
            .map(|s| s.record.marks)
            .collect();

        let passed = outcome
            .students
            .iter()
            .filter(|s| !s.grade.is_fail())
            .count();

        CourseSummary {
            total_students: outcome.students.len(),
            raw_average: mean(&regular),
            method: outcome.method,
            pass_percentage: pct(passed, outcome.students.len()),
            distribution: distribution(outcome.students.iter().map(|s| s.grade)),
        }
    }
}

/// Counts grades, keeping display order and dropping grades nobody received.
pub fn distribution(grades: impl IntoIterator<Item = Grade>) -> Vec<GradeCount> {
    let mut counts = [0usize; Grade::DISPLAY_ORDER.len()];
    for grade in grades {
        if let Some(i) = Grade::DISPLAY_ORDER.iter().position(|g| *g == grade) {
            counts[i] += 1;
        }
    }

    Grade::DISPLAY_ORDER
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(grade, count)| GradeCount {
            grade: *grade,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GradingConfig;
    use crate::grading::GradingEngine;
    use crate::record::{EseMarks, StudentRecord};

    #[test]
    fn test_distribution_order_and_zero_filtering() {
        let counts = distribution([Grade::A, Grade::F, Grade::A, Grade::Z]);
        assert_eq!(
            counts,
            vec![
                GradeCount {
                    grade: Grade::Z,
                    count: 1
                },
                GradeCount {
                    grade: Grade::F,
                    count: 1
                },
                GradeCount {
                    grade: Grade::A,
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_summary_of_template_class() {
        let records = vec![
            StudentRecord::new("1", 82.0, 90.0, EseMarks::Marks(40.0)),
            StudentRecord::new("2", 65.0, 85.0, EseMarks::Marks(30.0)),
            StudentRecord::new("3", 45.0, 80.0, EseMarks::Absent),
            StudentRecord::new("4", 32.0, 76.0, EseMarks::Marks(10.0)),
            StudentRecord::new("5", 91.0, 95.0, EseMarks::Marks(50.0)),
        ];
        let outcome = GradingEngine::new(GradingConfig::default())
            .unwrap()
            .process(records);
        let summary = CourseSummary::from_outcome(&outcome, 75.0);

        assert_eq!(summary.total_students, 5);
        assert_eq!(summary.method, GradingMethod::Absolute);
        assert_eq!(summary.raw_average, 63.0);
        assert_eq!(summary.pass_percentage, 60.0);
    }
}
