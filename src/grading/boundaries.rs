//! Grade cut-offs: the relative curve and the absolute fallback tables.

use serde::Serialize;

use crate::config::{CourseType, GradingConfig};
use crate::grade::Grade;
use crate::grading::events::GradingEvent;
use crate::stats::CohortStats;

/// Minimum marks for each passing grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Boundaries {
    #[serde(rename = "A+")]
    pub a_plus: f64,
    #[serde(rename = "A")]
    pub a: f64,
    #[serde(rename = "B+")]
    pub b_plus: f64,
    #[serde(rename = "B")]
    pub b: f64,
    #[serde(rename = "C+")]
    pub c_plus: f64,
    #[serde(rename = "C")]
    pub c: f64,
    #[serde(rename = "D")]
    pub d: f64,
}

impl Boundaries {
    /// Builds the curve from cohort mean `X` and SD `s`, then applies the
    /// moderation, minimum cut-off and maximum marks rules.
    ///
    /// | Grade | Raw cut-off |
    /// |-------|-------------|
    /// | A+    | X + 1.5s    |
    /// | A     | X + s       |
    /// | B+    | X + 0.5s    |
    /// | B     | X           |
    /// | C+    | X - 0.5s    |
    /// | C     | X - s       |
    /// | D     | X - 1.5s    |
    pub fn relative(stats: &CohortStats, config: &GradingConfig) -> (Self, Vec<GradingEvent>) {
        let x = stats.mean;
        let sigma = stats.sd;
        let pass = config.pass_marks();
        let floor = config.floor_marks();
        let max = config.total_max_marks;

        let raw_d = x - 1.5 * sigma;
        let mut bounds = Boundaries {
            a_plus: x + 1.5 * sigma,
            a: x + sigma,
            b_plus: x + 0.5 * sigma,
            b: x,
            c_plus: x - 0.5 * sigma,
            c: x - sigma,
            d: raw_d,
        };
        let mut events = Vec::new();

        if raw_d > pass {
            events.push(GradingEvent::Moderation {
                raw_d,
                pass_marks: pass,
            });
            bounds.c_plus = x - (x - pass) / 3.0;
            bounds.c = x - 2.0 * (x - pass) / 3.0;
            bounds.d = pass;
        } else if raw_d < floor {
            let delta = floor - raw_d;
            events.push(GradingEvent::FloorShift {
                raw_d,
                floor,
                delta,
            });
            bounds = bounds.shifted(delta);
            bounds.d = floor;
        }

        if bounds.a_plus > max {
            bounds.a_plus = max;
            events.push(GradingEvent::UpperCap { max_marks: max });
        }

        (bounds, events)
    }

    /// Fixed tables used when the cohort is too small for a curve.
    pub fn absolute(course_type: CourseType) -> Self {
        match course_type {
            CourseType::Theory => Boundaries {
                a_plus: 90.0,
                a: 80.0,
                b_plus: 72.0,
                b: 64.0,
                c_plus: 56.0,
                c: 48.0,
                d: 40.0,
            },
            CourseType::Practical => Boundaries {
                a_plus: 90.0,
                a: 80.0,
                b_plus: 70.0,
                b: 62.0,
                c_plus: 58.0,
                c: 54.0,
                d: 50.0,
            },
        }
    }

    fn shifted(self, delta: f64) -> Self {
        Boundaries {
            a_plus: self.a_plus + delta,
            a: self.a + delta,
            b_plus: self.b_plus + delta,
            b: self.b + delta,
            c_plus: self.c_plus + delta,
            c: self.c + delta,
            d: self.d + delta,
        }
    }

    /// Cut-offs from A+ down to D.
    pub fn cutoffs(&self) -> [(Grade, f64); 7] {
        [
            (Grade::APlus, self.a_plus),
            (Grade::A, self.a),
            (Grade::BPlus, self.b_plus),
            (Grade::B, self.b),
            (Grade::CPlus, self.c_plus),
            (Grade::C, self.c),
            (Grade::D, self.d),
        ]
    }

    /// The highest grade whose cut-off `marks` reaches, or `F`.
    pub fn assign(&self, marks: f64) -> Grade {
        match marks {
            m if m >= self.a_plus => Grade::APlus,
            m if m >= self.a => Grade::A,
            m if m >= self.b_plus => Grade::BPlus,
            m if m >= self.b => Grade::B,
            m if m >= self.c_plus => Grade::CPlus,
            m if m >= self.c => Grade::C,
            m if m >= self.d => Grade::D,
            _ => Grade::F,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn stats(mean: f64, sd: f64) -> CohortStats {
        CohortStats { count: 30, mean, sd }
    }

    #[test]
    fn test_plain_curve_without_adjustments() {
        // raw D = 35, inside [30, 40]
        let (b, events) = Boundaries::relative(&stats(50.0, 10.0), &GradingConfig::default());

        assert!(events.is_empty());
        assert_close(b.a_plus, 65.0);
        assert_close(b.a, 60.0);
        assert_close(b.b_plus, 55.0);
        assert_close(b.b, 50.0);
        assert_close(b.c_plus, 45.0);
        assert_close(b.c, 40.0);
        assert_close(b.d, 35.0);
    }

    #[test]
    fn test_moderation_caps_d_at_pass_mark() {
        // raw D = 45 > P = 40
        let (b, events) = Boundaries::relative(&stats(60.0, 10.0), &GradingConfig::default());

        assert_eq!(
            events,
            vec![GradingEvent::Moderation {
                raw_d: 45.0,
                pass_marks: 40.0
            }]
        );
        assert_close(b.a_plus, 75.0);
        assert_close(b.b, 60.0);
        assert_close(b.c_plus, 60.0 - 20.0 / 3.0);
        assert_close(b.c, 60.0 - 40.0 / 3.0);
        assert_close(b.d, 40.0);
    }

    #[test]
    fn test_floor_shift_moves_whole_curve() {
        // raw D = 25 < floor 30, delta 5
        let (b, events) = Boundaries::relative(&stats(40.0, 10.0), &GradingConfig::default());

        assert_eq!(
            events,
            vec![GradingEvent::FloorShift {
                raw_d: 25.0,
                floor: 30.0,
                delta: 5.0
            }]
        );
        assert_close(b.a_plus, 60.0);
        assert_close(b.a, 55.0);
        assert_close(b.b_plus, 50.0);
        assert_close(b.b, 45.0);
        assert_close(b.c_plus, 40.0);
        assert_close(b.c, 35.0);
        assert_close(b.d, 30.0);
    }

    #[test]
    fn test_upper_cap_after_moderation() {
        let (b, events) = Boundaries::relative(&stats(90.0, 10.0), &GradingConfig::default());

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], GradingEvent::Moderation { .. }));
        assert_eq!(events[1], GradingEvent::UpperCap { max_marks: 100.0 });
        assert_close(b.a_plus, 100.0);
        assert_close(b.d, 40.0);
    }

    #[test]
    fn test_practical_pass_mark_moderation() {
        let config = GradingConfig {
            course_type: CourseType::Practical,
            ..Default::default()
        };
        // raw D = 55 > P = 50
        let (b, _) = Boundaries::relative(&stats(70.0, 10.0), &config);
        assert_close(b.d, 50.0);
        assert_close(b.c_plus, 70.0 - 20.0 / 3.0);
    }

    #[test]
    fn test_absolute_tables() {
        let theory = Boundaries::absolute(CourseType::Theory);
        assert_eq!(theory.b_plus, 72.0);
        assert_eq!(theory.d, 40.0);

        let practical = Boundaries::absolute(CourseType::Practical);
        assert_eq!(practical.c_plus, 58.0);
        assert_eq!(practical.d, 50.0);
    }

    #[test]
    fn test_assign_boundaries_are_inclusive() {
        let b = Boundaries::absolute(CourseType::Theory);
        assert_eq!(b.assign(100.0), Grade::APlus);
        assert_eq!(b.assign(90.0), Grade::APlus);
        assert_eq!(b.assign(89.9), Grade::A);
        assert_eq!(b.assign(72.0), Grade::BPlus);
        assert_eq!(b.assign(64.0), Grade::B);
        assert_eq!(b.assign(56.0), Grade::CPlus);
        assert_eq!(b.assign(48.0), Grade::C);
        assert_eq!(b.assign(40.0), Grade::D);
        assert_eq!(b.assign(39.99), Grade::F);
        assert_eq!(b.assign(0.0), Grade::F);
    }

    #[test]
    fn test_cutoffs_order() {
        let grades: Vec<Grade> = Boundaries::absolute(CourseType::Theory)
            .cutoffs()
            .iter()
            .map(|(g, _)| *g)
            .collect();
        assert_eq!(
            grades,
            vec![
                Grade::APlus,
                Grade::A,
                Grade::BPlus,
                Grade::B,
                Grade::CPlus,
                Grade::C,
                Grade::D
            ]
        );
    }
}
