//! Letter grades, grade points and display order.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A final course grade.
///
/// | Grade | Points | Meaning                        |
/// |-------|--------|--------------------------------|
/// | A+    | 10     |                                |
/// | A     | 9      |                                |
/// | B+    | 8      |                                |
/// | B     | 7      |                                |
/// | C+    | 6      |                                |
/// | C     | 5      |                                |
/// | D     | 4      |                                |
/// | D*    | 4      | D awarded through grace marks  |
/// | F     | 0      | fail                           |
/// | I     | 0      | attendance shortfall           |
/// | Z     | 0      | absent in the end-semester exam|
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Grade {
    I,
    Z,
    F,
    DGrace,
    D,
    C,
    CPlus,
    B,
    BPlus,
    A,
    APlus,
}

impl Grade {
    /// Every grade, lowest first. This is the x-axis order of the distribution chart.
    pub const DISPLAY_ORDER: [Grade; 11] = [
        Grade::I,
        Grade::Z,
        Grade::F,
        Grade::DGrace,
        Grade::D,
        Grade::C,
        Grade::CPlus,
        Grade::B,
        Grade::BPlus,
        Grade::A,
        Grade::APlus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
            Grade::DGrace => "D*",
            Grade::F => "F",
            Grade::I => "I",
            Grade::Z => "Z",
        }
    }

    pub fn points(&self) -> u8 {
        match self {
            Grade::APlus => 10,
            Grade::A => 9,
            Grade::BPlus => 8,
            Grade::B => 7,
            Grade::CPlus => 6,
            Grade::C => 5,
            Grade::D | Grade::DGrace => 4,
            Grade::F | Grade::I | Grade::Z => 0,
        }
    }

    /// `F`, `I` and `Z` are failing grades.
    pub fn is_fail(&self) -> bool {
        matches!(self, Grade::F | Grade::I | Grade::Z)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::DISPLAY_ORDER
            .iter()
            .copied()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown grade '{s}'"))
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_points() {
        assert_eq!(Grade::APlus.points(), 10);
        assert_eq!(Grade::A.points(), 9);
        assert_eq!(Grade::BPlus.points(), 8);
        assert_eq!(Grade::B.points(), 7);
        assert_eq!(Grade::CPlus.points(), 6);
        assert_eq!(Grade::C.points(), 5);
        assert_eq!(Grade::D.points(), 4);
        assert_eq!(Grade::DGrace.points(), 4);
        assert_eq!(Grade::F.points(), 0);
        assert_eq!(Grade::I.points(), 0);
        assert_eq!(Grade::Z.points(), 0);
    }

    #[test]
    fn test_failing_grades() {
        let failing: Vec<_> = Grade::DISPLAY_ORDER
            .iter()
            .filter(|g| g.is_fail())
            .collect();
        assert_eq!(failing, vec![&Grade::I, &Grade::Z, &Grade::F]);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("a+".parse::<Grade>().unwrap(), Grade::APlus);
        assert_eq!(" D* ".parse::<Grade>().unwrap(), Grade::DGrace);
        assert!("E".parse::<Grade>().is_err());
    }

    #[test]
    fn test_display_order_is_ascending() {
        let mut sorted = Grade::DISPLAY_ORDER;
        sorted.sort();
        assert_eq!(sorted, Grade::DISPLAY_ORDER);
    }
}
