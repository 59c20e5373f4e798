//! Per-course grading.
//!
//! This module classifies students (attendance shortfall, ESE absence, ESE
//! hurdle), selects the statistics cohort according to the configured
//! protocol, derives grade cut-offs and assigns the remaining grades.

pub mod boundaries;
pub mod engine;
pub mod events;
pub mod protocol;

pub use boundaries::Boundaries;
pub use engine::{CourseOutcome, GradingEngine, GradingMethod};
pub use events::GradingEvent;
