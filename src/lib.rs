pub mod chart;
pub mod config;
pub mod error;
pub mod grade;
pub mod grading;
pub mod output;
pub mod parser;
pub mod record;
pub mod semester;
pub mod stats;
pub mod summary;

pub use error::{GradeError, Result};
