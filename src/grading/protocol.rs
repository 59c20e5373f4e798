use crate::config::{GradingConfig, Protocol};
use crate::record::StudentRecord;

impl Protocol {
    /// Returns `true` if `record` contributes to the cohort statistics.
    ///
    /// Both protocols drop attendance defaulters. Protocol A also drops
    /// anyone under the ESE hurdle, absentees included.
    pub fn includes(&self, record: &StudentRecord, config: &GradingConfig) -> bool {
        let attended = record.attendance >= config.attendance_threshold;
        match self {
            Protocol::Exclusive => attended && record.ese.score() >= config.ese_hurdle(),
            Protocol::Inclusive => attended,
        }
    }
}

/// Marks of the students the configured protocol selects, in input order.
pub fn cohort_marks(records: &[StudentRecord], config: &GradingConfig) -> Vec<f64> {
    records
        .iter()
        .filter(|r| config.protocol.includes(r, config))
        .map(|r| r.marks)
        .collect()
}
