use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics about snapshot ingestion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    /// Records accepted into the index, per month
    pub records: BTreeMap<String, usize>,

    /// Records without a usable url, hash or count
    pub malformed: usize,

    /// Records whose origin never appeared in the current month
    pub unknown_origin: usize,

    /// Months with no snapshot data
    pub empty_months: Vec<String>,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, month: &str) {
        *self.records.entry(month.to_string()).or_insert(0) += 1;
    }

    pub fn add_malformed(&mut self) {
        self.malformed += 1;
    }

    pub fn add_unknown_origin(&mut self) {
        self.unknown_origin += 1;
    }

    pub fn add_empty_month(&mut self, month: String) {
        self.empty_months.push(month);
    }

    pub fn total_records(&self) -> usize {
        self.records.values().sum()
    }
}
