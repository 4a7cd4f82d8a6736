use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A CSV document held in memory. Every row has `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Returns the index of `name`, appending an empty column when it is missing.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }
}

/// One `Answer` entry of a DNS-over-HTTPS JSON reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxRecord {
    pub name: Option<String>,
    pub record_type: Option<u16>,
    pub data: Option<String>,
}

impl MxRecord {
    pub fn with_data(data: &str) -> Self {
        Self {
            name: None,
            record_type: Some(15),
            data: Some(data.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HostLabel {
    Provider(String),
    Other,
    NoEmail,
    InvalidEmail,
}

impl fmt::Display for HostLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostLabel::Provider(name) => f.write_str(name),
            HostLabel::Other => f.write_str("Other"),
            HostLabel::NoEmail => f.write_str("No-Email"),
            HostLabel::InvalidEmail => f.write_str("Invalid-Email"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentSummary {
    pub total_rows: usize,
    pub looked_up_rows: usize,
    pub skipped_rows: usize,
    pub unique_domains: usize,
    pub failed_lookups: usize,
    pub labels: BTreeMap<String, usize>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl EnrichmentSummary {
    pub fn start() -> Self {
        Self {
            total_rows: 0,
            looked_up_rows: 0,
            skipped_rows: 0,
            unique_domains: 0,
            failed_lookups: 0,
            labels: BTreeMap::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record_label(&mut self, label: &HostLabel) {
        *self.labels.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub table: CsvTable,
    pub summary: EnrichmentSummary,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: String,
    pub summary: EnrichmentSummary,
}
