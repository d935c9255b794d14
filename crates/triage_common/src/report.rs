//! Shared result contract for both front ends.
//!
//! The CLI formats this for the terminal; the web API serializes it as
//! JSON. Truncation to a caller-requested maximum happens here, after
//! scanning completes, and never reorders matches.

use serde::{Deserialize, Serialize};

use crate::scanner::MatchRecord;

/// One reported match, in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub line_number: u64,
    pub log_line: String,
    pub interpretation: String,
}

impl From<&MatchRecord> for ReportEntry {
    fn from(record: &MatchRecord) -> Self {
        Self {
            line_number: record.line_number,
            log_line: record.raw_line.clone(),
            interpretation: record.interpretation.clone(),
        }
    }
}

/// Full triage result: every match found, the slice actually displayed,
/// and the size of the mapping set that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageReport {
    pub total_errors: usize,
    pub displayed_errors: usize,
    pub results: Vec<ReportEntry>,
    pub mappings_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filename: Option<String>,
}

impl TriageReport {
    /// Build a report, keeping at most `max_errors` matches in original
    /// order. `total_errors` always reflects the full count.
    pub fn new(matches: &[MatchRecord], mappings_count: usize, max_errors: Option<usize>) -> Self {
        let total = matches.len();
        let shown = match max_errors {
            Some(max) => &matches[..total.min(max)],
            None => matches,
        };

        Self {
            total_errors: total,
            displayed_errors: shown.len(),
            results: shown.iter().map(ReportEntry::from).collect(),
            mappings_count,
            log_filename: None,
        }
    }

    pub fn with_log_filename(mut self, filename: impl Into<String>) -> Self {
        self.log_filename = Some(filename.into());
        self
    }

    /// Number of matches found but not displayed under the current cap.
    pub fn hidden_errors(&self) -> usize {
        self.total_errors - self.displayed_errors
    }
}
