//! Shared scanning core for the platform log triage tool.
//!
//! Both front ends (`triagectl` and `triaged`) drive the same two-phase
//! flow: load an error-mapping table, then scan a log file against it.
//! Everything transport-specific (exit codes, HTTP statuses, truncation
//! framing) lives in the front ends; this crate owns the mapping and
//! matching semantics plus the shared report contract.

pub mod config;
pub mod mappings;
pub mod report;
pub mod scanner;

pub use config::TriageConfig;
pub use mappings::{ErrorMapping, LoadError, MappingLoader, MappingSet};
pub use report::{ReportEntry, TriageReport};
pub use scanner::{LogScanner, MatchRecord, ScanCondition, ScanError, ScanOutcome};
