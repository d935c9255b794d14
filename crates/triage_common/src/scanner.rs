//! Log scanning against a loaded mapping set.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::mappings::MappingSet;

/// Progress diagnostic cadence for large files.
const PROGRESS_INTERVAL_LINES: u64 = 10_000;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read log file: {0}")]
    Io(String),
}

/// Reportable (non-fatal) conditions on the log source.
///
/// Both yield an empty match list rather than an error: a mapping load may
/// already have succeeded and the caller still wants a well-formed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCondition {
    SourceNotFound,
    EmptySource,
}

/// One match of a known error signature against a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// 1-based ordinal of the physical line, blank lines included.
    pub line_number: u64,
    /// The matched line, trimmed of surrounding whitespace.
    pub raw_line: String,
    /// Interpretation text copied from the matching mapping.
    pub interpretation: String,
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Matches in line order, then mapping-set order within a line.
    pub matches: Vec<MatchRecord>,
    pub condition: Option<ScanCondition>,
}

/// Scans a text source line by line for known error signatures.
///
/// Matching is case-insensitive plain substring containment: a signature
/// that happens to be a substring of a longer log token still counts.
/// The borrowed mapping set cannot change for the lifetime of the scanner,
/// so repeated scans of the same source give identical results.
pub struct LogScanner<'a> {
    mappings: &'a MappingSet,
}

impl<'a> LogScanner<'a> {
    pub fn new(mappings: &'a MappingSet) -> Self {
        Self { mappings }
    }

    /// Scan a log file, fully materializing the match list before return.
    pub fn scan(&self, path: &Path) -> Result<ScanOutcome, ScanError> {
        if !path.exists() {
            warn!("Log file '{}' not found", path.display());
            return Ok(ScanOutcome {
                matches: Vec::new(),
                condition: Some(ScanCondition::SourceNotFound),
            });
        }

        let size = std::fs::metadata(path)
            .map_err(|e| ScanError::Io(e.to_string()))?
            .len();
        if size == 0 {
            warn!("Log file '{}' is empty", path.display());
            return Ok(ScanOutcome {
                matches: Vec::new(),
                condition: Some(ScanCondition::EmptySource),
            });
        }

        info!("Scanning log file: {} ({} bytes)", path.display(), size);

        let file = File::open(path).map_err(|e| ScanError::Io(e.to_string()))?;
        let matches = self.scan_reader(BufReader::new(file))?;

        Ok(ScanOutcome {
            matches,
            condition: None,
        })
    }

    /// Scan an already-open line source.
    ///
    /// Lines are split on `\n` as raw bytes and decoded lossily, so
    /// encoding noise in a log never aborts a scan.
    pub fn scan_reader<R: BufRead>(&self, mut reader: R) -> Result<Vec<MatchRecord>, ScanError> {
        let mut matches = Vec::new();
        let mut buf = Vec::new();
        let mut line_number: u64 = 0;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| ScanError::Io(e.to_string()))?;
            if read == 0 {
                break;
            }
            line_number += 1;

            let decoded = String::from_utf8_lossy(&buf);
            let raw_line = decoded.trim();
            let normalized = raw_line.to_lowercase();

            for mapping in self.mappings.iter() {
                if normalized.contains(mapping.key.as_str()) {
                    matches.push(MatchRecord {
                        line_number,
                        raw_line: raw_line.to_string(),
                        interpretation: mapping.interpretation.clone(),
                    });
                }
            }

            if line_number % PROGRESS_INTERVAL_LINES == 0 {
                debug!("Processed {} lines", line_number);
            }
        }

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappings::ErrorMapping;
    use std::io::Cursor;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn mapping(signature: &str, interpretation: &str) -> ErrorMapping {
        ErrorMapping {
            key: signature.trim().to_lowercase(),
            original_text: signature.trim().to_string(),
            interpretation: interpretation.to_string(),
        }
    }

    fn set_of(pairs: &[(&str, &str)]) -> MappingSet {
        let mut set = MappingSet::new();
        for (sig, interp) in pairs {
            set.insert(mapping(sig, interp));
        }
        set
    }

    #[test]
    fn case_insensitive_substring_match() {
        let set = set_of(&[("disk full", "Storage exhausted")]);
        let scanner = LogScanner::new(&set);
        let log = "INFO start\nERROR: Disk Full detected\nINFO end\n";

        let matches = scanner.scan_reader(Cursor::new(log)).unwrap();
        assert_eq!(
            matches,
            vec![MatchRecord {
                line_number: 2,
                raw_line: "ERROR: Disk Full detected".to_string(),
                interpretation: "Storage exhausted".to_string(),
            }]
        );
    }

    #[test]
    fn line_numbers_count_blank_lines() {
        let set = set_of(&[("oops", "Something broke")]);
        let scanner = LogScanner::new(&set);
        let log = "\n\noops\n";

        let matches = scanner.scan_reader(Cursor::new(log)).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line_number, 3);
    }

    #[test]
    fn multiple_signatures_on_one_line_follow_mapping_order() {
        let set = set_of(&[("disk full", "Storage exhausted"), ("error", "Generic failure")]);
        let scanner = LogScanner::new(&set);
        let log = "ERROR: disk full\n";

        let matches = scanner.scan_reader(Cursor::new(log)).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].interpretation, "Storage exhausted");
        assert_eq!(matches[1].interpretation, "Generic failure");
        assert_eq!(matches[0].line_number, matches[1].line_number);
    }

    #[test]
    fn substring_of_longer_token_still_matches() {
        let set = set_of(&[("err1", "Known error one")]);
        let scanner = LogScanner::new(&set);

        let matches = scanner.scan_reader(Cursor::new("fatal: ERR123\n")).unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn raw_line_is_trimmed_but_not_lowercased() {
        let set = set_of(&[("disk full", "Storage exhausted")]);
        let scanner = LogScanner::new(&set);

        let matches = scanner
            .scan_reader(Cursor::new("   DISK FULL on /dev/sda1   \r\n"))
            .unwrap();
        assert_eq!(matches[0].raw_line, "DISK FULL on /dev/sda1");
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let set = set_of(&[("disk full", "Storage exhausted")]);
        let scanner = LogScanner::new(&set);
        let bytes: &[u8] = b"\xff\xfe garbage\ndisk full\n";

        let matches = scanner.scan_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line_number, 2);
    }

    #[test]
    fn last_line_without_newline_is_scanned() {
        let set = set_of(&[("disk full", "Storage exhausted")]);
        let scanner = LogScanner::new(&set);

        let matches = scanner.scan_reader(Cursor::new("disk full")).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line_number, 1);
    }

    #[test]
    fn missing_file_reports_condition_not_error() {
        let set = set_of(&[("disk full", "Storage exhausted")]);
        let scanner = LogScanner::new(&set);

        let outcome = scanner.scan(Path::new("/nonexistent/app.log")).unwrap();
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.condition, Some(ScanCondition::SourceNotFound));
    }

    #[test]
    fn empty_file_reports_condition_not_error() {
        let set = set_of(&[("disk full", "Storage exhausted")]);
        let scanner = LogScanner::new(&set);
        let file = NamedTempFile::new().unwrap();

        let outcome = scanner.scan(file.path()).unwrap();
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.condition, Some(ScanCondition::EmptySource));
    }

    #[test]
    fn rescanning_is_idempotent() {
        let set = set_of(&[("disk full", "Storage exhausted"), ("timeout", "Too slow")]);
        let scanner = LogScanner::new(&set);
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a timeout here\ndisk full there\ntimeout again\n").unwrap();
        file.flush().unwrap();

        let first = scanner.scan(file.path()).unwrap();
        let second = scanner.scan(file.path()).unwrap();
        assert_eq!(first.matches, second.matches);
        assert_eq!(first.matches.len(), 3);
    }
}
