//! End-to-end load -> scan -> report flow over real temp files.

use std::io::Write;

use tempfile::NamedTempFile;
use triage_common::{LoadError, LogScanner, MappingLoader, ScanCondition, TriageReport};

fn fixture(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn full_triage_run_produces_ordered_report() {
    let table = fixture(
        b"Error Text,Interpretation\n\
          disk full,Storage exhausted\n\
          connection refused,Service is down\n\
          oom,Out of memory\n",
    );
    let log = fixture(
        b"2024-01-01 INFO boot\n\
          2024-01-01 ERROR Disk Full on /var\n\
          2024-01-01 WARN retrying: Connection Refused\n\
          2024-01-01 ERROR disk full again, connection refused too\n",
    );

    let mappings = MappingLoader::new(table.path()).load().unwrap();
    assert_eq!(mappings.len(), 3);

    let outcome = LogScanner::new(&mappings).scan(log.path()).unwrap();
    assert!(outcome.condition.is_none());

    let lines: Vec<u64> = outcome.matches.iter().map(|m| m.line_number).collect();
    assert_eq!(lines, vec![2, 3, 4, 4]);

    // Line 4 hits two signatures, in mapping-table order.
    assert_eq!(outcome.matches[2].interpretation, "Storage exhausted");
    assert_eq!(outcome.matches[3].interpretation, "Service is down");

    let report = TriageReport::new(&outcome.matches, mappings.len(), Some(3))
        .with_log_filename("app.log");
    assert_eq!(report.total_errors, 4);
    assert_eq!(report.displayed_errors, 3);
    assert_eq!(report.hidden_errors(), 1);
    assert_eq!(report.mappings_count, 3);
    assert_eq!(report.results[2].line_number, 4);
}

#[test]
fn load_failures_block_scanning() {
    let one_column = fixture(b"only\nERR1\n");
    assert!(matches!(
        MappingLoader::new(one_column.path()).load(),
        Err(LoadError::MalformedSchema(1))
    ));

    assert!(matches!(
        MappingLoader::new("/no/such/table.csv").load(),
        Err(LoadError::NotFound(_))
    ));

    let all_blank = fixture(b"a,b\n,x\nnan,y\n");
    assert!(matches!(
        MappingLoader::new(all_blank.path()).load(),
        Err(LoadError::EmptyMappings)
    ));
}

#[test]
fn scan_tolerates_encoding_noise_and_empty_sources() {
    let table = fixture(b"a,b\ndisk full,Storage exhausted\n");
    let mappings = MappingLoader::new(table.path()).load().unwrap();
    let scanner = LogScanner::new(&mappings);

    // Invalid UTF-8 bytes are replaced, never fatal.
    let noisy = fixture(b"\xf0\x28\x8c\x28 before\nDISK FULL\n");
    let outcome = scanner.scan(noisy.path()).unwrap();
    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].line_number, 2);

    let empty = fixture(b"");
    let outcome = scanner.scan(empty.path()).unwrap();
    assert!(outcome.matches.is_empty());
    assert_eq!(outcome.condition, Some(ScanCondition::EmptySource));
}

#[test]
fn independent_runs_share_no_state() {
    let table = fixture(b"a,b\ntimeout,Too slow\n");
    let log = fixture(b"request timeout\n");

    let first_mappings = MappingLoader::new(table.path()).load().unwrap();
    let second_mappings = MappingLoader::new(table.path()).load().unwrap();

    let first = LogScanner::new(&first_mappings).scan(log.path()).unwrap();
    let second = LogScanner::new(&second_mappings).scan(log.path()).unwrap();

    assert_eq!(first.matches, second.matches);
    assert_eq!(first.matches.len(), 1);
}
