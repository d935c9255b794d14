//! Terminal output - clean, ASCII-only formatting.

use owo_colors::OwoColorize;
use triage_common::TriageReport;

const WIDE_SEPARATOR: usize = 80;
const ENTRY_SEPARATOR: usize = 60;

pub fn print_banner() {
    println!("{}", "Platform Issue Triage Tool".bold());
    println!("{}", "=".repeat(40));
}

pub fn print_loaded(count: usize, path: &std::path::Path) {
    println!("Loaded {} error mappings from '{}'", count, path.display());
}

pub fn print_scanning(path: &std::path::Path, size_bytes: u64) {
    println!("Scanning log file: {} ({} bytes)", path.display(), size_bytes);
}

/// Render the results block. Returned as a string so the exact layout is
/// testable without capturing stdout.
pub fn render_results(report: &TriageReport) -> String {
    let mut out = String::new();

    if report.total_errors == 0 {
        out.push_str("\nNo known errors detected in the log file.\n");
        return out;
    }

    out.push('\n');
    out.push_str(&"=".repeat(WIDE_SEPARATOR));
    out.push('\n');
    if report.hidden_errors() > 0 {
        out.push_str(&format!(
            "TRIAGE RESULTS: Showing {} of {} error(s) found\n",
            report.displayed_errors, report.total_errors
        ));
    } else {
        out.push_str(&format!(
            "TRIAGE RESULTS: {} error(s) found\n",
            report.total_errors
        ));
    }
    out.push_str(&"=".repeat(WIDE_SEPARATOR));
    out.push('\n');

    for (i, entry) in report.results.iter().enumerate() {
        out.push_str(&format!(
            "\n[{}] Error found at line {}:\n",
            i + 1,
            entry.line_number
        ));
        out.push_str(&format!("    Log Line: {}\n", entry.log_line));
        out.push_str(&format!("    Interpretation: {}\n", entry.interpretation));
        out.push_str(&format!("    {}\n", "-".repeat(ENTRY_SEPARATOR)));
    }

    if report.hidden_errors() > 0 {
        out.push_str(&format!(
            "\n... and {} more error(s) not shown\n",
            report.hidden_errors()
        ));
    }

    out
}

pub fn print_results(report: &TriageReport) {
    print!("{}", render_results(report));
}

pub fn print_summary(total: usize) {
    if total > 0 {
        println!(
            "\nScan complete. Total errors found: {}",
            total.to_string().bright_red()
        );
    } else {
        println!(
            "\nScan complete. Total errors found: {}",
            total.to_string().bright_green()
        );
    }
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".bright_red(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "Warning:".yellow(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_common::MatchRecord;

    fn report_with(matches: usize, cap: Option<usize>) -> TriageReport {
        let records: Vec<MatchRecord> = (1..=matches as u64)
            .map(|n| MatchRecord {
                line_number: n * 10,
                raw_line: format!("line {n}"),
                interpretation: format!("meaning {n}"),
            })
            .collect();
        TriageReport::new(&records, 7, cap)
    }

    #[test]
    fn no_matches_renders_clean_message() {
        let out = render_results(&report_with(0, None));
        assert!(out.contains("No known errors detected"));
        assert!(!out.contains("TRIAGE RESULTS"));
    }

    #[test]
    fn full_results_show_count_and_entries() {
        let out = render_results(&report_with(2, None));
        assert!(out.contains("TRIAGE RESULTS: 2 error(s) found"));
        assert!(out.contains("[1] Error found at line 10:"));
        assert!(out.contains("[2] Error found at line 20:"));
        assert!(out.contains("    Log Line: line 1"));
        assert!(out.contains("    Interpretation: meaning 2"));
        assert!(!out.contains("not shown"));
    }

    #[test]
    fn truncated_results_show_both_counts() {
        let out = render_results(&report_with(5, Some(2)));
        assert!(out.contains("TRIAGE RESULTS: Showing 2 of 5 error(s) found"));
        assert!(out.contains("... and 3 more error(s) not shown"));
        assert!(!out.contains("[3]"));
    }
}
