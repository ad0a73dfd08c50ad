//! Ranking and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering (length descending, identifier ascending)
//! - `num_total_tests` is counted before truncation
//! - Aggregation never mutates its input mapping

use crate::scan::LengthMap;
use serde::{Deserialize, Serialize};

/// Ranked tests that met the line threshold
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargeTests {
    /// `(identifier, body length)` pairs, longest first
    pub large_tests: Vec<(String, usize)>,
    /// Number of tests meeting the threshold before truncation
    pub num_total_tests: usize,
    /// Threshold the report was built with
    #[serde(skip)]
    pub min_lines: usize,
}

/// Filter, rank, and truncate a length mapping
pub fn aggregate(lengths: &LengthMap, min_lines: usize, max_count: usize) -> LargeTests {
    let mut qualifying: Vec<(String, usize)> = lengths
        .iter()
        .filter(|(_, len)| *len >= min_lines)
        .map(|(id, len)| (id.to_string(), len))
        .collect();

    let num_total_tests = qualifying.len();

    qualifying.sort_by(|a, b| {
        // 1. Length descending
        b.1.cmp(&a.1)
            // 2. Identifier ascending
            .then_with(|| a.0.cmp(&b.0))
    });
    qualifying.truncate(max_count);

    LargeTests {
        large_tests: qualifying,
        num_total_tests,
        min_lines,
    }
}

/// Render a report as a text table
pub fn render_text(report: &LargeTests) -> String {
    let mut output = String::new();

    if !report.large_tests.is_empty() {
        output.push_str(&format!("{:<8} {}\n", "LINES", "TEST"));
        for (id, len) in &report.large_tests {
            output.push_str(&format!("{:<8} {}\n", len, id));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "Showing {} of {} test(s) with at least {} line(s)\n",
        report.large_tests.len(),
        report.num_total_tests,
        report.min_lines
    ));

    output
}

/// Render a report as JSON output
pub fn render_json(report: &LargeTests) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|_| r#"{"largeTests":[],"numTotalTests":0}"#.to_string())
}
