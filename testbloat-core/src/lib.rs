//! testbloat core library - finds oversized test bodies in JavaScript test suites

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Classification is line-oriented; source is never parsed
// - No global mutable state
// - Inputs are validated before the filesystem is walked
// - Per-file scans write isolated mappings merged in discovery order
// - Identical input yields byte-for-byte identical output

pub mod classify;
pub mod config;
pub mod discover;
pub mod error;
pub mod report;
pub mod scan;

pub use classify::{classify, is_block_boundary, is_leading_space, is_test_start, LineKind};
pub use config::ResolvedConfig;
pub use discover::{discover_test_files, DiscoverOptions, TestFileMatcher};
pub use error::{Error, Result};
pub use report::{aggregate, render_json, render_text, LargeTests};
pub use scan::{read_source, scan_file, scan_source, scan_source_to_map, LengthMap};

use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Find the largest tests under `directory` using default configuration
///
/// Returns at most `max_results` tests whose body is at least `min_lines`
/// long, plus the number of tests that met the threshold.
pub fn get_large_tests(directory: &Path, min_lines: i64, max_results: i64) -> Result<LargeTests> {
    get_large_tests_with_config(directory, min_lines, max_results, &ResolvedConfig::defaults())
}

/// Find the largest tests under `directory` with a resolved configuration
pub fn get_large_tests_with_config(
    directory: &Path,
    min_lines: i64,
    max_results: i64,
    config: &ResolvedConfig,
) -> Result<LargeTests> {
    let (min_lines, max_results) = validate_inputs(directory, min_lines, max_results)?;

    let files = discover_test_files(
        directory,
        DiscoverOptions {
            matcher: &config.matcher,
            exclude: config.exclude.as_ref(),
        },
    )?;

    let lengths = collect_lengths(&files, config)?;
    let report = aggregate(&lengths, min_lines, max_results);

    tracing::info!(
        files = files.len(),
        tests = lengths.len(),
        qualifying = report.num_total_tests,
        "analysis complete"
    );

    Ok(report)
}

/// Check preconditions, converting the thresholds to counts
///
/// The directory is checked first, then `min_lines`, then `max_results`.
pub fn validate_inputs(directory: &Path, min_lines: i64, max_results: i64) -> Result<(usize, usize)> {
    if !directory.is_dir() {
        return Err(Error::NotADirectory(directory.to_path_buf()));
    }

    if min_lines < 0 {
        return Err(Error::NegativeMinLines(min_lines));
    }

    if max_results < 0 {
        return Err(Error::NegativeMaxResults(max_results));
    }

    Ok((
        usize::try_from(min_lines).unwrap_or(usize::MAX),
        usize::try_from(max_results).unwrap_or(usize::MAX),
    ))
}

/// Scan every file and merge the per-file mappings in file order
fn collect_lengths(files: &[PathBuf], config: &ResolvedConfig) -> Result<LengthMap> {
    let scan_one = |path: &PathBuf| -> Result<LengthMap> {
        let text = read_source(path)?;
        let partial = scan_source_to_map(&path.display().to_string(), &text);
        tracing::debug!(file = %path.display(), tests = partial.len(), "scanned");
        Ok(partial)
    };

    let partials: Vec<Result<LengthMap>> = if config.parallel {
        files.par_iter().map(scan_one).collect()
    } else {
        files.iter().map(scan_one).collect()
    };

    let mut lengths = LengthMap::new();
    let mut skipped_files: usize = 0;
    for partial in partials {
        match partial {
            Ok(partial) => lengths.merge(partial),
            Err(e) if config.skip_unreadable => {
                tracing::warn!("skipping file: {}: {}", e, error_source(&e));
                skipped_files += 1;
            }
            Err(e) => return Err(e),
        }
    }
    if skipped_files > 0 {
        tracing::warn!("Skipped {} file(s) due to read errors", skipped_files);
    }

    Ok(lengths)
}

fn error_source(e: &Error) -> String {
    std::error::Error::source(e)
        .map(|s| s.to_string())
        .unwrap_or_default()
}
