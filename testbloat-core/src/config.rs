//! Optional JSON configuration
//!
//! Without `--config`, the scanned directory is searched: the first existing
//! file of `.testbloatrc.json` and `testbloat.config.json` wins, otherwise the
//! `"testbloat"` object of `package.json` is used. A `package.json` given
//! explicitly is read through the same key.
//!
//! Command-line flags are layered on top with [`ResolvedConfig::apply`].

use crate::discover::{TestFileMatcher, DEFAULT_SUFFIXES};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Standalone config files, in lookup order
const CONFIG_FILE_NAMES: &[&str] = &[".testbloatrc.json", "testbloat.config.json"];

const PACKAGE_MANIFEST: &str = "package.json";
const PACKAGE_KEY: &str = "testbloat";

/// Result cap used when neither a flag nor a config file sets one
pub const DEFAULT_TOP: i64 = 10;

/// Settings as written in a config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestbloatConfig {
    /// Test file name suffixes; empty keeps `test.js` and `spec.js`
    pub suffixes: Vec<String>,
    /// Globs relative to the scanned directory
    pub exclude: Vec<String>,
    pub min_lines: Option<i64>,
    pub top: Option<i64>,
    pub skip_unreadable: bool,
}

/// Command-line settings that take precedence over a config file
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub min_lines: Option<i64>,
    pub top: Option<i64>,
    /// Can only turn skipping on; a config file enabling it is not undone
    pub skip_unreadable: bool,
    pub sequential: bool,
}

/// Everything a scan needs, after defaults, config file and flags are merged
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub matcher: TestFileMatcher,
    pub exclude: Option<GlobSet>,
    pub min_lines: Option<i64>,
    pub top_n: Option<i64>,
    pub skip_unreadable: bool,
    pub parallel: bool,
    /// File the settings came from
    pub config_path: Option<PathBuf>,
}

impl TestbloatConfig {
    /// Reject values a scan could not use
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.suffixes.iter().all(|s| !s.trim().is_empty()),
            "suffixes must not contain blank entries"
        );
        if let Some(n) = self.min_lines.filter(|n| *n < 0) {
            anyhow::bail!("min_lines cannot be negative (got {})", n);
        }
        if let Some(n) = self.top.filter(|n| *n < 0) {
            anyhow::bail!("top cannot be negative (got {})", n);
        }
        compile_excludes(&self.exclude)?;
        Ok(())
    }

    /// Turn file settings into scan settings, remembering where they came from
    pub fn into_resolved(self, source: Option<PathBuf>) -> Result<ResolvedConfig> {
        self.validate()?;
        let matcher = if self.suffixes.is_empty() {
            TestFileMatcher::new(DEFAULT_SUFFIXES)
        } else {
            TestFileMatcher::new(&self.suffixes)
        };
        Ok(ResolvedConfig {
            matcher,
            exclude: compile_excludes(&self.exclude)?,
            min_lines: self.min_lines,
            top_n: self.top,
            skip_unreadable: self.skip_unreadable,
            parallel: true,
            config_path: source,
        })
    }
}

impl ResolvedConfig {
    /// Default suffixes, no excludes, parallel scan, fatal read errors
    pub fn defaults() -> Self {
        ResolvedConfig {
            matcher: TestFileMatcher::default(),
            exclude: None,
            min_lines: None,
            top_n: None,
            skip_unreadable: false,
            parallel: true,
            config_path: None,
        }
    }

    /// Layer command-line settings over the file settings
    pub fn apply(&mut self, overrides: &Overrides) {
        self.min_lines = overrides.min_lines.or(self.min_lines);
        self.top_n = overrides.top.or(self.top_n);
        self.skip_unreadable |= overrides.skip_unreadable;
        if overrides.sequential {
            self.parallel = false;
        }
    }

    /// `(min_lines, max_results)` with the unset ones defaulted
    pub fn thresholds(&self) -> (i64, i64) {
        (self.min_lines.unwrap_or(0), self.top_n.unwrap_or(DEFAULT_TOP))
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

fn compile_excludes(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("bad exclude glob `{}`", pattern))?);
    }
    Ok(Some(builder.build()?))
}

/// Parse one config source
///
/// Returns `None` for a `package.json` without a `"testbloat"` object.
pub fn read_config(path: &Path) -> Result<Option<TestbloatConfig>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;

    let config: TestbloatConfig = if path.file_name().is_some_and(|n| n == PACKAGE_MANIFEST) {
        let manifest: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        let Some(section) = manifest.get(PACKAGE_KEY) else {
            return Ok(None);
        };
        TestbloatConfig::deserialize(section)
            .with_context(|| format!("bad \"{}\" section in {}", PACKAGE_KEY, path.display()))?
    } else {
        serde_json::from_str(&text).with_context(|| format!("bad config in {}", path.display()))?
    };

    config
        .validate()
        .with_context(|| format!("bad config in {}", path.display()))?;
    Ok(Some(config))
}

/// Resolve the settings for a scan of `root`
///
/// An `explicit` path must yield a config; otherwise the lookup falls back to
/// defaults when nothing is found.
pub fn load(root: &Path, explicit: Option<&Path>) -> Result<ResolvedConfig> {
    if let Some(path) = explicit {
        let config = read_config(path)?.with_context(|| {
            format!("{} has no \"{}\" section", path.display(), PACKAGE_KEY)
        })?;
        return config.into_resolved(Some(path.to_path_buf()));
    }

    let candidates = CONFIG_FILE_NAMES
        .iter()
        .chain(std::iter::once(&PACKAGE_MANIFEST))
        .map(|name| root.join(name))
        .filter(|path| path.is_file());

    for path in candidates {
        if let Some(config) = read_config(&path)? {
            return config.into_resolved(Some(path));
        }
    }

    Ok(ResolvedConfig::defaults())
}
