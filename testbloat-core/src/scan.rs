//! Block-length scanning
//!
//! Global invariants enforced:
//! - Single forward pass over the lines of one file
//! - At most one open test at a time; a nested `it(` closes the outer test
//! - Only lines strictly between a test start and the next block boundary
//!   (or end of file) are counted
//! - Lines are split on `\n` only; a trailing newline yields a final empty line

use crate::classify::{classify, is_leading_space, LineKind};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// Test identifier -> body length, in first-insertion order
///
/// Re-inserting an existing identifier overwrites its length but keeps its
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LengthMap {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl LengthMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a length, returning the previous one if the identifier collided
    pub fn insert(&mut self, id: String, length: usize) -> Option<usize> {
        if let Some(&pos) = self.index.get(&id) {
            let previous = self.entries[pos].1;
            self.entries[pos].1 = length;
            return Some(previous);
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push((id, length));
        None
    }

    pub fn get(&self, id: &str) -> Option<usize> {
        self.index.get(id).map(|&pos| self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(id, len)| (id.as_str(), *len))
    }

    /// Fold another mapping into this one, in the other mapping's order
    pub fn merge(&mut self, other: LengthMap) {
        for (id, length) in other.entries {
            self.insert(id, length);
        }
    }
}

/// Test currently accumulating body lines
struct OpenTest {
    id: String,
    body: usize,
}

/// Build the identifier for a test starting at `line_number`
///
/// Surrounding whitespace, including a byte order mark, is dropped.
pub fn test_identifier(label: &str, line_number: usize, line: &str) -> String {
    format!("{}:{} - {}", label, line_number, line.trim_matches(is_leading_space))
        .trim_matches(is_leading_space)
        .to_string()
}

/// Scan source text, recording every test body into `lengths`
///
/// `label` is the file path as it should appear in identifiers. Returns the
/// number of tests recorded.
pub fn scan_source(label: &str, text: &str, lengths: &mut LengthMap) -> usize {
    if text.is_empty() {
        return 0;
    }

    let mut recorded = 0;
    let mut current: Option<OpenTest> = None;

    for (idx, line) in text.split('\n').enumerate() {
        let kind = classify(line);

        if !kind.is_boundary() {
            if let Some(open) = current.as_mut() {
                open.body += 1;
            }
            continue;
        }

        if let Some(open) = current.take() {
            lengths.insert(open.id, open.body);
            recorded += 1;
        }

        if kind == LineKind::TestStart {
            current = Some(OpenTest {
                id: test_identifier(label, idx + 1, line),
                body: 0,
            });
        }
    }

    // End of file closes any test still open
    if let Some(open) = current {
        lengths.insert(open.id, open.body);
        recorded += 1;
    }

    recorded
}

/// Scan source text into a fresh mapping
pub fn scan_source_to_map(label: &str, text: &str) -> LengthMap {
    let mut lengths = LengthMap::new();
    scan_source(label, text, &mut lengths);
    lengths
}

/// Read a test file as text
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read a file and scan it into `lengths`
pub fn scan_file(path: &Path, lengths: &mut LengthMap) -> Result<usize> {
    let text = read_source(path)?;
    let recorded = scan_source(&path.display().to_string(), &text, lengths);
    tracing::debug!(file = %path.display(), tests = recorded, "scanned");
    Ok(recorded)
}
