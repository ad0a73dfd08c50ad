//! Line classification for test sources
//!
//! Global invariants enforced:
//! - Pure functions of a single line, no state or I/O
//! - Matching is a lexical prefix test anchored at the first non-whitespace
//!   character; string literals, comments, and multi-line calls are not parsed
//! - A byte order mark counts as leading whitespace
//! - `is_test_start` implies `is_block_boundary`

use regex::Regex;
use std::sync::OnceLock;

/// Kind of a single source line as seen by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `it(` declaration; opens a new test body
    TestStart,
    /// `describe(`, `beforeEach(` or `afterEach(`; closes any open test body
    BlockBoundary,
    /// Anything else
    Code,
}

impl LineKind {
    pub fn is_boundary(&self) -> bool {
        !matches!(self, LineKind::Code)
    }
}

fn test_start_re() -> &'static Regex {
    static TEST_RE: OnceLock<Regex> = OnceLock::new();
    TEST_RE.get_or_init(|| Regex::new(r"^[\s\x{FEFF}]*it\(").unwrap())
}

fn block_re() -> &'static Regex {
    static BLOCK_RE: OnceLock<Regex> = OnceLock::new();
    BLOCK_RE.get_or_init(|| Regex::new(r"^[\s\x{FEFF}]*(?:it|describe|beforeEach|afterEach)\(").unwrap())
}

/// True if the line declares a test case
pub fn is_test_start(line: &str) -> bool {
    test_start_re().is_match(line)
}

/// True if the line declares any block that ends the current test body
pub fn is_block_boundary(line: &str) -> bool {
    block_re().is_match(line)
}

/// Whitespace as the classifier sees it: Unicode whitespace plus U+FEFF
pub fn is_leading_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Classify a line into exactly one [`LineKind`]
pub fn classify(line: &str) -> LineKind {
    if is_test_start(line) {
        LineKind::TestStart
    } else if is_block_boundary(line) {
        LineKind::BlockBoundary
    } else {
        LineKind::Code
    }
}
