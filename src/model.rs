//! In-memory representation of a parsed hotspot profile and of the
//! annotation groups derived from it.

use serde::Serialize;

/// A single executed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageLine {
    /// Zero-based line index (the report numbers lines from 1).
    pub line_index: u32,
    /// Count exactly as written in the report, unit suffix included.
    pub raw_count_text: String,
    /// Suffix-expanded count, truncated to an integer.
    pub numeric_count: u64,
}

/// The result of parsing one file's section of a coverage report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    pub lines: Vec<CoverageLine>,
    /// Sum of every `numeric_count`, the denominator for percentages.
    pub total_count: u64,
    /// Widest `raw_count_text`, used to align labels.
    pub max_label_width: usize,
}

impl ParseResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of `total_count` executed by `line`, in percent. Zero when
    /// the total is zero.
    #[must_use]
    pub fn percent(&self, line: &CoverageLine) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            line.numeric_count as f64 / self.total_count as f64 * 100.0
        }
    }
}

/// Lines sharing one percentage value, rendered as a single annotation set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationGroup {
    /// The shared percentage.
    pub bucket_key: f64,
    /// Zero-based line indices, in encounter order.
    pub locations: Vec<u32>,
    /// One label per location, same order as `locations`.
    pub labels: Vec<String>,
    /// `#rrggbb`
    pub color: String,
}

/// An annotation set as persisted in the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredAnnotationSet {
    pub key: String,
    pub color: String,
    pub created_at: String,
    /// `(line_index, label)` pairs in render order.
    pub annotations: Vec<(u32, String)>,
}
