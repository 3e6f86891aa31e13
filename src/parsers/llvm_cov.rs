/// Parser for the text output of `llvm-cov show`.
///
/// Format:
///   [/path/to/file.rs:]                  (only when the binary has several files)
///   <line> | <count>[suffix] | <source text>
///   ...
///   <blank line>
///
/// Counts are abbreviated with a unit suffix once they grow large
/// (`12.3k`, `4M`, ...). Lines with an empty count were not instrumented,
/// lines with a count of `0` were never executed; neither is a hotspot.
use tracing::trace;

use crate::error::{HotspotsError, Result};
use crate::model::{CoverageLine, ParseResult};

/// Unit suffixes in the order llvm-cov uses them. The position of a suffix
/// in this table determines its multiplier, see [`decode_count`].
pub const SUFFIXES: [&str; 9] = ["", "k", "M", "G", "T", "P", "E", "Z", "Y"];

/// Why a single report line was not turned into a [`CoverageLine`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("empty count field")]
    Empty,
    #[error("unknown unit suffix '{0}'")]
    UnknownSuffix(char),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("negative count '{0}'")]
    Negative(String),
    #[error("count '{0}' does not fit in 64 bits")]
    TooLarge(String),
    #[error("total execution count overflows 64 bits")]
    TotalOverflow,
    #[error("missing count field")]
    MissingCountField,
    #[error("invalid line number '{0}'")]
    InvalidLineNumber(String),
}

/// Expand a count field such as `42`, `1.5k` or `3M` into a number.
///
/// The multiplier for a suffix is `1000 * index` where `index` is the
/// suffix's position in [`SUFFIXES`], so `2k` is 2000 and `1M` is 2000 too.
pub fn decode_count(field: &str) -> std::result::Result<f64, DecodeError> {
    let last = field.chars().next_back().ok_or(DecodeError::Empty)?;

    let value = if last.is_ascii_digit() {
        parse_number(field)?
    } else {
        let prefix = &field[..field.len() - last.len_utf8()];
        let index = SUFFIXES
            .iter()
            .position(|s| s.chars().eq(std::iter::once(last)))
            .ok_or(DecodeError::UnknownSuffix(last))?;
        parse_number(prefix)? * 1000.0 * index as f64
    };

    if value < 0.0 {
        return Err(DecodeError::Negative(field.to_string()));
    }
    Ok(value)
}

fn parse_number(text: &str) -> std::result::Result<f64, DecodeError> {
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DecodeError::InvalidNumber(text.to_string())),
    }
}

/// Parse the section of `report` that belongs to `filename`.
///
/// `filename` is matched as a substring of the section header, so callers
/// usually pass `/<basename>`.
pub fn parse(report: &str, filename: &str) -> Result<ParseResult> {
    let lines: Vec<&str> = report.lines().collect();
    parse_lines(&lines, filename)
}

/// Same as [`parse`] for a report that is already split into lines.
pub fn parse_lines(lines: &[&str], filename: &str) -> Result<ParseResult> {
    let start = find_section(lines, filename).ok_or_else(|| HotspotsError::SectionNotFound {
        filename: filename.to_string(),
    })?;

    let mut result = ParseResult::new();

    for raw_line in &lines[start..] {
        let line = raw_line.trim();
        if line.is_empty() {
            break;
        }

        let record = parse_record(line).and_then(|cov| match cov {
            Some(cov) => result
                .total_count
                .checked_add(cov.numeric_count)
                .map(|total| Some((cov, total)))
                .ok_or(DecodeError::TotalOverflow),
            None => Ok(None),
        });

        match record {
            Ok(Some((cov, total))) => {
                let width = cov.raw_count_text.chars().count();
                if width >= result.max_label_width {
                    result.max_label_width = width;
                }
                result.total_count = total;
                result.lines.push(cov);
            }
            Ok(None) => {}
            Err(e) => trace!(line, error = %e, "skipping report line"),
        }
    }

    Ok(result)
}

/// Index of the first data line for `filename`.
///
/// A report for a single source file has no header: the data starts on
/// the very first line.
fn find_section(lines: &[&str], filename: &str) -> Option<usize> {
    let first = lines.first()?;
    if first.contains('|') {
        return Some(0);
    }
    lines
        .iter()
        .position(|l| l.contains(filename))
        .map(|i| i + 1)
}

/// Parse one `<line> | <count> | <source>` record.
///
/// Returns `Ok(None)` for lines that were not executed.
fn parse_record(line: &str) -> std::result::Result<Option<CoverageLine>, DecodeError> {
    let mut fields = line.split('|');
    let number_field = fields.next().unwrap_or_default();
    let count_field = fields.next().ok_or(DecodeError::MissingCountField)?.trim();

    if count_field.is_empty() || count_field == "0" {
        return Ok(None);
    }

    let count = decode_count(count_field)?.floor();
    // u64::MAX rounds up to 2^64 as f64, the first value that no longer fits.
    if count >= u64::MAX as f64 {
        return Err(DecodeError::TooLarge(count_field.to_string()));
    }

    let line_index = number_field
        .trim()
        .parse::<u32>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| DecodeError::InvalidLineNumber(number_field.trim().to_string()))?;

    Ok(Some(CoverageLine {
        line_index,
        raw_count_text: count_field.to_string(),
        numeric_count: count as u64,
    }))
}
