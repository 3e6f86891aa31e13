//! Turns parsed execution counts into colored, labelled annotation groups.

use std::collections::HashMap;
use std::fmt::Write;

use tracing::debug;

use crate::color::{gradient, Rgb};
use crate::model::{AnnotationGroup, ParseResult};

/// How groups are colored and labelled.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub lower_color: Rgb,
    pub upper_color: Rgb,
    /// Append ` | NN.NN%` to every label.
    pub show_percent: bool,
    /// Use `lower_color` (normalized to lowercase hex) for every group
    /// instead of the gradient.
    pub monotone_color: bool,
    /// Filler appended to short counts so labels line up.
    pub label_padding: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            lower_color: Rgb::WHITE,
            upper_color: Rgb::WHITE,
            show_percent: true,
            monotone_color: false,
            label_padding: "&nbsp;".to_string(),
        }
    }
}

/// Build one label: the raw count padded to `width` filler units, followed
/// by the percentage when `percent` is given.
#[must_use]
pub fn format_label(raw_count: &str, width: usize, padding: &str, percent: Option<f64>) -> String {
    let fill = width.saturating_sub(raw_count.chars().count());
    let mut label = String::with_capacity(raw_count.len() + fill * padding.len() + 9);
    label.push_str(raw_count);
    label.push_str(&padding.repeat(fill));
    if let Some(percent) = percent {
        write!(label, " | {percent:05.2}%").unwrap();
    }
    label
}

/// Group the lines of `parsed` by their share of the total execution count.
///
/// Lines with exactly the same percentage end up in the same group. Groups
/// are ordered by the first line that falls into them.
#[must_use]
pub fn build_groups(parsed: &ParseResult, options: &RenderOptions) -> Vec<AnnotationGroup> {
    let mut groups: Vec<AnnotationGroup> = Vec::new();
    let mut by_bucket: HashMap<u64, usize> = HashMap::new();

    for line in &parsed.lines {
        let percent = parsed.percent(line);

        let idx = *by_bucket.entry(percent.to_bits()).or_insert_with(|| {
            groups.push(AnnotationGroup {
                bucket_key: percent,
                locations: Vec::new(),
                labels: Vec::new(),
                color: String::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[idx];

        group.locations.push(line.line_index);
        group.labels.push(format_label(
            &line.raw_count_text,
            parsed.max_label_width,
            &options.label_padding,
            options.show_percent.then_some(percent),
        ));
        group.color = group_color(percent, options);
    }

    debug!(
        lines = parsed.lines.len(),
        groups = groups.len(),
        "built annotation groups"
    );
    groups
}

/// Color of a group at `percent`.
///
/// Colors are always emitted as lowercase `#rrggbb`, so in monotone mode a
/// configured `#AABBCC` comes back as `#aabbcc`: the same color, normalized.
fn group_color(percent: f64, options: &RenderOptions) -> String {
    if options.monotone_color {
        options.lower_color.to_hex()
    } else {
        gradient(percent, options.lower_color, options.upper_color).to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CoverageLine;

    fn line(line_index: u32, raw: &str, count: u64) -> CoverageLine {
        CoverageLine {
            line_index,
            raw_count_text: raw.to_string(),
            numeric_count: count,
        }
    }

    fn parsed(lines: Vec<CoverageLine>) -> ParseResult {
        let total_count = lines.iter().map(|l| l.numeric_count).sum();
        let max_label_width = lines
            .iter()
            .map(|l| l.raw_count_text.len())
            .max()
            .unwrap_or(0);
        ParseResult {
            lines,
            total_count,
            max_label_width,
        }
    }

    fn options(lower: &str, upper: &str) -> RenderOptions {
        RenderOptions {
            lower_color: lower.parse().unwrap(),
            upper_color: upper.parse().unwrap(),
            ..RenderOptions::default()
        }
    }

    #[test]
    fn test_format_label_padding() {
        assert_eq!(format_label("42", 5, "&nbsp;", None), "42&nbsp;&nbsp;&nbsp;");
        assert_eq!(format_label("42", 5, " ", None), "42   ");
        assert_eq!(format_label("12345", 5, " ", None), "12345");
    }

    #[test]
    fn test_format_label_percent() {
        assert_eq!(format_label("7", 1, " ", Some(5.2)), "7 | 05.20%");
        assert_eq!(format_label("7", 2, " ", Some(42.0)), "7  | 42.00%");
        assert_eq!(format_label("1k", 2, " ", Some(100.0)), "1k | 100.00%");
    }

    #[test]
    fn test_groups_by_identical_percent() {
        let p = parsed(vec![
            line(0, "10", 10),
            line(3, "20", 20),
            line(4, "10", 10),
            line(9, "60", 60),
        ]);
        let groups = build_groups(&p, &RenderOptions::default());

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].bucket_key, 10.0);
        assert_eq!(groups[0].locations, vec![0, 4]);
        assert_eq!(groups[0].labels.len(), 2);
        assert_eq!(groups[1].locations, vec![3]);
        assert_eq!(groups[2].locations, vec![9]);
    }

    #[test]
    fn test_labels_follow_locations() {
        let p = parsed(vec![line(0, "1k", 1000), line(1, "1k", 1000)]);
        let mut opts = options("#000000", "#ffffff");
        opts.label_padding = " ".to_string();
        let groups = build_groups(&p, &opts);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].labels, vec!["1k | 50.00%", "1k | 50.00%"]);
    }

    #[test]
    fn test_labels_without_percent() {
        let p = parsed(vec![line(0, "5", 5), line(1, "120", 120)]);
        let mut opts = options("#000000", "#ffffff");
        opts.show_percent = false;
        opts.label_padding = ".".to_string();
        let groups = build_groups(&p, &opts);

        assert_eq!(groups[0].labels, vec!["5.."]);
        assert_eq!(groups[1].labels, vec!["120"]);
    }

    #[test]
    fn test_gradient_colors() {
        let p = parsed(vec![line(0, "1", 1), line(1, "3", 3)]);
        let groups = build_groups(&p, &options("#000000", "#ff0000"));

        // 255 * 25/99 = 64.4, 255 * 75/99 = 193.2
        assert_eq!(groups[0].color, "#400000");
        assert_eq!(groups[1].color, "#c10000");
    }

    #[test]
    fn test_monotone_uses_lower_color() {
        let p = parsed(vec![line(0, "1", 1), line(1, "3", 3), line(2, "96", 96)]);
        let mut opts = options("#AABBCC", "#000000");
        opts.monotone_color = true;
        let groups = build_groups(&p, &opts);

        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.color == "#aabbcc"));
    }

    #[test]
    fn test_empty_parse_result() {
        let groups = build_groups(&ParseResult::new(), &RenderOptions::default());
        assert!(groups.is_empty());
    }

    #[test]
    fn test_zero_total_uses_zero_percent() {
        // A fractional count like "0.5" survives parsing but truncates to 0.
        let p = parsed(vec![line(0, "0.5", 0)]);
        let groups = build_groups(&p, &options("#123456", "#ffffff"));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].bucket_key, 0.0);
        assert_eq!(groups[0].color, "#123456");
    }
}
