//! Output formatting for rendered hotspots.

use std::fmt::Write;

use serde::Serialize;
use tracing::warn;

use crate::model::AnnotationGroup;

/// Everything one run produced for a source file, ready to be formatted.
#[derive(Debug, Serialize)]
pub struct HotspotReport {
    pub source_file: String,
    /// Number of executed lines.
    pub lines: usize,
    /// Sum of all execution counts.
    pub total_count: u64,
    pub groups: Vec<AnnotationGroup>,
}

impl HotspotReport {
    /// Format using a specific formatter.
    #[must_use]
    pub fn format(&self, formatter: &dyn ReportFormatter) -> String {
        formatter.format(self)
    }
}

/// Trait for formatting hotspot reports.
pub trait ReportFormatter {
    /// Format the report to a string.
    fn format(&self, report: &HotspotReport) -> String;
}

/// Plain text formatter.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &HotspotReport) -> String {
        let mut out = String::new();
        let path = &report.source_file;

        if report.groups.is_empty() {
            writeln!(out, "No executed lines found for {path}.").unwrap();
            return out;
        }

        let total = report.total_count;
        let lines = report.lines;
        let groups = report.groups.len();
        writeln!(
            out,
            "Hotspots in {path}: {total} executions over {lines} lines ({groups} groups)"
        )
        .unwrap();

        for (i, group) in report.groups.iter().enumerate() {
            let ranges = format_line_ranges(&group.locations);
            writeln!(
                out,
                "\n  hotspots-{i}  {}  {:.2}%  lines {ranges}",
                group.color, group.bucket_key
            )
            .unwrap();
            for (line, label) in group.locations.iter().zip(&group.labels) {
                writeln!(out, "    {:>6}  {}", line + 1, plain_label(label)).unwrap();
            }
        }

        out
    }
}

/// JSON formatter, for editor plugins that draw the annotations themselves.
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &HotspotReport) -> String {
        match serde_json::to_string_pretty(report) {
            Ok(mut json) => {
                json.push('\n');
                json
            }
            Err(e) => {
                warn!(error = %e, "could not serialize hotspot report");
                String::new()
            }
        }
    }
}

/// Labels are HTML for the editor; show padding as plain spaces.
fn plain_label(label: &str) -> String {
    label.replace("&nbsp;", " ")
}

/// Format zero-based line indices as one-based ranges, e.g. "1, 3-5, 8".
#[must_use]
pub fn format_line_ranges(line_indices: &[u32]) -> String {
    let mut lines: Vec<u32> = line_indices.iter().map(|l| l + 1).collect();
    lines.sort_unstable();
    lines.dedup();

    let mut ranges: Vec<(u32, u32)> = Vec::new();
    for line in lines {
        if let Some((_, end)) = ranges.last_mut() {
            if *end + 1 == line {
                *end = line;
                continue;
            }
        }
        ranges.push((line, line));
    }

    ranges
        .iter()
        .map(|&(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> HotspotReport {
        HotspotReport {
            source_file: "src/main.rs".to_string(),
            lines: 3,
            total_count: 4,
            groups: vec![
                AnnotationGroup {
                    bucket_key: 25.0,
                    locations: vec![0, 2],
                    labels: vec![
                        "1&nbsp; | 25.00%".to_string(),
                        "1&nbsp; | 25.00%".to_string(),
                    ],
                    color: "#ffffff".to_string(),
                },
                AnnotationGroup {
                    bucket_key: 50.0,
                    locations: vec![1],
                    labels: vec!["2&nbsp; | 50.00%".to_string()],
                    color: "#ff8080".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_format_line_ranges() {
        assert_eq!(format_line_ranges(&[]), "");
        assert_eq!(format_line_ranges(&[4]), "5");
        assert_eq!(format_line_ranges(&[0, 1, 2]), "1-3");
        assert_eq!(format_line_ranges(&[0, 2, 3, 4, 9]), "1, 3-5, 10");
        assert_eq!(format_line_ranges(&[3, 0, 1]), "1-2, 4");
    }

    #[test]
    fn test_text_format() {
        let text = sample_report().format(&TextFormatter);

        assert!(text.contains("Hotspots in src/main.rs: 4 executions over 3 lines (2 groups)"));
        assert!(text.contains("hotspots-0  #ffffff  25.00%  lines 1, 3"));
        assert!(text.contains("hotspots-1  #ff8080  50.00%  lines 2"));
        assert!(text.contains("     2  2  | 50.00%"));
        assert!(!text.contains("&nbsp;"));
    }

    #[test]
    fn test_text_format_empty() {
        let report = HotspotReport {
            source_file: "src/lib.rs".to_string(),
            lines: 0,
            total_count: 0,
            groups: vec![],
        };
        assert_eq!(
            report.format(&TextFormatter),
            "No executed lines found for src/lib.rs.\n"
        );
    }

    #[test]
    fn test_json_format() {
        let json = sample_report().format(&JsonFormatter);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["source_file"], "src/main.rs");
        assert_eq!(value["groups"].as_array().unwrap().len(), 2);
        assert_eq!(value["groups"][0]["locations"][1], 2);
        assert_eq!(value["groups"][1]["color"], "#ff8080");
        assert_eq!(value["groups"][0]["labels"][0], "1&nbsp; | 25.00%");
    }
}
