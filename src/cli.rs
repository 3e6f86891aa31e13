//! Command handler functions for the hotspots CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use rusqlite::Connection;
use tracing::info;

use crate::config::Settings;
use crate::report::{HotspotReport, JsonFormatter, TextFormatter};
use crate::toolchain::{self, Toolchain};
use crate::{db, parsers, render};

/// Output style for commands that print hotspots.
#[derive(Clone, ValueEnum)]
pub enum Style {
    Text,
    Json,
}

/// Key under which a source file's annotation sets are stored. Every
/// spelling of the same file maps to the same key.
pub fn store_key(source_file: &Path) -> String {
    toolchain::normalize_source(source_file).display().to_string()
}

/// Build the project, profile it and annotate `source_file` with the result.
pub fn cmd_run(
    conn: &mut Connection,
    source_file: &Path,
    settings: &Settings,
    style: &Style,
) -> Result<String> {
    // Bad colors should fail before the (slow) build starts.
    settings.render_options()?;

    let root = toolchain::project_root(&toolchain::normalize_source(source_file))?;
    info!(root = %root.display(), "generating coverage report");
    let report_text = Toolchain::from_settings(settings)
        .generate_report(&root)
        .context("Failed to generate coverage report")?;

    cmd_annotate(conn, &report_text, source_file, settings, style)
}

/// Annotate `source_file` from an existing `llvm-cov show` report.
pub fn cmd_annotate(
    conn: &mut Connection,
    report_text: &str,
    source_file: &Path,
    settings: &Settings,
    style: &Style,
) -> Result<String> {
    let options = settings.render_options()?;

    let marker = toolchain::section_marker(source_file);
    let parsed = parsers::parse(report_text, &marker)
        .with_context(|| format!("Failed to read hotspots for {}", source_file.display()))?;
    info!(
        lines = parsed.lines.len(),
        total = parsed.total_count,
        "parsed coverage report"
    );

    let groups = render::build_groups(&parsed, &options);
    let key = store_key(source_file);
    db::store_hotspots(conn, &key, &groups).context("Failed to store hotspots")?;

    let report = HotspotReport {
        source_file: key,
        lines: parsed.lines.len(),
        total_count: parsed.total_count,
        groups,
    };

    Ok(match style {
        Style::Text => report.format(&TextFormatter),
        Style::Json => report.format(&JsonFormatter),
    })
}

/// Remove all hotspots shown on `source_file`.
pub fn cmd_clear(conn: &mut Connection, source_file: &Path) -> Result<String> {
    let key = store_key(source_file);
    let removed = db::clear_hotspots(conn, &key)?;
    Ok(format!("Removed {removed} hotspot sets from {key}\n"))
}

/// List stored hotspots for `source_file`, or the files that have any.
pub fn cmd_list(conn: &Connection, source_file: Option<&Path>) -> Result<String> {
    let mut out = String::new();

    let Some(source_file) = source_file else {
        let files = db::list_source_files(conn)?;
        if files.is_empty() {
            return Ok("No hotspots stored.\n".to_string());
        }
        for file in files {
            writeln!(out, "{file}").unwrap();
        }
        return Ok(out);
    };

    let key = store_key(source_file);
    let sets = db::get_annotation_sets(conn, &key)?;
    if sets.is_empty() {
        return Ok(format!("No hotspots stored for {key}\n"));
    }

    writeln!(out, "{:<14} {:<8} {:>6}  LABEL", "SET", "COLOR", "LINE").unwrap();
    writeln!(out, "{}", "-".repeat(50)).unwrap();
    for set in &sets {
        for (line_index, label) in &set.annotations {
            writeln!(
                out,
                "{:<14} {:<8} {:>6}  {}",
                set.key,
                set.color,
                line_index + 1,
                label
            )
            .unwrap();
        }
    }
    Ok(out)
}
