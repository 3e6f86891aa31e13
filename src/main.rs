use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use hotspots::cli::{self, Style};
use hotspots::config::Settings;
use hotspots::{db, logging};

/// hotspots — Execution-frequency annotations from llvm-cov line counts.
#[derive(Parser)]
#[command(name = "hotspots", version, about)]
struct Cli {
    /// Path to the annotation store (default: ./.hotspots.db)
    #[arg(long, global = true, default_value = ".hotspots.db")]
    db: PathBuf,

    /// Path to the JSON settings file. Missing file means defaults.
    #[arg(long, global = true, default_value = "hotspots.json")]
    settings: PathBuf,

    /// Log at debug level (overridden by HOTSPOTS_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and profile the project, then annotate a source file.
    Run {
        /// Source file inside the project's src/ directory.
        source_file: PathBuf,

        /// Output style.
        #[arg(long, value_enum, default_value = "text")]
        style: Style,
    },

    /// Annotate a source file from an existing `llvm-cov show` report.
    Annotate {
        /// Source file the annotations belong to.
        source_file: PathBuf,

        /// Report file, or "-" to read it from stdin.
        #[arg(long)]
        report: PathBuf,

        /// Output style.
        #[arg(long, value_enum, default_value = "text")]
        style: Style,
    },

    /// Remove all hotspot annotations from a source file.
    Clear {
        /// Source file to clear.
        source_file: PathBuf,
    },

    /// Show stored annotations. Without a file, list annotated files.
    List {
        /// Source file to show.
        source_file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    logging::init(args.verbose);

    let settings = Settings::load(&args.settings)
        .with_context(|| format!("Failed to load settings from {}", args.settings.display()))?;

    let mut conn = db::open(&args.db).context("Failed to open annotation store")?;
    db::init_schema(&conn).context("Failed to initialize schema")?;

    let output = match args.command {
        Commands::Run { source_file, style } => {
            cli::cmd_run(&mut conn, &source_file, &settings, &style)?
        }
        Commands::Annotate {
            source_file,
            report,
            style,
        } => {
            let report_text = read_report(&report)?;
            cli::cmd_annotate(&mut conn, &report_text, &source_file, &settings, &style)?
        }
        Commands::Clear { source_file } => cli::cmd_clear(&mut conn, &source_file)?,
        Commands::List { source_file } => cli::cmd_list(&conn, source_file.as_deref())?,
    };

    print!("{output}");
    Ok(())
}

fn read_report(path: &std::path::Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read report from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report {}", path.display()))
    }
}
