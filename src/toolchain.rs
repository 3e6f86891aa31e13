//! Runs the external tools that produce an `llvm-cov show` report for a
//! Cargo project:
//!
//!   1. `cargo rustc`     build with coverage instrumentation
//!   2. `cargo run`       execute once, writing `default.profraw`
//!   3. `llvm-profdata`   merge the raw profile into `merged.profdata`
//!   4. `llvm-cov show`   render the line-count report
//!
//! Every command runs with the project root as its working directory. The
//! working directory of this process is never changed.
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Output};

use regex::Regex;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{HotspotsError, Result};

const RAW_PROFILE: &str = "default.profraw";
const MERGED_PROFILE: &str = "merged.profdata";

/// External tool locations and the arguments shared by every invocation.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub cargo: String,
    pub llvm_profdata: String,
    pub llvm_cov: String,
    /// Prepended to every command line (e.g. `wsl`).
    pub additional_args: Vec<String>,
    pub rustflags: String,
}

impl Toolchain {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cargo: settings.cargo.clone(),
            llvm_profdata: settings.llvm_profdata.clone(),
            llvm_cov: settings.llvm_cov.clone(),
            additional_args: settings.additional_args.clone(),
            rustflags: settings.rustflags.clone(),
        }
    }

    /// Build, run and profile the project at `root`, returning the text of
    /// `llvm-cov show`. Stops at the first failing step.
    pub fn generate_report(&self, root: &Path) -> Result<String> {
        let binary = package_name(root)?;
        let instrumented = [
            ("RUSTFLAGS", self.rustflags.as_str()),
            ("LLVM_PROFILE_FILE", RAW_PROFILE),
        ];

        self.invoke(root, &self.cargo, &["rustc"], &instrumented)?;
        self.invoke(root, &self.cargo, &["run"], &instrumented)?;
        self.invoke(
            root,
            &self.llvm_profdata,
            &[
                "merge",
                &format!("-output={MERGED_PROFILE}"),
                "-instr",
                RAW_PROFILE,
            ],
            &[],
        )?;

        let output = self.invoke(
            root,
            &self.llvm_cov,
            &[
                "show",
                &format!("target/debug/{binary}"),
                &format!("-instr-profile={MERGED_PROFILE}"),
            ],
            &[],
        )?;

        let report = String::from_utf8(output.stdout)
            .map_err(|_| HotspotsError::Parse(format!("{} output is not valid UTF-8", self.llvm_cov)))?;
        if report.trim().is_empty() {
            return Err(HotspotsError::ExternalTool {
                tool: self.llvm_cov.clone(),
                status: output.status.code(),
                detail: "produced no output".to_string(),
            });
        }

        info!(bytes = report.len(), "coverage report generated");
        Ok(report)
    }

    /// The program and argument list actually executed for `tool args...`.
    pub fn command_line(&self, tool: &str, args: &[&str]) -> (String, Vec<String>) {
        let mut line: Vec<String> = self.additional_args.clone();
        line.push(tool.to_string());
        line.extend(args.iter().map(|a| a.to_string()));
        let program = line.remove(0);
        (program, line)
    }

    fn invoke(&self, root: &Path, tool: &str, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
        let (program, argv) = self.command_line(tool, args);
        debug!(%program, ?argv, cwd = %root.display(), "running external tool");

        let output = Command::new(&program)
            .args(&argv)
            .envs(envs.iter().copied())
            .current_dir(root)
            .output()
            .map_err(|e| HotspotsError::ExternalTool {
                tool: tool.to_string(),
                status: None,
                detail: format!("failed to start {program}: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HotspotsError::ExternalTool {
                tool: format!("{tool} {}", args.first().copied().unwrap_or_default()),
                status: output.status.code(),
                detail: stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

/// The Cargo project containing `source_file`: the parent of the first
/// `src` directory on its path.
pub fn project_root(source_file: &Path) -> Result<PathBuf> {
    let mut root = PathBuf::new();
    for component in source_file.components() {
        if let Component::Normal(name) = component {
            if name == "src" {
                return Ok(if root.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    root
                });
            }
        }
        root.push(component);
    }
    Err(HotspotsError::Other(format!(
        "{} is not inside a 'src' directory",
        source_file.display()
    )))
}

/// The package name declared in `<root>/Cargo.toml`, which is also the
/// name of the binary under `target/debug`.
pub fn package_name(root: &Path) -> Result<String> {
    let manifest = root.join("Cargo.toml");
    let content = std::fs::read_to_string(&manifest)?;
    let re = Regex::new(r#"(?m)^\s*name\s*=\s*"([^"]+)""#)
        .map_err(|e| HotspotsError::Other(e.to_string()))?;
    re.captures(&content)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| HotspotsError::Parse(format!("no package name in {}", manifest.display())))
}

/// Absolute form of `source_file`, so that different spellings of the same
/// file (`./src/main.rs`, `src/main.rs`, `/app/src/main.rs`) agree.
///
/// Existing files are canonicalized. Otherwise `.` and `..` are resolved
/// lexically against the current directory.
pub fn normalize_source(source_file: &Path) -> PathBuf {
    if let Ok(path) = std::fs::canonicalize(source_file) {
        return path;
    }

    let absolute = if source_file.is_absolute() {
        source_file.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(source_file))
            .unwrap_or_else(|_| source_file.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Header fragment that identifies `source_file`'s section in a report.
pub fn section_marker(source_file: &Path) -> String {
    let name = source_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("/{name}")
}
