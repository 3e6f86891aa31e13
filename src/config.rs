//! User settings, read from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::Rgb;
use crate::error::Result;
use crate::render::RenderOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gradient start, `#RRGGBB`.
    pub lower_color: String,
    /// Gradient end, `#RRGGBB`.
    pub upper_color: String,
    pub show_percent: bool,
    pub monotone_color: bool,
    /// Filler used to align labels. Annotations are rendered as HTML,
    /// hence the entity.
    pub label_padding: String,

    pub cargo: String,
    pub llvm_profdata: String,
    pub llvm_cov: String,
    /// Prepended to every external command line, e.g. `["wsl"]`.
    pub additional_args: Vec<String>,
    pub rustflags: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lower_color: "#FFFFFF".to_string(),
            upper_color: "#FFFFFF".to_string(),
            show_percent: true,
            monotone_color: false,
            label_padding: "&nbsp;".to_string(),
            cargo: "cargo".to_string(),
            llvm_profdata: "llvm-profdata".to_string(),
            llvm_cov: "llvm-cov".to_string(),
            additional_args: Vec::new(),
            rustflags: "-C instrument-coverage".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults; a
    /// file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Validate the colors and build renderer options from them.
    pub fn render_options(&self) -> Result<RenderOptions> {
        Ok(RenderOptions {
            lower_color: self.lower_color.parse::<Rgb>()?,
            upper_color: self.upper_color.parse::<Rgb>()?,
            show_percent: self.show_percent,
            monotone_color: self.monotone_color,
            label_padding: self.label_padding.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HotspotsError;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.lower_color, "#FFFFFF");
        assert!(settings.show_percent);
        assert!(!settings.monotone_color);
        assert!(settings.additional_args.is_empty());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r##"{"upper_color": "#FF0000", "additional_args": ["wsl"]}"##)
                .unwrap();
        assert_eq!(settings.upper_color, "#FF0000");
        assert_eq!(settings.lower_color, "#FFFFFF");
        assert_eq!(settings.additional_args, vec!["wsl"]);
        assert_eq!(settings.llvm_cov, "llvm-cov");
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(HotspotsError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("hotspots.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotspots.json");
        std::fs::write(&path, r#"{"monotone_color": true}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!(settings.monotone_color);
    }

    #[test]
    fn test_render_options_normalizes_colors() {
        let settings = Settings {
            lower_color: "#AbCdEf".to_string(),
            ..Settings::default()
        };
        let options = settings.render_options().unwrap();
        assert_eq!(options.lower_color.to_hex(), "#abcdef");
        assert_eq!(options.upper_color.to_hex(), "#ffffff");
    }

    #[test]
    fn test_render_options_rejects_bad_color() {
        let settings = Settings {
            upper_color: "red".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.render_options(),
            Err(HotspotsError::ColorDecode(ref s)) if s == "red"
        ));
    }
}
