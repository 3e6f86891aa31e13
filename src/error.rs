use thiserror::Error;

#[derive(Error, Debug)]
pub enum HotspotsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No section for '{filename}' found in coverage report")]
    SectionNotFound { filename: String },

    #[error("{tool} failed (exit status: {}): {detail}", describe_status(.status))]
    ExternalTool {
        tool: String,
        status: Option<i32>,
        detail: String,
    },

    #[error("Invalid color '{0}': expected #RRGGBB")]
    ColorDecode(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Other(String),
}

fn describe_status(status: &Option<i32>) -> String {
    status.map_or_else(|| "none".to_string(), |code| code.to_string())
}

pub type Result<T> = std::result::Result<T, HotspotsError>;
