use std::path::PathBuf;

use thiserror::Error;

/// Library-level error taxonomy for the decision engine.
///
/// Every public component boundary returns `Result<T, Error>`; only the CLI's
/// `main` wraps this in `anyhow` for top-level error-chain printing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("oracle call failed: {0}")]
    Oracle(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
