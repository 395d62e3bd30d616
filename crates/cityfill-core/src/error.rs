// crates/cityfill-core/src/error.rs
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the cityfill core.
///
/// Most "no answer" situations (short term, disabled country, missing
/// gazetteer file, malformed rows) are NOT errors: they resolve to an empty
/// suggestion list. Only genuine I/O trouble on an existing file, snapshot
/// encoding problems and configuration mistakes end up here.
#[derive(Debug, Error)]
pub enum CityFillError {
    /// The gazetteer file exists but could not be opened or read.
    #[error("Cannot read gazetteer file {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid country code: {0:?}")]
    InvalidCountryCode(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CityFillError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CityFillError::FileAccess {
            path: path.into(),
            source,
        }
    }
}

impl From<config::ConfigError> for CityFillError {
    fn from(e: config::ConfigError) -> Self {
        CityFillError::Config(e.to_string())
    }
}

#[cfg(feature = "snapshot")]
impl From<bincode::Error> for CityFillError {
    fn from(e: bincode::Error) -> Self {
        CityFillError::Snapshot(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CityFillError>;
