use std::path::PathBuf;
use thiserror::Error;

/// Startup errors. Anything returned from here is fatal and stops the run
/// before a single worker is spawned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Config {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to read corpus file {}: {source}", .path.display())]
    CorpusIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid properties file {}: {reason}", .path.display())]
    PropertiesFile { path: PathBuf, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl LoadError {
    pub(crate) fn config(key: &'static str, value: impl Into<String>, reason: impl ToString) -> Self {
        LoadError::Config {
            key,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = LoadError> = std::result::Result<T, E>;
