//! Source dataset error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors fetching or reading the raw dataset
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to download {file}: {source}")]
    Http {
        file: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download of {file} returned HTTP {status}")]
    Status {
        file: String,
        status: u16,
    },

    #[error("Raw file not found: {0}")]
    MissingFile(PathBuf),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed row in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
