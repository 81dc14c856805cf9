use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EsfetchError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid target name '{0}': must be a single path segment")]
    InvalidName(String),

    #[error("Unsupported URL scheme '{scheme}' in {url}")]
    UnsupportedScheme { scheme: String, url: String },

    #[error("HTTP status {status} when downloading {url}")]
    Http { status: u16, url: String },

    #[error("Failed to download '{url}': {source}")]
    Download {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to extract '{path}': {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Unsupported archive format: {0}")]
    UnsupportedArchive(PathBuf),

    #[error("Failed to run '{path}': {source}")]
    VersionQuery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unknown target name: {0}")]
    UnknownTarget(String),

    #[error("An unexpected error occurred: {0}")]
    Other(String),
}

impl EsfetchError {
    pub(crate) fn extract<E>(path: impl Into<PathBuf>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        EsfetchError::Extract {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn download<E>(url: &str, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        EsfetchError::Download {
            url: url.to_string(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EsfetchError>;
