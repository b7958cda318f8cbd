use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid project path {}: {message}", path.display())]
    InvalidProjectPath { path: PathBuf, message: String },

    #[error("parse error in {}: {message}", file.display())]
    Parse { file: PathBuf, message: String },

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub(crate) fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse {
            file: file.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML: {}", err))
    }
}
