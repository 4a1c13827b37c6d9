// src/error/types.rs
use crate::domain::DomainError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a run. Everything per-file or per-group is a value in the
/// audit report instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Submission root {0:?} does not exist or is not a directory")]
    InvalidRoot(PathBuf),

    #[error("Output root {output:?} must not be inside the submission root {input:?}")]
    InvalidOutput { input: PathBuf, output: PathBuf },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<walkdir::Error> for AppError {
    fn from(err: walkdir::Error) -> Self {
        AppError::Other(format!("Directory walk error: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
