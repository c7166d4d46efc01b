use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{action} requires an administrator")]
    PermissionDenied { action: &'static str },

    #[error("invalid settings: {0}")]
    Validation(String),

    #[error("failed to access settings store at {path}: {source}")]
    StoreIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("settings store at {path} is not a JSON object: {source}")]
    StoreParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type SettingsResult<T> = Result<T, SettingsError>;
