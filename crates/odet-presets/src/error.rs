//! Preset store error types.

use thiserror::Error;

use odet_models::ConfigError;

pub type PresetResult<T> = Result<T, PresetError>;

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("Preset name must not be empty")]
    EmptyName,

    #[error("Built-in preset cannot be modified: {0}")]
    BuiltinPreset(String),

    #[error("Preset not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Preset config out of range: {0}")]
    OutOfRange(#[from] validator::ValidationErrors),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PresetError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
