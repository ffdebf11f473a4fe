//! Session error types.

use thiserror::Error;

use odet_camera::CameraError;
use odet_client::ClientError;
use odet_models::ValidationError;
use odet_presets::PresetError;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] ClientError),

    #[error("Video processing timed out: {id} not ready after {attempts} attempts")]
    PollTimeout { id: String, attempts: u32 },

    #[error("{0}")]
    DetectionFailed(String),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Preset(#[from] PresetError),
}

impl SessionError {
    pub fn detection_failed(msg: impl Into<String>) -> Self {
        Self::DetectionFailed(msg.into())
    }

    /// Whether the request was rejected before reaching the network.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            SessionError::Validation(_) | SessionError::Camera(_) | SessionError::Preset(_)
        )
    }
}
