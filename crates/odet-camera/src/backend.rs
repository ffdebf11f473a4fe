//! Platform seam for camera devices.

use async_trait::async_trait;

use crate::frame::Frame;

/// Error reported by a platform camera API, identified by name
/// (e.g. `NotAllowedError`, `EBUSY`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError {
    pub name: String,
    pub message: String,
}

impl PlatformError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// A video-input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: String,
    pub label: String,
}

/// Camera permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    Environment,
}

/// Requested stream shape. Backends treat sizes as ideals, not hard limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing: FacingMode,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 640,
            ideal_height: 480,
            facing: FacingMode::User,
        }
    }
}

/// Platform camera API.
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// List video-input devices. Does not prompt for permission.
    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, PlatformError>;

    /// Current permission status. Backends without a permission query
    /// return an error; callers then proceed to `acquire`.
    async fn permission_state(&self) -> Result<PermissionState, PlatformError>;

    /// Request access and open a stream. May prompt the user.
    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn CameraStream>, PlatformError>;
}

/// An open device stream.
#[async_trait]
pub trait CameraStream: Send + Sync {
    /// Sample the current frame.
    async fn grab_frame(&mut self) -> Result<Frame, PlatformError>;

    /// Release every track of the stream. Safe to call more than once.
    fn stop(&mut self);
}
