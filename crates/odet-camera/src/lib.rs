//! Camera device control.
//!
//! [`CameraController`] owns the device handle obtained from a platform
//! [`CameraBackend`], classifies acquisition failures into
//! [`CameraErrorKind`], and turns the live stream into JPEG still captures.

pub mod backend;
pub mod controller;
pub mod error;
pub mod frame;

pub use backend::{
    CameraBackend, CameraStream, DeviceInfo, FacingMode, PermissionState, PlatformError,
    StreamConstraints,
};
pub use controller::{CameraController, CameraState};
pub use error::{CameraError, CameraErrorKind, CameraResult};
pub use frame::{encode_jpeg, Frame, CAPTURE_FILENAME, CAPTURE_JPEG_QUALITY};
