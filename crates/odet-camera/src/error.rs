//! Camera error types.

use std::fmt;

use thiserror::Error;

pub type CameraResult<T> = Result<T, CameraError>;

/// Classified cause of a failed device acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraErrorKind {
    PermissionDenied,
    DeviceNotFound,
    DeviceBusy,
    Unsupported,
    SecurityRestricted,
    Aborted,
    Unknown,
}

impl CameraErrorKind {
    /// Map a platform error identifier. Unrecognized identifiers map to
    /// `Unknown`.
    pub fn from_platform_name(name: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" | "EACCES" | "EPERM" => {
                CameraErrorKind::PermissionDenied
            }
            "NotFoundError" | "DevicesNotFoundError" | "ENOENT" | "ENODEV" | "ENXIO" => {
                CameraErrorKind::DeviceNotFound
            }
            "NotReadableError" | "TrackStartError" | "EBUSY" => CameraErrorKind::DeviceBusy,
            "OverconstrainedError" | "ConstraintNotSatisfiedError" | "NotSupportedError"
            | "EINVAL" => CameraErrorKind::Unsupported,
            "SecurityError" => CameraErrorKind::SecurityRestricted,
            "AbortError" | "EINTR" => CameraErrorKind::Aborted,
            _ => CameraErrorKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraErrorKind::PermissionDenied => "permission_denied",
            CameraErrorKind::DeviceNotFound => "device_not_found",
            CameraErrorKind::DeviceBusy => "device_busy",
            CameraErrorKind::Unsupported => "unsupported",
            CameraErrorKind::SecurityRestricted => "security_restricted",
            CameraErrorKind::Aborted => "aborted",
            CameraErrorKind::Unknown => "unknown",
        }
    }

    /// What the user should do about it.
    pub fn user_message(&self) -> &'static str {
        match self {
            CameraErrorKind::PermissionDenied => {
                "Camera permission denied. Allow camera access and try again."
            }
            CameraErrorKind::DeviceNotFound => {
                "No camera device found. Connect a camera and try again."
            }
            CameraErrorKind::DeviceBusy => {
                "The camera is already in use by another application."
            }
            CameraErrorKind::Unsupported => {
                "The camera does not support the requested video format."
            }
            CameraErrorKind::SecurityRestricted => {
                "Camera access blocked by security restrictions. Use HTTPS or localhost."
            }
            CameraErrorKind::Aborted => "Camera access was interrupted. Try again.",
            CameraErrorKind::Unknown => "Camera access error.",
        }
    }
}

impl fmt::Display for CameraErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("{}", .kind.user_message())]
    Acquisition {
        kind: CameraErrorKind,
        message: String,
    },

    #[error("Camera is not active")]
    NotActive,

    #[error("Frame capture failed: {0}")]
    Capture(String),

    #[error("Frame encoding failed: {0}")]
    Encode(String),
}

impl CameraError {
    pub fn acquisition(kind: CameraErrorKind, message: impl Into<String>) -> Self {
        Self::Acquisition {
            kind,
            message: message.into(),
        }
    }

    /// Acquisition kind, if this is an acquisition failure.
    pub fn kind(&self) -> Option<CameraErrorKind> {
        match self {
            CameraError::Acquisition { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
