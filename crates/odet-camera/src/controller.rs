//! Camera acquisition state machine.

use std::sync::Arc;

use tracing::{debug, info, warn};

use odet_models::{ModelId, Upload};

use crate::backend::{CameraBackend, CameraStream, PermissionState, StreamConstraints};
use crate::error::{CameraError, CameraErrorKind, CameraResult};

/// Controller state. `Acquiring` is only observable while `start` is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Inactive,
    Acquiring,
    Active,
}

/// Exclusive owner of the camera device handle.
pub struct CameraController {
    backend: Arc<dyn CameraBackend>,
    constraints: StreamConstraints,
    state: CameraState,
    stream: Option<Box<dyn CameraStream>>,
    model: ModelId,
    last_error: Option<CameraErrorKind>,
}

impl CameraController {
    /// Create an inactive controller bound to the currently selected model.
    pub fn new(backend: Arc<dyn CameraBackend>, model: ModelId) -> Self {
        Self {
            backend,
            constraints: StreamConstraints::default(),
            state: CameraState::Inactive,
            stream: None,
            model,
            last_error: None,
        }
    }

    pub fn with_constraints(mut self, constraints: StreamConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == CameraState::Active
    }

    /// Model the controller is currently bound to.
    pub fn model(&self) -> &ModelId {
        &self.model
    }

    /// Kind of the most recent `start` failure, cleared by a successful start.
    pub fn last_error(&self) -> Option<CameraErrorKind> {
        self.last_error
    }

    /// Acquire the camera.
    ///
    /// Checks, in order: a video-input device exists (no permission prompt
    /// otherwise), the platform has not already denied permission, then
    /// requests access. No-op when already active.
    pub async fn start(&mut self) -> CameraResult<()> {
        if self.state == CameraState::Active {
            debug!("Camera already active");
            return Ok(());
        }

        self.state = CameraState::Acquiring;
        match self.acquire().await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = CameraState::Active;
                self.last_error = None;
                info!(model = %self.model, "Camera started");
                Ok(())
            }
            Err(e) => {
                self.state = CameraState::Inactive;
                self.last_error = e.kind();
                warn!(error_kind = ?e.kind(), "Camera start failed: {}", e);
                Err(e)
            }
        }
    }

    async fn acquire(&self) -> CameraResult<Box<dyn CameraStream>> {
        let devices = match self.backend.enumerate_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                warn!(name = %e.name, "Could not enumerate devices: {}", e.message);
                Vec::new()
            }
        };
        if devices.is_empty() {
            return Err(CameraError::acquisition(
                CameraErrorKind::DeviceNotFound,
                "no video input devices",
            ));
        }
        debug!(devices = devices.len(), "Found video input devices");

        match self.backend.permission_state().await {
            Ok(PermissionState::Denied) => {
                return Err(CameraError::acquisition(
                    CameraErrorKind::PermissionDenied,
                    "camera permission has been denied",
                ));
            }
            Ok(state) => debug!(?state, "Camera permission state"),
            Err(e) => warn!(name = %e.name, "Could not check permission status: {}", e.message),
        }

        self.backend
            .acquire(&self.constraints)
            .await
            .map_err(|e| {
                CameraError::acquisition(CameraErrorKind::from_platform_name(&e.name), e.message)
            })
    }

    /// Capture the current frame as a JPEG upload.
    pub async fn capture(&mut self) -> CameraResult<Upload> {
        let stream = match (&self.state, self.stream.as_mut()) {
            (CameraState::Active, Some(stream)) => stream,
            _ => return Err(CameraError::NotActive),
        };

        let frame = stream
            .grab_frame()
            .await
            .map_err(|e| CameraError::Capture(format!("{}: {}", e.name, e.message)))?;

        debug!(width = frame.width, height = frame.height, "Captured frame");
        frame.to_upload()
    }

    /// Release every track and return to `Inactive`. Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            info!("Camera stopped");
        }
        self.state = CameraState::Inactive;
    }

    /// Rebind to a newly selected model. An active stream is stopped and
    /// not restarted; restarting is left to the user.
    pub fn on_model_changed(&mut self, model: ModelId) {
        if model == self.model {
            return;
        }

        if self.is_active() {
            info!(from = %self.model, to = %model, "Model changed, stopping camera");
            self.stop();
        }
        self.model = model;
    }
}

impl Drop for CameraController {
    fn drop(&mut self) {
        self.stop();
    }
}
