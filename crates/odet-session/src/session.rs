//! A user's detection session.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use odet_camera::{CameraBackend, CameraController, CameraError, CameraErrorKind, CameraState};
use odet_client::{InferenceClient, InferenceService};
use odet_models::{MediaKind, ModelId, ModelInfo, Upload};
use odet_presets::{ConfigStore, JsonFileStorage};

use crate::config::{PollerConfig, SessionConfig};
use crate::error::{SessionError, SessionResult};
use crate::orchestrator::{DetectionOrchestrator, DetectionState, Submission};
use crate::poller::{VideoReadinessPoller, VideoStatusSource};

/// Wires the selected model, the config store, an optional camera and the
/// orchestrator together.
pub struct DetectionSession {
    service: Arc<dyn InferenceService>,
    orchestrator: DetectionOrchestrator,
    presets: ConfigStore,
    camera: Option<CameraController>,
    model: ModelId,
    catalog: OnceCell<Vec<ModelInfo>>,
}

impl DetectionSession {
    pub fn new(
        service: Arc<dyn InferenceService>,
        status: Arc<dyn VideoStatusSource>,
        presets: ConfigStore,
        poller: PollerConfig,
        model: ModelId,
    ) -> Self {
        let poller = VideoReadinessPoller::new(status, poller);
        Self {
            orchestrator: DetectionOrchestrator::new(service.clone(), poller),
            service,
            presets,
            camera: None,
            model,
            catalog: OnceCell::new(),
        }
    }

    /// Build a session against the HTTP service, with presets persisted
    /// under `config.presets_dir`.
    pub fn from_config(config: &SessionConfig) -> SessionResult<Self> {
        let client = Arc::new(InferenceClient::new(config.client.clone())?);
        let storage = Arc::new(JsonFileStorage::new(config.presets_dir.clone()));

        Ok(Self::new(
            client.clone(),
            client,
            ConfigStore::load(storage),
            config.poller.clone(),
            config.default_model.clone(),
        ))
    }

    /// Attach a camera backend. The camera starts inactive.
    pub fn with_camera(mut self, backend: Arc<dyn CameraBackend>) -> Self {
        self.camera = Some(CameraController::new(backend, self.model.clone()));
        self
    }

    pub fn model(&self) -> &ModelId {
        &self.model
    }

    pub fn presets(&self) -> &ConfigStore {
        &self.presets
    }

    pub fn presets_mut(&mut self) -> &mut ConfigStore {
        &mut self.presets
    }

    pub fn orchestrator(&self) -> &DetectionOrchestrator {
        &self.orchestrator
    }

    pub fn state(&self) -> DetectionState {
        self.orchestrator.snapshot()
    }

    /// Model catalog, fetched from the service once per session.
    pub async fn models(&self) -> SessionResult<&[ModelInfo]> {
        let models = self
            .catalog
            .get_or_try_init(|| self.service.list_models())
            .await?;
        Ok(models.as_slice())
    }

    /// Switch models. Clears results and stops an active camera; the camera
    /// is not restarted.
    pub fn select_model(&mut self, model: ModelId) {
        if model == self.model {
            return;
        }

        info!(from = %self.model, to = %model, "Model selected");
        if let Some(camera) = self.camera.as_mut() {
            camera.on_model_changed(model.clone());
        }
        self.orchestrator.clear_results();
        self.model = model;
    }

    pub fn camera_state(&self) -> CameraState {
        self.camera
            .as_ref()
            .map(CameraController::state)
            .unwrap_or(CameraState::Inactive)
    }

    pub async fn start_camera(&mut self) -> SessionResult<()> {
        self.camera_mut()?.start().await?;
        Ok(())
    }

    pub fn stop_camera(&mut self) {
        if let Some(camera) = self.camera.as_mut() {
            camera.stop();
        }
    }

    /// Capture a frame and submit it with a copy of the active config.
    pub async fn capture_and_detect(&mut self) -> SessionResult<Submission> {
        let upload = self.camera_mut()?.capture().await?;
        self.orchestrator
            .submit_image(upload, &self.model, self.presets.active())
            .await
    }

    /// Submit an uploaded file, routed by its declared media type.
    pub async fn submit_upload(&self, upload: Upload) -> SessionResult<Submission> {
        let config = self.presets.active();
        match upload.media_kind() {
            Some(MediaKind::Video) => {
                self.orchestrator
                    .submit_video(upload, &self.model, config)
                    .await
            }
            _ => {
                self.orchestrator
                    .submit_image(upload, &self.model, config)
                    .await
            }
        }
    }

    pub fn clear_results(&self) {
        self.orchestrator.clear_results();
    }

    fn camera_mut(&mut self) -> SessionResult<&mut CameraController> {
        self.camera.as_mut().ok_or_else(|| {
            SessionError::Camera(CameraError::acquisition(
                CameraErrorKind::DeviceNotFound,
                "no camera backend attached",
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::Phase;
    use async_trait::async_trait;
    use odet_camera::{
        CameraStream, DeviceInfo, Frame, PermissionState, PlatformError, StreamConstraints,
    };
    use odet_client::{ClientError, ClientResult};
    use odet_models::{
        ConfigUpdate, DetectionConfig, DetectionResult, HealthStatus, VideoStatus,
    };
    use odet_presets::MemoryStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingService {
        list_calls: AtomicUsize,
        last_request: Mutex<Option<(String, ModelId, DetectionConfig)>>,
    }

    impl RecordingService {
        fn record(&self, upload: &Upload, model: &ModelId, config: &DetectionConfig) {
            *self.last_request.lock().unwrap() =
                Some((upload.filename.clone(), model.clone(), config.clone()));
        }

        fn last_request(&self) -> (String, ModelId, DetectionConfig) {
            self.last_request.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait]
    impl InferenceService for RecordingService {
        async fn list_models(&self) -> ClientResult<Vec<ModelInfo>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ModelInfo {
                id: ModelId::new("yolov8n"),
                name: "YOLOv8 Nano".to_string(),
                size: "6.2MB".to_string(),
                description: "Fastest".to_string(),
                filename: "yolov8n.pt".to_string(),
            }])
        }

        async fn detect_image(
            &self,
            upload: Upload,
            model: &ModelId,
            config: &DetectionConfig,
        ) -> ClientResult<DetectionResult> {
            self.record(&upload, model, config);
            Ok(result(model, None))
        }

        async fn detect_video(
            &self,
            upload: Upload,
            model: &ModelId,
            config: &DetectionConfig,
        ) -> ClientResult<DetectionResult> {
            self.record(&upload, model, config);
            Ok(result(model, Some("/results/out.mp4")))
        }

        async fn video_status(&self, _id: &str) -> ClientResult<VideoStatus> {
            Ok(VideoStatus {
                ready: true,
                filename: None,
                size: None,
            })
        }

        async fn health_check(&self) -> ClientResult<HealthStatus> {
            Err(ClientError::network("unused"))
        }
    }

    #[async_trait]
    impl VideoStatusSource for RecordingService {
        async fn video_status(&self, id: &str) -> ClientResult<VideoStatus> {
            InferenceService::video_status(self, id).await
        }
    }

    fn result(model: &ModelId, video_url: Option<&str>) -> DetectionResult {
        DetectionResult {
            success: true,
            detections: Vec::new(),
            image_url: video_url.is_none().then(|| "/results/out.jpg".to_string()),
            video_url: video_url.map(str::to_string),
            original_filename: None,
            model_used: model.to_string(),
            processing_time: 0.1,
            image_size: None,
            total_frames: None,
            processing_fps: None,
        }
    }

    struct StillStream;

    #[async_trait]
    impl CameraStream for StillStream {
        async fn grab_frame(&mut self) -> Result<Frame, PlatformError> {
            Ok(Frame::new(8, 8, vec![90u8; 8 * 8 * 3]))
        }

        fn stop(&mut self) {}
    }

    struct StillCamera;

    #[async_trait]
    impl CameraBackend for StillCamera {
        async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, PlatformError> {
            Ok(vec![DeviceInfo {
                id: "0".to_string(),
                label: "Still camera".to_string(),
            }])
        }

        async fn permission_state(&self) -> Result<PermissionState, PlatformError> {
            Ok(PermissionState::Granted)
        }

        async fn acquire(
            &self,
            _constraints: &StreamConstraints,
        ) -> Result<Box<dyn CameraStream>, PlatformError> {
            Ok(Box::new(StillStream))
        }
    }

    fn session() -> (DetectionSession, Arc<RecordingService>) {
        let service = Arc::new(RecordingService::default());
        let presets = ConfigStore::load(Arc::new(MemoryStorage::new()));
        let session = DetectionSession::new(
            service.clone(),
            service.clone(),
            presets,
            PollerConfig::default(),
            ModelId::new("yolov8n"),
        )
        .with_camera(Arc::new(StillCamera));
        (session, service)
    }

    #[tokio::test]
    async fn test_catalog_fetched_once() {
        let (session, service) = session();
        assert_eq!(session.models().await.unwrap().len(), 1);
        assert_eq!(session.models().await.unwrap()[0].id.as_str(), "yolov8n");
        assert_eq!(service.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_capture_submits_active_config() {
        let (mut session, service) = session();
        session
            .presets()
            .update_field(ConfigUpdate::Confidence(0.6))
            .unwrap();

        session.start_camera().await.unwrap();
        let submission = session.capture_and_detect().await.unwrap();
        assert!(!submission.is_superseded());

        let (filename, model, config) = service.last_request();
        assert_eq!(filename, "webcam-capture.jpg");
        assert_eq!(model.as_str(), "yolov8n");
        assert_eq!(config.confidence, 0.6);
        assert_eq!(session.state().phase, Phase::Success);
    }

    #[tokio::test]
    async fn test_capture_requires_started_camera() {
        let (mut session, _) = session();
        let err = session.capture_and_detect().await.unwrap_err();
        assert!(matches!(err, SessionError::Camera(CameraError::NotActive)));
    }

    #[tokio::test]
    async fn test_select_model_stops_camera_and_clears() {
        let (mut session, _) = session();
        session.start_camera().await.unwrap();
        session.capture_and_detect().await.unwrap();
        assert_eq!(session.state().phase, Phase::Success);

        session.select_model(ModelId::new("yolov8s"));
        assert_eq!(session.model().as_str(), "yolov8s");
        assert_eq!(session.camera_state(), CameraState::Inactive);
        assert_eq!(session.state(), DetectionState::default());
    }

    #[tokio::test]
    async fn test_upload_routed_by_media_type() {
        let (session, service) = session();

        session
            .submit_upload(Upload::new("clip.mp4", "video/mp4", vec![1u8; 16]))
            .await
            .unwrap();
        assert_eq!(service.last_request().0, "clip.mp4");
        assert_eq!(
            session.state().result_video_url.as_deref(),
            Some("/results/out.mp4")
        );

        session
            .submit_upload(Upload::new("dog.png", "image/png", vec![1u8; 16]))
            .await
            .unwrap();
        assert_eq!(service.last_request().0, "dog.png");
        assert_eq!(
            session.state().result_image_url.as_deref(),
            Some("/results/out.jpg")
        );
    }

    #[tokio::test]
    async fn test_unsupported_upload_fails_locally() {
        let (session, service) = session();
        let err = session
            .submit_upload(Upload::new("notes.txt", "text/plain", vec![1u8; 16]))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Validation(_)));
        assert!(service.last_request.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_without_camera() {
        let service = Arc::new(RecordingService::default());
        let mut session = DetectionSession::new(
            service.clone(),
            service,
            ConfigStore::load(Arc::new(MemoryStorage::new())),
            PollerConfig::default(),
            ModelId::new("yolov8n"),
        );

        let err = session.start_camera().await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Camera(CameraError::Acquisition {
                kind: CameraErrorKind::DeviceNotFound,
                ..
            })
        ));
        assert_eq!(session.camera_state(), CameraState::Inactive);
    }
}
