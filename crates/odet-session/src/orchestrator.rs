//! Detection request lifecycle.
//!
//! - Local validation before anything reaches the network
//! - Image and video submissions against an [`InferenceService`]
//! - Video results are surfaced only once the artifact is ready
//! - Generation guard: responses to superseded submissions are discarded

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::Instrument;

use odet_client::InferenceService;
use odet_models::{Detection, DetectionConfig, DetectionResult, MediaKind, ModelId, Upload};

use crate::error::{SessionError, SessionResult};
use crate::logging::SubmissionLogger;
use crate::poller::VideoReadinessPoller;

/// Lifecycle phase of the current submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Processing,
    Success,
    Failed,
}

/// Observable detection state.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DetectionState {
    pub phase: Phase,
    pub detections: Vec<Detection>,
    /// Server-side processing time in seconds
    pub processing_time: Option<f64>,
    pub model_used: Option<String>,
    /// Annotated image URL as returned by the service (relative)
    pub result_image_url: Option<String>,
    /// Annotated video URL, set only once the video is ready
    pub result_video_url: Option<String>,
    pub error: Option<String>,
}

impl DetectionState {
    fn failed(message: String) -> Self {
        Self {
            phase: Phase::Failed,
            error: Some(message),
            ..Default::default()
        }
    }

    pub fn is_processing(&self) -> bool {
        self.phase == Phase::Processing
    }
}

/// Outcome of a submission that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The response was applied; carries the resulting state.
    Applied(DetectionState),
    /// A newer submission or a clear was issued while this one was in
    /// flight; its response was discarded.
    Superseded,
}

impl Submission {
    pub fn is_superseded(&self) -> bool {
        matches!(self, Submission::Superseded)
    }
}

/// Coordinates detection submissions and owns the result state.
pub struct DetectionOrchestrator {
    service: Arc<dyn InferenceService>,
    poller: VideoReadinessPoller,
    generation: AtomicU64,
    state: watch::Sender<DetectionState>,
}

impl DetectionOrchestrator {
    pub fn new(service: Arc<dyn InferenceService>, poller: VideoReadinessPoller) -> Self {
        let (state, _) = watch::channel(DetectionState::default());
        Self {
            service,
            poller,
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<DetectionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DetectionState {
        self.state.borrow().clone()
    }

    /// Latest issued generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Submit a still image for detection.
    ///
    /// `config` is a copy of the active configuration taken at submission
    /// time; later edits do not affect this request. An upload rejected by
    /// local validation returns an error without touching the state or the
    /// generation.
    pub async fn submit_image(
        &self,
        upload: Upload,
        model: &ModelId,
        config: DetectionConfig,
    ) -> SessionResult<Submission> {
        reject_locally(&upload, MediaKind::Image)?;

        let generation = self.begin();
        let logger = SubmissionLogger::new(generation, MediaKind::Image, model);
        logger.log_start(&upload.filename);

        let outcome = self
            .run_image(upload, model, &config)
            .instrument(logger.create_span())
            .await;
        self.finish(&logger, outcome)
    }

    /// Submit a video for detection and wait for the rendered artifact.
    pub async fn submit_video(
        &self,
        upload: Upload,
        model: &ModelId,
        config: DetectionConfig,
    ) -> SessionResult<Submission> {
        reject_locally(&upload, MediaKind::Video)?;

        let generation = self.begin();
        let logger = SubmissionLogger::new(generation, MediaKind::Video, model);
        logger.log_start(&upload.filename);

        let outcome = self
            .run_video(upload, model, &config, &logger)
            .instrument(logger.create_span())
            .await;
        self.finish(&logger, outcome)
    }

    /// Return to `Idle`, discarding results, errors and any in-flight response.
    pub fn clear_results(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(DetectionState::default());
        tracing::debug!(generation, "Results cleared");
    }

    fn begin(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| {
            state.phase = Phase::Processing;
            state.error = None;
        });
        generation
    }

    async fn run_image(
        &self,
        upload: Upload,
        model: &ModelId,
        config: &DetectionConfig,
    ) -> SessionResult<DetectionState> {
        let result = self.service.detect_image(upload, model, config).await?;
        ensure_success(&result, "Detection failed")?;

        Ok(DetectionState {
            phase: Phase::Success,
            processing_time: Some(result.processing_time),
            model_used: Some(result.model_used),
            result_image_url: result.image_url,
            result_video_url: None,
            detections: result.detections,
            error: None,
        })
    }

    async fn run_video(
        &self,
        upload: Upload,
        model: &ModelId,
        config: &DetectionConfig,
        logger: &SubmissionLogger,
    ) -> SessionResult<DetectionState> {
        let result = self.service.detect_video(upload, model, config).await?;
        ensure_success(&result, "Video processing failed")?;

        let result_video_url = match result.video_artifact_id() {
            Some(id) => {
                logger.log_progress(&format!("waiting for video {}", id));
                self.poller.wait_until_ready(id).await?;
                result.video_url.clone()
            }
            None => None,
        };

        Ok(DetectionState {
            phase: Phase::Success,
            detections: Vec::new(),
            processing_time: Some(result.processing_time),
            model_used: Some(result.model_used),
            result_image_url: None,
            result_video_url,
            error: None,
        })
    }

    /// Apply `outcome` if its generation is still the latest.
    fn finish(
        &self,
        logger: &SubmissionLogger,
        outcome: SessionResult<DetectionState>,
    ) -> SessionResult<Submission> {
        let next = match &outcome {
            Ok(state) => state.clone(),
            Err(e) => DetectionState::failed(e.to_string()),
        };

        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != logger.generation() {
                return false;
            }
            *state = next.clone();
            true
        });

        if !applied {
            logger.log_superseded(self.generation());
            return Ok(Submission::Superseded);
        }

        match outcome {
            Ok(state) => {
                logger.log_completion(&format!(
                    "{} detections in {:.3}s",
                    state.detections.len(),
                    state.processing_time.unwrap_or_default()
                ));
                Ok(Submission::Applied(state))
            }
            Err(e) => {
                logger.log_error(&e.to_string());
                Err(e)
            }
        }
    }
}

fn reject_locally(upload: &Upload, expected: MediaKind) -> SessionResult<()> {
    upload.validate_as(expected).map_err(|e| {
        tracing::warn!(filename = %upload.filename, kind = %expected, "Upload rejected: {}", e);
        SessionError::from(e)
    })
}

fn ensure_success(result: &DetectionResult, message: &str) -> SessionResult<()> {
    if result.success {
        Ok(())
    } else {
        Err(SessionError::detection_failed(message))
    }
}
