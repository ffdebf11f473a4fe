//! Trait seam over the inference service.

use async_trait::async_trait;

use odet_models::{
    DetectionConfig, DetectionResult, HealthStatus, ModelId, ModelInfo, Upload, VideoStatus,
};

use crate::client::InferenceClient;
use crate::error::ClientResult;

/// Operations of the inference service consumed by the session layer.
#[async_trait]
pub trait InferenceService: Send + Sync {
    async fn list_models(&self) -> ClientResult<Vec<ModelInfo>>;

    async fn detect_image(
        &self,
        upload: Upload,
        model: &ModelId,
        config: &DetectionConfig,
    ) -> ClientResult<DetectionResult>;

    async fn detect_video(
        &self,
        upload: Upload,
        model: &ModelId,
        config: &DetectionConfig,
    ) -> ClientResult<DetectionResult>;

    async fn video_status(&self, id: &str) -> ClientResult<VideoStatus>;

    async fn health_check(&self) -> ClientResult<HealthStatus>;
}

#[async_trait]
impl InferenceService for InferenceClient {
    async fn list_models(&self) -> ClientResult<Vec<ModelInfo>> {
        InferenceClient::list_models(self).await
    }

    async fn detect_image(
        &self,
        upload: Upload,
        model: &ModelId,
        config: &DetectionConfig,
    ) -> ClientResult<DetectionResult> {
        InferenceClient::detect_image(self, upload, model, config).await
    }

    async fn detect_video(
        &self,
        upload: Upload,
        model: &ModelId,
        config: &DetectionConfig,
    ) -> ClientResult<DetectionResult> {
        InferenceClient::detect_video(self, upload, model, config).await
    }

    async fn video_status(&self, id: &str) -> ClientResult<VideoStatus> {
        InferenceClient::video_status(self, id).await
    }

    async fn health_check(&self) -> ClientResult<HealthStatus> {
        InferenceClient::health_check(self).await
    }
}
