//! Inference service HTTP client.

use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use odet_models::{
    DetectionConfig, DetectionResult, HealthStatus, ModelId, ModelInfo, Upload, VideoStatus,
};

use crate::error::{ClientError, ClientResult};
use crate::metrics::record_request;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the inference client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the inference service
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ODET_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("ODET_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }
}

/// Client for the inference service.
pub struct InferenceClient {
    http: Client,
    base_url: Url,
    config: ClientConfig,
}

impl InferenceClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::network(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch the model catalog.
    pub async fn list_models(&self) -> ClientResult<Vec<ModelInfo>> {
        let url = self.endpoint(&["api", "models"]);
        self.execute("models", self.http.get(url)).await
    }

    /// Run detection on a still image.
    pub async fn detect_image(
        &self,
        upload: Upload,
        model: &ModelId,
        config: &DetectionConfig,
    ) -> ClientResult<DetectionResult> {
        let url = self.endpoint(&["api", "detect", "image"]);
        debug!(model = %model, file = %upload.filename, bytes = upload.len(), "Sending image detection request");

        let form = detection_form(upload, model, config)?;
        self.execute("detect_image", self.http.post(url).multipart(form))
            .await
    }

    /// Run detection on a video. The response carries a `video_url` whose
    /// artifact may not be ready yet; see [`video_status`](Self::video_status).
    pub async fn detect_video(
        &self,
        upload: Upload,
        model: &ModelId,
        config: &DetectionConfig,
    ) -> ClientResult<DetectionResult> {
        let url = self.endpoint(&["api", "detect", "video"]);
        debug!(model = %model, file = %upload.filename, bytes = upload.len(), "Sending video detection request");

        let form = detection_form(upload, model, config)?;
        self.execute("detect_video", self.http.post(url).multipart(form))
            .await
    }

    /// Query readiness of a rendered video artifact.
    pub async fn video_status(&self, id: &str) -> ClientResult<VideoStatus> {
        let url = self.endpoint(&["api", "video", "status", id]);
        self.execute("video_status", self.http.get(url)).await
    }

    /// Fetch the liveness payload.
    pub async fn health_check(&self) -> ClientResult<HealthStatus> {
        let url = self.endpoint(&["health"]);
        self.execute("health", self.http.get(url)).await
    }

    /// True if the service answers `/health` with a healthy status.
    pub async fn is_healthy(&self) -> bool {
        match self.health_check().await {
            Ok(health) => health.is_healthy(),
            Err(e) => {
                warn!("Inference service health check error: {}", e);
                false
            }
        }
    }

    /// Resolve a result media path (`image_url` / `video_url`) against the
    /// service base URL. Absolute URLs are returned unchanged.
    pub fn media_url(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> ClientResult<T> {
        let started = Instant::now();
        let result = self.send(request).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(_) => record_request(endpoint, "ok", elapsed),
            Err(e) => {
                warn!(endpoint, error_kind = e.kind(), "Inference request failed: {}", e);
                record_request(endpoint, e.kind(), elapsed);
            }
        }

        result
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let timeout = self.config.timeout;
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_http_status(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::from_reqwest(e, timeout))
    }
}

/// Multipart body shared by image and video detection.
fn detection_form(
    upload: Upload,
    model: &ModelId,
    config: &DetectionConfig,
) -> ClientResult<Form> {
    let Upload {
        filename,
        content_type,
        bytes,
    } = upload;

    let file = Part::bytes(bytes)
        .file_name(filename)
        .mime_str(&content_type)
        .map_err(|e| ClientError::network(e.to_string()))?;

    let mut form = Form::new()
        .part("file", file)
        .text("model", model.to_string())
        .text("confidence", config.confidence.to_string())
        .text("iou", config.iou.to_string())
        .text("max_detections", config.max_detections.to_string())
        .text("image_size", config.image_size.to_string());

    if let Some(classes) = config.classes_param() {
        form = form.text("classes", classes);
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        std::env::set_var("ODET_SERVICE_URL", "http://inference:9000");
        std::env::set_var("ODET_REQUEST_TIMEOUT_SECS", "45");
        let config = ClientConfig::from_env();
        std::env::remove_var("ODET_SERVICE_URL");
        std::env::remove_var("ODET_REQUEST_TIMEOUT_SECS");

        assert_eq!(config.base_url, "http://inference:9000");
        assert_eq!(config.timeout, Duration::from_secs(45));
    }

    #[test]
    #[serial]
    fn test_config_from_env_ignores_garbage() {
        std::env::set_var("ODET_REQUEST_TIMEOUT_SECS", "soon");
        let config = ClientConfig::from_env();
        std::env::remove_var("ODET_REQUEST_TIMEOUT_SECS");

        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            InferenceClient::new(config),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = InferenceClient::new(ClientConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();

        assert_eq!(
            client.endpoint(&["api", "video", "status", "result abc.mp4"]).as_str(),
            "http://localhost:8000/api/video/status/result%20abc.mp4"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = InferenceClient::new(ClientConfig {
            base_url: "http://gateway/detector".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();

        assert_eq!(
            client.endpoint(&["health"]).as_str(),
            "http://gateway/detector/health"
        );
    }

    #[test]
    fn test_media_url() {
        let client = InferenceClient::new(ClientConfig::default()).unwrap();

        assert_eq!(
            client.media_url("/static/result_1.jpg").unwrap().as_str(),
            "http://localhost:8000/static/result_1.jpg"
        );
        assert_eq!(
            client.media_url("https://cdn.example.com/v.mp4").unwrap().as_str(),
            "https://cdn.example.com/v.mp4"
        );
    }
}
