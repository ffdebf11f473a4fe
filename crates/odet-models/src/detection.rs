//! Detection results as produced by the inference service.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box `[x1, y1, x2, y2]` in image coordinates.
pub type BoundingBox = [f32; 4];

/// A single detected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    /// Class label (e.g. "cat")
    pub class: String,
    /// Confidence score in [0, 1]
    pub confidence: f32,
    /// Bounding box
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn width(&self) -> f32 {
        self.bbox[2] - self.bbox[0]
    }

    pub fn height(&self) -> f32 {
        self.bbox[3] - self.bbox[1]
    }
}

/// Response body of `/api/detect/image` and `/api/detect/video`.
///
/// Video responses never carry per-frame detections; `detections` is empty
/// and `video_url` points at the rendered artifact instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionResult {
    pub success: bool,

    #[serde(default)]
    pub detections: Vec<Detection>,

    /// Relative URL of the annotated image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Relative URL of the annotated video
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,

    #[serde(default)]
    pub model_used: String,

    /// Server-side processing time in seconds
    #[serde(default)]
    pub processing_time: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_fps: Option<f64>,
}

impl DetectionResult {
    /// Artifact identifier of the rendered video: the last path segment of
    /// `video_url`.
    pub fn video_artifact_id(&self) -> Option<&str> {
        self.video_url
            .as_deref()
            .and_then(|url| url.rsplit('/').next())
            .filter(|id| !id.is_empty())
    }
}

/// Response body of `/api/video/status/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VideoStatus {
    pub ready: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Liveness payload of `/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HealthStatus {
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models_loaded: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" || self.status == "ok"
    }
}
