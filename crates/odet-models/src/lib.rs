//! Shared data models for the odet detection client.
//!
//! This crate provides Serde-serializable types for:
//! - Detections and detection results returned by the inference service
//! - Detection configuration and presets
//! - The model catalog
//! - Upload payloads and local pre-flight validation

pub mod config;
pub mod detection;
pub mod model;
pub mod preset;
pub mod upload;

// Re-export common types
pub use config::{ConfigError, ConfigUpdate, DetectionConfig, ImageSize};
pub use detection::{BoundingBox, Detection, DetectionResult, HealthStatus, VideoStatus};
pub use model::{ModelId, ModelInfo};
pub use preset::DetectionPreset;
pub use upload::{MediaKind, Upload, ValidationError, MAX_UPLOAD_BYTES};
