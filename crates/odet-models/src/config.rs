//! Detection configuration.
//!
//! A `DetectionConfig` is sent alongside every detection request. All fields
//! are range-bounded; `apply` is the only mutation path and keeps them in
//! range.

use std::collections::BTreeSet;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

pub const CONFIDENCE_MIN: f32 = 0.05;
pub const CONFIDENCE_MAX: f32 = 0.95;
pub const IOU_MIN: f32 = 0.20;
pub const IOU_MAX: f32 = 0.70;
pub const MAX_DETECTIONS_MIN: u32 = 50;
pub const MAX_DETECTIONS_MAX: u32 = 1000;

/// Errors raised when a configuration update cannot be applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} must be a number")]
    NotANumber(&'static str),

    #[error("Unsupported image size: {0} (expected 320, 640 or 1280)")]
    InvalidImageSize(u32),
}

/// Inference input resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum ImageSize {
    S320,
    #[default]
    S640,
    S1280,
}

impl ImageSize {
    pub const ALL: &'static [ImageSize] = &[ImageSize::S320, ImageSize::S640, ImageSize::S1280];

    pub fn pixels(&self) -> u32 {
        match self {
            ImageSize::S320 => 320,
            ImageSize::S640 => 640,
            ImageSize::S1280 => 1280,
        }
    }
}

impl TryFrom<u32> for ImageSize {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            320 => Ok(ImageSize::S320),
            640 => Ok(ImageSize::S640),
            1280 => Ok(ImageSize::S1280),
            other => Err(ConfigError::InvalidImageSize(other)),
        }
    }
}

impl From<ImageSize> for u32 {
    fn from(size: ImageSize) -> Self {
        size.pixels()
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pixels())
    }
}

/// Detection parameters forwarded to the inference service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    /// Minimum confidence for a detection to be reported
    #[validate(range(min = 0.05, max = 0.95))]
    pub confidence: f32,

    /// NMS IoU threshold
    #[validate(range(min = 0.20, max = 0.70))]
    pub iou: f32,

    /// Maximum number of detections per image
    #[validate(range(min = 50, max = 1000))]
    pub max_detections: u32,

    #[schemars(with = "u32")]
    pub image_size: ImageSize,

    /// Restrict detection to these class indices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<BTreeSet<u32>>,
}

impl Default for DetectionConfig {
    /// Same values as the `balanced` preset.
    fn default() -> Self {
        Self {
            confidence: 0.25,
            iou: 0.45,
            max_detections: 300,
            image_size: ImageSize::S640,
            classes: None,
        }
    }
}

/// A single-field change to a `DetectionConfig`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigUpdate {
    Confidence(f32),
    Iou(f32),
    MaxDetections(u32),
    ImageSize(ImageSize),
    Classes(Option<BTreeSet<u32>>),
}

impl ConfigUpdate {
    pub fn field_name(&self) -> &'static str {
        match self {
            ConfigUpdate::Confidence(_) => "confidence",
            ConfigUpdate::Iou(_) => "iou",
            ConfigUpdate::MaxDetections(_) => "maxDetections",
            ConfigUpdate::ImageSize(_) => "imageSize",
            ConfigUpdate::Classes(_) => "classes",
        }
    }
}

impl DetectionConfig {
    /// Apply one field update, clamping continuous values into range.
    ///
    /// NaN is rejected and leaves the config untouched.
    pub fn apply(&mut self, update: ConfigUpdate) -> Result<(), ConfigError> {
        match update {
            ConfigUpdate::Confidence(value) => {
                self.confidence = clamp_f32(value, CONFIDENCE_MIN, CONFIDENCE_MAX, "confidence")?;
            }
            ConfigUpdate::Iou(value) => {
                self.iou = clamp_f32(value, IOU_MIN, IOU_MAX, "iou")?;
            }
            ConfigUpdate::MaxDetections(value) => {
                self.max_detections = value.clamp(MAX_DETECTIONS_MIN, MAX_DETECTIONS_MAX);
            }
            ConfigUpdate::ImageSize(size) => {
                self.image_size = size;
            }
            ConfigUpdate::Classes(classes) => {
                self.classes = classes.filter(|set| !set.is_empty());
            }
        }
        Ok(())
    }

    /// Classes rendered as the comma-separated form sent over the wire.
    pub fn classes_param(&self) -> Option<String> {
        self.classes.as_ref().map(|set| {
            set.iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
    }
}

fn clamp_f32(value: f32, min: f32, max: f32, field: &'static str) -> Result<f32, ConfigError> {
    if value.is_nan() {
        return Err(ConfigError::NotANumber(field));
    }
    Ok(value.clamp(min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_in_range(config: &DetectionConfig) {
        assert!(config.validate().is_ok(), "out of range: {:?}", config);
        assert!(ImageSize::ALL.contains(&config.image_size));
    }

    #[test]
    fn test_default_is_valid() {
        let config = DetectionConfig::default();
        assert_in_range(&config);
        assert_eq!(config.image_size.pixels(), 640);
    }

    #[test]
    fn test_apply_clamps_continuous_fields() {
        let mut config = DetectionConfig::default();

        for value in [-1.0, 0.0, 0.05, 0.5, 0.95, 1.0, 7.5, f32::INFINITY, f32::NEG_INFINITY] {
            config.apply(ConfigUpdate::Confidence(value)).unwrap();
            assert_in_range(&config);
            config.apply(ConfigUpdate::Iou(value)).unwrap();
            assert_in_range(&config);
        }

        for value in [0, 49, 50, 500, 1000, 1001, u32::MAX] {
            config.apply(ConfigUpdate::MaxDetections(value)).unwrap();
            assert_in_range(&config);
        }

        config.apply(ConfigUpdate::Confidence(0.01)).unwrap();
        assert_eq!(config.confidence, CONFIDENCE_MIN);
        config.apply(ConfigUpdate::Iou(0.9)).unwrap();
        assert_eq!(config.iou, IOU_MAX);
        config.apply(ConfigUpdate::MaxDetections(5000)).unwrap();
        assert_eq!(config.max_detections, MAX_DETECTIONS_MAX);
    }

    #[test]
    fn test_apply_rejects_nan() {
        let mut config = DetectionConfig::default();
        let err = config.apply(ConfigUpdate::Confidence(f32::NAN)).unwrap_err();
        assert_eq!(err, ConfigError::NotANumber("confidence"));
        assert_eq!(config, DetectionConfig::default());
    }

    #[test]
    fn test_apply_touches_one_field() {
        let mut config = DetectionConfig::default();
        config.apply(ConfigUpdate::ImageSize(ImageSize::S1280)).unwrap();

        let expected = DetectionConfig {
            image_size: ImageSize::S1280,
            ..DetectionConfig::default()
        };
        assert_eq!(config, expected);
    }

    #[test]
    fn test_image_size_conversion() {
        assert_eq!(ImageSize::try_from(320).unwrap(), ImageSize::S320);
        assert_eq!(ImageSize::try_from(1280).unwrap(), ImageSize::S1280);
        assert_eq!(
            ImageSize::try_from(512).unwrap_err(),
            ConfigError::InvalidImageSize(512)
        );
    }

    #[test]
    fn test_serde_camel_case() {
        let mut config = DetectionConfig::default();
        config
            .apply(ConfigUpdate::Classes(Some([0, 15].into_iter().collect())))
            .unwrap();

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["maxDetections"], 300);
        assert_eq!(json["imageSize"], 640);
        assert_eq!(json["classes"], serde_json::json!([0, 15]));

        let back: DetectionConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_serde_rejects_unknown_image_size() {
        let json = r#"{"confidence":0.25,"iou":0.45,"maxDetections":300,"imageSize":999}"#;
        assert!(serde_json::from_str::<DetectionConfig>(json).is_err());
    }

    #[test]
    fn test_classes_param() {
        let mut config = DetectionConfig::default();
        assert_eq!(config.classes_param(), None);

        config
            .apply(ConfigUpdate::Classes(Some([16, 2, 0].into_iter().collect())))
            .unwrap();
        assert_eq!(config.classes_param().as_deref(), Some("0,2,16"));

        config
            .apply(ConfigUpdate::Classes(Some(BTreeSet::new())))
            .unwrap();
        assert_eq!(config.classes, None);
    }
}
