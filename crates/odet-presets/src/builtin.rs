//! Built-in presets. Fixed constants; never mutated or deleted.

use odet_models::{DetectionConfig, DetectionPreset, ImageSize};

/// Preset restored by `reset_to_default`.
pub const DEFAULT_PRESET_ID: &str = "balanced";

struct Builtin {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    confidence: f32,
    iou: f32,
    max_detections: u32,
    image_size: ImageSize,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        id: DEFAULT_PRESET_ID,
        name: "Balanced",
        description: "Good balance between speed and accuracy",
        confidence: 0.25,
        iou: 0.45,
        max_detections: 300,
        image_size: ImageSize::S640,
    },
    Builtin {
        id: "high-precision",
        name: "High Precision",
        description: "Maximum accuracy, fewer false positives",
        confidence: 0.50,
        iou: 0.50,
        max_detections: 100,
        image_size: ImageSize::S1280,
    },
    Builtin {
        id: "fast",
        name: "Fast",
        description: "Optimized for speed, good for real-time",
        confidence: 0.30,
        iou: 0.40,
        max_detections: 200,
        image_size: ImageSize::S320,
    },
    Builtin {
        id: "high-recall",
        name: "High Recall",
        description: "Detect more objects, may include false positives",
        confidence: 0.15,
        iou: 0.35,
        max_detections: 500,
        image_size: ImageSize::S640,
    },
];

impl Builtin {
    fn to_preset(&self) -> DetectionPreset {
        DetectionPreset {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            config: DetectionConfig {
                confidence: self.confidence,
                iou: self.iou,
                max_detections: self.max_detections,
                image_size: self.image_size,
                classes: None,
            },
        }
    }
}

/// All built-in presets, in display order.
pub fn builtin_presets() -> Vec<DetectionPreset> {
    BUILTINS.iter().map(Builtin::to_preset).collect()
}

pub fn is_builtin(id: &str) -> bool {
    BUILTINS.iter().any(|b| b.id == id)
}

/// The `balanced` preset.
pub fn default_preset() -> DetectionPreset {
    BUILTINS[0].to_preset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_builtins_are_valid_and_unique() {
        let presets = builtin_presets();
        assert_eq!(presets.len(), 4);

        for preset in &presets {
            assert!(preset.config.validate().is_ok(), "{} out of range", preset.id);
            assert!(!preset.is_custom());
        }

        let mut ids: Vec<_> = presets.iter().map(|p| p.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_default_preset_matches_config_default() {
        let preset = default_preset();
        assert_eq!(preset.id, "balanced");
        assert_eq!(preset.config, DetectionConfig::default());
    }

    #[test]
    fn test_builtin_values() {
        let presets = builtin_presets();
        let fast = presets.iter().find(|p| p.id == "fast").unwrap();
        assert_eq!(fast.config.confidence, 0.30);
        assert_eq!(fast.config.iou, 0.40);
        assert_eq!(fast.config.max_detections, 200);
        assert_eq!(fast.config.image_size, ImageSize::S320);

        let precise = presets.iter().find(|p| p.id == "high-precision").unwrap();
        assert_eq!(precise.config.image_size.pixels(), 1280);

        assert!(is_builtin("high-recall"));
        assert!(!is_builtin("custom-1"));
    }
}
