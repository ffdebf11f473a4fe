//! Named detection configurations.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::DetectionConfig;

/// A named, reusable `DetectionConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionPreset {
    /// Unique across built-in and custom presets
    pub id: String,
    pub name: String,
    pub description: String,
    pub config: DetectionConfig,
}

impl DetectionPreset {
    /// Prefix of every user-created preset id.
    pub const CUSTOM_PREFIX: &'static str = "custom-";

    pub fn is_custom(&self) -> bool {
        self.id.starts_with(Self::CUSTOM_PREFIX)
    }
}
