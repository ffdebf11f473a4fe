//! Active configuration and preset management.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use odet_models::{ConfigUpdate, DetectionConfig, DetectionPreset};

use crate::builtin::{builtin_presets, default_preset, is_builtin};
use crate::error::{PresetError, PresetResult};
use crate::storage::PresetStorage;

/// Owner of the active `DetectionConfig` and the custom preset list.
///
/// Every change to the active config is broadcast to subscribers as it
/// happens. The custom list is persisted in full under [`Self::STORAGE_KEY`]
/// after each save/delete.
pub struct ConfigStore {
    storage: Arc<dyn PresetStorage>,
    custom: Vec<DetectionPreset>,
    active: watch::Sender<DetectionConfig>,
}

impl ConfigStore {
    /// Storage key holding the JSON array of custom presets.
    pub const STORAGE_KEY: &'static str = "yolo-custom-presets";

    const CUSTOM_DESCRIPTION: &'static str = "Custom configuration";

    /// Load custom presets from storage. The active config starts at the
    /// default preset.
    ///
    /// Unreadable storage or malformed JSON yields an empty custom list;
    /// entries that are out of range or reuse an existing id are dropped.
    pub fn load(storage: Arc<dyn PresetStorage>) -> Self {
        let custom = match storage.load(Self::STORAGE_KEY) {
            Ok(Some(raw)) => parse_custom_presets(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to load custom presets: {}", e);
                Vec::new()
            }
        };

        info!(custom_presets = custom.len(), "Preset store loaded");

        let (active, _) = watch::channel(default_preset().config);
        Self {
            storage,
            custom,
            active,
        }
    }

    /// Copy of the active config.
    pub fn active(&self) -> DetectionConfig {
        self.active.borrow().clone()
    }

    /// Receive every subsequent change to the active config.
    pub fn subscribe(&self) -> watch::Receiver<DetectionConfig> {
        self.active.subscribe()
    }

    /// Built-in presets followed by custom presets.
    pub fn presets(&self) -> Vec<DetectionPreset> {
        let mut all = builtin_presets();
        all.extend(self.custom.iter().cloned());
        all
    }

    pub fn custom_presets(&self) -> &[DetectionPreset] {
        &self.custom
    }

    pub fn find(&self, id: &str) -> Option<DetectionPreset> {
        self.presets().into_iter().find(|p| p.id == id)
    }

    /// Replace the active config with the preset's config.
    ///
    /// A preset whose config is out of range is rejected and the active
    /// config is left unchanged.
    pub fn select_preset(&self, preset: &DetectionPreset) -> PresetResult<()> {
        preset.config.validate()?;

        debug!(preset_id = %preset.id, "Selecting preset");
        self.active.send_replace(preset.config.clone());
        Ok(())
    }

    pub fn select_preset_by_id(&self, id: &str) -> PresetResult<()> {
        let preset = self
            .find(id)
            .ok_or_else(|| PresetError::NotFound(id.to_string()))?;
        self.select_preset(&preset)
    }

    /// Change one field of the active config and notify subscribers.
    ///
    /// Continuous values are clamped into range; NaN is rejected and the
    /// active config is left unchanged.
    pub fn update_field(&self, update: ConfigUpdate) -> PresetResult<DetectionConfig> {
        let field = update.field_name();
        let mut config = self.active();
        config.apply(update)?;

        debug!(field, "Updated detection config field");
        self.active.send_replace(config.clone());
        Ok(config)
    }

    /// Restore the active config to the `balanced` preset.
    pub fn reset_to_default(&self) {
        debug!("Resetting detection config to default");
        self.active.send_replace(default_preset().config);
    }

    /// Snapshot the active config into a new custom preset and persist the
    /// custom list.
    pub fn save_preset(&mut self, name: &str) -> PresetResult<DetectionPreset> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PresetError::EmptyName);
        }

        let preset = DetectionPreset {
            id: self.fresh_id(),
            name: name.to_string(),
            description: Self::CUSTOM_DESCRIPTION.to_string(),
            config: self.active(),
        };

        let mut updated = self.custom.clone();
        updated.push(preset.clone());
        self.persist(&updated)?;
        self.custom = updated;

        info!(preset_id = %preset.id, name = %preset.name, "Saved custom preset");
        Ok(preset)
    }

    /// Remove one custom preset and persist the custom list.
    pub fn delete_preset(&mut self, id: &str) -> PresetResult<DetectionPreset> {
        if is_builtin(id) {
            return Err(PresetError::BuiltinPreset(id.to_string()));
        }

        let index = self
            .custom
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PresetError::NotFound(id.to_string()))?;

        let mut updated = self.custom.clone();
        let removed = updated.remove(index);
        self.persist(&updated)?;
        self.custom = updated;

        info!(preset_id = %removed.id, "Deleted custom preset");
        Ok(removed)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = format!("{}{}", DetectionPreset::CUSTOM_PREFIX, Uuid::new_v4());
            if !is_builtin(&id) && !self.custom.iter().any(|p| p.id == id) {
                return id;
            }
        }
    }

    fn persist(&self, presets: &[DetectionPreset]) -> PresetResult<()> {
        let json = serde_json::to_string(presets)?;
        self.storage.save(Self::STORAGE_KEY, &json)
    }
}

fn parse_custom_presets(raw: &str) -> Vec<DetectionPreset> {
    let parsed: Vec<DetectionPreset> = match serde_json::from_str(raw) {
        Ok(presets) => presets,
        Err(e) => {
            warn!("Failed to parse custom presets, ignoring stored list: {}", e);
            return Vec::new();
        }
    };

    let mut seen: HashSet<String> = HashSet::new();
    parsed
        .into_iter()
        .filter(|preset| {
            if is_builtin(&preset.id) || !seen.insert(preset.id.clone()) {
                warn!(preset_id = %preset.id, "Dropping stored preset with duplicate id");
                return false;
            }
            if let Err(e) = preset.config.validate() {
                warn!(preset_id = %preset.id, "Dropping stored preset with invalid config: {}", e);
                return false;
            }
            true
        })
        .collect()
}
