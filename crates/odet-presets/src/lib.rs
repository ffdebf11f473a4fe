//! Detection configuration store.
//!
//! This crate provides:
//! - The built-in presets (`balanced`, `high-precision`, `fast`, `high-recall`)
//! - [`ConfigStore`], owner of the active config and the custom preset list
//! - [`PresetStorage`] backends (JSON files on disk, in-memory)

pub mod builtin;
pub mod error;
pub mod storage;
pub mod store;

pub use builtin::{builtin_presets, default_preset, DEFAULT_PRESET_ID};
pub use error::{PresetError, PresetResult};
pub use storage::{JsonFileStorage, MemoryStorage, PresetStorage};
pub use store::ConfigStore;
