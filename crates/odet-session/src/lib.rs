//! Detection session coordination.
//!
//! This crate provides:
//! - [`DetectionOrchestrator`]: image/video submissions with a generation guard
//! - [`VideoReadinessPoller`]: bounded polling for rendered video artifacts
//! - [`DetectionSession`]: model selection, presets and camera wired together
//! - Environment-driven configuration and structured submission logging

pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod poller;
pub mod session;

pub use config::{PollerConfig, SessionConfig};
pub use error::{SessionError, SessionResult};
pub use logging::SubmissionLogger;
pub use orchestrator::{DetectionOrchestrator, DetectionState, Phase, Submission};
pub use poller::{VideoReadinessPoller, VideoStatusSource};
pub use session::DetectionSession;
