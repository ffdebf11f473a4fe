//! Client for the object-detection inference service.
//!
//! This crate provides a thin HTTP client over the service's fixed REST
//! contract (model catalog, image/video detection, video readiness, health).
//! Every transport failure is normalized into [`ClientError`] so callers
//! never see raw protocol errors.

pub mod client;
pub mod error;
pub mod metrics;
pub mod service;

pub use client::{ClientConfig, InferenceClient};
pub use error::{ClientError, ClientResult};
pub use service::InferenceService;
