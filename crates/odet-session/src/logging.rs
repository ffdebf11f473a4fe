//! Structured submission logging.
//!
//! Provides consistent, structured logging for detection submissions with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};

use odet_models::{MediaKind, ModelId};

/// Submission logger carrying the generation, media kind and model of one
/// detection request.
#[derive(Debug, Clone)]
pub struct SubmissionLogger {
    generation: u64,
    kind: MediaKind,
    model: String,
}

impl SubmissionLogger {
    pub fn new(generation: u64, kind: MediaKind, model: &ModelId) -> Self {
        Self {
            generation,
            kind,
            model: model.to_string(),
        }
    }

    /// Log the start of a submission.
    pub fn log_start(&self, filename: &str) {
        info!(
            generation = self.generation,
            kind = %self.kind,
            model = %self.model,
            "Submission started: {}", filename
        );
    }

    /// Log a progress update while the submission is in flight.
    pub fn log_progress(&self, message: &str) {
        info!(
            generation = self.generation,
            kind = %self.kind,
            model = %self.model,
            "Submission progress: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            generation = self.generation,
            kind = %self.kind,
            model = %self.model,
            "Submission failed: {}", message
        );
    }

    /// Log a response that arrived after a newer submission or a clear.
    pub fn log_superseded(&self, latest: u64) {
        warn!(
            generation = self.generation,
            latest,
            kind = %self.kind,
            model = %self.model,
            "Submission superseded, discarding response"
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            generation = self.generation,
            kind = %self.kind,
            model = %self.model,
            "Submission completed: {}", message
        );
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Create a tracing span for this submission.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "submission",
            generation = self.generation,
            kind = %self.kind,
            model = %self.model
        )
    }
}
