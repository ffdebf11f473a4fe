//! Bounded polling for asynchronously rendered video artifacts.

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use tracing::{debug, info, warn};

use odet_client::{ClientResult, InferenceClient};
use odet_models::VideoStatus;

use crate::config::PollerConfig;
use crate::error::{SessionError, SessionResult};

/// Counter of status queries, labelled by outcome (`ready`, `pending`, `error`).
pub const VIDEO_POLL_ATTEMPTS_TOTAL: &str = "odet_video_poll_attempts_total";

/// Anything that can report whether a rendered video is ready.
#[async_trait]
pub trait VideoStatusSource: Send + Sync {
    async fn video_status(&self, id: &str) -> ClientResult<VideoStatus>;
}

#[async_trait]
impl VideoStatusSource for InferenceClient {
    async fn video_status(&self, id: &str) -> ClientResult<VideoStatus> {
        InferenceClient::video_status(self, id).await
    }
}

/// Polls a [`VideoStatusSource`] with a fixed interval and attempt budget.
#[derive(Clone)]
pub struct VideoReadinessPoller {
    source: Arc<dyn VideoStatusSource>,
    config: PollerConfig,
}

impl VideoReadinessPoller {
    pub fn new(source: Arc<dyn VideoStatusSource>, config: PollerConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Wait until `id` reports ready.
    ///
    /// Returns the number of status queries made. Failed queries count
    /// against the budget but are never escalated.
    pub async fn wait_until_ready(&self, id: &str) -> SessionResult<u32> {
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.source.video_status(id).await {
                Ok(status) if status.ready => {
                    counter!(VIDEO_POLL_ATTEMPTS_TOTAL, "outcome" => "ready").increment(1);
                    info!(video_id = %id, attempt, "Video ready");
                    return Ok(attempt);
                }
                Ok(_) => {
                    counter!(VIDEO_POLL_ATTEMPTS_TOTAL, "outcome" => "pending").increment(1);
                    debug!(video_id = %id, attempt, "Video not ready yet");
                }
                Err(e) => {
                    counter!(VIDEO_POLL_ATTEMPTS_TOTAL, "outcome" => "error").increment(1);
                    warn!(
                        video_id = %id,
                        attempt,
                        error_kind = e.kind(),
                        "Failed to check video status: {}", e
                    );
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.config.interval).await;
            }
        }

        warn!(video_id = %id, attempts = max_attempts, "Video readiness polling timed out");
        Err(SessionError::PollTimeout {
            id: id.to_string(),
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odet_client::ClientError;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Replays scripted answers, then reports not ready forever.
    struct ScriptedSource {
        answers: Mutex<VecDeque<ClientResult<VideoStatus>>>,
        calls: AtomicU32,
    }

    impl ScriptedSource {
        fn new(answers: Vec<ClientResult<VideoStatus>>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.into()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VideoStatusSource for ScriptedSource {
        async fn video_status(&self, _id: &str) -> ClientResult<VideoStatus> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(status(false)))
        }
    }

    fn status(ready: bool) -> VideoStatus {
        VideoStatus {
            ready,
            filename: None,
            size: None,
        }
    }

    fn poller(source: Arc<ScriptedSource>) -> VideoReadinessPoller {
        VideoReadinessPoller::new(source, PollerConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_after_five_pending() {
        let mut answers: Vec<_> = (0..5).map(|_| Ok(status(false))).collect();
        answers.push(Ok(status(true)));
        let source = ScriptedSource::new(answers);

        let start = Instant::now();
        let attempts = poller(source.clone()).wait_until_ready("abc.mp4").await.unwrap();

        assert_eq!(attempts, 6);
        assert_eq!(source.calls(), 6);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(5), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(6), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_first_attempt_does_not_sleep() {
        let source = ScriptedSource::new(vec![Ok(status(true))]);

        let start = Instant::now();
        let attempts = poller(source.clone()).wait_until_ready("abc.mp4").await.unwrap();

        assert_eq!(attempts, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_budget() {
        let source = ScriptedSource::new(Vec::new());

        let err = poller(source.clone()).wait_until_ready("abc.mp4").await.unwrap_err();

        match err {
            SessionError::PollTimeout { id, attempts } => {
                assert_eq!(id, "abc.mp4");
                assert_eq!(attempts, 30);
            }
            other => panic!("expected PollTimeout, got {:?}", other),
        }
        assert_eq!(source.calls(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_queries_count_against_budget() {
        let answers = vec![
            Err(ClientError::network("connection reset")),
            Err(ClientError::ServerError(502)),
            Ok(status(true)),
        ];
        let source = ScriptedSource::new(answers);

        let attempts = poller(source.clone()).wait_until_ready("abc.mp4").await.unwrap();
        assert_eq!(attempts, 3);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_alone_time_out() {
        let answers = (0..3)
            .map(|_| Err(ClientError::Timeout(Duration::from_secs(30))))
            .collect();
        let source = ScriptedSource::new(answers);
        let config = PollerConfig {
            max_attempts: 3,
            interval: Duration::from_millis(10),
        };

        let err = VideoReadinessPoller::new(source.clone(), config)
            .wait_until_ready("abc.mp4")
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::PollTimeout { attempts: 3, .. }));
        assert_eq!(source.calls(), 3);
    }
}
