//! Canned [`FeatureExtractor`] for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::extractor::FeatureExtractor;
use crate::decompose::error::DecomposeError;

#[derive(Debug, Clone)]
enum Behavior {
    Reply(String),
    Fail(String),
    Hang(Duration),
}

/// Extractor that returns a fixed reply, fails, or stalls.
#[derive(Debug)]
pub struct MockExtractor {
    behavior: Behavior,
    calls: AtomicUsize,
    last_user: Mutex<Option<String>>,
}

impl MockExtractor {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::with(Behavior::Reply(reply.into()))
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with(Behavior::Fail(reason.into()))
    }

    /// Sleeps for `delay` before replying with an empty array.
    pub fn hanging(delay: Duration) -> Self {
        Self::with(Behavior::Hang(delay))
    }

    fn with(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_user: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_user_message(&self) -> Option<String> {
        self.last_user.lock().clone()
    }
}

#[async_trait]
impl FeatureExtractor for MockExtractor {
    async fn extract(&self, _system: &str, user: &str) -> Result<String, DecomposeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_user.lock() = Some(user.to_string());

        match &self.behavior {
            Behavior::Reply(reply) => Ok(reply.clone()),
            Behavior::Fail(reason) => Err(DecomposeError::Provider(reason.clone())),
            Behavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("[]".to_string())
            }
        }
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
