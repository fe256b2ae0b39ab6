// Detection engine bring-up
//
// A real backend would load model weights and pick a GPU backend here.
// The placeholder just waits a bit and says it's ready.

use crate::error::{Result, TryOnError};
use async_trait::async_trait;
use std::time::Duration;

/// One-time setup for whatever runs the detectors
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    fn name(&self) -> &'static str;

    async fn initialize(&self) -> Result<()>;
}

pub struct PlaceholderEngine {
    warmup: Duration,
    failure: Option<String>,
}

impl PlaceholderEngine {
    pub fn new(warmup: Duration) -> Self {
        Self {
            warmup,
            failure: None,
        }
    }

    /// Engine whose bring-up always fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            warmup: Duration::ZERO,
            failure: Some(reason.into()),
        }
    }
}

impl Default for PlaceholderEngine {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}

#[async_trait]
impl InferenceEngine for PlaceholderEngine {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    async fn initialize(&self) -> Result<()> {
        if !self.warmup.is_zero() {
            tokio::time::sleep(self.warmup).await;
        }

        match &self.failure {
            Some(reason) => Err(TryOnError::EngineInit(reason.clone())),
            None => Ok(()),
        }
    }
}
