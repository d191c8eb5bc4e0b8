use thiserror::Error;

use crate::Millis;

/// How a new dispatch interacts with a request that is still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// Skip the new dispatch while a request is pending or settling.
    Mutex,
    /// Abort the outstanding request and issue the new one; newest text wins.
    #[default]
    CancelAndReplace,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("bucket_size must be greater than zero")]
    ZeroBucketSize,
    #[error("min_chars must be greater than zero")]
    ZeroMinChars,
    #[error("checkpoints must be strictly ascending (found {previous} before {next})")]
    UnsortedCheckpoints { previous: usize, next: usize },
}

/// Tuning for the localization trigger. Fixed per deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerConfig {
    /// Below this length no requests are made and bucket state resets.
    pub min_chars: usize,
    /// Lengths that trigger an immediate evaluation when crossed upwards.
    pub checkpoints: Vec<usize>,
    pub bucket_size: usize,
    /// Staleness after which a refresh is allowed without a structural trigger.
    pub cooldown_ms: Millis,
    /// Hard floor between two dispatches.
    pub min_call_interval_ms: Millis,
    pub debounce_ms: Millis,
    /// Mutex policy only: how long a completed request still counts as pending.
    pub settle_ms: Millis,
    /// Quiet period before the current draft is persisted.
    pub draft_save_ms: Millis,
    pub policy: DispatchPolicy,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            min_chars: 50,
            checkpoints: vec![50, 250],
            bucket_size: 125,
            cooldown_ms: 10_000,
            min_call_interval_ms: 1_500,
            debounce_ms: 1_200,
            settle_ms: 300,
            draft_save_ms: 500,
            policy: DispatchPolicy::CancelAndReplace,
        }
    }
}

impl TriggerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_size == 0 {
            return Err(ConfigError::ZeroBucketSize);
        }
        if self.min_chars == 0 {
            return Err(ConfigError::ZeroMinChars);
        }
        if let Some(pair) = self.checkpoints.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::UnsortedCheckpoints {
                previous: pair[0],
                next: pair[1],
            });
        }
        Ok(())
    }

    pub fn bucket_of(&self, length: usize) -> usize {
        length / self.bucket_size.max(1)
    }

    /// True if any checkpoint lies in `(previous, current]`.
    pub fn crossed_checkpoint(&self, previous: usize, current: usize) -> bool {
        self.checkpoints
            .iter()
            .any(|&checkpoint| previous < checkpoint && checkpoint <= current)
    }
}
