use std::env;
use std::time::Duration;

use crate::adapter::SavePolicy;

/// Session store configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Seed for the first episode's bag
    pub seed: u32,
    /// Capacity of the intent queue shared by dispatchers and the gravity timer
    pub max_pending_intents: usize,
    pub save_policy: SavePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            max_pending_intents: 64,
            save_policy: SavePolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from a variable lookup; unset or unparseable values keep their defaults.
    ///
    /// - `STACKFALL_SEED`
    /// - `STACKFALL_MAX_PENDING`
    /// - `STACKFALL_SAVE_ATTEMPTS`
    /// - `STACKFALL_SAVE_BACKOFF_MS`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        let seed = parsed("STACKFALL_SEED")
            .map(|s| s as u32)
            .unwrap_or(defaults.seed);
        let max_pending_intents = parsed("STACKFALL_MAX_PENDING")
            .map(|n| (n as usize).max(1))
            .unwrap_or(defaults.max_pending_intents);
        let max_attempts = parsed("STACKFALL_SAVE_ATTEMPTS")
            .map(|n| (n as u32).max(1))
            .unwrap_or(defaults.save_policy.max_attempts);
        let initial_backoff = parsed("STACKFALL_SAVE_BACKOFF_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.save_policy.initial_backoff);

        Self {
            seed,
            max_pending_intents,
            save_policy: SavePolicy {
                max_attempts,
                initial_backoff,
            },
        }
    }
}
