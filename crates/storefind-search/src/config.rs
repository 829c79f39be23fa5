//! Tunables for one [`StoreSearch`](crate::StoreSearch) instance.

use std::time::Duration;

use storefind_core::AppConfig;

/// Places adopted from an extended search are enriched this many at a time.
pub const ENRICH_BATCH_SIZE: usize = 5;
/// At most this many find-place lookups per extended search.
pub const FIND_PLACE_ATTEMPTS: usize = 5;
/// Concurrent detail lookups for an ordinary page.
pub const ENRICH_CONCURRENCY: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Annulus width used when the request does not carry `baseRadius`.
    pub base_radius_m: u32,
    /// Wait before re-issuing a continuation token that was not ready.
    pub token_retry_delay: Duration,
    /// Pause between extended-search enrichment batches.
    pub enrich_batch_pause: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_radius_m: 5000,
            token_retry_delay: Duration::from_millis(2000),
            enrich_batch_pause: Duration::from_millis(1000),
        }
    }
}

impl From<&AppConfig> for SearchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_radius_m: config.base_radius_m,
            token_retry_delay: Duration::from_millis(config.token_retry_delay_ms),
            enrich_batch_pause: Duration::from_millis(config.enrich_batch_pause_ms),
        }
    }
}
