//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the registry loader, refresher, and query engine.
///
/// Every field has a default matching the production constants; hosts can
/// deserialize a partial config and rely on `#[serde(default)]` for the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Document-store collection holding the clan documents.
    pub collection: String,
    /// Parent path of the collection within the store.
    pub parent_path: String,
    /// Number of document ids per bulk read.
    pub batch_size: usize,
    /// Pause between successive refresh batches, in milliseconds.
    pub batch_pause_ms: u64,
    /// Period of the background refresh, in milliseconds.
    pub refresh_interval_ms: u64,
    /// Upper bound accepted for the `maxResult` query parameter.
    pub max_result_ceiling: usize,
    /// Draw budget for the rejection-sampling search mode, counting both
    /// accepted and rejected draws.
    pub sample_attempt_budget: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            collection: "Clans".to_string(),
            parent_path: "/".to_string(),
            batch_size: 1000,
            batch_pause_ms: 100,
            refresh_interval_ms: 1000 * 3600,
            max_result_ceiling: 500_000,
            sample_attempt_budget: 100_000,
        }
    }
}
