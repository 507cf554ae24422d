//! Sync configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the secret sync core.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL for the GitHub REST API. Overridden in tests to point at a
    /// local mock server.
    pub api_base_url: String,

    /// User-Agent header; the GitHub API rejects requests without one.
    pub user_agent: String,

    /// Per-request timeout in seconds. A timeout is a per-secret failure,
    /// not a pass abort.
    pub request_timeout_secs: u64,

    /// Bound on queued auto-sync notifications. Excess notifications from
    /// write bursts are dropped with a warning and picked up by the next
    /// write.
    pub auto_sync_queue_depth: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            user_agent: "depvault-sync".to_string(),
            request_timeout_secs: 10,
            auto_sync_queue_depth: 64,
        }
    }
}
