//! Shared types for secret sync operations.

use chrono::{DateTime, Utc};
use depvault_types::{Environment, ProjectId, RepoSlug, SecretId};
use serde::{Deserialize, Serialize};

/// A repository's current sealed-box public key.
///
/// Fetched once per sync pass and never cached across passes; the remote
/// store may rotate it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepoPublicKey {
    pub key_id: String,
    /// Base64-encoded Curve25519 public key.
    pub key: String,
}

/// Remote secret metadata. The remote API returns names and timestamps only;
/// values are write-only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteSecretMeta {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of the remote upsert call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PutSecret {
    /// Sealed-box ciphertext, base64-encoded.
    pub encrypted_value: String,
    /// The key id the value was sealed against.
    pub key_id: String,
}

/// A local secret resolved to its remote name. Computed fresh for every
/// pass from the current local set; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappedSecret {
    pub id: SecretId,
    /// The local name as stored.
    pub key_name: String,
    /// The name the secret would take in the remote store.
    pub remote_name: String,
    /// True when an earlier secret in the batch already claimed
    /// `remote_name`.
    pub conflict: bool,
    pub conflict_reason: Option<String>,
}

/// Per-secret result of a sync pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub remote_name: String,
    pub success: bool,
    pub error: Option<String>,
}

impl SyncOutcome {
    pub fn ok(remote_name: impl Into<String>) -> Self {
        Self {
            remote_name: remote_name.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(remote_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            remote_name: remote_name.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregated result of one sync pass against one repository.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncReport {
    pub repo: RepoSlug,
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// (remote name, error message) for every failed secret.
    pub fn failures(&self) -> Vec<(String, String)> {
        self.outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| {
                (
                    o.remote_name.clone(),
                    o.error.clone().unwrap_or_default(),
                )
            })
            .collect()
    }
}

/// A local secret write; drives auto-sync fan-out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SecretChange {
    pub project_id: ProjectId,
    pub environment: Environment,
}

/// What started a sync pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    /// A user reviewed conflicts and selected secrets to push.
    Interactive,
    /// A local write fanned out to auto-sync-enabled repo links.
    AutoSync,
}
