//! Sync error types.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors from the secret sync core.
///
/// Namespace-level errors (credential rejection, public-key fetch failure)
/// abort a whole pass; everything else is captured per secret in the pass
/// outcomes and never raised.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Local ciphertext corrupt or master key mismatch. Per-secret.
    #[error("at-rest decryption failed: {0}")]
    Decryption(String),

    /// The remote store rejected our token (401/403). The caller UI offers a
    /// reconnect action for exactly this case, so it stays distinct.
    #[error("repository credential expired or revoked")]
    CredentialExpired,

    /// 409 on upsert: the secret was modified elsewhere; refresh and retry.
    #[error("remote secret modified elsewhere: {0}")]
    RemoteConflict(String),

    /// Any other non-success response from the remote store.
    #[error("remote API request failed: {0}")]
    RemoteApi(String),

    /// The remote store has no such secret or repository.
    #[error("not found: {0}")]
    NotFound(String),

    /// Two local keys map to the same remote name. Detected before any
    /// network call; the colliding entry is excluded, never overwritten.
    #[error("remote name collision: {0}")]
    Collision(String),

    /// The application's persistence layer failed.
    #[error("local store error: {0}")]
    Store(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] depvault_crypto::CryptoError),
}

impl SyncError {
    /// True for errors that invalidate the whole pass rather than a single
    /// secret.
    pub fn is_namespace_fatal(&self) -> bool {
        matches!(self, SyncError::CredentialExpired)
    }
}
