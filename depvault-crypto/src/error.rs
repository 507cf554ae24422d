//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors from the at-rest cipher and the sealed-box encoder.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Tag verification or unpacking failed: tampering, corruption, or the
    /// wrong key. Callers must treat this as a hard stop, not a retry.
    #[error("invalid ciphertext (tampered, corrupted, or wrong key)")]
    InvalidCiphertext,

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid base64 encoding: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
}
