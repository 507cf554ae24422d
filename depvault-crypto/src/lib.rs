//! Encryption layer for depvault.
//!
//! Two orthogonal constructions:
//!
//! 1. **At-rest cipher**: XChaCha20-Poly1305 under a server-held master key,
//!    protecting credential values inside depvault's own database. Symmetric,
//!    randomized per call, round-trippable.
//! 2. **Sealed box**: libsodium-compatible anonymous public-key encryption
//!    used to push secrets to a repository's secret store. One-way: the
//!    repository can decrypt with its private key, depvault cannot.

pub mod cipher;
mod error;
pub mod sealed;

pub use cipher::{decrypt, encrypt, MasterKey, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use sealed::{seal, seal_base64, PUBLIC_KEY_SIZE};
