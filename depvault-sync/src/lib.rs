//! GitHub secret synchronization core for depvault.
//!
//! Mirrors locally stored, at-rest-encrypted credentials into GitHub Actions
//! Secrets:
//! - remote-name mapping with collision detection
//! - sealed-box transport encryption against the repository public key
//! - sequential sync passes with per-secret failure isolation
//! - bounded background auto-sync triggered by local secret writes

pub mod api_client;
pub mod audit;
pub mod autosync;
pub mod config;
pub mod error;
pub mod names;
pub mod orchestrator;
pub mod store;
pub mod types;

pub use api_client::{GithubSecretsClient, SecretsApi};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use orchestrator::SyncOrchestrator;
pub use types::*;
