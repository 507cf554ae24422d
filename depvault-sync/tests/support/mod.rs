//! Shared test doubles for orchestrator and auto-sync tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crypto_box::SecretKey;
use depvault_crypto::{cipher, MasterKey};
use depvault_sync::api_client::SecretsApi;
use depvault_sync::error::{SyncError, SyncResult};
use depvault_sync::types::{PutSecret, RemoteSecretMeta, RepoPublicKey};
use depvault_types::{EncryptedSecret, Environment, ProjectId, RepoSlug};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Remote store double: hands out a real keypair's public key and records
/// writes, so tests can unseal what the orchestrator actually sent.
#[derive(Clone, Default)]
pub struct FakeRemote {
    pub key_id: String,
    pub public_key_b64: String,
    pub fail_public_key: bool,
    pub reject_auth: bool,
    /// Names whose upsert returns a 409-style conflict.
    pub conflict_names: HashSet<String>,
    /// Names whose upsert returns a transient server error.
    pub fail_names: HashSet<String>,
    /// Names whose upsert reports an expired credential (mid-pass 401).
    pub auth_fail_names: HashSet<String>,
    pub puts: Arc<Mutex<Vec<(String, PutSecret)>>>,
    pub deletes: Arc<Mutex<Vec<String>>>,
}

impl FakeRemote {
    /// Creates a fake remote plus the private key that can open its sealed
    /// secrets.
    pub fn new() -> (Self, SecretKey) {
        let sk = SecretKey::generate(&mut crypto_box::aead::OsRng);
        let remote = Self {
            key_id: "key-1".to_string(),
            public_key_b64: BASE64.encode(sk.public_key().as_bytes()),
            ..Self::default()
        };
        (remote, sk)
    }

    pub fn recorded_puts(&self) -> Vec<(String, PutSecret)> {
        self.puts.lock().unwrap().clone()
    }

    pub fn recorded_deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

impl SecretsApi for FakeRemote {
    async fn get_public_key(&self, _repo: &RepoSlug) -> SyncResult<RepoPublicKey> {
        if self.reject_auth {
            return Err(SyncError::CredentialExpired);
        }
        if self.fail_public_key {
            return Err(SyncError::RemoteApi("503: service unavailable".to_string()));
        }
        Ok(RepoPublicKey {
            key_id: self.key_id.clone(),
            key: self.public_key_b64.clone(),
        })
    }

    async fn list_secrets(&self, _repo: &RepoSlug) -> SyncResult<Vec<RemoteSecretMeta>> {
        Ok(Vec::new())
    }

    async fn put_secret(&self, _repo: &RepoSlug, name: &str, body: &PutSecret) -> SyncResult<()> {
        if self.auth_fail_names.contains(name) {
            return Err(SyncError::CredentialExpired);
        }
        if self.conflict_names.contains(name) {
            return Err(SyncError::RemoteConflict(format!("{name} modified elsewhere")));
        }
        if self.fail_names.contains(name) {
            return Err(SyncError::RemoteApi("500: internal server error".to_string()));
        }
        self.puts
            .lock()
            .unwrap()
            .push((name.to_string(), body.clone()));
        Ok(())
    }

    async fn delete_secret(&self, _repo: &RepoSlug, name: &str) -> SyncResult<()> {
        self.deletes.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

pub fn master_key() -> MasterKey {
    MasterKey::from_bytes([7u8; 32])
}

/// A stored secret whose ciphertext round-trips under [`master_key`].
pub fn stored_secret(
    project: ProjectId,
    environment: Environment,
    key_name: &str,
    value: &str,
) -> EncryptedSecret {
    let ciphertext = cipher::encrypt(&master_key(), value).unwrap();
    EncryptedSecret::new(project, environment, key_name, ciphertext)
}
