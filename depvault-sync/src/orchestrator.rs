//! Sync orchestrator: drives one sync pass against one repository.
//!
//! A pass fetches the repository's sealed-box public key once, then walks
//! the selected secrets sequentially: decrypt at rest, seal for the
//! repository, upsert remotely. Per-secret failures are recorded in the
//! report and the pass continues; only credential rejection and public-key
//! fetch failure abort the whole pass. Remote calls stay sequential: the
//! repository key is fetched once per pass and the remote store rate-limits
//! per namespace.

use crate::api_client::SecretsApi;
use crate::audit::{AuditSink, SyncAuditRecord};
use crate::error::{SyncError, SyncResult};
use crate::names;
use crate::store::{LinkStore, SecretStore};
use crate::types::{MappedSecret, PutSecret, RepoPublicKey, SyncOutcome, SyncReport, SyncTrigger};
use chrono::Utc;
use depvault_crypto::{cipher, sealed, MasterKey};
use depvault_types::{EncryptedSecret, Environment, ProjectId, RepoLink, RepoSlug, SecretId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Coordinates the cipher, the name mapper and the remote store client.
///
/// Holds everything it needs explicitly (remote client, master key, stores,
/// audit sink) so tests can assemble one around fakes.
pub struct SyncOrchestrator<C: SecretsApi> {
    api: C,
    master_key: MasterKey,
    secrets: Arc<dyn SecretStore>,
    links: Arc<dyn LinkStore>,
    audit: Arc<dyn AuditSink>,
}

impl<C: SecretsApi> SyncOrchestrator<C> {
    pub fn new(
        api: C,
        master_key: MasterKey,
        secrets: Arc<dyn SecretStore>,
        links: Arc<dyn LinkStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            api,
            master_key,
            secrets,
            links,
            audit,
        }
    }

    /// Resolves remote names for a project environment so an interactive
    /// caller can review conflicts before selecting what to sync.
    pub fn preview(
        &self,
        project: &ProjectId,
        environment: Environment,
    ) -> SyncResult<Vec<MappedSecret>> {
        let secrets = self.secrets.secrets_for(project, environment)?;
        Ok(names::map_secrets(&secrets))
    }

    /// Interactive path: syncs exactly the caller's selection, nothing more.
    ///
    /// Selections are expected to be conflict-free (reviewed via
    /// [`preview`](Self::preview)); any collision that slipped through is
    /// recorded as a failed outcome without touching the remote store.
    pub async fn sync_selected(
        &self,
        repo: &RepoSlug,
        selection: &[SecretId],
    ) -> SyncResult<SyncReport> {
        let mut secrets = Vec::with_capacity(selection.len());
        for id in selection {
            match self.secrets.get(id)? {
                Some(secret) => secrets.push(secret),
                None => return Err(SyncError::NotFound(format!("local secret {id}"))),
            }
        }
        let report = self.run_pass(repo, secrets).await?;
        info!(
            repo = %repo,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "interactive sync pass complete"
        );
        Ok(report)
    }

    /// Background path: syncs the link's environment, stamps
    /// `last_synced_at`, and writes one audit record for the pass.
    ///
    /// Only `is_secret` entries are mirrored; plain configuration values
    /// stay local. Mapper conflicts are excluded and reported as failures.
    pub async fn sync_link(&self, link: &RepoLink) -> SyncResult<SyncReport> {
        let eligible: Vec<_> = self
            .secrets
            .secrets_for(&link.project_id, link.sync_environment)?
            .into_iter()
            .filter(|s| s.is_secret)
            .collect();

        match self.run_pass(&link.repo, eligible).await {
            Ok(report) => {
                self.links.touch_synced(&link.id, Utc::now())?;
                self.audit.record(SyncAuditRecord::from_report(
                    &report,
                    link.sync_environment,
                    SyncTrigger::AutoSync,
                ));
                Ok(report)
            }
            Err(e) => {
                self.audit.record(SyncAuditRecord::aborted(
                    &link.repo,
                    link.sync_environment,
                    SyncTrigger::AutoSync,
                    e.to_string(),
                ));
                Err(e)
            }
        }
    }

    /// Removes a single remote secret. Not batchable in this design; called
    /// once per user-initiated removal.
    pub async fn delete_remote(&self, repo: &RepoSlug, remote_name: &str) -> SyncResult<()> {
        self.api.delete_secret(repo, remote_name).await?;
        info!(repo = %repo, secret = remote_name, "deleted remote secret");
        Ok(())
    }

    /// One pass: single public-key fetch, then sequential per-secret
    /// decrypt / seal / upsert with independent-failure semantics.
    async fn run_pass(
        &self,
        repo: &RepoSlug,
        secrets: Vec<EncryptedSecret>,
    ) -> SyncResult<SyncReport> {
        let mapped = names::map_secrets(&secrets);

        // One round trip; failure here aborts before any upsert is attempted.
        let key = self.api.get_public_key(repo).await?;
        debug!(repo = %repo, key_id = %key.key_id, "fetched repository public key");

        let mut outcomes = Vec::with_capacity(mapped.len());
        for (secret, mapping) in secrets.iter().zip(&mapped) {
            if mapping.conflict {
                let reason = mapping
                    .conflict_reason
                    .clone()
                    .unwrap_or_else(|| "remote name collision".to_string());
                outcomes.push(SyncOutcome::failed(
                    &mapping.remote_name,
                    SyncError::Collision(reason).to_string(),
                ));
                continue;
            }

            match self.push_one(repo, secret, &mapping.remote_name, &key).await {
                Ok(()) => outcomes.push(SyncOutcome::ok(&mapping.remote_name)),
                Err(e) if e.is_namespace_fatal() => return Err(e),
                Err(e) => {
                    warn!(
                        repo = %repo,
                        secret = %mapping.remote_name,
                        error = %e,
                        "secret upsert failed"
                    );
                    outcomes.push(SyncOutcome::failed(&mapping.remote_name, e.to_string()));
                }
            }
        }

        Ok(SyncReport {
            repo: repo.clone(),
            outcomes,
        })
    }

    /// Decrypts, seals and upserts a single secret. The plaintext exists
    /// only inside this call and is zeroized before the upsert completes.
    async fn push_one(
        &self,
        repo: &RepoSlug,
        secret: &EncryptedSecret,
        remote_name: &str,
        key: &RepoPublicKey,
    ) -> SyncResult<()> {
        let plaintext = cipher::decrypt(&self.master_key, &secret.ciphertext)
            .map_err(|e| SyncError::Decryption(e.to_string()))?;
        let encrypted_value = sealed::seal_base64(&plaintext, &key.key)?;
        drop(plaintext);

        self.api
            .put_secret(
                repo,
                remote_name,
                &PutSecret {
                    encrypted_value,
                    key_id: key.key_id.clone(),
                },
            )
            .await
    }
}
