//! HTTP client for the GitHub Actions secrets API.
//!
//! Covers the four operations the sync core consumes: list secret names,
//! fetch the repository public key, upsert an encrypted secret, delete a
//! secret. Authenticates with a bearer token scoped to the repository;
//! 401/403 responses surface as [`SyncError::CredentialExpired`] so the
//! caller can prompt a reconnect instead of showing a generic failure.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::types::{PutSecret, RemoteSecretMeta, RepoPublicKey};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use depvault_crypto::PUBLIC_KEY_SIZE;
use depvault_types::RepoSlug;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const ACCEPT_HEADER: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";

/// The remote secret-store operations the orchestrator consumes.
///
/// Implemented by [`GithubSecretsClient`] for production and by in-memory
/// fakes in tests; the orchestrator takes an implementation at construction
/// so no module-level client state exists.
pub trait SecretsApi: Send + Sync {
    /// Current sealed-box public key for the repository.
    fn get_public_key(
        &self,
        repo: &RepoSlug,
    ) -> impl Future<Output = SyncResult<RepoPublicKey>> + Send;

    /// Secret names and timestamps; the remote store never returns values.
    fn list_secrets(
        &self,
        repo: &RepoSlug,
    ) -> impl Future<Output = SyncResult<Vec<RemoteSecretMeta>>> + Send;

    /// Idempotent upsert by name.
    fn put_secret(
        &self,
        repo: &RepoSlug,
        name: &str,
        body: &PutSecret,
    ) -> impl Future<Output = SyncResult<()>> + Send;

    /// Removes a single secret by name.
    fn delete_secret(
        &self,
        repo: &RepoSlug,
        name: &str,
    ) -> impl Future<Output = SyncResult<()>> + Send;
}

/// Client for the GitHub Actions secrets endpoints.
pub struct GithubSecretsClient {
    client: Client,
    config: SyncConfig,
    token: String,
}

impl GithubSecretsClient {
    pub fn new(config: SyncConfig, token: impl Into<String>) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            config,
            token: token.into(),
        })
    }

    fn secrets_url(&self, repo: &RepoSlug) -> String {
        format!(
            "{}/repos/{}/{}/actions/secrets",
            self.config.api_base_url, repo.owner, repo.repo
        )
    }

    fn request(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .header(API_VERSION_HEADER, API_VERSION)
    }

    /// Maps the remote store's status codes onto the sync error taxonomy.
    async fn check(resp: Response) -> SyncResult<Response> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SyncError::CredentialExpired);
        }
        if status == StatusCode::NOT_FOUND {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::NotFound(body));
        }
        if status == StatusCode::CONFLICT {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::RemoteConflict(body));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::RemoteApi(format!("{status}: {body}")));
        }
        Ok(resp)
    }
}

impl SecretsApi for GithubSecretsClient {
    async fn get_public_key(&self, repo: &RepoSlug) -> SyncResult<RepoPublicKey> {
        let url = format!("{}/public-key", self.secrets_url(repo));
        let resp = self.request(Method::GET, url).send().await?;
        let key: RepoPublicKey = Self::check(resp).await?.json().await?;

        // Validate at the boundary so a garbled key aborts the pass here
        // instead of failing every secret downstream.
        let raw = BASE64
            .decode(&key.key)
            .map_err(|e| SyncError::RemoteApi(format!("invalid public key encoding: {e}")))?;
        if raw.len() != PUBLIC_KEY_SIZE {
            return Err(SyncError::RemoteApi(format!(
                "invalid public key length: expected {PUBLIC_KEY_SIZE}, got {}",
                raw.len()
            )));
        }

        debug!("fetched public key {} for {repo}", key.key_id);
        Ok(key)
    }

    async fn list_secrets(&self, repo: &RepoSlug) -> SyncResult<Vec<RemoteSecretMeta>> {
        #[derive(Deserialize)]
        struct Resp {
            secrets: Vec<RemoteSecretMeta>,
        }

        let resp = self.request(Method::GET, self.secrets_url(repo)).send().await?;
        let data: Resp = Self::check(resp).await?.json().await?;
        Ok(data.secrets)
    }

    async fn put_secret(&self, repo: &RepoSlug, name: &str, body: &PutSecret) -> SyncResult<()> {
        let url = format!("{}/{name}", self.secrets_url(repo));
        let resp = self.request(Method::PUT, url).json(body).send().await?;
        Self::check(resp).await?;
        debug!("upserted secret {name} in {repo}");
        Ok(())
    }

    async fn delete_secret(&self, repo: &RepoSlug, name: &str) -> SyncResult<()> {
        let url = format!("{}/{name}", self.secrets_url(repo));
        let resp = self.request(Method::DELETE, url).send().await?;
        Self::check(resp).await?;
        debug!("deleted secret {name} from {repo}");
        Ok(())
    }
}
