//! Boundary traits for the application's persistence layer.
//!
//! The dashboard owns its database; the sync core needs only two narrow
//! views of it: encrypted secrets by scope and repo links by project. The
//! in-memory implementations back the tests and make the core usable
//! without a database.

use crate::error::{SyncError, SyncResult};
use chrono::{DateTime, Utc};
use depvault_types::{EncryptedSecret, Environment, LinkId, ProjectId, RepoLink, SecretId};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Read access to locally stored encrypted secrets.
pub trait SecretStore: Send + Sync {
    /// All secrets for a project in one environment, in stable insertion
    /// order.
    fn secrets_for(
        &self,
        project: &ProjectId,
        environment: Environment,
    ) -> SyncResult<Vec<EncryptedSecret>>;

    /// Single secret lookup.
    fn get(&self, id: &SecretId) -> SyncResult<Option<EncryptedSecret>>;
}

/// Access to project-repository links.
pub trait LinkStore: Send + Sync {
    /// Links with auto-sync enabled for this project and environment.
    fn auto_sync_links(
        &self,
        project: &ProjectId,
        environment: Environment,
    ) -> SyncResult<Vec<RepoLink>>;

    /// Stamps the link's last successful sync time.
    fn touch_synced(&self, link: &LinkId, at: DateTime<Utc>) -> SyncResult<()>;
}

/// In-memory secret store.
#[derive(Default)]
pub struct MemorySecretStore {
    inner: RwLock<Vec<EncryptedSecret>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, secret: EncryptedSecret) -> SyncResult<()> {
        self.write()?.push(secret);
        Ok(())
    }

    pub fn remove(&self, id: &SecretId) -> SyncResult<()> {
        self.write()?.retain(|s| s.id != *id);
        Ok(())
    }

    fn read(&self) -> SyncResult<RwLockReadGuard<'_, Vec<EncryptedSecret>>> {
        self.inner
            .read()
            .map_err(|_| SyncError::Store("secret store lock poisoned".to_string()))
    }

    fn write(&self) -> SyncResult<RwLockWriteGuard<'_, Vec<EncryptedSecret>>> {
        self.inner
            .write()
            .map_err(|_| SyncError::Store("secret store lock poisoned".to_string()))
    }
}

impl SecretStore for MemorySecretStore {
    fn secrets_for(
        &self,
        project: &ProjectId,
        environment: Environment,
    ) -> SyncResult<Vec<EncryptedSecret>> {
        Ok(self
            .read()?
            .iter()
            .filter(|s| s.project_id == *project && s.environment == environment)
            .cloned()
            .collect())
    }

    fn get(&self, id: &SecretId) -> SyncResult<Option<EncryptedSecret>> {
        Ok(self.read()?.iter().find(|s| s.id == *id).cloned())
    }
}

/// In-memory link store.
#[derive(Default)]
pub struct MemoryLinkStore {
    inner: RwLock<Vec<RepoLink>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, link: RepoLink) -> SyncResult<()> {
        self.write()?.push(link);
        Ok(())
    }

    pub fn get(&self, id: &LinkId) -> SyncResult<Option<RepoLink>> {
        Ok(self.read()?.iter().find(|l| l.id == *id).cloned())
    }

    fn read(&self) -> SyncResult<RwLockReadGuard<'_, Vec<RepoLink>>> {
        self.inner
            .read()
            .map_err(|_| SyncError::Store("link store lock poisoned".to_string()))
    }

    fn write(&self) -> SyncResult<RwLockWriteGuard<'_, Vec<RepoLink>>> {
        self.inner
            .write()
            .map_err(|_| SyncError::Store("link store lock poisoned".to_string()))
    }
}

impl LinkStore for MemoryLinkStore {
    fn auto_sync_links(
        &self,
        project: &ProjectId,
        environment: Environment,
    ) -> SyncResult<Vec<RepoLink>> {
        Ok(self
            .read()?
            .iter()
            .filter(|l| {
                l.project_id == *project
                    && l.auto_sync_enabled
                    && l.sync_environment == environment
            })
            .cloned()
            .collect())
    }

    fn touch_synced(&self, link: &LinkId, at: DateTime<Utc>) -> SyncResult<()> {
        let mut links = self.write()?;
        match links.iter_mut().find(|l| l.id == *link) {
            Some(l) => {
                l.last_synced_at = Some(at);
                Ok(())
            }
            None => Err(SyncError::Store(format!("unknown repo link: {link}"))),
        }
    }
}
