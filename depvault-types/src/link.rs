//! Project-to-repository links.

use crate::{Environment, LinkId, ProjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Repository coordinates in `owner/repo` form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Error)]
#[error("invalid repository slug (expected owner/repo): {0}")]
pub struct ParseRepoSlugError(String);

impl std::str::FromStr for RepoSlug {
    type Err = ParseRepoSlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(RepoSlug::new(owner, repo))
            }
            _ => Err(ParseRepoSlugError(s.to_string())),
        }
    }
}

/// Connects a project to a repository's secret store.
///
/// Created by the onboarding flow; the sync core only reads it and stamps
/// `last_synced_at` after a background pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepoLink {
    pub id: LinkId,
    pub project_id: ProjectId,
    pub repo: RepoSlug,
    /// When true, local secret writes in `sync_environment` trigger a
    /// background sync pass against this repository.
    pub auto_sync_enabled: bool,
    pub sync_environment: Environment,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl RepoLink {
    pub fn new(project_id: ProjectId, repo: RepoSlug, sync_environment: Environment) -> Self {
        Self {
            id: LinkId::new(),
            project_id,
            repo,
            auto_sync_enabled: false,
            sync_environment,
            last_synced_at: None,
        }
    }

    pub fn with_auto_sync(mut self) -> Self {
        self.auto_sync_enabled = true;
        self
    }
}
