//! Audit sink for sync passes.
//!
//! Background passes have no UI, so their outcome is observable only here:
//! one record per pass, including which secrets failed and why.

use crate::types::{SyncReport, SyncTrigger};
use chrono::{DateTime, Utc};
use depvault_types::{Environment, RepoSlug};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::info;

/// Summary of one sync pass against one repository.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncAuditRecord {
    pub repo: RepoSlug,
    pub environment: Environment,
    pub trigger: SyncTrigger,
    pub attempted: usize,
    pub succeeded: usize,
    /// (remote name, error message) for every failed secret.
    pub failures: Vec<(String, String)>,
    /// Set when the pass aborted before any upsert (public key or credential
    /// failure); per-secret fields are empty in that case.
    pub aborted: Option<String>,
    pub at: DateTime<Utc>,
}

impl SyncAuditRecord {
    pub fn from_report(
        report: &SyncReport,
        environment: Environment,
        trigger: SyncTrigger,
    ) -> Self {
        Self {
            repo: report.repo.clone(),
            environment,
            trigger,
            attempted: report.outcomes.len(),
            succeeded: report.succeeded(),
            failures: report.failures(),
            aborted: None,
            at: Utc::now(),
        }
    }

    pub fn aborted(
        repo: &RepoSlug,
        environment: Environment,
        trigger: SyncTrigger,
        error: impl Into<String>,
    ) -> Self {
        Self {
            repo: repo.clone(),
            environment,
            trigger,
            attempted: 0,
            succeeded: 0,
            failures: Vec::new(),
            aborted: Some(error.into()),
            at: Utc::now(),
        }
    }
}

/// Where sync-pass summaries go. Recording must never fail the pass.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: SyncAuditRecord);
}

/// Emits audit records as structured log lines.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: SyncAuditRecord) {
        let failures = serde_json::to_string(&record.failures).unwrap_or_default();
        info!(
            repo = %record.repo,
            environment = %record.environment,
            trigger = ?record.trigger,
            attempted = record.attempted,
            succeeded = record.succeeded,
            failures = %failures,
            aborted = record.aborted.as_deref().unwrap_or(""),
            "secret sync pass"
        );
    }
}

/// Collects audit records in memory, for tests and small deployments.
#[derive(Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<SyncAuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<SyncAuditRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(_) => Vec::new(),
        }
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: SyncAuditRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}
