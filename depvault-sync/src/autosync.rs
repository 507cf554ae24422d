//! Background auto-sync triggered by local secret writes.
//!
//! Write handlers submit a [`SecretChange`] through a bounded channel and
//! move on; a worker task fans each change out to the matching repo links
//! and runs one sync pass per link. Submission never blocks and never fails
//! the originating write; when the queue is full the notification is
//! dropped with a warning and the state is picked up by the next write.

use crate::api_client::SecretsApi;
use crate::orchestrator::SyncOrchestrator;
use crate::store::LinkStore;
use crate::types::SecretChange;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Submits change notifications to the auto-sync worker.
#[derive(Clone)]
pub struct AutoSyncHandle {
    tx: mpsc::Sender<SecretChange>,
}

impl AutoSyncHandle {
    /// Fire-and-forget notification from a secret create/update/delete.
    pub fn notify(&self, change: SecretChange) {
        if let Err(e) = self.tx.try_send(change) {
            warn!("auto-sync queue full or closed, dropping notification: {e}");
        }
    }
}

/// Drains change notifications and runs sync passes.
///
/// Spawn [`run`](Self::run) on the runtime; it exits once every handle is
/// dropped and the queue is drained. Pass failures are logged and audited,
/// never propagated back to the write path.
pub struct AutoSyncWorker<C: SecretsApi> {
    orchestrator: Arc<SyncOrchestrator<C>>,
    links: Arc<dyn LinkStore>,
    rx: mpsc::Receiver<SecretChange>,
}

/// Creates a handle/worker pair over a bounded queue.
pub fn auto_sync_channel<C: SecretsApi>(
    orchestrator: Arc<SyncOrchestrator<C>>,
    links: Arc<dyn LinkStore>,
    queue_depth: usize,
) -> (AutoSyncHandle, AutoSyncWorker<C>) {
    let (tx, rx) = mpsc::channel(queue_depth);
    (
        AutoSyncHandle { tx },
        AutoSyncWorker {
            orchestrator,
            links,
            rx,
        },
    )
}

impl<C: SecretsApi> AutoSyncWorker<C> {
    pub async fn run(mut self) {
        info!("auto-sync worker started");
        while let Some(change) = self.rx.recv().await {
            self.handle_change(change).await;
        }
        info!("auto-sync worker stopped");
    }

    async fn handle_change(&self, change: SecretChange) {
        let links = match self
            .links
            .auto_sync_links(&change.project_id, change.environment)
        {
            Ok(links) => links,
            Err(e) => {
                error!("auto-sync link lookup failed: {e}");
                return;
            }
        };
        if links.is_empty() {
            return;
        }

        // Passes for different links are independent; one failing repo must
        // not stop the others.
        for link in links {
            match self.orchestrator.sync_link(&link).await {
                Ok(report) => debug!(
                    repo = %link.repo,
                    succeeded = report.succeeded(),
                    failed = report.failed(),
                    "auto-sync pass complete"
                ),
                Err(e) => error!(repo = %link.repo, "auto-sync pass failed: {e}"),
            }
        }
    }
}
