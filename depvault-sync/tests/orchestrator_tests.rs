//! Orchestrator pass semantics: single key fetch, sequential upserts,
//! per-secret failure isolation, namespace-level aborts.

mod support;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use depvault_sync::audit::MemoryAuditSink;
use depvault_sync::error::SyncError;
use depvault_sync::orchestrator::SyncOrchestrator;
use depvault_sync::store::{MemoryLinkStore, MemorySecretStore};
use depvault_sync::types::SyncTrigger;
use depvault_types::{EncryptedSecret, Environment, ProjectId, RepoLink, RepoSlug, SecretId};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use support::{master_key, stored_secret, FakeRemote};

struct Harness {
    remote: FakeRemote,
    secrets: Arc<MemorySecretStore>,
    links: Arc<MemoryLinkStore>,
    audit: Arc<MemoryAuditSink>,
    orchestrator: SyncOrchestrator<FakeRemote>,
}

fn harness(remote: FakeRemote) -> Harness {
    let secrets = Arc::new(MemorySecretStore::new());
    let links = Arc::new(MemoryLinkStore::new());
    let audit = Arc::new(MemoryAuditSink::new());
    let orchestrator = SyncOrchestrator::new(
        remote.clone(),
        master_key(),
        secrets.clone(),
        links.clone(),
        audit.clone(),
    );
    Harness {
        remote,
        secrets,
        links,
        audit,
        orchestrator,
    }
}

fn repo() -> RepoSlug {
    RepoSlug::new("acme", "web")
}

#[tokio::test]
async fn end_to_end_single_secret() {
    let (remote, recipient_sk) = FakeRemote::new();
    let h = harness(remote);

    let project = ProjectId::new();
    let secret = stored_secret(project, Environment::Production, "STRIPE_KEY", "sk_live_x");
    let id = secret.id;
    h.secrets.insert(secret).unwrap();

    let report = h.orchestrator.sync_selected(&repo(), &[id]).await.unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].remote_name, "STRIPE_KEY");
    assert!(report.outcomes[0].success);

    let puts = h.remote.recorded_puts();
    assert_eq!(puts.len(), 1, "exactly one upsert call");
    let (name, body) = &puts[0];
    assert_eq!(name, "STRIPE_KEY");
    assert_eq!(body.key_id, "key-1");

    // The uploaded value must open under the repository's real private key.
    let sealed = BASE64.decode(&body.encrypted_value).unwrap();
    let opened = recipient_sk.unseal(&sealed).unwrap();
    assert_eq!(opened, b"sk_live_x");
}

#[tokio::test]
async fn partial_failure_is_isolated_per_secret() {
    let (remote, _sk) = FakeRemote::new();
    let h = harness(remote);

    let project = ProjectId::new();
    let first = stored_secret(project, Environment::Production, "FIRST", "one");
    let broken = EncryptedSecret::new(
        project,
        Environment::Production,
        "BROKEN",
        "definitely-not-valid-ciphertext",
    );
    let third = stored_secret(project, Environment::Production, "THIRD", "three");
    let ids = [first.id, broken.id, third.id];
    for s in [first, broken, third] {
        h.secrets.insert(s).unwrap();
    }

    let report = h.orchestrator.sync_selected(&repo(), &ids).await.unwrap();

    assert_eq!(report.outcomes.len(), 3, "every secret gets a result");
    assert!(report.outcomes[0].success);
    assert!(!report.outcomes[1].success);
    assert!(report.outcomes[2].success, "third secret still attempted");

    let error = report.outcomes[1].error.as_ref().unwrap();
    assert!(
        error.contains("decryption failed"),
        "failure carries the decryption cause: {error}"
    );

    let names: Vec<_> = h
        .remote
        .recorded_puts()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["FIRST", "THIRD"]);
}

#[tokio::test]
async fn public_key_fetch_failure_aborts_with_zero_upserts() {
    let (mut remote, _sk) = FakeRemote::new();
    remote.fail_public_key = true;
    let h = harness(remote);

    let project = ProjectId::new();
    let secret = stored_secret(project, Environment::Production, "KEY", "value");
    let id = secret.id;
    h.secrets.insert(secret).unwrap();

    let err = h.orchestrator.sync_selected(&repo(), &[id]).await.unwrap_err();
    assert!(matches!(err, SyncError::RemoteApi(_)));
    assert!(h.remote.recorded_puts().is_empty(), "no upsert attempted");
}

#[tokio::test]
async fn credential_rejection_is_distinct_and_fatal() {
    let (mut remote, _sk) = FakeRemote::new();
    remote.reject_auth = true;
    let h = harness(remote);

    let secret = stored_secret(ProjectId::new(), Environment::Production, "KEY", "v");
    let id = secret.id;
    h.secrets.insert(secret).unwrap();

    let err = h.orchestrator.sync_selected(&repo(), &[id]).await.unwrap_err();
    assert!(matches!(err, SyncError::CredentialExpired));
}

#[tokio::test]
async fn mid_pass_credential_expiry_aborts_remaining() {
    let (mut remote, _sk) = FakeRemote::new();
    remote.auth_fail_names.insert("SECOND".to_string());
    let h = harness(remote);

    let project = ProjectId::new();
    let a = stored_secret(project, Environment::Production, "FIRST", "1");
    let b = stored_secret(project, Environment::Production, "SECOND", "2");
    let c = stored_secret(project, Environment::Production, "THIRD", "3");
    let ids = [a.id, b.id, c.id];
    for s in [a, b, c] {
        h.secrets.insert(s).unwrap();
    }

    let err = h.orchestrator.sync_selected(&repo(), &ids).await.unwrap_err();
    assert!(matches!(err, SyncError::CredentialExpired));

    let names: Vec<_> = h
        .remote
        .recorded_puts()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["FIRST"], "pass stops at the credential failure");
}

#[tokio::test]
async fn colliding_selection_is_failed_not_overwritten() {
    let (remote, _sk) = FakeRemote::new();
    let h = harness(remote);

    let project = ProjectId::new();
    let a = stored_secret(project, Environment::Production, "api-key", "first");
    let b = stored_secret(project, Environment::Production, "API_KEY", "second");
    let ids = [a.id, b.id];
    for s in [a, b] {
        h.secrets.insert(s).unwrap();
    }

    let report = h.orchestrator.sync_selected(&repo(), &ids).await.unwrap();

    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes[0].success);
    assert!(!report.outcomes[1].success);
    let error = report.outcomes[1].error.as_ref().unwrap();
    assert!(error.contains("collision"), "reports the collision: {error}");

    assert_eq!(h.remote.recorded_puts().len(), 1, "loser is never upserted");
}

#[tokio::test]
async fn remote_conflict_is_per_secret() {
    let (mut remote, _sk) = FakeRemote::new();
    remote.conflict_names.insert("CONTESTED".to_string());
    let h = harness(remote);

    let project = ProjectId::new();
    let a = stored_secret(project, Environment::Production, "FIRST", "1");
    let b = stored_secret(project, Environment::Production, "CONTESTED", "2");
    let c = stored_secret(project, Environment::Production, "THIRD", "3");
    let ids = [a.id, b.id, c.id];
    for s in [a, b, c] {
        h.secrets.insert(s).unwrap();
    }

    let report = h.orchestrator.sync_selected(&repo(), &ids).await.unwrap();

    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    let error = report.outcomes[1].error.as_ref().unwrap();
    assert!(error.contains("modified elsewhere"), "surfaced as: {error}");
}

#[tokio::test]
async fn sync_selected_rejects_unknown_ids() {
    let (remote, _sk) = FakeRemote::new();
    let h = harness(remote);

    let err = h
        .orchestrator
        .sync_selected(&repo(), &[SecretId::new()])
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound(_)));
}

#[tokio::test]
async fn preview_reports_conflicts_for_review() {
    let (remote, _sk) = FakeRemote::new();
    let h = harness(remote);

    let project = ProjectId::new();
    for s in [
        stored_secret(project, Environment::Preview, "api-key", "1"),
        stored_secret(project, Environment::Preview, "API_KEY", "2"),
        stored_secret(project, Environment::Preview, "OTHER", "3"),
    ] {
        h.secrets.insert(s).unwrap();
    }

    let mapped = h.orchestrator.preview(&project, Environment::Preview).unwrap();
    assert_eq!(
        mapped.iter().map(|m| m.conflict).collect::<Vec<_>>(),
        vec![false, true, false]
    );
}

#[tokio::test]
async fn sync_link_stamps_link_and_writes_audit_record() {
    let (remote, _sk) = FakeRemote::new();
    let h = harness(remote);

    let project = ProjectId::new();
    h.secrets
        .insert(stored_secret(project, Environment::Production, "DB_URL", "postgres://"))
        .unwrap();
    h.secrets
        .insert(
            stored_secret(project, Environment::Production, "LOG_LEVEL", "debug")
                .plain_config(),
        )
        .unwrap();
    // Different environment; must not be picked up.
    h.secrets
        .insert(stored_secret(project, Environment::Preview, "PREVIEW_ONLY", "x"))
        .unwrap();

    let link = RepoLink::new(project, repo(), Environment::Production).with_auto_sync();
    let link_id = link.id;
    h.links.insert(link.clone()).unwrap();

    let report = h.orchestrator.sync_link(&link).await.unwrap();

    assert_eq!(report.outcomes.len(), 1, "plain config stays local");
    assert_eq!(report.outcomes[0].remote_name, "DB_URL");

    let stamped = h.links.get(&link_id).unwrap().unwrap();
    assert!(stamped.last_synced_at.is_some());

    let records = h.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].trigger, SyncTrigger::AutoSync);
    assert_eq!(records[0].environment, Environment::Production);
    assert_eq!(records[0].attempted, 1);
    assert_eq!(records[0].succeeded, 1);
    assert!(records[0].failures.is_empty());
}

#[tokio::test]
async fn sync_link_audits_failures_by_name() {
    let (mut remote, _sk) = FakeRemote::new();
    remote.fail_names.insert("FLAKY".to_string());
    let h = harness(remote);

    let project = ProjectId::new();
    h.secrets
        .insert(stored_secret(project, Environment::Production, "GOOD", "1"))
        .unwrap();
    h.secrets
        .insert(stored_secret(project, Environment::Production, "FLAKY", "2"))
        .unwrap();

    let link = RepoLink::new(project, repo(), Environment::Production).with_auto_sync();
    h.links.insert(link.clone()).unwrap();

    let report = h.orchestrator.sync_link(&link).await.unwrap();
    assert_eq!(report.failed(), 1);

    let records = h.audit.records();
    assert_eq!(records[0].failures.len(), 1);
    assert_eq!(records[0].failures[0].0, "FLAKY");
    assert!(records[0].failures[0].1.contains("500"));
}

#[tokio::test]
async fn aborted_sync_link_audits_and_leaves_link_unstamped() {
    let (mut remote, _sk) = FakeRemote::new();
    remote.fail_public_key = true;
    let h = harness(remote);

    let project = ProjectId::new();
    h.secrets
        .insert(stored_secret(project, Environment::Production, "KEY", "v"))
        .unwrap();

    let link = RepoLink::new(project, repo(), Environment::Production).with_auto_sync();
    let link_id = link.id;
    h.links.insert(link.clone()).unwrap();

    assert!(h.orchestrator.sync_link(&link).await.is_err());

    let stamped = h.links.get(&link_id).unwrap().unwrap();
    assert!(stamped.last_synced_at.is_none(), "aborted pass does not stamp");

    let records = h.audit.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].aborted.as_ref().unwrap().contains("503"));
}

#[tokio::test]
async fn delete_remote_issues_single_delete() {
    let (remote, _sk) = FakeRemote::new();
    let h = harness(remote);

    h.orchestrator
        .delete_remote(&repo(), "STRIPE_KEY")
        .await
        .unwrap();
    assert_eq!(h.remote.recorded_deletes(), vec!["STRIPE_KEY"]);
}
