//! Mapping local key names onto the remote store's naming rules.
//!
//! GitHub Actions secret names must match `[A-Z0-9_]+`, must not begin with
//! a digit, and must not use the vendor-reserved `GITHUB_` prefix. Local key
//! names are free-form, so distinct local keys can land on the same remote
//! name; [`map_secrets`] detects that before any network call.

use crate::types::MappedSecret;
use depvault_types::EncryptedSecret;
use std::collections::HashMap;

/// Vendor-reserved prefix remote names may not start with.
pub const RESERVED_PREFIX: &str = "GITHUB_";

/// Marker prepended to names that would land in the reserved namespace.
const RESERVED_MARKER: &str = "X_";

/// Substitute when the transformation consumes the whole input.
const EMPTY_PLACEHOLDER: &str = "SECRET";

/// Canonical remote name for a local key. Pure and deterministic; applying
/// it to an already-compliant name is a no-op.
pub fn remote_secret_name(key_name: &str) -> String {
    // Uppercase, then map everything outside [A-Z0-9_] to '_'.
    let mut mapped = String::with_capacity(key_name.len());
    for ch in key_name.chars() {
        let up = ch.to_ascii_uppercase();
        if matches!(up, 'A'..='Z' | '0'..='9' | '_') {
            mapped.push(up);
        } else {
            mapped.push('_');
        }
    }

    // Strip leading underscores and collapse runs.
    let mut out = String::with_capacity(mapped.len());
    for ch in mapped.trim_start_matches('_').chars() {
        if ch == '_' && out.ends_with('_') {
            continue;
        }
        out.push(ch);
    }

    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.starts_with(RESERVED_PREFIX) {
        out.insert_str(0, RESERVED_MARKER);
    }
    if out.is_empty() {
        out.push_str(EMPTY_PLACEHOLDER);
    }
    out
}

/// Resolves remote names for a batch, in input order.
///
/// The first secret to produce a given remote name owns it; every later
/// secret producing the same name is marked `conflict` with a reason naming
/// both local keys. Callers must exclude conflicted entries from the sync
/// set; the orchestrator never silently overwrites.
pub fn map_secrets(secrets: &[EncryptedSecret]) -> Vec<MappedSecret> {
    let mut seen: HashMap<String, String> = HashMap::new();

    secrets
        .iter()
        .map(|secret| {
            let remote_name = remote_secret_name(&secret.key_name);
            match seen.get(&remote_name) {
                Some(first) => MappedSecret {
                    id: secret.id,
                    key_name: secret.key_name.clone(),
                    remote_name: remote_name.clone(),
                    conflict: true,
                    conflict_reason: Some(format!(
                        "`{}` and `{}` both map to {remote_name}",
                        first, secret.key_name
                    )),
                },
                None => {
                    seen.insert(remote_name.clone(), secret.key_name.clone());
                    MappedSecret {
                        id: secret.id,
                        key_name: secret.key_name.clone(),
                        remote_name,
                        conflict: false,
                        conflict_reason: None,
                    }
                }
            }
        })
        .collect()
}
