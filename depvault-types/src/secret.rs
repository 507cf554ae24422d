//! Stored credential records.

use crate::{Environment, ProjectId, SecretId, ServiceId};
use serde::{Deserialize, Serialize};

/// A persisted credential for one project and environment.
///
/// `ciphertext` is the at-rest-encrypted value and is opaque to every
/// component except the cipher. The same `key_name` may appear more than once
/// within a scope when different services claim it (`service_id`
/// disambiguates locally); the remote name mapper flags that as a collision
/// at sync time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedSecret {
    pub id: SecretId,
    pub project_id: ProjectId,
    /// The catalog service this credential belongs to, if any. Free-standing
    /// project secrets leave this unset.
    pub service_id: Option<ServiceId>,
    pub environment: Environment,
    /// The local name, as the user typed it (e.g. `DATABASE_URL`, `api-key`).
    pub key_name: String,
    /// At-rest ciphertext, packed and base64-encoded by the cipher.
    pub ciphertext: String,
    /// False for plain configuration values that are stored alongside real
    /// credentials but are not mirrored by background sync.
    pub is_secret: bool,
    pub description: Option<String>,
}

impl EncryptedSecret {
    /// A secret credential with no service attribution.
    pub fn new(
        project_id: ProjectId,
        environment: Environment,
        key_name: impl Into<String>,
        ciphertext: impl Into<String>,
    ) -> Self {
        Self {
            id: SecretId::new(),
            project_id,
            service_id: None,
            environment,
            key_name: key_name.into(),
            ciphertext: ciphertext.into(),
            is_secret: true,
            description: None,
        }
    }

    pub fn with_service(mut self, service_id: ServiceId) -> Self {
        self.service_id = Some(service_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks this entry as a plain configuration value.
    pub fn plain_config(mut self) -> Self {
        self.is_secret = false;
        self
    }
}
