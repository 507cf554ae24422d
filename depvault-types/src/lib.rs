//! Shared types for the depvault secret-sync core.
//!
//! Identifiers are strongly typed uuid newtypes, records are explicit about
//! optionality, and parsing happens at the boundary so everything downstream
//! of the loaders operates on fully-typed values.

mod environment;
mod ids;
mod link;
mod secret;

pub use environment::{Environment, ParseEnvironmentError};
pub use ids::{LinkId, ProjectId, SecretId, ServiceId};
pub use link::{ParseRepoSlugError, RepoLink, RepoSlug};
pub use secret::EncryptedSecret;
