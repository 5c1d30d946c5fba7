//! Common error types used across the workspace.
//!
//! Each IO-facing operation has its own typed error: [`FetchError`] for state
//! reads, [`DispatchError`] for command writes. Adapters box their library
//! errors into the `Transport` / `Protocol` variants so this crate stays free
//! of IO dependencies.

use serde::{Deserialize, Serialize};

/// Boxed error used to carry adapter-specific sources across port boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The hub answered, but not with something we can use.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The hub replied with a non-success HTTP status.
    #[error("hub replied with status {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("malformed response body")]
    Body(#[source] BoxError),
}

/// Failure of a single state read.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// No credentials are present; no request was made.
    #[error("hub credentials are not configured")]
    Unconfigured,

    /// Timeout or connection failure.
    #[error("transport failure")]
    Transport(#[source] BoxError),

    /// Non-success status or malformed body.
    #[error("protocol failure")]
    Protocol(#[from] ProtocolError),
}

impl FetchError {
    /// Coarse classification stored alongside failed cache entries.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Unconfigured => FailureKind::Unconfigured,
            Self::Transport(_) => FailureKind::Transport,
            Self::Protocol(_) => FailureKind::Protocol,
        }
    }
}

/// Failure of a single command dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No credentials are present; no request was made.
    #[error("hub credentials are not configured")]
    Unconfigured,

    /// The command text is empty or whitespace only; no request was made.
    #[error("command text is empty")]
    EmptyInput,

    /// Timeout or connection failure.
    #[error("transport failure")]
    Transport(#[source] BoxError),

    /// Non-success status.
    #[error("protocol failure")]
    Protocol(#[from] ProtocolError),
}

impl DispatchError {
    /// Human-readable reason, including the underlying cause when there is one.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Transport(source) => format!("{self}: {source}"),
            Self::Protocol(source) => format!("{self}: {source}"),
            other => other.to_string(),
        }
    }
}

/// Why an entity reading is not ok.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Credentials absent (initial state, or after logout).
    Unconfigured,
    /// Timeout or connection failure.
    Transport,
    /// Non-success status or malformed body.
    Protocol,
}

/// Invariant violations in catalog or configuration data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// An entity id is empty or whitespace only.
    #[error("entity id must not be empty")]
    EmptyEntityId,

    /// A group or profile key is empty or whitespace only.
    #[error("key must not be empty")]
    EmptyKey,

    /// The same entity id is declared twice.
    #[error("entity id {0} is declared more than once")]
    DuplicateEntityId(String),

    /// The same group or profile key is declared twice.
    #[error("key {0} is declared more than once")]
    DuplicateKey(String),

    /// The catalog tracks nothing.
    #[error("at least one sensor group is required")]
    NoSensorGroups,
}

/// A lookup by id found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of thing looked up (e.g. `"Entity"`, `"Profile"`).
    pub entity: &'static str,
    /// The id that was not found.
    pub id: String,
}
