//! HTTP adapter error types and the mapping of reqwest failures into the
//! domain taxonomy.

use hubpanel_domain::error::{DispatchError, FetchError, ProtocolError};

/// Errors raised while building the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    /// The configured timeout is zero.
    #[error("http timeout must be greater than zero")]
    ZeroTimeout,

    /// reqwest could not build the client (TLS backend, resolver...).
    #[error("unable to build http client")]
    Build(#[source] reqwest::Error),
}

/// A request that never produced a usable status line: timeout, refused
/// connection, DNS failure, body read interrupted.
pub(crate) fn fetch_transport(err: reqwest::Error) -> FetchError {
    FetchError::Transport(Box::new(err))
}

pub(crate) fn dispatch_transport(err: reqwest::Error) -> DispatchError {
    DispatchError::Transport(Box::new(err))
}

/// The body arrived but is not the JSON we expect.
pub(crate) fn malformed(err: serde_json::Error) -> FetchError {
    ProtocolError::Body(Box::new(err)).into()
}
