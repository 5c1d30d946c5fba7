//! State client port: reads and writes against the remote hub.
//!
//! Implementations own the transport: they look up the current credentials,
//! apply a bounded timeout to every call and map every failure into the
//! domain taxonomy. They never retry; retry policy belongs to the caller.

use std::future::Future;

use hubpanel_domain::entity::StateValue;
use hubpanel_domain::error::{DispatchError, FetchError};

/// Stateless request executor for the hub's state and command endpoints.
pub trait StateClient {
    /// Read the current state of `entity_id`.
    ///
    /// Fails fast with [`FetchError::Unconfigured`] (no request made) when
    /// there are no credentials.
    fn fetch_state(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<StateValue, FetchError>> + Send;

    /// Write `text` to the text entity `entity_id`.
    ///
    /// Fails fast with [`DispatchError::Unconfigured`] (no request made) when
    /// there are no credentials.
    fn send_command(
        &self,
        entity_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;
}

impl<T: StateClient + Send + Sync> StateClient for std::sync::Arc<T> {
    fn fetch_state(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<StateValue, FetchError>> + Send {
        (**self).fetch_state(entity_id)
    }

    fn send_command(
        &self,
        entity_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send {
        (**self).send_command(entity_id, text)
    }
}
