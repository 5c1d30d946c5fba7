//! Command dispatcher: validated pass-through to [`StateClient::send_command`].

use hubpanel_domain::entity::CommandRequest;
use hubpanel_domain::error::DispatchError;

use crate::ports::StateClient;

/// Sends command text to actuator entities.
///
/// No caching, queueing or retry: each call makes at most one request and
/// returns its outcome verbatim.
pub struct CommandDispatcher<C> {
    client: C,
}

impl<C: StateClient> CommandDispatcher<C> {
    #[must_use]
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Write `text` to `entity_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::EmptyInput`] without making a request when
    /// `text` is empty or whitespace only; otherwise whatever the client
    /// returned.
    pub async fn dispatch(&self, entity_id: &str, text: &str) -> Result<(), DispatchError> {
        if text.trim().is_empty() {
            return Err(DispatchError::EmptyInput);
        }
        match self.client.send_command(entity_id, text).await {
            Ok(()) => {
                tracing::info!(entity_id, "command sent");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(entity_id, reason = %err.reason(), "command failed");
                Err(err)
            }
        }
    }

    /// Send a resolved [`CommandRequest`].
    ///
    /// # Errors
    ///
    /// Same as [`CommandDispatcher::dispatch`].
    pub async fn dispatch_request(&self, request: &CommandRequest) -> Result<(), DispatchError> {
        self.dispatch(&request.target.id, &request.text).await
    }
}
