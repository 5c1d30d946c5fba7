//! Session store: the in-memory single source of truth for hub credentials.
//!
//! Backed by a tokio [`watch`] channel: writers replace the whole
//! `Option<Credentials>` at once, readers clone a snapshot, and subscribers are
//! woken on every replacement. Persisting credentials is the front-end's job.

use std::sync::Arc;

use tokio::sync::watch;

use hubpanel_domain::credentials::Credentials;

/// Shared handle to the current credentials. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sender: Arc<watch::Sender<Option<Credentials>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SessionStore {
    /// Create a store holding `initial`.
    #[must_use]
    pub fn new(initial: Option<Credentials>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Atomically replace the credentials and notify subscribers.
    ///
    /// Subscribers are notified even when the new value equals the old one,
    /// so re-submitting the same credentials forces a refresh.
    pub fn set(&self, credentials: Option<Credentials>) {
        let base_url = credentials.as_ref().map(|c| c.base_url().to_string());
        let previous = self.sender.send_replace(credentials);
        match base_url {
            Some(base_url) => tracing::info!(%base_url, "hub credentials updated"),
            None if previous.is_some() => tracing::info!("hub credentials cleared"),
            None => tracing::debug!("hub credentials cleared while already empty"),
        }
    }

    /// Set credentials from user input. Partial input clears the session.
    ///
    /// Returns whether the session is configured afterwards.
    pub fn provide(&self, base_url: &str, token: &str) -> bool {
        let credentials = Credentials::from_parts(base_url, token);
        let configured = credentials.is_some();
        if !configured {
            tracing::warn!("incomplete hub credentials provided, treating as logout");
        }
        self.set(credentials);
        configured
    }

    /// Forget the credentials (logout). Equivalent to `set(None)`.
    pub fn clear(&self) {
        self.set(None);
    }

    /// Snapshot of the current credentials.
    #[must_use]
    pub fn get(&self) -> Option<Credentials> {
        self.sender.borrow().clone()
    }

    /// Whether credentials are currently present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// Subscribe to credential changes.
    ///
    /// The current value is marked as seen: `changed()` resolves on the next
    /// replacement only.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Credentials>> {
        self.sender.subscribe()
    }
}
