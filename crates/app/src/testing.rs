//! In-memory `StateClient` fake shared by the app crate's tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::{Notify, watch};

use hubpanel_domain::entity::StateValue;
use hubpanel_domain::error::{DispatchError, FetchError, ProtocolError};

use crate::ports::StateClient;

/// What the fake hub answers for an entity.
#[derive(Debug, Clone)]
pub enum FakeOutcome {
    Value(StateValue),
    Transport,
    Status(u16),
    Malformed,
}

impl FakeOutcome {
    pub fn value(value: &str, unit: &str) -> Self {
        Self::Value(StateValue::new(value, unit))
    }
}

/// Programmable `StateClient` that counts calls and records commands.
///
/// Fetches answer `"1"` with no unit unless told otherwise. Closing the gate
/// parks every fetch until it is opened again.
pub struct FakeStateClient {
    outcomes: Mutex<HashMap<String, FakeOutcome>>,
    command_outcome: Mutex<Option<FakeOutcome>>,
    fetches: AtomicUsize,
    commands: Mutex<Vec<(String, String)>>,
    gate: watch::Sender<bool>,
    /// Notified each time a fetch starts.
    pub entered: Notify,
}

impl Default for FakeStateClient {
    fn default() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            outcomes: Mutex::default(),
            command_outcome: Mutex::default(),
            fetches: AtomicUsize::new(0),
            commands: Mutex::default(),
            gate,
            entered: Notify::new(),
        }
    }
}

impl FakeStateClient {
    pub fn set_outcome(&self, entity_id: &str, outcome: FakeOutcome) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entity_id.to_string(), outcome);
    }

    pub fn set_command_outcome(&self, outcome: FakeOutcome) {
        *self
            .command_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcome);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<(String, String)> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn close_gate(&self) {
        self.gate.send_replace(false);
    }

    pub fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    fn outcome_for(&self, entity_id: &str) -> FakeOutcome {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entity_id)
            .cloned()
            .unwrap_or_else(|| FakeOutcome::value("1", ""))
    }
}

impl StateClient for FakeStateClient {
    async fn fetch_state(&self, entity_id: &str) -> Result<StateValue, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();

        let mut gate = self.gate.subscribe();
        while !*gate.borrow_and_update() {
            if gate.changed().await.is_err() {
                break;
            }
        }

        match self.outcome_for(entity_id) {
            FakeOutcome::Value(state) => Ok(state),
            FakeOutcome::Transport => Err(FetchError::Transport("connection refused".into())),
            FakeOutcome::Status(status) => Err(ProtocolError::Status(status).into()),
            FakeOutcome::Malformed => Err(ProtocolError::Body("missing state".into()).into()),
        }
    }

    async fn send_command(&self, entity_id: &str, text: &str) -> Result<(), DispatchError> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((entity_id.to_string(), text.to_string()));

        let outcome = self
            .command_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match outcome {
            None | Some(FakeOutcome::Value(_)) => Ok(()),
            Some(FakeOutcome::Transport) => {
                Err(DispatchError::Transport("connection refused".into()))
            }
            Some(FakeOutcome::Status(status)) => Err(ProtocolError::Status(status).into()),
            Some(FakeOutcome::Malformed) => {
                Err(ProtocolError::Body("unexpected body".into()).into())
            }
        }
    }
}
