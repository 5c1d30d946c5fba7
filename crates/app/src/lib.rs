//! # hubpanel-app
//!
//! Application layer: the state synchronization core and its **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `StateClient`: read entity state, write command text
//!   - `UpdatePublisher`: deliver batched "entities updated" notifications
//! - Provide the core components:
//!   - `SessionStore`: in-memory single source of truth for credentials
//!   - `EntityCache`: one last-known reading per tracked entity
//!   - `Poller`: periodic and on-demand refresh cycles
//!   - `CommandDispatcher`: validated pass-through to `StateClient`
//! - Provide **in-process infrastructure** (update bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `hubpanel-domain` only (plus `tokio` for tasks, timers and
//! channels). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

pub mod dispatcher;
pub mod entity_cache;
pub mod poller;
pub mod ports;
pub mod session;
pub mod update_bus;

#[cfg(test)]
mod testing;
