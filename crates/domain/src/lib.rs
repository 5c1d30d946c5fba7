//! # hubpanel-domain
//!
//! Pure domain model for the hubpanel control-panel client.
//!
//! ## Responsibilities
//! - Foundational types: error taxonomy, timestamps
//! - Define **Credentials** (hub base URL + bearer token, both or neither)
//! - Define **Entity readings** (last-known value, unit, fetch time, ok flag)
//! - Define **Tracked entities** and the **sensor groups** they belong to
//! - Define **Command targets** and the **device profiles** they belong to
//! - Define the **Catalog** of everything the panel polls and controls
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod catalog;
pub mod credentials;
pub mod entity;
