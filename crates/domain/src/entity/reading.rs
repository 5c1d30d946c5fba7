//! Entity readings: what the panel last learned about a tracked entity.

use serde::{Deserialize, Serialize};

use crate::error::FailureKind;
use crate::time::Timestamp;

/// The `(state, unit)` pair returned by a successful state read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateValue {
    /// The hub's `state` field, verbatim.
    pub value: String,
    /// The `unit_of_measurement` attribute, empty when the hub omits it.
    pub unit: String,
}

impl StateValue {
    /// Convenience constructor.
    #[must_use]
    pub fn new(value: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            unit: unit.into(),
        }
    }
}

/// Last-known state of a tracked entity.
///
/// A reading is either ok (value and unit as fetched) or failed, in which case
/// value and unit are always empty and `failure` says why. Failed readings
/// never carry a stale value from an earlier success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReading {
    pub entity_id: String,
    pub value: String,
    pub unit: String,
    pub fetched_at: Timestamp,
    pub ok: bool,
    pub failure: Option<FailureKind>,
}

impl EntityReading {
    /// A successful reading.
    #[must_use]
    pub fn success(entity_id: impl Into<String>, state: StateValue, fetched_at: Timestamp) -> Self {
        Self {
            entity_id: entity_id.into(),
            value: state.value,
            unit: state.unit,
            fetched_at,
            ok: true,
            failure: None,
        }
    }

    /// A failed reading with value and unit cleared.
    #[must_use]
    pub fn failed(entity_id: impl Into<String>, kind: FailureKind, fetched_at: Timestamp) -> Self {
        Self {
            entity_id: entity_id.into(),
            value: String::new(),
            unit: String::new(),
            fetched_at,
            ok: false,
            failure: Some(kind),
        }
    }

    /// The value parsed as a number, when the reading is ok and numeric.
    ///
    /// Hub states such as `"unavailable"` or `"unknown"` yield `None`.
    #[must_use]
    pub fn numeric(&self) -> Option<f64> {
        if !self.ok {
            return None;
        }
        self.value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}
