//! Tracked sensors and the groups they are displayed in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a tracked sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Temperature,
    Humidity,
    Battery,
}

impl SensorKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 3] = [Self::Temperature, Self::Humidity, Self::Battery];
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => f.write_str("temperature"),
            Self::Humidity => f.write_str("humidity"),
            Self::Battery => f.write_str("battery"),
        }
    }
}

/// A sensor entity the poller refreshes every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEntity {
    pub id: String,
    pub kind: SensorKind,
}

/// A fixed temperature / humidity / battery triple, e.g. one per floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorGroup {
    /// Short stable key (e.g. `floor11`).
    pub key: String,
    /// Display label (e.g. `Floor 11`).
    pub label: String,
    /// Temperature sensor entity id.
    pub temperature: String,
    /// Relative humidity sensor entity id.
    pub humidity: String,
    /// Battery level sensor entity id.
    pub battery: String,
}

impl SensorGroup {
    /// Entity id of the sensor of the given kind.
    #[must_use]
    pub fn entity_id(&self, kind: SensorKind) -> &str {
        match kind {
            SensorKind::Temperature => &self.temperature,
            SensorKind::Humidity => &self.humidity,
            SensorKind::Battery => &self.battery,
        }
    }

    /// The group's sensors as tracked entities.
    pub fn tracked(&self) -> impl Iterator<Item = TrackedEntity> + '_ {
        SensorKind::ALL.into_iter().map(|kind| TrackedEntity {
            id: self.entity_id(kind).to_string(),
            kind,
        })
    }
}
