//! Catalog: the fixed set of sensor groups and device profiles the panel knows.
//!
//! The catalog is configuration data: it is loaded once at startup and stays
//! immutable for the lifetime of the process. The built-in catalog mirrors the
//! household the panel was written for (two Mijia thermo-hygrometers, two
//! Xiaomi speakers).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::entity::{CommandRequest, CommandRole, DeviceProfile, SensorGroup, TrackedEntity};
use crate::error::{NotFoundError, ValidationError};

/// Everything the panel polls and controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub groups: Vec<SensorGroup>,
    pub profiles: Vec<DeviceProfile>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            groups: vec![
                SensorGroup {
                    key: "floor11".to_string(),
                    label: "Floor 11".to_string(),
                    temperature: "sensor.miaomiaoce_t2_cb34_temperature".to_string(),
                    humidity: "sensor.miaomiaoce_t2_cb34_relative_humidity".to_string(),
                    battery: "sensor.miaomiaoce_t2_cb34_battery_level".to_string(),
                },
                SensorGroup {
                    key: "floor5".to_string(),
                    label: "Floor 5".to_string(),
                    temperature: "sensor.miaomiaoce_t2_f771_temperature".to_string(),
                    humidity: "sensor.miaomiaoce_t2_f771_relative_humidity".to_string(),
                    battery: "sensor.miaomiaoce_t2_f771_battery_level".to_string(),
                },
            ],
            profiles: vec![
                DeviceProfile {
                    key: "enhanced".to_string(),
                    label: "Play Enhanced".to_string(),
                    execute: "text.xiaomi_l05c_37bc_execute_text_directive".to_string(),
                    play_text: "text.xiaomi_l05c_37bc_play_text".to_string(),
                },
                DeviceProfile {
                    key: "pro".to_string(),
                    label: "Pro".to_string(),
                    execute: "text.xiaomi_lx06_22f3_execute_text_directive".to_string(),
                    play_text: "text.xiaomi_lx06_22f3_play_text".to_string(),
                },
            ],
        }
    }

    /// Check catalog invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if there are no sensor groups, if a key or
    /// entity id is empty, or if a key or entity id is declared twice.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.groups.is_empty() {
            return Err(ValidationError::NoSensorGroups);
        }

        let mut keys = HashSet::new();
        let group_keys = self.groups.iter().map(|g| g.key.as_str());
        let profile_keys = self.profiles.iter().map(|p| p.key.as_str());
        for key in group_keys.chain(profile_keys) {
            if key.trim().is_empty() {
                return Err(ValidationError::EmptyKey);
            }
            if !keys.insert(key) {
                return Err(ValidationError::DuplicateKey(key.to_string()));
            }
        }

        let mut ids = HashSet::new();
        let profile_ids = self
            .profiles
            .iter()
            .flat_map(|p| [p.execute.clone(), p.play_text.clone()]);
        for id in self.tracked().map(|t| t.id).chain(profile_ids) {
            if id.trim().is_empty() {
                return Err(ValidationError::EmptyEntityId);
            }
            if !ids.insert(id.clone()) {
                return Err(ValidationError::DuplicateEntityId(id));
            }
        }

        Ok(())
    }

    /// Every tracked sensor, grouped in declaration order.
    pub fn tracked(&self) -> impl Iterator<Item = TrackedEntity> + '_ {
        self.groups.iter().flat_map(SensorGroup::tracked)
    }

    /// Ids of every tracked sensor.
    #[must_use]
    pub fn tracked_ids(&self) -> Vec<String> {
        self.tracked().map(|t| t.id).collect()
    }

    /// Look up a device profile by key (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no profile has that key.
    pub fn profile(&self, key: &str) -> Result<&DeviceProfile, NotFoundError> {
        self.profiles
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(key.trim()))
            .ok_or_else(|| NotFoundError {
                entity: "Profile",
                id: key.to_string(),
            })
    }

    /// Build a request writing `text` to a profile's target.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no profile has that key.
    pub fn command(
        &self,
        profile: &str,
        role: CommandRole,
        text: impl Into<String>,
    ) -> Result<CommandRequest, NotFoundError> {
        let profile = self.profile(profile)?;
        Ok(CommandRequest::new(profile.target(role), text))
    }

    /// Build the dismiss preset for a profile.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no profile has that key.
    pub fn dismiss(&self, profile: &str) -> Result<CommandRequest, NotFoundError> {
        self.profile(profile).map(CommandRequest::dismiss)
    }
}
