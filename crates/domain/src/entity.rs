//! Entities: remotely addressable sensors and actuators in the hub's namespace.
//!
//! The panel only knows entities by their hub-side string id
//! (e.g. `sensor.miaomiaoce_t2_cb34_temperature`). Sensors are *tracked*: the
//! poller reads them every cycle and keeps an [`EntityReading`] per id.
//! Actuators are *command targets*: the panel writes text to them and keeps
//! nothing.

mod battery;
mod command;
mod reading;
mod sensor;

pub use battery::{BatteryLevel, LOW_BATTERY_PERCENT};
pub use command::{
    CommandRequest, CommandRole, CommandTarget, DISMISS_TEXT, DeviceProfile, UnknownRole,
};
pub use reading::{EntityReading, StateValue};
pub use sensor::{SensorGroup, SensorKind, TrackedEntity};
