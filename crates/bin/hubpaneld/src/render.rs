//! Text rendering of cache snapshots and command outcomes for the console.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use hubpanel_app::entity_cache::CacheSnapshot;
use hubpanel_app::ports::EntitiesUpdated;
use hubpanel_domain::catalog::Catalog;
use hubpanel_domain::entity::{BatteryLevel, EntityReading, SensorGroup, SensorKind};
use hubpanel_domain::error::DispatchError;

const MISSING: &str = "--";
const BAR_CELLS: u8 = 10;

/// Print every update until the bus closes.
pub async fn print_updates(catalog: Arc<Catalog>, updates: broadcast::Receiver<EntitiesUpdated>) {
    let mut stream = BroadcastStream::new(updates);
    while let Some(item) = stream.next().await {
        match item {
            Ok(update) => println!("{}", update_block(&catalog, &update)),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "renderer lagging, skipping to latest update");
            }
        }
    }
}

/// Header line plus one line per sensor group.
#[must_use]
pub fn update_block(catalog: &Catalog, update: &EntitiesUpdated) -> String {
    format!(
        "-- refresh #{} at {} UTC --\n{}",
        update.cycle,
        update.completed_at.format("%H:%M:%S"),
        groups_block(catalog, &update.readings)
    )
}

/// One line per sensor group, in catalog order.
#[must_use]
pub fn groups_block(catalog: &Catalog, readings: &CacheSnapshot) -> String {
    catalog
        .groups
        .iter()
        .map(|group| group_line(group, readings))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `Floor 11 | temperature 21.5°C | humidity 45% | battery [##--------] 17% LOW`
#[must_use]
pub fn group_line(group: &SensorGroup, readings: &CacheSnapshot) -> String {
    let reading = |kind: SensorKind| readings.get(group.entity_id(kind));
    format!(
        "{} | temperature {} | humidity {} | battery {}",
        group.label,
        measurement(reading(SensorKind::Temperature)),
        measurement(reading(SensorKind::Humidity)),
        battery(reading(SensorKind::Battery)),
    )
}

fn measurement(reading: Option<&EntityReading>) -> String {
    match reading {
        Some(r) if r.ok => format!("{}{}", r.value, r.unit),
        _ => MISSING.to_string(),
    }
}

fn battery(reading: Option<&EntityReading>) -> String {
    let Some(reading) = reading.filter(|r| r.ok) else {
        return MISSING.to_string();
    };
    let Some(level) = BatteryLevel::from_reading(reading) else {
        return reading.value.clone();
    };

    let scaled = level.fraction() * f64::from(BAR_CELLS);
    let filled = (0..BAR_CELLS)
        .filter(|cell| f64::from(*cell) + 0.5 < scaled)
        .count();
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(usize::from(BAR_CELLS) - filled)
    );
    let marker = if level.is_low() { " LOW" } else { "" };
    format!("[{bar}] {}%{marker}", reading.value.trim())
}

/// Transient status line for a dispatched command.
#[must_use]
pub fn command_outcome(result: &Result<(), DispatchError>) -> String {
    match result {
        Ok(()) => "command sent".to_string(),
        Err(err) => format!("send failed: {}", err.reason()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubpanel_domain::entity::StateValue;
    use hubpanel_domain::error::{FailureKind, ProtocolError};
    use hubpanel_domain::time::now;

    fn floor11() -> SensorGroup {
        Catalog::builtin().groups.remove(0)
    }

    fn ok(id: &str, value: &str, unit: &str) -> (String, EntityReading) {
        (
            id.to_string(),
            EntityReading::success(id, StateValue::new(value, unit), now()),
        )
    }

    fn failed(id: &str) -> (String, EntityReading) {
        (
            id.to_string(),
            EntityReading::failed(id, FailureKind::Transport, now()),
        )
    }

    #[test]
    fn should_render_values_with_units() {
        let group = floor11();
        let readings: CacheSnapshot = [
            ok(&group.temperature, "21.5", "°C"),
            ok(&group.humidity, "45", "%"),
            ok(&group.battery, "80", "%"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            group_line(&group, &readings),
            "Floor 11 | temperature 21.5°C | humidity 45% | battery [########--] 80%"
        );
    }

    #[test]
    fn should_flag_low_battery() {
        let group = floor11();
        let readings: CacheSnapshot = [ok(&group.battery, "17", "%")].into_iter().collect();

        let line = group_line(&group, &readings);

        assert!(line.ends_with("battery [##--------] 17% LOW"), "{line}");
    }

    #[test]
    fn should_render_failed_readings_as_missing() {
        let group = floor11();
        let readings: CacheSnapshot = [
            failed(&group.temperature),
            failed(&group.humidity),
            failed(&group.battery),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            group_line(&group, &readings),
            "Floor 11 | temperature -- | humidity -- | battery --"
        );
    }

    #[test]
    fn should_show_raw_battery_state_when_not_numeric() {
        let group = floor11();
        let readings: CacheSnapshot = [ok(&group.battery, "unavailable", "")].into_iter().collect();

        assert!(group_line(&group, &readings).ends_with("battery unavailable"));
    }

    #[test]
    fn should_render_one_line_per_group() {
        let block = groups_block(&Catalog::builtin(), &CacheSnapshot::new());
        assert_eq!(block.lines().count(), 2);
        assert!(block.starts_with("Floor 11"));
    }

    #[test]
    fn should_include_cycle_in_update_header() {
        let update = EntitiesUpdated {
            cycle: 42,
            completed_at: now(),
            readings: CacheSnapshot::new(),
        };
        assert!(update_block(&Catalog::builtin(), &update).starts_with("-- refresh #42 at "));
    }

    #[test]
    fn should_describe_command_outcomes() {
        assert_eq!(command_outcome(&Ok(())), "command sent");
        let err = Err(DispatchError::from(ProtocolError::Status(401)));
        assert_eq!(
            command_outcome(&err),
            "send failed: protocol failure: hub replied with status 401"
        );
        assert_eq!(
            command_outcome(&Err(DispatchError::EmptyInput)),
            "send failed: command text is empty"
        );
    }
}
