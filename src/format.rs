//! Output formatting for listings and readings.

use crate::types::{Reading, Sensor, SensorGroup};
use serde::Serialize;

/// A sensor paired with its availability probe result.
#[derive(Debug, Serialize)]
pub struct SensorEntry {
    #[serde(flatten)]
    pub sensor: Sensor,
    pub available: bool,
}

/// One section of the catalog listing; `group` is `None` for the
/// "No Group" section.
#[derive(Debug, Serialize)]
pub struct GroupListing {
    pub group: Option<SensorGroup>,
    pub sensors: Vec<SensorEntry>,
}

/// Format the catalog listing as plain text, one section per group.
pub fn format_listing_text(listings: &[GroupListing]) -> String {
    let mut out = String::new();

    for listing in listings {
        match &listing.group {
            Some(group) => out.push_str(&format!("{}:\n", group.name)),
            None => out.push_str("No Group:\n"),
        }

        if listing.sensors.is_empty() {
            out.push_str("    None\n");
            continue;
        }

        for entry in &listing.sensors {
            let available = if entry.available { "Available" } else { "" };
            out.push_str(&format!(
                "    id={} '{}' {}\n",
                entry.sensor.id, entry.sensor.name, available
            ));
        }
    }

    out
}

/// Format the catalog listing as pretty JSON.
pub fn format_listing_json(listings: &[GroupListing]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(listings)?)
}

/// Format a single reading for display.
pub fn format_reading(reading: &Reading) -> String {
    format!("{}  {:5.1} F", reading.time_display(), reading.value)
}
