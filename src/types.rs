//! Core catalog types: groups, polymorphic sensors, readings.

use serde::{Deserialize, Serialize};

/// Maximum length for sensor and group names.
pub const MAX_NAME_LEN: usize = 32;
/// Maximum length for descriptions.
pub const MAX_DESCRIPTION_LEN: usize = 100;
/// Maximum length for Accuweather location codes.
pub const MAX_LOC_CODE_LEN: usize = 10;
/// Maximum length for 1-wire hardware element ids.
pub const MAX_HARDWARE_ID_LEN: usize = 16;

/// An organizational unit owning zero or more sensors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorGroup {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// The concrete variant of a sensor, fixed at construction.
///
/// The variant set is closed: adding a new physical read strategy means
/// adding a case here plus its extension table, not subclassing at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorKind {
    /// Remote weather-feed sensor queried by location code.
    Accuweather { loc_code: String },
    /// Local 1-wire sensor identified by (family code, element id).
    W1Therm { family: i64, hardware_id: String },
}

impl SensorKind {
    /// Discriminator tag stored in the `sensors.kind` column.
    pub fn tag(&self) -> &'static str {
        match self {
            SensorKind::Accuweather { .. } => "accuweather",
            SensorKind::W1Therm { .. } => "w1therm",
        }
    }

    /// Display name used when no explicit name is supplied at creation.
    pub fn default_name(&self) -> String {
        match self {
            SensorKind::Accuweather { loc_code } => format!("Accuweather {}", loc_code),
            SensorKind::W1Therm { hardware_id, .. } => format!("W1Therm {}", hardware_id),
        }
    }
}

/// A cataloged sensor. `group_id` is a weak reference resolved by lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub group_id: Option<i64>,
    #[serde(flatten)]
    pub kind: SensorKind,
}

/// A single temperature measurement in degrees Fahrenheit.
///
/// `id` is `None` while the reading is transient; it is assigned when the
/// reading is explicitly saved through the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub id: Option<i64>,
    pub sensor_id: i64,
    /// Wall-clock time of the measurement, UTC milliseconds.
    pub time_ms: i64,
    pub value: f64,
}

impl Reading {
    /// Construct a transient (unpersisted) reading.
    pub fn new(sensor_id: i64, time_ms: i64, value: f64) -> Self {
        Self {
            id: None,
            sensor_id,
            time_ms,
            value,
        }
    }

    /// Format the timestamp for display.
    pub fn time_display(&self) -> String {
        chrono::DateTime::<chrono::Utc>::from_timestamp_millis(self.time_ms)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.time_ms.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuweather_default_name_uses_loc_code() {
        let kind = SensorKind::Accuweather {
            loc_code: "10001".to_string(),
        };
        assert_eq!(kind.default_name(), "Accuweather 10001");
        assert_eq!(kind.tag(), "accuweather");
    }

    #[test]
    fn w1therm_default_name_uses_hardware_id() {
        let kind = SensorKind::W1Therm {
            family: 0x28,
            hardware_id: "0000051f4b2f".to_string(),
        };
        assert_eq!(kind.default_name(), "W1Therm 0000051f4b2f");
        assert_eq!(kind.tag(), "w1therm");
    }
}
