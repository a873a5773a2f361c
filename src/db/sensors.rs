//! Sensor CRUD and group-assignment operations.
//!
//! A sensor is stored as a base row plus one extension row selected by the
//! `kind` discriminator. The two are always written in one transaction.

use super::{Database, exactly_one};
use crate::types::{
    MAX_DESCRIPTION_LEN, MAX_HARDWARE_ID_LEN, MAX_LOC_CODE_LEN, MAX_NAME_LEN, Sensor, SensorKind,
};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};

/// Raw row shape from the sensor base/extension join.
type SensorRow = (
    i64,
    String,
    Option<String>,
    Option<i64>,
    String,
    Option<String>,
    Option<i64>,
    Option<String>,
);

const SENSOR_SELECT: &str = "SELECT s.id, s.name, s.description, s.group_id, s.kind,
        a.loc_code, w.family, w.hardware_id
 FROM sensors s
 LEFT JOIN accuweather_sensors a ON a.sensor_id = s.id
 LEFT JOIN w1therm_sensors w ON w.sensor_id = s.id";

fn row_to_sensor(row: SensorRow) -> Result<Sensor> {
    let (id, name, description, group_id, tag, loc_code, family, hardware_id) = row;

    let kind = match tag.as_str() {
        "accuweather" => SensorKind::Accuweather {
            loc_code: loc_code
                .ok_or_else(|| anyhow!("Sensor {} missing accuweather extension row", id))?,
        },
        "w1therm" => SensorKind::W1Therm {
            family: family
                .ok_or_else(|| anyhow!("Sensor {} missing w1therm extension row", id))?,
            hardware_id: hardware_id
                .ok_or_else(|| anyhow!("Sensor {} missing w1therm extension row", id))?,
        },
        other => return Err(anyhow!("Sensor {} has unknown kind '{}'", id, other)),
    };

    Ok(Sensor {
        id,
        name,
        description,
        group_id,
        kind,
    })
}

fn query_sensors(conn: &Connection, where_clause: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Sensor>> {
    let sql = format!("{} {} ORDER BY s.id", SENSOR_SELECT, where_clause);
    let mut stmt = conn.prepare(&sql)?;

    let rows: Vec<SensorRow> = stmt
        .query_map(args, |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
            ))
        })?
        .collect::<std::result::Result<_, _>>()?;

    rows.into_iter().map(row_to_sensor).collect()
}

fn validate_kind(kind: &SensorKind) -> Result<()> {
    match kind {
        SensorKind::Accuweather { loc_code } => {
            if loc_code.is_empty() {
                return Err(anyhow!("Location code cannot be empty"));
            }
            if loc_code.len() > MAX_LOC_CODE_LEN {
                return Err(anyhow!(
                    "Location code must be at most {} characters, got {}",
                    MAX_LOC_CODE_LEN,
                    loc_code.len()
                ));
            }
        }
        SensorKind::W1Therm { hardware_id, .. } => {
            if hardware_id.is_empty() {
                return Err(anyhow!("Hardware id cannot be empty"));
            }
            if hardware_id.len() > MAX_HARDWARE_ID_LEN {
                return Err(anyhow!(
                    "Hardware id must be at most {} characters, got {}",
                    MAX_HARDWARE_ID_LEN,
                    hardware_id.len()
                ));
            }
        }
    }
    Ok(())
}

impl Database {
    /// Create a new sensor of the given kind.
    ///
    /// When `name` is absent the variant-specific default name is used
    /// (`"Accuweather {loc_code}"` / `"W1Therm {hardware_id}"`).
    pub fn add_sensor(
        &self,
        name: Option<&str>,
        description: Option<&str>,
        group_id: Option<i64>,
        kind: SensorKind,
    ) -> Result<Sensor> {
        validate_kind(&kind)?;

        let name = match name {
            Some(n) => n.to_string(),
            None => kind.default_name(),
        };
        if name.is_empty() {
            return Err(anyhow!("Sensor name cannot be empty"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(anyhow!(
                "Sensor name must be at most {} characters, got {}",
                MAX_NAME_LEN,
                name.len()
            ));
        }
        if let Some(desc) = description {
            if desc.len() > MAX_DESCRIPTION_LEN {
                return Err(anyhow!(
                    "Description must be at most {} characters, got {}",
                    MAX_DESCRIPTION_LEN,
                    desc.len()
                ));
            }
        }

        // The weak group reference must resolve at creation time.
        if let Some(gid) = group_id {
            self.get_group(gid)?;
        }

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO sensors (name, description, group_id, kind)
                 VALUES (?1, ?2, ?3, ?4)",
                params![&name, description, group_id, kind.tag()],
            )?;
            let id = tx.last_insert_rowid();

            match &kind {
                SensorKind::Accuweather { loc_code } => {
                    tx.execute(
                        "INSERT INTO accuweather_sensors (sensor_id, loc_code) VALUES (?1, ?2)",
                        params![id, loc_code],
                    )?;
                }
                SensorKind::W1Therm {
                    family,
                    hardware_id,
                } => {
                    tx.execute(
                        "INSERT INTO w1therm_sensors (sensor_id, family, hardware_id)
                         VALUES (?1, ?2, ?3)",
                        params![id, family, hardware_id],
                    )?;
                }
            }

            tx.commit()?;

            Ok(Sensor {
                id,
                name,
                description: description.map(str::to_string),
                group_id,
                kind,
            })
        })
    }

    /// Get a sensor by id. Must resolve to exactly one row.
    pub fn get_sensor(&self, sensor_id: i64) -> Result<Sensor> {
        self.with_conn(|conn| {
            let rows = query_sensors(conn, "WHERE s.id = ?1", params![sensor_id])?;
            Ok(exactly_one(rows, "sensor", sensor_id)?)
        })
    }

    /// List the sensors belonging to a group, ordered by id.
    pub fn sensors_in_group(&self, group_id: i64) -> Result<Vec<Sensor>> {
        self.with_conn(|conn| query_sensors(conn, "WHERE s.group_id = ?1", params![group_id]))
    }

    /// List sensors with no group, ordered by id.
    pub fn ungrouped_sensors(&self) -> Result<Vec<Sensor>> {
        self.with_conn(|conn| query_sensors(conn, "WHERE s.group_id IS NULL", params![]))
    }

    /// Reassign a sensor's group, or clear it when `group_id` is `None`.
    pub fn set_sensor_group(&self, sensor_id: i64, group_id: Option<i64>) -> Result<Sensor> {
        // Both ends of the reference must exist before the update.
        self.get_sensor(sensor_id)?;
        if let Some(gid) = group_id {
            self.get_group(gid)?;
        }

        self.with_conn(|conn| {
            conn.execute(
                "UPDATE sensors SET group_id = ?1 WHERE id = ?2",
                params![group_id, sensor_id],
            )?;
            Ok(())
        })?;

        self.get_sensor(sensor_id)
    }
}
