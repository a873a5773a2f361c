//! Reading persistence.
//!
//! A `Reading` produced by a sensor read is transient; nothing here runs
//! implicitly on the read path. `insert_reading` is the explicit commit that
//! makes a reading durable.

use super::Database;
use crate::types::Reading;
use anyhow::{Result, anyhow};
use rusqlite::params;

impl Database {
    /// Persist a transient reading, returning it with its assigned id.
    pub fn insert_reading(&self, reading: &Reading) -> Result<Reading> {
        if reading.id.is_some() {
            return Err(anyhow!("Reading is already persisted"));
        }

        // The owning sensor must exist.
        self.get_sensor(reading.sensor_id)?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO readings (sensor_id, time_ms, value) VALUES (?1, ?2, ?3)",
                params![reading.sensor_id, reading.time_ms, reading.value],
            )?;
            let id = conn.last_insert_rowid();

            Ok(Reading {
                id: Some(id),
                sensor_id: reading.sensor_id,
                time_ms: reading.time_ms,
                value: reading.value,
            })
        })
    }

    /// List a sensor's readings, newest first.
    pub fn readings_for_sensor(&self, sensor_id: i64) -> Result<Vec<Reading>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sensor_id, time_ms, value FROM readings
                 WHERE sensor_id = ?1 ORDER BY time_ms DESC",
            )?;

            let readings = stmt
                .query_map(params![sensor_id], |row| {
                    Ok(Reading {
                        id: row.get(0)?,
                        sensor_id: row.get(1)?,
                        time_ms: row.get(2)?,
                        value: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<_, _>>()?;

            Ok(readings)
        })
    }

    /// Count persisted readings for a sensor.
    pub fn reading_count(&self, sensor_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM readings WHERE sensor_id = ?1",
                params![sensor_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }
}
