//! Sensor group CRUD operations.

use super::{Database, exactly_one};
use crate::types::{MAX_DESCRIPTION_LEN, MAX_NAME_LEN, SensorGroup};
use anyhow::{Result, anyhow};
use rusqlite::params;

impl Database {
    /// Create a new sensor group.
    pub fn add_group(&self, name: &str, description: Option<&str>) -> Result<SensorGroup> {
        if name.is_empty() {
            return Err(anyhow!("Group name cannot be empty"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(anyhow!(
                "Group name must be at most {} characters, got {}",
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

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sensor_groups (name, description) VALUES (?1, ?2)",
                params![name, description],
            )?;
            let id = conn.last_insert_rowid();

            Ok(SensorGroup {
                id,
                name: name.to_string(),
                description: description.map(str::to_string),
            })
        })
    }

    /// Get a group by id. Must resolve to exactly one row.
    pub fn get_group(&self, group_id: i64) -> Result<SensorGroup> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, description FROM sensor_groups WHERE id = ?1",
            )?;

            let rows: Vec<SensorGroup> = stmt
                .query_map(params![group_id], |row| {
                    Ok(SensorGroup {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<_, _>>()?;

            Ok(exactly_one(rows, "group", group_id)?)
        })
    }

    /// List all groups ordered by id.
    pub fn list_groups(&self) -> Result<Vec<SensorGroup>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, description FROM sensor_groups ORDER BY id",
            )?;

            let groups = stmt
                .query_map([], |row| {
                    Ok(SensorGroup {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<_, _>>()?;

            Ok(groups)
        })
    }
}
