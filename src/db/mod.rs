//! Database layer for the sensor catalog.

pub mod groups;
pub mod readings;
pub mod sensors;

use crate::error::LookupError;
use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Database handle wrapping a SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the database at the given path.
    ///
    /// With `echo_sql` set, every executed statement is logged at debug level.
    pub fn open<P: AsRef<Path>>(path: P, echo_sql: bool) -> Result<Self> {
        let (db, _report) = Self::open_with_report(path, echo_sql)?;
        Ok(db)
    }

    /// Open the database and return the migration report alongside it.
    ///
    /// Used by the `init` command to show which migrations were applied.
    pub fn open_with_report<P: AsRef<Path>>(
        path: P,
        echo_sql: bool,
    ) -> Result<(Self, refinery::Report)> {
        let mut conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )?;

        if echo_sql {
            conn.trace(Some(|sql: &str| tracing::debug!(sql = %sql, "executing")));
        }

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        let report = db.run_migrations()?;

        Ok((db, report))
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations.
    fn run_migrations(&self) -> Result<refinery::Report> {
        let mut conn = self.conn.lock().unwrap();
        let report = embedded::migrations::runner().run(&mut *conn)?;
        Ok(report)
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().unwrap();
        f(&conn)
    }

    /// Execute a function with mutable access to the connection (for transactions).
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().unwrap();
        f(&mut conn)
    }
}

/// Get the current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Reduce an id-lookup result set to exactly one row.
///
/// Zero and multiple matches fail symmetrically, distinguishable by variant.
pub(crate) fn exactly_one<T>(
    mut rows: Vec<T>,
    kind: &'static str,
    id: i64,
) -> Result<T, LookupError> {
    match rows.len() {
        0 => Err(LookupError::NotFound { kind, id }),
        1 => Ok(rows.remove(0)),
        count => Err(LookupError::Ambiguous { kind, id, count }),
    }
}
