mod activity;
mod employees;
mod requests;
mod screenshots;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use rusqlite::Connection;
use tokio::fs;
use tokio::sync::Mutex;

pub use employees::valid_employee_code;
pub use requests::RespondOutcome;

/// The record store. One SQLite connection guarded by an async mutex; every
/// protocol operation takes the lock for the duration of its read/write, so
/// check-then-insert sequences are serialized in-process.
pub struct Store {
    db: Arc<Mutex<Connection>>,
}

impl Store {
    pub async fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await?;
        }
        let db = Connection::open(db_path)?;
        Self::initialize(db)
    }

    fn initialize(db: Connection) -> Result<Self> {
        db.pragma_update(None, "foreign_keys", true)?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS employees (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                employee_code TEXT NOT NULL UNIQUE,
                device_name TEXT,
                api_key TEXT NOT NULL UNIQUE,
                status TEXT NOT NULL DEFAULT 'offline',
                current_app TEXT,
                last_seen DATETIME,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS activity_logs (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
                app_name TEXT NOT NULL,
                status TEXT NOT NULL,
                duration_seconds INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS screenshots (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
                image_path TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS agent_requests (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
                request_type TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                reason TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                responded_at DATETIME
            )",
            [],
        )?;

        db.execute(
            "CREATE INDEX IF NOT EXISTS idx_activity_logs_employee_created
                ON activity_logs(employee_id, created_at)",
            [],
        )?;
        db.execute(
            "CREATE INDEX IF NOT EXISTS idx_screenshots_employee_created
                ON screenshots(employee_id, created_at)",
            [],
        )?;
        // At most one pending request per (employee, type). The submit path
        // checks before inserting; this index backs the invariant at the
        // store level as well.
        db.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_agent_requests_one_pending
                ON agent_requests(employee_id, request_type) WHERE status = 'pending'",
            [],
        )?;

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }
}

/// Create an in-memory Store for testing. Avoids filesystem side-effects.
#[cfg(test)]
pub(crate) fn test_store() -> Store {
    let db = Connection::open_in_memory().expect("open in-memory db");
    Store::initialize(db).expect("initialize schema")
}
