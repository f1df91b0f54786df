use anyhow::Result;
use rusqlite::{Row, params};

use super::Store;
use super::types::{ActivityLogRecord, ReportStatus};

fn activity_from_row(row: &Row) -> rusqlite::Result<ActivityLogRecord> {
    Ok(ActivityLogRecord {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        app_name: row.get(2)?,
        status: row.get(3)?,
        duration_seconds: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl Store {
    /// Record one activity sample and drive the presence transition. Both
    /// writes run in a single transaction: the log append and the employee
    /// update succeed or fail together. The log is append-only and carries
    /// the app name exactly as reported.
    ///
    /// Retried calls duplicate the log row; presence fields are last-write-
    /// wins except `last_seen`, which only moves forward.
    pub async fn log_activity(
        &self,
        employee_id: &str,
        app_name: &str,
        status: ReportStatus,
        duration_seconds: i64,
    ) -> Result<ActivityLogRecord> {
        let id = uuid::Uuid::new_v4().to_string();
        let presence = status.presence();

        let mut db = self.db.lock().await;
        let tx = db.transaction()?;
        tx.execute(
            "INSERT INTO activity_logs (id, employee_id, app_name, status, duration_seconds)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, employee_id, app_name, status, duration_seconds],
        )?;
        let updated = tx.execute(
            "UPDATE employees SET
                status = ?2,
                current_app = ?3,
                last_seen = MAX(COALESCE(last_seen, ''), CURRENT_TIMESTAMP),
                updated_at = CURRENT_TIMESTAMP
             WHERE id = ?1",
            params![employee_id, presence, app_name],
        )?;
        if updated == 0 {
            anyhow::bail!("employee not found: {}", employee_id);
        }
        let record = tx.query_row(
            "SELECT id, employee_id, app_name, status, duration_seconds, created_at
             FROM activity_logs WHERE id = ?1",
            params![id],
            activity_from_row,
        )?;
        tx.commit()?;
        Ok(record)
    }

    pub async fn list_activity(
        &self,
        employee_id: &str,
        limit: i64,
    ) -> Result<Vec<ActivityLogRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, employee_id, app_name, status, duration_seconds, created_at
             FROM activity_logs WHERE employee_id = ?1
             ORDER BY created_at DESC, id LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![employee_id, limit], activity_from_row)?;
        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?);
        }
        Ok(logs)
    }
}
