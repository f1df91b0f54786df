use anyhow::Result;
use rusqlite::{OptionalExtension, Row, params};

use super::Store;
use super::types::ScreenshotRecord;

fn screenshot_from_row(row: &Row) -> rusqlite::Result<ScreenshotRecord> {
    Ok(ScreenshotRecord {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        image_path: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl Store {
    /// Append-only. The image bytes live in the blob store; the row carries
    /// only the relative path.
    pub async fn insert_screenshot(
        &self,
        employee_id: &str,
        image_path: &str,
    ) -> Result<ScreenshotRecord> {
        let id = uuid::Uuid::new_v4().to_string();
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO screenshots (id, employee_id, image_path) VALUES (?1, ?2, ?3)",
            params![id, employee_id, image_path],
        )?;
        let record = db.query_row(
            "SELECT id, employee_id, image_path, created_at FROM screenshots WHERE id = ?1",
            params![id],
            screenshot_from_row,
        )?;
        Ok(record)
    }

    pub async fn list_screenshots(
        &self,
        employee_id: &str,
        limit: i64,
    ) -> Result<Vec<ScreenshotRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, employee_id, image_path, created_at
             FROM screenshots WHERE employee_id = ?1
             ORDER BY created_at DESC, id LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![employee_id, limit], screenshot_from_row)?;
        let mut shots = Vec::new();
        for row in rows {
            shots.push(row?);
        }
        Ok(shots)
    }

    pub async fn get_screenshot(&self, id: &str) -> Result<Option<ScreenshotRecord>> {
        let db = self.db.lock().await;
        let record = db
            .query_row(
                "SELECT id, employee_id, image_path, created_at FROM screenshots WHERE id = ?1",
                params![id],
                screenshot_from_row,
            )
            .optional()?;
        Ok(record)
    }
}
