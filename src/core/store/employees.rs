use anyhow::Result;
use rusqlite::{OptionalExtension, Row, params};

use super::Store;
use super::types::{EmployeeIdentity, EmployeeRecord, PresenceStatus};

fn generate_api_key() -> String {
    let bytes: [u8; 16] = rand::random();
    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!("vgk_{}", hex)
}

/// Employee codes end up as blob-store directory names, so keep them to a
/// filesystem-safe alphabet.
pub fn valid_employee_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

const EMPLOYEE_COLUMNS: &str = "id, name, employee_code, device_name, api_key, \
     status, current_app, last_seen, created_at, updated_at";

fn employee_from_row(row: &Row) -> rusqlite::Result<EmployeeRecord> {
    Ok(EmployeeRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        employee_code: row.get(2)?,
        device_name: row.get(3)?,
        api_key: row.get(4)?,
        status: row.get(5)?,
        current_app: row.get(6)?,
        last_seen: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl Store {
    pub async fn create_employee(
        &self,
        name: &str,
        employee_code: &str,
        device_name: Option<&str>,
    ) -> Result<EmployeeRecord> {
        let id = uuid::Uuid::new_v4().to_string();
        let api_key = generate_api_key();

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO employees (id, name, employee_code, device_name, api_key)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, name, employee_code, device_name, api_key],
        )?;

        let record = db.query_row(
            &format!("SELECT {} FROM employees WHERE id = ?1", EMPLOYEE_COLUMNS),
            params![id],
            employee_from_row,
        )?;
        Ok(record)
    }

    pub async fn list_employees(&self) -> Result<Vec<EmployeeRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!(
            "SELECT {} FROM employees ORDER BY name",
            EMPLOYEE_COLUMNS
        ))?;
        let rows = stmt.query_map([], employee_from_row)?;
        let mut employees = Vec::new();
        for row in rows {
            employees.push(row?);
        }
        Ok(employees)
    }

    pub async fn get_employee(&self, id: &str) -> Result<Option<EmployeeRecord>> {
        let db = self.db.lock().await;
        let record = db
            .query_row(
                &format!("SELECT {} FROM employees WHERE id = ?1", EMPLOYEE_COLUMNS),
                params![id],
                employee_from_row,
            )
            .optional()?;
        Ok(record)
    }

    pub async fn get_employee_by_code(&self, code: &str) -> Result<Option<EmployeeRecord>> {
        let db = self.db.lock().await;
        let record = db
            .query_row(
                &format!(
                    "SELECT {} FROM employees WHERE employee_code = ?1",
                    EMPLOYEE_COLUMNS
                ),
                params![code],
                employee_from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// Operator edit path. `status` here is the only way presence changes
    /// outside of activity ingestion.
    pub async fn update_employee(
        &self,
        id: &str,
        name: Option<&str>,
        device_name: Option<&str>,
        status: Option<PresenceStatus>,
    ) -> Result<bool> {
        let db = self.db.lock().await;
        let updated = db.execute(
            "UPDATE employees SET
                name = COALESCE(?2, name),
                device_name = COALESCE(?3, device_name),
                status = COALESCE(?4, status),
                updated_at = CURRENT_TIMESTAMP
             WHERE id = ?1",
            params![id, name, device_name, status],
        )?;
        Ok(updated > 0)
    }

    pub async fn delete_employee(&self, id: &str) -> Result<bool> {
        let db = self.db.lock().await;
        let deleted = db.execute("DELETE FROM employees WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// Issue a fresh API key, invalidating the previous one.
    pub async fn rotate_api_key(&self, id: &str) -> Result<Option<String>> {
        let api_key = generate_api_key();
        let db = self.db.lock().await;
        let updated = db.execute(
            "UPDATE employees SET api_key = ?2, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
            params![id, api_key],
        )?;
        Ok((updated > 0).then_some(api_key))
    }

    /// Credential resolution: verbatim exact match on the key column. The
    /// key is an opaque bearer credential; no hashing or expiry.
    pub async fn resolve_api_key(&self, api_key: &str) -> Result<Option<EmployeeIdentity>> {
        if api_key.is_empty() {
            return Ok(None);
        }
        let db = self.db.lock().await;
        let identity = db
            .query_row(
                "SELECT id, name, employee_code FROM employees WHERE api_key = ?1",
                params![api_key],
                |row| {
                    Ok(EmployeeIdentity {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        employee_code: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(identity)
    }

    /// Bump `last_seen` without touching presence. The MAX guard keeps it
    /// monotonic under duplicate or delayed delivery; SQLite's fixed
    /// timestamp format compares correctly as text.
    pub async fn touch_last_seen(&self, id: &str) -> Result<()> {
        let db = self.db.lock().await;
        db.execute(
            "UPDATE employees SET
                last_seen = MAX(COALESCE(last_seen, ''), CURRENT_TIMESTAMP),
                updated_at = CURRENT_TIMESTAMP
             WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }
}
