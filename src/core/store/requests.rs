use anyhow::Result;
use rusqlite::{OptionalExtension, Row, params};

use super::Store;
use super::types::{AgentRequestOverview, AgentRequestRecord, RequestStatus, RequestType};

/// Result of an operator decision write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespondOutcome {
    /// The pending row was transitioned to the decision.
    Updated,
    /// The row exists but is already terminal; nothing was written.
    NotPending,
    NotFound,
}

fn request_from_row(row: &Row) -> rusqlite::Result<AgentRequestRecord> {
    Ok(AgentRequestRecord {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        request_type: row.get(2)?,
        status: row.get(3)?,
        reason: row.get(4)?,
        created_at: row.get(5)?,
        responded_at: row.get(6)?,
    })
}

impl Store {
    /// Submit a permission ask. Idempotent while a request for the same
    /// (employee, type) pair is still pending: the existing id is returned
    /// and no second row is created. Once the prior request is terminal a
    /// fresh submit opens a new row.
    ///
    /// Returns `(request_id, already_pending)`.
    pub async fn submit_request(
        &self,
        employee_id: &str,
        request_type: RequestType,
    ) -> Result<(String, bool)> {
        let db = self.db.lock().await;
        let existing: Option<String> = db
            .query_row(
                "SELECT id FROM agent_requests
                 WHERE employee_id = ?1 AND request_type = ?2 AND status = 'pending'",
                params![employee_id, request_type],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok((id, true));
        }

        let id = uuid::Uuid::new_v4().to_string();
        db.execute(
            "INSERT INTO agent_requests (id, employee_id, request_type, status)
             VALUES (?1, ?2, ?3, 'pending')",
            params![id, employee_id, request_type],
        )?;
        Ok((id, false))
    }

    /// Ownership is part of the lookup: a request id belonging to another
    /// employee is indistinguishable from a nonexistent one.
    pub async fn get_request_for_employee(
        &self,
        request_id: &str,
        employee_id: &str,
    ) -> Result<Option<AgentRequestRecord>> {
        let db = self.db.lock().await;
        let record = db
            .query_row(
                "SELECT id, employee_id, request_type, status, reason, created_at, responded_at
                 FROM agent_requests WHERE id = ?1 AND employee_id = ?2",
                params![request_id, employee_id],
                request_from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// Operator decision. A compare-and-swap conditioned on the row still
    /// being pending: an already-terminal row is left untouched and reported
    /// as `NotPending`.
    pub async fn respond_to_request(
        &self,
        request_id: &str,
        decision: RequestStatus,
        reason: Option<&str>,
    ) -> Result<RespondOutcome> {
        debug_assert_ne!(decision, RequestStatus::Pending);
        let db = self.db.lock().await;
        let updated = db.execute(
            "UPDATE agent_requests
             SET status = ?2, reason = ?3, responded_at = CURRENT_TIMESTAMP
             WHERE id = ?1 AND status = 'pending'",
            params![request_id, decision, reason],
        )?;
        if updated > 0 {
            return Ok(RespondOutcome::Updated);
        }
        let exists: i64 = db.query_row(
            "SELECT COUNT(*) FROM agent_requests WHERE id = ?1",
            params![request_id],
            |row| row.get(0),
        )?;
        Ok(if exists > 0 {
            RespondOutcome::NotPending
        } else {
            RespondOutcome::NotFound
        })
    }

    /// Every request ever made, newest first, joined with the owning
    /// employee for the operator review list. Requests are never deleted;
    /// they are the audit trail.
    pub async fn list_requests(&self) -> Result<Vec<AgentRequestOverview>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT r.id, r.employee_id, e.name, e.employee_code, r.request_type,
                    r.status, r.reason, r.created_at, r.responded_at
             FROM agent_requests r JOIN employees e ON e.id = r.employee_id
             ORDER BY r.created_at DESC, r.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AgentRequestOverview {
                id: row.get(0)?,
                employee_id: row.get(1)?,
                employee_name: row.get(2)?,
                employee_code: row.get(3)?,
                request_type: row.get(4)?,
                status: row.get(5)?,
                reason: row.get(6)?,
                created_at: row.get(7)?,
                responded_at: row.get(8)?,
            })
        })?;
        let mut requests = Vec::new();
        for row in rows {
            requests.push(row?);
        }
        Ok(requests)
    }

    pub async fn pending_request_count(&self) -> Result<u64> {
        let db = self.db.lock().await;
        let count: i64 = db.query_row(
            "SELECT COUNT(*) FROM agent_requests WHERE status = 'pending'",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_store;
    use super::*;

    #[tokio::test]
    async fn duplicate_submit_returns_same_id_while_pending() {
        let store = test_store();
        let emp = store
            .create_employee("Dana", "EMP-300", None)
            .await
            .unwrap();

        let (id1, already1) = store
            .submit_request(&emp.id, RequestType::Close)
            .await
            .unwrap();
        let (id2, already2) = store
            .submit_request(&emp.id, RequestType::Close)
            .await
            .unwrap();
        assert_eq!(id1, id2);
        assert!(!already1);
        assert!(already2);
        assert_eq!(store.pending_request_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn different_request_types_are_independent() {
        let store = test_store();
        let emp = store.create_employee("Sam", "EMP-301", None).await.unwrap();
        let (close_id, _) = store
            .submit_request(&emp.id, RequestType::Close)
            .await
            .unwrap();
        let (uninstall_id, already) = store
            .submit_request(&emp.id, RequestType::Uninstall)
            .await
            .unwrap();
        assert_ne!(close_id, uninstall_id);
        assert!(!already);
        assert_eq!(store.pending_request_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn resubmit_after_terminal_creates_new_row() {
        let store = test_store();
        let emp = store.create_employee("Lee", "EMP-302", None).await.unwrap();
        let (first, _) = store
            .submit_request(&emp.id, RequestType::Close)
            .await
            .unwrap();
        store
            .respond_to_request(&first, RequestStatus::Denied, Some("not now"))
            .await
            .unwrap();

        let (second, already) = store
            .submit_request(&emp.id, RequestType::Close)
            .await
            .unwrap();
        assert_ne!(first, second);
        assert!(!already);

        let all = store.list_requests().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn approve_sets_terminal_state_and_responded_at() {
        let store = test_store();
        let emp = store.create_employee("Ana", "EMP-303", None).await.unwrap();
        let (id, _) = store
            .submit_request(&emp.id, RequestType::Uninstall)
            .await
            .unwrap();

        let outcome = store
            .respond_to_request(&id, RequestStatus::Approved, None)
            .await
            .unwrap();
        assert_eq!(outcome, RespondOutcome::Updated);

        let req = store
            .get_request_for_employee(&id, &emp.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(req.status, RequestStatus::Approved);
        assert!(req.responded_at.is_some());
        assert_eq!(store.pending_request_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn second_response_is_a_conflict_and_leaves_row_untouched() {
        let store = test_store();
        let emp = store.create_employee("Kim", "EMP-304", None).await.unwrap();
        let (id, _) = store
            .submit_request(&emp.id, RequestType::Close)
            .await
            .unwrap();
        store
            .respond_to_request(&id, RequestStatus::Approved, None)
            .await
            .unwrap();

        let outcome = store
            .respond_to_request(&id, RequestStatus::Denied, Some("changed my mind"))
            .await
            .unwrap();
        assert_eq!(outcome, RespondOutcome::NotPending);

        let req = store
            .get_request_for_employee(&id, &emp.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(req.status, RequestStatus::Approved);
        assert!(req.reason.is_none());
    }

    #[tokio::test]
    async fn respond_to_unknown_request_is_not_found() {
        let store = test_store();
        let outcome = store
            .respond_to_request("ghost", RequestStatus::Approved, None)
            .await
            .unwrap();
        assert_eq!(outcome, RespondOutcome::NotFound);
    }

    #[tokio::test]
    async fn cross_employee_lookup_is_indistinguishable_from_missing() {
        let store = test_store();
        let owner = store
            .create_employee("Owner", "EMP-305", None)
            .await
            .unwrap();
        let other = store
            .create_employee("Other", "EMP-306", None)
            .await
            .unwrap();
        let (id, _) = store
            .submit_request(&owner.id, RequestType::Close)
            .await
            .unwrap();

        assert!(
            store
                .get_request_for_employee(&id, &other.id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .get_request_for_employee(&id, &owner.id)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn list_requests_includes_employee_details() {
        let store = test_store();
        let emp = store
            .create_employee("Dana Reyes", "EMP-307", None)
            .await
            .unwrap();
        store
            .submit_request(&emp.id, RequestType::Close)
            .await
            .unwrap();

        let all = store.list_requests().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].employee_name, "Dana Reyes");
        assert_eq!(all[0].employee_code, "EMP-307");
        assert_eq!(all[0].status, RequestStatus::Pending);
    }
}
