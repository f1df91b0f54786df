use tokio::sync::broadcast;

/// One committed record mutation, fanned out to operator clients so the
/// dashboard can re-render live state without polling. Writers never block
/// on slow consumers; a lagging receiver sees a lag marker and re-fetches.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChangeEvent {
    pub entity: &'static str,
    pub action: &'static str,
    pub id: String,
}

impl ChangeEvent {
    pub fn inserted(entity: &'static str, id: impl Into<String>) -> Self {
        Self {
            entity,
            action: "insert",
            id: id.into(),
        }
    }

    pub fn updated(entity: &'static str, id: impl Into<String>) -> Self {
        Self {
            entity,
            action: "update",
            id: id.into(),
        }
    }

    pub fn deleted(entity: &'static str, id: impl Into<String>) -> Self {
        Self {
            entity,
            action: "delete",
            id: id.into(),
        }
    }
}

pub type EventSender = broadcast::Sender<ChangeEvent>;

pub fn channel() -> EventSender {
    let (tx, _) = broadcast::channel(256);
    tx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_subscribers() {
        let tx = channel();
        let mut rx = tx.subscribe();
        tx.send(ChangeEvent::inserted("employees", "abc")).unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(event.entity, "employees");
        assert_eq!(event.action, "insert");
        assert_eq!(event.id, "abc");
    }

    #[test]
    fn send_without_subscribers_is_not_an_error_path() {
        let tx = channel();
        // broadcast::send errs with no receivers; callers ignore the result.
        assert!(tx.send(ChangeEvent::updated("employees", "x")).is_err());
    }

    #[test]
    fn serializes_to_flat_json() {
        let event = ChangeEvent::deleted("agent_requests", "r1");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["entity"], "agent_requests");
        assert_eq!(json["action"], "delete");
        assert_eq!(json["id"], "r1");
    }
}
