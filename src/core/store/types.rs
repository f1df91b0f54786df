use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};

/// Presence of an employee as shown on the dashboard. Derived from activity
/// reports; `offline` is only ever written at creation time or by an
/// explicit operator edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Idle,
    Offline,
}

impl PresenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceStatus::Online => "online",
            PresenceStatus::Idle => "idle",
            PresenceStatus::Offline => "offline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "online" => Some(PresenceStatus::Online),
            "idle" => Some(PresenceStatus::Idle),
            "offline" => Some(PresenceStatus::Offline),
            _ => None,
        }
    }
}

/// Status as self-reported by the agent on each activity sample. Two-valued;
/// the three-valued presence is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Working,
    Idle,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Working => "working",
            ReportStatus::Idle => "idle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "working" => Some(ReportStatus::Working),
            "idle" => Some(ReportStatus::Idle),
            _ => None,
        }
    }

    /// Presence transition applied by activity ingestion: `working` maps to
    /// `online`, `idle` maps to `idle`. Nothing maps to `offline`.
    pub fn presence(self) -> PresenceStatus {
        match self {
            ReportStatus::Working => PresenceStatus::Online,
            ReportStatus::Idle => PresenceStatus::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Close,
    Uninstall,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Close => "close",
            RequestType::Uninstall => "uninstall",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "close" => Some(RequestType::Close),
            "uninstall" => Some(RequestType::Uninstall),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Denied => "denied",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "denied" => Some(RequestStatus::Denied),
            _ => None,
        }
    }
}

macro_rules! sql_enum {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(self.as_str().into())
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                Self::parse(value.as_str()?).ok_or(FromSqlError::InvalidType)
            }
        }
    };
}

sql_enum!(PresenceStatus);
sql_enum!(ReportStatus);
sql_enum!(RequestType);
sql_enum!(RequestStatus);

/// Full employee row, including the API key (operator surfaces only).
#[derive(Debug, Clone, serde::Serialize)]
pub struct EmployeeRecord {
    pub id: String,
    pub name: String,
    pub employee_code: String,
    pub device_name: Option<String>,
    pub api_key: String,
    pub status: PresenceStatus,
    pub current_app: Option<String>,
    pub last_seen: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Minimal identity handed to request handlers after API key resolution.
#[derive(Debug, Clone)]
pub struct EmployeeIdentity {
    pub id: String,
    pub name: String,
    pub employee_code: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ActivityLogRecord {
    pub id: String,
    pub employee_id: String,
    pub app_name: String,
    pub status: ReportStatus,
    pub duration_seconds: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ScreenshotRecord {
    pub id: String,
    pub employee_id: String,
    pub image_path: String,
    pub created_at: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AgentRequestRecord {
    pub id: String,
    pub employee_id: String,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub reason: Option<String>,
    pub created_at: String,
    pub responded_at: Option<String>,
}

/// Request row joined with the owning employee, for the operator review list.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AgentRequestOverview {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub employee_code: String,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub reason: Option<String>,
    pub created_at: String,
    pub responded_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_status_maps_to_presence() {
        assert_eq!(ReportStatus::Working.presence(), PresenceStatus::Online);
        assert_eq!(ReportStatus::Idle.presence(), PresenceStatus::Idle);
    }

    #[test]
    fn enums_roundtrip_through_strings() {
        assert_eq!(PresenceStatus::parse("online"), Some(PresenceStatus::Online));
        assert_eq!(PresenceStatus::parse("gone"), None);
        assert_eq!(ReportStatus::parse("working"), Some(ReportStatus::Working));
        assert_eq!(ReportStatus::parse("offline"), None);
        assert_eq!(RequestType::parse("uninstall"), Some(RequestType::Uninstall));
        assert_eq!(RequestType::parse("restart"), None);
        assert_eq!(RequestStatus::parse("denied"), Some(RequestStatus::Denied));
        assert_eq!(RequestStatus::Denied.as_str(), "denied");
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&PresenceStatus::Online).unwrap(),
            "\"online\""
        );
        assert_eq!(
            serde_json::from_str::<RequestType>("\"close\"").unwrap(),
            RequestType::Close
        );
    }
}
