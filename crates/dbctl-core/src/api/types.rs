//! Wire types for the database endpoints
//!
//! Field names follow the control plane's PascalCase JSON. Request types that
//! carry a password implement `Debug` by hand so the password never reaches a
//! log line.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state reported for an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceStatus {
    Provisioning,
    Available,
    BackingUp,
    Restoring,
    Deleting,
    /// Any status this client does not know about, kept verbatim
    Other(String),
}

impl InstanceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            InstanceStatus::Provisioning => "provisioning",
            InstanceStatus::Available => "available",
            InstanceStatus::BackingUp => "backing-up",
            InstanceStatus::Restoring => "restoring",
            InstanceStatus::Deleting => "deleting",
            InstanceStatus::Other(s) => s,
        }
    }

    /// Ready to accept connections; polling stops here
    pub fn is_ready(&self) -> bool {
        matches!(self, InstanceStatus::Available | InstanceStatus::BackingUp)
    }
}

impl From<String> for InstanceStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "provisioning" => InstanceStatus::Provisioning,
            "available" => InstanceStatus::Available,
            "backing-up" => InstanceStatus::BackingUp,
            "restoring" => InstanceStatus::Restoring,
            "deleting" => InstanceStatus::Deleting,
            _ => InstanceStatus::Other(s),
        }
    }
}

impl From<&str> for InstanceStatus {
    fn from(s: &str) -> Self {
        InstanceStatus::from(s.to_string())
    }
}

impl From<InstanceStatus> for String {
    fn from(status: InstanceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instance detail as returned by the control plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DatabaseInstanceRecord {
    pub postgres_instance_name: String,
    pub status: InstanceStatus,
    pub host_name: String,
    pub port: u16,
    pub database_username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_linked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_time_travel: Option<bool>,
}

impl DatabaseInstanceRecord {
    /// The fixed human-readable rendering used by `get` and `list`
    pub fn display_lines(&self) -> Vec<String> {
        vec![
            format!("Postgres Instance Name: {}", self.postgres_instance_name),
            format!("Status: {}", self.status),
            format!("Host Name: {}", self.host_name),
            format!("Port: {}", self.port),
            format!("Database Username: {}", self.database_username),
        ]
    }
}

/// POST /userdb
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateDatabaseRequest {
    pub name: String,
    pub admin_name: String,
    pub admin_password: String,
}

impl fmt::Debug for CreateDatabaseRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateDatabaseRequest")
            .field("name", &self.name)
            .field("admin_name", &self.admin_name)
            .field("admin_password", &"<redacted>")
            .finish()
    }
}

/// POST /byod
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinkDatabaseRequest {
    pub name: String,
    pub host_name: String,
    pub port: u16,
    pub password: String,
    #[serde(rename = "captureProvenance")]
    pub capture_provenance: bool,
}

impl fmt::Debug for LinkDatabaseRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkDatabaseRequest")
            .field("name", &self.name)
            .field("host_name", &self.host_name)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("capture_provenance", &self.capture_provenance)
            .finish()
    }
}

/// POST /userdb/{name}/credentials
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResetCredentialsRequest {
    pub password: String,
}

impl fmt::Debug for ResetCredentialsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetCredentialsRequest")
            .field("password", &"<redacted>")
            .finish()
    }
}

/// POST /userdb/{name}/restore
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RestoreDatabaseRequest {
    pub restore_name: String,
    /// RFC 3339 timestamp to restore to
    pub restore_timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_deserializes_from_wire() {
        let record: DatabaseInstanceRecord = serde_json::from_value(json!({
            "PostgresInstanceName": "orders",
            "Status": "available",
            "HostName": "orders.example.com",
            "Port": 5432,
            "DatabaseUsername": "dbos_admin",
            "AdminPassword": "ignored-extra-field"
        }))
        .unwrap();

        assert_eq!(record.postgres_instance_name, "orders");
        assert_eq!(record.status, InstanceStatus::Available);
        assert_eq!(record.port, 5432);
        assert_eq!(record.is_linked, None);
    }

    #[test]
    fn test_record_round_trips_optional_flags() {
        let record: DatabaseInstanceRecord = serde_json::from_value(json!({
            "PostgresInstanceName": "byod",
            "Status": "available",
            "HostName": "h",
            "Port": 5432,
            "DatabaseUsername": "u",
            "IsLinked": true,
            "SupportsTimeTravel": false
        }))
        .unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["IsLinked"], true);
        assert_eq!(value["SupportsTimeTravel"], false);
    }

    #[test]
    fn test_unknown_status_preserved() {
        let status = InstanceStatus::from("upgrading");
        assert_eq!(status, InstanceStatus::Other("upgrading".to_string()));
        assert_eq!(status.to_string(), "upgrading");
        assert!(!status.is_ready());
    }

    #[test]
    fn test_ready_statuses() {
        assert!(InstanceStatus::from("available").is_ready());
        assert!(InstanceStatus::from("backing-up").is_ready());
        assert!(!InstanceStatus::from("provisioning").is_ready());
        assert!(!InstanceStatus::from("restoring").is_ready());
    }

    #[test]
    fn test_display_lines() {
        let record = DatabaseInstanceRecord {
            postgres_instance_name: "orders".to_string(),
            status: InstanceStatus::Provisioning,
            host_name: "h.example.com".to_string(),
            port: 5432,
            database_username: "admin".to_string(),
            is_linked: None,
            supports_time_travel: None,
        };
        assert_eq!(
            record.display_lines(),
            vec![
                "Postgres Instance Name: orders",
                "Status: provisioning",
                "Host Name: h.example.com",
                "Port: 5432",
                "Database Username: admin",
            ]
        );
    }

    #[test]
    fn test_request_bodies_use_wire_names() {
        let link = LinkDatabaseRequest {
            name: "ext".to_string(),
            host_name: "pg.example.com".to_string(),
            port: 6543,
            password: "s3cretpass".to_string(),
            capture_provenance: true,
        };
        assert_eq!(
            serde_json::to_value(&link).unwrap(),
            json!({
                "Name": "ext",
                "HostName": "pg.example.com",
                "Port": 6543,
                "Password": "s3cretpass",
                "captureProvenance": true
            })
        );

        let restore = RestoreDatabaseRequest {
            restore_name: "orders-copy".to_string(),
            restore_timestamp: "2026-01-01T00:00:00.000Z".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&restore).unwrap(),
            json!({"RestoreName": "orders-copy", "RestoreTimestamp": "2026-01-01T00:00:00.000Z"})
        );
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let create = CreateDatabaseRequest {
            name: "n".to_string(),
            admin_name: "a".to_string(),
            admin_password: "hunter2hunter2".to_string(),
        };
        let reset = ResetCredentialsRequest {
            password: "hunter2hunter2".to_string(),
        };
        assert!(!format!("{:?}", create).contains("hunter2"));
        assert!(!format!("{:?}", reset).contains("hunter2"));
    }
}
