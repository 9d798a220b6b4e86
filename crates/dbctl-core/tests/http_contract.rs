//! HTTP contract tests for DatabaseAdminClient against a mock control plane

use std::fs;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use dbctl_core::console::CapturedOutput;
use dbctl_core::{
    Console, Credentials, DatabaseAdminClient, FAILURE, HttpDatabaseApi, LocalConfigStore,
    SUCCESS, StaticCredentials,
};
use serde_json::json;
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "/v1alpha1/acme/databases";

fn client() -> (DatabaseAdminClient, CapturedOutput) {
    let (console, captured) = Console::capture();
    let client = DatabaseAdminClient::new(
        Arc::new(HttpDatabaseApi::new().unwrap()),
        Arc::new(StaticCredentials::new(Credentials::new("tok-123", "acme"))),
    )
    .with_console(console);
    (client, captured)
}

fn instance(name: &str, status: &str) -> serde_json::Value {
    json!({
        "PostgresInstanceName": name,
        "Status": status,
        "HostName": format!("{}.pg.dbos.dev", name),
        "Port": 5432,
        "DatabaseUsername": "dbos_admin",
    })
}

// ============================================================================
// Request shape
// ============================================================================

#[tokio::test]
async fn create_posts_credentials_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/userdb", BASE)))
        .and(header("authorization", "Bearer tok-123"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "Name": "orders",
            "AdminName": "admin",
            "AdminPassword": "Pa$$w0rd!",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (client, captured) = client();
    let code = client
        .create_database(&server.uri(), "orders", "admin", "Pa$$w0rd!", false)
        .await;

    assert_eq!(code, SUCCESS);
    assert_eq!(captured.lines(), vec!["Database orders creation requested"]);
}

#[tokio::test]
async fn link_posts_provenance_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/byod", BASE)))
        .and(body_json(json!({
            "Name": "legacy",
            "HostName": "pg.internal.example.com",
            "Port": 6543,
            "Password": "linkpass1",
            "captureProvenance": true,
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client();
    let code = client
        .link_existing_database(
            &server.uri(),
            "legacy",
            "pg.internal.example.com",
            6543,
            "linkpass1",
            true,
        )
        .await;
    assert_eq!(code, SUCCESS);
}

#[tokio::test]
async fn delete_and_unlink_use_separate_paths() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/userdb/orders", BASE)))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/byod/legacy", BASE)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client();
    assert_eq!(client.delete_database(&server.uri(), "orders").await, SUCCESS);
    assert_eq!(client.unlink_database(&server.uri(), "legacy").await, SUCCESS);
}

#[tokio::test]
async fn reset_credentials_posts_password() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/userdb/orders/credentials", BASE)))
        .and(body_json(json!({ "Password": "fresh-pass-9" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client();
    assert_eq!(
        client.reset_credentials(&server.uri(), "orders", "fresh-pass-9").await,
        SUCCESS
    );
}

#[tokio::test]
async fn restore_sends_iso_timestamp() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/userdb/orders/restore", BASE)))
        .and(body_json(json!({
            "RestoreName": "orders-restored",
            "RestoreTimestamp": "2024-03-15T08:00:00.250Z",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let timestamp = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap()
        + chrono::Duration::milliseconds(250);
    let (client, _) = client();
    assert_eq!(
        client
            .restore_database(&server.uri(), "orders", "orders-restored", timestamp, false)
            .await,
        SUCCESS
    );
}

// ============================================================================
// Output
// ============================================================================

#[tokio::test]
async fn get_prints_fixed_lines() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/userdb/info/orders", BASE)))
        .respond_with(ResponseTemplate::new(200).set_body_json(instance("orders", "available")))
        .mount(&server)
        .await;

    let (client, captured) = client();
    assert_eq!(client.get_database(&server.uri(), "orders", false).await, SUCCESS);
    assert_eq!(
        captured.lines(),
        vec![
            "Postgres Instance Name: orders",
            "Status: available",
            "Host Name: orders.pg.dbos.dev",
            "Port: 5432",
            "Database Username: dbos_admin",
        ]
    );
}

#[tokio::test]
async fn list_json_is_one_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BASE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            instance("a", "available"),
            instance("b", "backing-up"),
        ])))
        .mount(&server)
        .await;

    let (client, captured) = client();
    assert_eq!(client.list_databases(&server.uri(), true).await, SUCCESS);

    let lines = captured.lines();
    assert_eq!(lines.len(), 1);
    let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(parsed[1]["Status"], "backing-up");
    assert!(!lines[0].contains("Postgres Instance Name:"));
}

#[tokio::test]
async fn list_empty_reports_no_instances() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BASE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (client, captured) = client();
    assert_eq!(client.list_databases(&server.uri(), false).await, SUCCESS);
    assert_eq!(captured.lines(), vec!["No Postgres database instances found"]);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn invalid_password_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, captured) = client();
    assert_eq!(
        client.create_database(&server.uri(), "orders", "admin", "bad pass word", false).await,
        FAILURE
    );
    assert_eq!(
        client.reset_credentials(&server.uri(), "orders", "p@ssword123").await,
        FAILURE
    );
    assert!(captured.contents().is_empty());
}

#[tokio::test]
async fn structured_error_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/userdb", BASE)))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "database orders already exists",
            "statusCode": 409,
            "requestID": "req-42",
        })))
        .mount(&server)
        .await;

    let (client, captured) = client();
    let code = client
        .create_database(&server.uri(), "orders", "admin", "password1", false)
        .await;
    assert_eq!(code, FAILURE);
    assert!(captured.contents().is_empty());
}

#[tokio::test]
async fn get_instance_info_surfaces_structured_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/userdb/info/missing", BASE)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "not found",
            "code": "NOT_FOUND",
        })))
        .mount(&server)
        .await;

    let (client, _) = client();
    let err = client
        .get_instance_info(&server.uri(), "missing")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        dbctl_core::error::describe_failure("Failed to get database missing", &err),
        "Failed to get database missing: not found"
    );
}

#[tokio::test]
async fn unstructured_error_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BASE))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let (client, _) = client();
    assert_eq!(client.list_databases(&server.uri(), false).await, FAILURE);
}

#[tokio::test]
async fn undecodable_body_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/userdb/info/orders", BASE)))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let (client, _) = client();
    assert_eq!(client.get_database(&server.uri(), "orders", true).await, FAILURE);
}

#[tokio::test]
async fn transport_error_fails() {
    let (client, _) = client();
    assert_eq!(client.delete_database("http://127.0.0.1:1", "orders").await, FAILURE);
}

// ============================================================================
// Local config
// ============================================================================

#[tokio::test]
async fn connect_updates_local_config() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/userdb/info/orders", BASE)))
        .respond_with(ResponseTemplate::new(200).set_body_json(instance("orders", "available")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("dbos-config.yaml");
    let original = "name: orders-app\nlanguage: python\ndatabase:\n  hostname: localhost\n  port: 5432\n  username: postgres\n  sys_db_name: orders_sys\n";
    fs::write(&config_path, original).unwrap();

    let (client, _) = client();
    let client = client.with_local_config(LocalConfigStore::new(&config_path));
    assert_eq!(
        client.connect_local_config(&server.uri(), "orders", "conn-pass-1").await,
        SUCCESS
    );

    let db = LocalConfigStore::new(&config_path)
        .load()
        .unwrap()
        .database()
        .unwrap()
        .unwrap();
    assert_eq!(db.hostname.as_deref(), Some("orders.pg.dbos.dev"));
    assert_eq!(db.port, Some(5432));
    assert_eq!(db.username.as_deref(), Some("dbos_admin"));
    assert_eq!(db.password.as_deref(), Some("conn-pass-1"));

    let rewritten = fs::read_to_string(&config_path).unwrap();
    assert!(rewritten.contains("sys_db_name: orders_sys"));
    assert!(rewritten.contains("language: python"));

    let backup = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| {
            let name = p.file_name().unwrap().to_string_lossy().into_owned();
            name.starts_with("dbos-config.yaml.") && name.ends_with(".bak")
        })
        .expect("backup file");
    assert_eq!(fs::read(&backup).unwrap(), original.as_bytes());
}

#[tokio::test]
async fn connect_without_local_config_does_not_fetch() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (client, _) = client();
    let client =
        client.with_local_config(LocalConfigStore::new(dir.path().join("dbos-config.yaml")));

    assert_eq!(
        client.connect_local_config(&server.uri(), "orders", "conn-pass-1").await,
        FAILURE
    );
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn connect_fetch_error_keeps_original_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "internal",
            "statusCode": 500,
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("dbos-config.yaml");
    fs::write(&config_path, "name: app\n").unwrap();

    let (client, _) = client();
    let client = client.with_local_config(LocalConfigStore::new(&config_path));
    assert_eq!(
        client.connect_local_config(&server.uri(), "orders", "conn-pass-1").await,
        FAILURE
    );
    assert_eq!(fs::read_to_string(&config_path).unwrap(), "name: app\n");
}
