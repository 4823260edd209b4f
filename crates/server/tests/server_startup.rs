//! Spawns the real binary and exercises it over TCP.

use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tempfile::{NamedTempFile, TempDir};
use tokio::time::sleep;

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn write_config(port: u16, root: &std::path::Path) -> NamedTempFile {
    let config = format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[database]
path = "{}"

[storage]
output_dir = "{}"
temp_dir = "{}"
input_dir = "{}"

[executor]
workers = 2
"#,
        port,
        root.join("geoprofile.db").display(),
        root.join("output").display(),
        root.join("temp").display(),
        root.join("input").display(),
    );

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

async fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_geoprofile"))
        .env("GEOPROFILE_CONFIG", config_path)
        .env("RUST_LOG", "error")
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/_health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

async fn start_test_server() -> (u16, tokio::process::Child, TempDir, NamedTempFile) {
    let port = get_available_port();
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir_all(temp_dir.path().join("input")).unwrap();

    let config_file = write_config(port, temp_dir.path());
    let server = spawn_server(config_file.path()).await;

    assert!(
        wait_for_server(port, 100).await,
        "Server did not start in time"
    );

    (port, server, temp_dir, config_file)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (port, mut server, _temp_dir, _config) = start_test_server().await;

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/_health", port))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["status"], "OK");

    server.kill().await.ok();
}

#[tokio::test]
async fn test_status_unknown_ticket_returns_404() {
    let (port, mut server, _temp_dir, _config) = start_test_server().await;

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/status/not-a-ticket", port))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_profile_path_missing_file_returns_400() {
    let (port, mut server, _temp_dir, _config) = start_test_server().await;

    let client = Client::new();
    let response = client
        .post(format!("http://127.0.0.1:{}/profile/path/vector", port))
        .form(&[("resource", "/nonexistent/path.shp"), ("response", "prompt")])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "File not found");

    server.kill().await.ok();
}

#[tokio::test]
async fn test_index_serves_endpoint_inventory() {
    let (port, mut server, _temp_dir, _config) = start_test_server().await;

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/", port))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["name"], "geoprofile");
    assert!(json["endpoints"].as_array().unwrap().iter().any(|e| e
        .as_str()
        .unwrap()
        .contains("/status/")));

    server.kill().await.ok();
}
