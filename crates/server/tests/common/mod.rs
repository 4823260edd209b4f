//! Common test utilities for in-process API testing.
//!
//! The fixture assembles the full application (store, executor, publisher,
//! router) around a controllable mock processor, so tests exercise real
//! request handling without external tooling.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use geoprofile_core::testing::MockProcessor;
use geoprofile_core::{
    create_executor, Config, DatabaseConfig, ExecutorConfig, Processor, ProcessorConfig,
    ResultPublisher, ServerConfig, SqliteTicketStore, StorageConfig, TicketStore,
};
use geoprofile_server::api::create_router;
use geoprofile_server::state::AppState;

pub const BOUNDARY: &str = "X-FIXTURE-BOUNDARY";

/// Test fixture wiring the API against a mock processor.
pub struct TestFixture {
    pub router: Router,
    pub processor: Arc<MockProcessor>,
    pub store: Arc<dyn TicketStore>,
    pub output_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub input_dir: PathBuf,
    /// Root holding all fixture directories; removed on drop.
    pub temp_dir: TempDir,
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }
}

impl TestFixture {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_dir = temp_dir.path().join("output");
        let scratch_dir = temp_dir.path().join("temp");
        let input_dir = temp_dir.path().join("input");
        for dir in [&output_dir, &scratch_dir, &input_dir] {
            std::fs::create_dir_all(dir).expect("Failed to create fixture dir");
        }

        let config = Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            storage: StorageConfig {
                output_dir: output_dir.clone(),
                temp_dir: scratch_dir.clone(),
                input_dir: input_dir.clone(),
            },
            executor: ExecutorConfig {
                workers: 2,
                queue_size: 16,
            },
            processor: ProcessorConfig::default(),
            cors: None,
        };

        let store: Arc<dyn TicketStore> =
            Arc::new(SqliteTicketStore::in_memory().expect("Failed to create ticket store"));
        let processor = Arc::new(MockProcessor::new());

        let publisher = Arc::new(ResultPublisher::new(
            Arc::clone(&store),
            output_dir.clone(),
        ));
        let (executor, runner) = create_executor(
            &config.executor,
            Arc::clone(&processor) as Arc<dyn Processor>,
            publisher,
        );
        tokio::spawn(runner.run());

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&store),
            Arc::clone(&processor) as Arc<dyn Processor>,
            executor,
        ));
        let router = create_router(state);

        Self {
            router,
            processor,
            store,
            output_dir,
            scratch_dir,
            input_dir,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a multipart POST with optional `resource` file and plain fields.
    pub async fn post_multipart(
        &self,
        path: &str,
        file: Option<(&str, &[u8])>,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let body = multipart_body(file, fields);
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Send a urlencoded POST.
    pub async fn post_form(&self, path: &str, pairs: &[(&str, &str)]) -> TestResponse {
        let body = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencode(k), urlencode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            bytes,
        }
    }

    /// Poll `/status/{ticket}` until the job is terminal, returning the
    /// final status body.
    pub async fn wait_for_completion(&self, ticket: &str) -> Value {
        for _ in 0..150 {
            let response = self.get(&format!("/status/{}", ticket)).await;
            assert_eq!(response.status, StatusCode::OK);
            let body = response.json();
            if body["completed"] == true {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("ticket {} never completed", ticket);
    }

    /// Workspace directories currently present under a namespace.
    pub fn workspaces(&self, namespace: &str) -> Vec<PathBuf> {
        let dir = self.scratch_dir.join(namespace);
        if !dir.is_dir() {
            return Vec::new();
        }
        std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect()
    }
}

fn multipart_body(file: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some((filename, content)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"resource\"; \
                 filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn urlencode(value: &str) -> String {
    let mut out = String::new();
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
