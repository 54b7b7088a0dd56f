//! End-to-end tests for the scan, summary, and category endpoints.
//!
//! Each test starts the full Axum app on a random port, backed by the JSON
//! mail fixture and a tracker file inside a temporary directory.
//!
//! Run with: `cargo test --test scan_pipeline_test`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jobtrack::config::{AppConfig, MailSourceKind, TABLE_HEADERS};
use jobtrack::models::email::RawEmail;
use jobtrack::services::mail::FixtureSource;
use jobtrack::AppState;
use reqwest::{Client, StatusCode, Url};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample_emails.json");

struct TestServer {
    base: String,
    client: Client,
    tracker: PathBuf,
    _dir: TempDir,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spin up the app on a random port with `source` as the mailbox.
async fn start_server(source: FixtureSource) -> TestServer {
    let dir = TempDir::new().expect("tempdir");
    let tracker = dir.path().join("job_applications.csv");

    let config = AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        tracker_path: tracker.clone(),
        mail_source: MailSourceKind::Fixture,
        mail_fixture_path: Some(PathBuf::from(FIXTURE)),
        ..AppConfig::default()
    };
    let state = AppState::new(config, Arc::new(source)).expect("state");
    let app = jobtrack::routes::router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    TestServer {
        base: format!("http://{addr}"),
        client: Client::new(),
        tracker,
        _dir: dir,
        _handle: handle,
    }
}

async fn fixture_server() -> TestServer {
    start_server(FixtureSource::from_path(Path::new(FIXTURE)).expect("fixture")).await
}

/// Extract `data` from an API response, panicking on error.
fn extract_data(body: &Value) -> &Value {
    if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
        panic!(
            "API error: {}: {}",
            err["code"].as_str().unwrap_or("?"),
            err["message"].as_str().unwrap_or("?"),
        );
    }
    body.get("data").expect("missing 'data' field")
}

impl TestServer {
    async fn scan(&self, body: Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(format!("{}/api/v1/scan", self.base))
            .json(&body)
            .send()
            .await
            .expect("scan request");
        let status = resp.status();
        (status, resp.json().await.expect("scan body"))
    }

    async fn summary(&self, table_path: Option<&Path>) -> (StatusCode, Value) {
        let mut url = Url::parse(&format!("{}/api/v1/summary", self.base)).expect("url");
        if let Some(path) = table_path {
            url.query_pairs_mut()
                .append_pair("table_path", &path.display().to_string());
        }
        let resp = self.client.get(url).send().await.expect("summary request");
        let status = resp.status();
        (status, resp.json().await.expect("summary body"))
    }
}

fn march_range() -> Value {
    json!({ "start_date": "2024-03-01", "end_date": "2024-03-31" })
}

#[tokio::test]
async fn scan_summary_and_rescan() {
    let server = fixture_server().await;

    // 1. First scan records every fixture email
    let (status, body) = server.scan(march_range()).await;
    assert_eq!(status, StatusCode::OK, "scan failed: {body}");
    let data = extract_data(&body);
    assert_eq!(data["source"], "fixture");
    assert_eq!(data["processed"], 4);
    assert_eq!(data["inserted_count"], 4);
    assert_eq!(data["duplicates"], 0);
    assert_eq!(data["errors"], 0);

    let breakdown: Vec<(String, u64)> = data["category_breakdown"]
        .as_array()
        .expect("breakdown")
        .iter()
        .map(|c| {
            (
                c["status"].as_str().expect("status").to_string(),
                c["count"].as_u64().expect("count"),
            )
        })
        .collect();
    assert_eq!(
        breakdown,
        vec![
            ("application_received".to_string(), 1),
            ("rejection".to_string(), 1),
            ("interview".to_string(), 1),
            ("offer".to_string(), 1),
        ]
    );

    // 2. Tracker file holds the header plus one row per email
    let contents = std::fs::read_to_string(&server.tracker).expect("tracker file");
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some(TABLE_HEADERS.join(",").as_str()));
    let first = lines.next().expect("first row");
    assert!(first.starts_with("Acmecorp,"), "unexpected row: {first}");
    assert!(first.contains("2024-03-05"));
    assert!(first.contains("msg-acme-001"));
    assert_eq!(lines.count(), 3);

    // 3. Summary reflects the four statuses
    let (status, body) = server.summary(None).await;
    assert_eq!(status, StatusCode::OK, "summary failed: {body}");
    let data = extract_data(&body);
    assert_eq!(data["total"], 4);
    let shares = data["by_status"].as_array().expect("by_status");
    assert_eq!(shares.len(), 4);
    for share in shares {
        assert_eq!(share["count"], 1);
        assert_eq!(share["percentage"], 25.0);
    }
    assert_eq!(data["file_path"], server.tracker.display().to_string());

    // 4. Rescanning the same range adds nothing
    let (status, body) = server.scan(march_range()).await;
    assert_eq!(status, StatusCode::OK);
    let data = extract_data(&body);
    assert_eq!(data["processed"], 4);
    assert_eq!(data["inserted_count"], 0);
    assert_eq!(data["duplicates"], 4);

    let (_, body) = server.summary(None).await;
    assert_eq!(extract_data(&body)["total"], 4);
}

#[tokio::test]
async fn scan_into_requested_tracker() {
    let server = fixture_server().await;
    let other = server.tracker.with_file_name("nested").join("other.csv");

    let mut request = march_range();
    request["table_path"] = json!(other.display().to_string());
    let (status, body) = server.scan(request).await;
    assert_eq!(status, StatusCode::OK, "scan failed: {body}");
    assert_eq!(extract_data(&body)["table_path"], other.display().to_string());

    assert!(other.exists());
    assert!(!server.tracker.exists());

    let (status, body) = server.summary(Some(&other)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(extract_data(&body)["total"], 4);
}

#[tokio::test]
async fn scan_with_no_matching_emails_is_no_data() {
    let server = start_server(FixtureSource::new(Vec::new())).await;

    let (status, body) = server.scan(march_range()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NO_DATA");
    assert_eq!(
        body["error"]["message"],
        "No job application emails found in the specified date range."
    );
    assert!(!server.tracker.exists());
}

#[tokio::test]
async fn scan_rejects_bad_input() {
    let server = fixture_server().await;

    let (status, body) = server
        .scan(json!({ "start_date": "03/01/2024", "end_date": "2024-03-31" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = server
        .scan(json!({ "start_date": "2024-03-31", "end_date": "2024-03-01" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let mut request = march_range();
    request["table_path"] = json!(server.tracker.with_extension("xlsx").display().to_string());
    let (status, body) = server.scan(request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "PERSISTENCE_ERROR");
}

#[tokio::test]
async fn summary_of_missing_or_empty_tracker() {
    let server = fixture_server().await;

    let (status, body) = server.summary(None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    std::fs::write(&server.tracker, format!("{}\n", TABLE_HEADERS.join(","))).expect("write");
    let (status, body) = server.summary(None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NO_DATA");
    assert_eq!(body["error"]["message"], "No applications found in tracker file");
}

#[tokio::test]
async fn added_pattern_changes_classification() {
    let email = RawEmail {
        subject: "Assessment invitation".to_string(),
        sender: "talent@hooli.com".to_string(),
        body: "Please complete the take-home assessment by Friday.".to_string(),
        date_header: "Mon, 04 Mar 2024 08:00:00 +0000".to_string(),
        message_id: "msg-hooli-005".to_string(),
    };
    let server = start_server(FixtureSource::new(vec![email])).await;

    let resp = server
        .client
        .get(format!("{}/api/v1/categories", server.base))
        .send()
        .await
        .expect("categories request");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("categories body");
    let names: Vec<&str> = extract_data(&body)
        .as_array()
        .expect("categories")
        .iter()
        .map(|c| c["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["application_received", "rejection", "interview", "offer"]);

    let resp = server
        .client
        .post(format!("{}/api/v1/categories/patterns", server.base))
        .json(&json!({ "category": "assessment", "pattern": r"take-home\s+assessment" }))
        .send()
        .await
        .expect("add pattern request");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("add pattern body");
    let categories = extract_data(&body).as_array().expect("categories");
    assert_eq!(categories.len(), 5);
    assert_eq!(categories[4]["name"], "assessment");

    let (status, body) = server.scan(march_range()).await;
    assert_eq!(status, StatusCode::OK, "scan failed: {body}");
    let breakdown = &extract_data(&body)["category_breakdown"];
    assert_eq!(breakdown[0]["status"], "assessment");
    assert_eq!(breakdown[0]["count"], 1);

    let resp = server
        .client
        .post(format!("{}/api/v1/categories/patterns", server.base))
        .json(&json!({ "category": "assessment", "pattern": "(unclosed" }))
        .send()
        .await
        .expect("invalid pattern request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("invalid pattern body");
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn health_probes() {
    let server = fixture_server().await;

    let resp = server
        .client
        .get(format!("{}/health/live", server.base))
        .send()
        .await
        .expect("live request");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("live body"), "OK");

    let resp = server
        .client
        .get(format!("{}/health/ready", server.base))
        .send()
        .await
        .expect("ready request");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("ready body");
    let data = extract_data(&body);
    assert_eq!(data["mail_source"], "fixture");
    assert_eq!(data["tracker_exists"], false);
    assert_eq!(data["tracker_writable"], true);
}
