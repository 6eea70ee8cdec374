//! Integration tests for the `canvass serve` HTTP API.
//!
//! Each test starts the server as a child process on a unique port with its
//! own data directory, makes HTTP requests, and verifies the responses.

use std::io::Read;
use std::net::TcpStream;
use std::path::Path;
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use tempfile::TempDir;

/// Atomic port counter to avoid port conflicts between parallel tests.
/// Base port is derived from process ID so separate test binaries don't
/// collide on the same port range.
static NEXT_PORT: AtomicU16 = AtomicU16::new(0);
static PORT_INIT: std::sync::Once = std::sync::Once::new();

fn next_port() -> u16 {
    PORT_INIT.call_once(|| {
        let base = 20000 + (std::process::id() as u16 % 20000);
        NEXT_PORT.store(base, Ordering::SeqCst);
    });
    NEXT_PORT.fetch_add(1, Ordering::SeqCst)
}

/// A running server that is killed on drop.
struct Server {
    child: Child,
    port: u16,
    data: TempDir,
}

impl Drop for Server {
    fn drop(&mut self) {
        self.child.kill().ok();
        self.child.wait().ok();
    }
}

/// Helper: start `canvass serve` on a fresh port and data directory.
fn start_server(envs: &[(&str, &str)]) -> Server {
    let data = TempDir::new().expect("temp dir");
    let port = next_port();

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_canvass"));
    cmd.arg("--data-dir")
        .arg(data.path())
        .arg("serve")
        .arg("--port")
        .arg(port.to_string());
    for (k, v) in envs {
        cmd.env(k, v);
    }
    cmd.stdout(std::process::Stdio::null());
    cmd.stderr(std::process::Stdio::null());

    let child = cmd.spawn().expect("failed to start canvass serve");
    for _ in 0..50 {
        if TcpStream::connect(format!("127.0.0.1:{}", port)).is_ok() {
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    Server {
        child,
        port,
        data,
    }
}

impl Server {
    fn data_dir(&self) -> &Path {
        self.data.path()
    }

    fn get(&self, path: &str) -> (u16, serde_json::Value) {
        self.request("GET", path, None)
    }

    fn send(&self, method: &str, path: &str, body: &str) -> (u16, serde_json::Value) {
        self.request(method, path, Some(body))
    }

    fn request(&self, method: &str, path: &str, body: Option<&str>) -> (u16, serde_json::Value) {
        let (status, body) = http_request(self.port, method, path, body);
        let json = serde_json::from_str(&body)
            .unwrap_or_else(|e| panic!("invalid JSON from {method} {path} ({e}): {body}"));
        (status, json)
    }
}

/// Helper: make one HTTP/1.1 request and return (status, body).
fn http_request(port: u16, method: &str, path: &str, body: Option<&str>) -> (u16, String) {
    let mut stream = TcpStream::connect(format!("127.0.0.1:{}", port)).expect("failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();

    let request = match body {
        Some(body) => format!(
            "{} {} HTTP/1.1\r\nHost: localhost:{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            method, path, port, body.len(), body
        ),
        None => format!(
            "{} {} HTTP/1.1\r\nHost: localhost:{}\r\nConnection: close\r\n\r\n",
            method, path, port
        ),
    };
    std::io::Write::write_all(&mut stream, request.as_bytes()).expect("failed to write");

    let mut response = String::new();
    let _ = stream.read_to_string(&mut response);

    parse_http_response(&response)
}

/// Parse an HTTP response into (status_code, body).
fn parse_http_response(response: &str) -> (u16, String) {
    let parts: Vec<&str> = response.splitn(2, "\r\n\r\n").collect();
    let headers = parts.first().unwrap_or(&"").to_string();
    let body = parts.get(1).unwrap_or(&"").to_string();

    let status = headers
        .lines()
        .next()
        .unwrap_or("")
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(0);

    let body = if headers.to_ascii_lowercase().contains("transfer-encoding: chunked") {
        decode_chunked(&body)
    } else {
        body
    };

    (status, body)
}

/// Decode chunked transfer encoding.
fn decode_chunked(data: &str) -> String {
    let mut result = String::new();
    let mut remaining = data;

    while let Some(line_end) = remaining.find("\r\n") {
        let size = match usize::from_str_radix(remaining[..line_end].trim(), 16) {
            Ok(s) => s,
            Err(_) => break,
        };
        if size == 0 {
            break;
        }
        let chunk_start = line_end + 2;
        let chunk_end = chunk_start + size;
        if chunk_end > remaining.len() {
            result.push_str(&remaining[chunk_start..]);
            break;
        }
        result.push_str(&remaining[chunk_start..chunk_end]);
        remaining = remaining.get(chunk_end + 2..).unwrap_or("");
    }

    result
}

fn submission(id: &str, group: &str, scale: i64, text: &str) -> String {
    serde_json::json!({
        "submissionId": id,
        "groupId": group,
        "answers": [
            {"questionId": 1, "answer": scale},
            {"questionId": 2, "answer": text}
        ],
        "timestamp": "2025-06-01T09:30:00.000Z"
    })
    .to_string()
}

// ──────────────────────────────────────────────
// Health and routing
// ──────────────────────────────────────────────

#[test]
fn health_returns_200_with_version() {
    let server = start_server(&[]);
    let (status, json) = server.get("/health");
    assert_eq!(status, 200);
    assert_eq!(json["status"], "ok");
    assert!(json.get("version").is_some(), "version field must be present");
}

#[test]
fn unknown_route_is_json_404() {
    let server = start_server(&[]);
    let (status, json) = server.get("/nope");
    assert_eq!(status, 404);
    assert_eq!(json["error"], "not found");
}

// ──────────────────────────────────────────────
// Submissions
// ──────────────────────────────────────────────

#[test]
fn submit_then_results() {
    let server = start_server(&[]);
    for (i, (group, scale, text)) in [("G1", 1, "good"), ("G1", 2, ""), ("G2", 2, "  ")]
        .into_iter()
        .enumerate()
    {
        let (status, json) =
            server.send("POST", "/api/submit-survey", &submission(&i.to_string(), group, scale, text));
        assert_eq!(status, 200, "{json}");
        assert_eq!(json["message"], "Survey submitted successfully.");
    }

    let (status, report) = server.get("/api/results");
    assert_eq!(status, 200);
    assert_eq!(report["total"], 3);
    assert_eq!(report["questions"][1]["answers"], serde_json::json!(["good"]));
    assert_eq!(report["questions"][0]["options"][1]["percentage"], 66.7);

    let (_, filtered) = server.get("/api/results?group=G1");
    assert_eq!(filtered["total"], 2);
    assert_eq!(filtered["questions"][0]["options"][0]["percentage"], 50.0);

    let (_, empty) = server.get("/api/results?group=nobody");
    assert_eq!(empty["total"], 0);

    let (status, groups) = server.get("/api/groups");
    assert_eq!(status, 200);
    assert_eq!(groups, serde_json::json!(["G1", "G2"]));

    let stored = std::fs::read_to_string(server.data_dir().join("data/survey_submissions.jsonl"))
        .expect("submissions file");
    assert_eq!(stored.lines().count(), 3);
}

#[test]
fn submit_rejects_each_boundary_case_distinctly() {
    let server = start_server(&[]);
    let cases = [
        (
            r#"{"groupId":"G1","answers":[{"questionId":1,"answer":1}],"timestamp":"2025-06-01T00:00:00Z"}"#,
            "Missing required fields: submissionId, groupId, answers, or timestamp",
        ),
        (
            r#"{"submissionId":"x","groupId":"G1","answers":[],"timestamp":"2025-06-01T00:00:00Z"}"#,
            "Answers must be a non-empty array",
        ),
        (
            r#"{"submissionId":"x","groupId":"   ","answers":[{"questionId":1,"answer":1}],"timestamp":"2025-06-01T00:00:00Z"}"#,
            "GroupId cannot be empty",
        ),
        ("{oops", "Invalid JSON format in request body"),
    ];
    for (body, message) in cases {
        let (status, json) = server.send("POST", "/api/submit-survey", body);
        assert_eq!(status, 400, "{body}");
        assert_eq!(json["error"], message);
    }
    assert!(!server
        .data_dir()
        .join("data/survey_submissions.jsonl")
        .exists());
}

// ──────────────────────────────────────────────
// Question catalog
// ──────────────────────────────────────────────

#[test]
fn questions_default_then_crud() {
    let server = start_server(&[]);

    let (status, list) = server.get("/api/questions");
    assert_eq!(status, 200);
    assert_eq!(list.as_array().unwrap().len(), 2);

    let (status, created) = server.send(
        "POST",
        "/api/questions",
        r#"{"type":"text_input","text":"Anything else?","placeholder":"..."}"#,
    );
    assert_eq!(status, 201, "{created}");
    assert_eq!(created["id"], 3);

    let (status, updated) = server.send(
        "PUT",
        "/api/questions",
        r#"{"id":3,"type":"emoji_scale","text":"Workload?","options":[{"value":1,"text":"Low"},{"value":2,"text":"High"}]}"#,
    );
    assert_eq!(status, 200, "{updated}");
    assert_eq!(updated["type"], "emoji_scale");

    let (status, deleted) = server.request("DELETE", "/api/questions?id=1", None);
    assert_eq!(status, 200);
    assert_eq!(deleted["message"], "Question deleted successfully");
    assert_eq!(deleted["deletedQuestion"]["id"], 1);

    let (_, list) = server.get("/api/questions");
    let ids: Vec<u64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, [2, 3]);

    let saved = std::fs::read_to_string(server.data_dir().join("data/survey_questions.json"))
        .expect("catalog file");
    let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved, list);
}

#[test]
fn question_validation_messages() {
    let server = start_server(&[]);
    let cases = [
        ("POST", r#"{"text":"No type"}"#, 400, "Missing required fields: text and type"),
        ("POST", r#"{"text":"Rate","type":"slider"}"#, 400, "Invalid question type. Must be \"emoji_scale\" or \"text_input\""),
        ("POST", r#"{"text":"Rate","type":"emoji_scale"}"#, 400, "Emoji scale questions must have options"),
        ("PUT", r#"{"text":"No id","type":"text_input"}"#, 400, "Missing required fields: id, text, and type"),
        ("PUT", r#"{"id":99,"text":"Ghost","type":"text_input"}"#, 404, "Question not found"),
    ];
    for (method, body, expected_status, message) in cases {
        let (status, json) = server.send(method, "/api/questions", body);
        assert_eq!(status, expected_status, "{method} {body}");
        assert_eq!(json["error"], message);
    }
}

#[test]
fn delete_validation_messages() {
    let server = start_server(&[]);
    let (status, json) = server.request("DELETE", "/api/questions", None);
    assert_eq!(status, 400);
    assert_eq!(json["error"], "Question ID is required");

    let (status, json) = server.request("DELETE", "/api/questions?id=abc", None);
    assert_eq!(status, 400);
    assert_eq!(json["error"], "Invalid question ID");

    let (status, json) = server.request("DELETE", "/api/questions?id=42", None);
    assert_eq!(status, 404);
    assert_eq!(json["error"], "Question not found");
}

// ──────────────────────────────────────────────
// Rate limiting
// ──────────────────────────────────────────────

#[test]
fn rate_limit_from_env() {
    let server = start_server(&[("CANVASS_RATE_LIMIT", "2")]);
    assert_eq!(server.get("/api/questions").0, 200);
    assert_eq!(server.get("/api/questions").0, 200);
    let (status, json) = server.get("/api/questions");
    assert_eq!(status, 429);
    assert_eq!(json["error"], "rate limit exceeded");

    // Health checks are exempt.
    assert_eq!(server.get("/health").0, 200);
}
