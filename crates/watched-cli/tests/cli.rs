use serde_json::Value;
use std::collections::BTreeSet;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output};
use std::thread;

fn run(args: &[&str], base: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_serializd-watched"))
        .args(args)
        .env("SERIALIZD_WATCHED_BASE_PATH", base)
        .env_remove("RUST_LOG")
        .env_remove("RUST_LOG_JSON")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .output()
        .expect("run serializd-watched")
}

/// Config pointing at a local port nothing listens on
fn unreachable_config(dir: &Path) -> String {
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        r#"
[serializd]
api_base_url = "http://127.0.0.1:9/api"
site_url = "http://127.0.0.1:9"
timeout_secs = 5
"#,
    )
    .expect("write config");
    path.to_string_lossy().into_owned()
}

#[test]
fn missing_arguments_exit_with_usage() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&[], dir.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn single_argument_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["me@example.com"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn extra_positional_argument_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["me@example.com", "secret", "extra"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn help_exits_successfully() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["--help"], dir.path());

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("<EMAIL>"));
}

#[test]
fn failed_login_prints_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let config = unreachable_config(dir.path());
    let output = run(&["me@example.com", "secret", "--config", &config], dir.path());

    assert!(output.status.success());
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(parsed, Value::Array(Vec::new()));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Login failed"));
}

#[test]
fn compact_flag_prints_single_line() {
    let dir = tempfile::tempdir().unwrap();
    let config = unreachable_config(dir.path());
    let output = run(&["me@example.com", "secret", "--compact", "--config", &config], dir.path());

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "[]\n");
}

/// What the test server saw for one request
struct Request {
    line: String,
    cookie: Option<String>,
}

type Route = fn(&Request) -> (&'static str, &'static str, &'static str);

/// Minimal HTTP server answering every connection through `route`
fn spawn_server(route: Route) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            handle_connection(stream, route);
        }
    });
    port
}

fn handle_connection(mut stream: TcpStream, route: Route) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut line = String::new();
    if reader.read_line(&mut line).is_err() {
        return;
    }

    let mut content_length = 0usize;
    let mut cookie = None;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).unwrap_or(0) == 0 || header == "\r\n" {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("cookie") {
                cookie = Some(value.trim().to_string());
            }
        }
    }
    let mut body = vec![0u8; content_length];
    let _ = reader.read_exact(&mut body);

    let (status, content_type, payload) = route(&Request { line, cookie });
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        payload.len(),
        payload
    );
    let _ = stream.write_all(response.as_bytes());
}

fn login_or_not_found(request: &Request) -> (&'static str, &'static str, &'static str) {
    if request.line.starts_with("POST /api/login ") {
        ("200 OK", "application/json", r#"{"token":"test-token","username":"someone"}"#)
    } else {
        ("404 Not Found", "application/json", r#"{"error":"not found"}"#)
    }
}

/// First endpoint answers 200 with an HTML page, second serves records to a logged-in session
fn html_then_profile(request: &Request) -> (&'static str, &'static str, &'static str) {
    if request.line.starts_with("GET /api/user/sattiyans ") {
        return ("200 OK", "text/html", "<!doctype html><html><body>Serializd</body></html>");
    }
    if request.line.starts_with("GET /api/user/sattiyans/profile ") {
        if request.cookie.as_deref() == Some("tvproduction=test-token") {
            return (
                "200 OK",
                "application/json",
                r#"{"watched":[{"title":"Andor","season":"2","episode":3,"rating":0},"x"]}"#,
            );
        }
        return ("401 Unauthorized", "application/json", r#"{"error":"no session"}"#);
    }
    login_or_not_found(request)
}

fn server_config(dir: &Path, port: u16) -> String {
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        format!(
            "[serializd]\napi_base_url = \"http://127.0.0.1:{port}/api\"\nsite_url = \"http://127.0.0.1:{port}\"\ntimeout_secs = 5\n"
        ),
    )
    .expect("write config");
    path.to_string_lossy().into_owned()
}

#[test]
fn no_endpoint_answering_prints_fallback_shows() {
    let port = spawn_server(login_or_not_found);
    let dir = tempfile::tempdir().unwrap();
    let config = server_config(dir.path(), port);

    let output = run(&["me@example.com", "secret", "--config", &config], dir.path());

    assert!(output.status.success());
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 7);

    let titles: BTreeSet<&str> = items.iter().filter_map(|i| i["title"].as_str()).collect();
    assert_eq!(titles.len(), 2);
    assert!(items.iter().all(|i| i["type"] == "series" && i["platform"] == "serializd"));
}

#[test]
fn html_page_is_skipped_and_session_cookie_unlocks_records() {
    let port = spawn_server(html_then_profile);
    let dir = tempfile::tempdir().unwrap();
    let config = server_config(dir.path(), port);

    let output = run(&["me@example.com", "secret", "--config", &config], dir.path());

    assert!(output.status.success());
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 1, "expected upstream records, got {}", parsed);

    let item = &items[0];
    assert_eq!(item["title"], "Andor");
    assert_eq!(item["season"], 2);
    assert_eq!(item["episode"], "3");
    assert!(item.get("rating").is_none());
}

#[test]
fn diagnostics_are_plain_text_when_stderr_is_piped() {
    let dir = tempfile::tempdir().unwrap();
    let config = unreachable_config(dir.path());
    let output = run(&["me@example.com", "secret", "--config", &config], dir.path());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.is_empty());
    assert!(
        stderr.lines().all(|line| !line.trim_start().starts_with('{')),
        "stderr should be human-readable: {}",
        stderr
    );
}
