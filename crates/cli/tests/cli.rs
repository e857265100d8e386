//! End-to-end tests for the ns binary
//!
//! Each test runs the binary with an isolated settings directory. Commands
//! that need a server talk to a one-shot listener on localhost.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};
use std::thread::JoinHandle;

use tempfile::TempDir;

fn run_ns(args: &[&str], config_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ns"))
        .args(args)
        .env("NS_CONFIG_DIR", config_dir)
        .env_remove("NS_PROFILE")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute ns")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Answer one request with `status_line` and `body`; yields the raw request
fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let handle = std::thread::spawn(move || {
        let (mut socket, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).unwrap();
            request.extend_from_slice(&buf[..n]);
            if n == 0 || complete(&request) {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (addr, handle)
}

fn complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(end) = text.find("\r\n\r\n") else {
        return false;
    };
    let head = text[..end].to_ascii_lowercase();
    let body = &text[end + 4..];
    if head.contains("transfer-encoding: chunked") {
        return body.ends_with("0\r\n\r\n");
    }
    let length = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    body.len() >= length
}

/// Settings directory with a `default` profile pointing at `host` over http
fn with_profile(host: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ns(
        &["profile", "set", "default", host, "upload", "secret", "--no-tls"],
        dir.path(),
    );
    assert!(output.status.success(), "profile set failed: {}", stderr(&output));
    dir
}

mod profiles {
    use super::*;

    #[test]
    fn test_profile_set_list_remove() {
        let dir = tempfile::tempdir().unwrap();

        let output = run_ns(
            &["profile", "set", "media", "media.example.net", "upload", "s3cr3t"],
            dir.path(),
        );
        assert!(output.status.success(), "{}", stderr(&output));

        let output = run_ns(&["profile", "list", "--json"], dir.path());
        assert!(output.status.success());
        let listing: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(listing["default"], "default");
        assert_eq!(listing["profiles"][0]["name"], "media");
        assert_eq!(listing["profiles"][0]["host"], "media.example.net");
        assert!(!stdout(&output).contains("s3cr3t"));

        let output = run_ns(&["profile", "remove", "media"], dir.path());
        assert!(output.status.success());

        let output = run_ns(&["profile", "remove", "media"], dir.path());
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_profile_set_rejects_empty_key() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_ns(
            &["profile", "set", "media", "media.example.net", "upload", ""],
            dir.path(),
        );
        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_settings_file_written() {
        let dir = with_profile("media.example.net");
        let contents = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
        assert!(contents.contains("media.example.net"));
    }
}

mod errors {
    use super::*;

    #[test]
    fn test_missing_profile_exits_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_ns(&["stat", "/CODE/a.jpg"], dir.path());
        assert_eq!(output.status.code(), Some(5));
        assert!(stderr(&output).contains("default"));
    }

    #[test]
    fn test_touch_invalid_date_is_usage_error() {
        // Port 9 is never contacted: the date is rejected first
        let dir = with_profile("127.0.0.1:9");
        let output = run_ns(&["touch", "/CODE/a.jpg", "--date", "next tuesday"], dir.path());
        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_json_errors_on_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_ns(&["--json", "ls", "/CODE"], dir.path());
        assert_eq!(output.status.code(), Some(5));
        let err: serde_json::Value = serde_json::from_str(&stderr(&output)).unwrap();
        assert!(err["error"].is_string());
    }
}

mod operations {
    use super::*;

    const STAT_XML: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<stat directory="/CODE"><file type="file" name="a.jpg" size="2048" mtime="1700000000"/></stat>"#;

    #[test]
    fn test_stat_json() {
        let (addr, server) = serve_once("200 OK", STAT_XML);
        let dir = with_profile(&addr);

        let output = run_ns(&["--json", "stat", "/CODE/a.jpg"], dir.path());
        assert!(output.status.success(), "{}", stderr(&output));

        let doc: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(doc["stat"]["attribs"]["directory"], "/CODE");
        assert_eq!(doc["stat"]["file"]["attribs"]["name"], "a.jpg");

        let request = server.join().unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /code/a.jpg http/1.1"));
        assert!(request.contains("x-akamai-acs-action: version=1&action=stat&format=xml"));
    }

    #[test]
    fn test_exists_exit_codes() {
        let (addr, _server) = serve_once("404 Not Found", "");
        let dir = with_profile(&addr);
        let output = run_ns(&["exists", "/CODE/missing.jpg"], dir.path());
        assert_eq!(output.status.code(), Some(5));

        let (addr, _server) = serve_once("200 OK", STAT_XML);
        let dir = with_profile(&addr);
        let output = run_ns(&["exists", "/CODE/a.jpg"], dir.path());
        assert_eq!(output.status.code(), Some(0));
    }

    #[test]
    fn test_mkdir_conflict_exit_code() {
        let (addr, _server) = serve_once("409 Conflict", "");
        let dir = with_profile(&addr);
        let output = run_ns(&["mkdir", "/CODE/existing"], dir.path());
        assert_eq!(output.status.code(), Some(6));
        assert!(stderr(&output).contains("409"));
    }

    #[test]
    fn test_put_file() {
        let (addr, server) = serve_once("200 OK", "");
        let dir = with_profile(&addr);
        let local = dir.path().join("hello.txt");
        std::fs::write(&local, "hello-from-disk").unwrap();

        let output = run_ns(&["put", local.to_str().unwrap(), "/CODE/"], dir.path());
        assert!(output.status.success(), "{}", stderr(&output));

        let request = server.join().unwrap();
        assert!(request.starts_with("PUT /CODE/hello.txt HTTP/1.1"));
        assert!(request.contains("upload-type=binary"));
        assert!(request.contains("hello-from-disk"));
    }

    #[test]
    fn test_get_to_file() {
        let (addr, _server) = serve_once("200 OK", "remote-bytes");
        let dir = with_profile(&addr);
        let local = dir.path().join("copy.bin");

        let output = run_ns(&["get", "/CODE/a.bin", local.to_str().unwrap()], dir.path());
        assert!(output.status.success(), "{}", stderr(&output));
        assert_eq!(std::fs::read_to_string(&local).unwrap(), "remote-bytes");
    }

    #[test]
    fn test_get_failure_leaves_no_file() {
        let (addr, _server) = serve_once("404 Not Found", "Not Found");
        let dir = with_profile(&addr);
        let local = dir.path().join("missing.bin");

        let output = run_ns(&["get", "/CODE/missing.bin", local.to_str().unwrap()], dir.path());
        assert_eq!(output.status.code(), Some(5));
        assert!(!local.exists());
    }
}
