#![cfg(feature = "cli")]

use std::net::TcpListener;
use std::process::{Command, Output, Stdio};

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("ephemeral bind should succeed")
        .local_addr()
        .expect("bound socket has an address")
        .port()
}

fn cipc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cipc"))
        .args(["--log-level", "error"])
        .args(args)
        .env_remove("CIPC_HOST")
        .env_remove("CIPC_PORT")
        .env_remove("CIPC_ADDRESS")
        .output()
        .expect("cipc should run")
}

#[test]
fn listen_echoes_one_message_to_send() {
    let port = free_port().to_string();

    let listener = Command::new(env!("CARGO_BIN_EXE_cipc"))
        .args(["--log-level", "error", "--format", "json"])
        .args(["listen", "--host", "127.0.0.1", "--port", &port, "--echo", "--count", "1"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("listen command should start");

    let sent = cipc(&[
        "--format", "json", "send", "--port", &port, "--data", "hello", "--retries", "8", "--wait",
    ]);
    assert!(
        sent.status.success(),
        "send failed: {}",
        String::from_utf8_lossy(&sent.stderr)
    );
    let stdout = String::from_utf8_lossy(&sent.stdout);
    assert!(stdout.contains("\"payload\":\"hello\""));
    assert!(stdout.contains("\"transport\":\"stream\""));

    let listened = listener.wait_with_output().expect("listen should exit");
    assert!(listened.status.success());
    let stdout = String::from_utf8_lossy(&listened.stdout);
    assert!(stdout.contains("\"size\":5"));
}

#[test]
fn send_to_closed_port_is_transport_error() {
    let port = free_port().to_string();
    let output = cipc(&["send", "--port", &port, "--data", "x", "--retries", "0"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("connect failed"));
}

#[test]
fn send_to_unparseable_host_is_usage_error() {
    let output = cipc(&["send", "--host", "not a host", "--port", "9", "--data", "x"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn send_without_payload_is_usage_error() {
    let output = cipc(&["send", "--port", "9"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn reply_answers_one_request() {
    let address = format!("tcp://127.0.0.1:{}", free_port());

    let replier = Command::new(env!("CARGO_BIN_EXE_cipc"))
        .args(["--log-level", "error", "--format", "json"])
        .args(["reply", "--address", &address, "--count", "1"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("reply command should start");

    let requested = cipc(&[
        "--format", "json", "request", "--address", &address, "--data", "ping", "--timeout", "5s",
    ]);
    assert!(
        requested.status.success(),
        "request failed: {}",
        String::from_utf8_lossy(&requested.stderr)
    );
    assert!(String::from_utf8_lossy(&requested.stdout).contains("\"payload\":\"ping\""));

    let replied = replier.wait_with_output().expect("reply should exit");
    assert!(replied.status.success());
    assert!(String::from_utf8_lossy(&replied.stdout).contains("\"transport\":\"queue\""));
}

#[test]
fn config_prints_resolved_defaults() {
    let output = cipc(&["--format", "json", "config", "stream-connect", "--port", "7000"]);
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("config output should be JSON");
    assert_eq!(value["transport"], "stream");
    assert_eq!(value["host"], "127.0.0.1");
    assert_eq!(value["port"], 7000);
    assert_eq!(value["retries"], 3);
}

#[test]
fn version_prints_package_version() {
    let output = cipc(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("cipc {}", env!("CARGO_PKG_VERSION"))
    );
}
