use assert_cmd::Command;
use predicates::str::contains;
use std::net::TcpListener;

fn rprobe() -> Command {
    let mut cmd = Command::cargo_bin("rprobe").unwrap();
    cmd.arg("--no-color");
    cmd
}

#[test]
fn test_invalid_input_no_args() {
    rprobe().assert().failure().code(2).stdout(contains("Error:"));
}

#[test]
fn test_continuous_conflicts_with_count() {
    rprobe()
        .args(["-t", "-n", "3", "127.0.0.1:80"])
        .assert()
        .failure()
        .code(2)
        .stdout(contains("--continuous cannot be used with --count"));
}

#[test]
fn test_ttl_range_is_enforced() {
    rprobe()
        .args(["-i", "0", "127.0.0.1:80"])
        .assert()
        .failure();
    rprobe()
        .args(["-i", "256", "127.0.0.1:80"])
        .assert()
        .failure();
}

#[test]
fn test_forced_families_are_exclusive() {
    rprobe()
        .args(["-4", "-6", "127.0.0.1:80"])
        .assert()
        .failure();
}

#[test]
fn test_tcp_without_port_is_rejected() {
    rprobe()
        .arg("example.com")
        .assert()
        .failure()
        .code(2)
        .stdout(contains("requires a port"));
}

#[test]
fn test_port_flag_conflicts_with_host_port_target() {
    rprobe()
        .args(["-p", "81", "127.0.0.1:80"])
        .assert()
        .failure()
        .code(2)
        .stdout(contains("--port cannot be combined"));
}

#[test]
fn test_successful_probe_reports_zero_loss() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    rprobe()
        .args(["-n", "1", &format!("127.0.0.1:{port}")])
        .assert()
        .success()
        .stdout(contains("Reply from"))
        .stdout(contains("(0.0% loss)"));
}

#[test]
fn test_refused_attempts_summarize_instead_of_failing() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    rprobe()
        .args(["-n", "1", &format!("127.0.0.1:{port}")])
        .assert()
        .success()
        .stdout(contains("Connection refused"))
        .stdout(contains("(100.0% loss)"))
        .stdout(contains("not computable"));
}

#[test]
fn test_short_output_is_one_line_per_target() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    rprobe()
        .args(["-S", "-n", "1", &format!("127.0.0.1:{port}")])
        .assert()
        .success()
        .stdout(contains("sent=1 received=1 loss=0.0%"));
}

#[cfg(feature = "json")]
#[test]
fn test_json_output_round_trips_summary_fields() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let assert = rprobe()
        .args(["-n", "1", "-f", "json", &format!("127.0.0.1:{port}")])
        .assert()
        .success();
    let stdout = assert.get_output().stdout.clone();

    let doc: serde_json::Value = serde_json::from_slice(&stdout).expect("valid json");
    assert_eq!(doc["schema_version"], 1);
    let summary = &doc["reports"][0]["summary"];
    assert_eq!(summary["sent"], 1);
    assert_eq!(summary["received"], 1);
    assert_eq!(summary["loss_pct"], 0.0);
    assert!(summary["latency"]["avg_ms"].as_f64().unwrap() >= 0.0);
    assert_eq!(doc["reports"][0]["attempts"][0]["kind"], "success");
}

#[cfg(feature = "network-tests")]
#[test]
fn test_unknown_host_exits_with_resolution_error() {
    rprobe()
        .args(["-n", "1", "no.such.domain.example:80"])
        .assert()
        .failure()
        .code(2)
        .stdout(contains("Error: dns"));
}
