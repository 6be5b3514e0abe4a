#![cfg(all(unix, feature = "cli"))]

use std::process::Command;

fn maestro() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_maestro"));
    cmd.env_remove("MAESTRO_PORT")
        .env_remove("MAESTRO_LIMITS")
        .env_remove("MAESTRO_DEVICE")
        .env_remove("MAESTRO_BAUD");
    cmd
}

#[test]
fn version_prints_package_version() {
    let output = maestro().arg("version").output().expect("binary should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("maestro "));
}

#[test]
fn missing_port_exits_with_transport_code() {
    let output = maestro()
        .args(["position", "0", "--port", "/dev/maestro-cli-test-missing"])
        .output()
        .expect("binary should run");
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("connect failed"));
}

#[test]
fn out_of_range_channel_is_a_usage_error() {
    let output = maestro()
        .args(["target", "30", "6000"])
        .output()
        .expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
}
