//! Integration tests for the rvx CLI

use std::process::Command;

fn rvx() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_rvx"));
    command.env_remove("RVX_VERSION_POLICY");
    command
}

#[test]
fn test_cli_version() {
    let output = rvx()
        .arg("--version")
        .output()
        .expect("Failed to execute rvx");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rvx"));
}

#[test]
fn test_cli_help() {
    let output = rvx().arg("--help").output().expect("Failed to execute rvx");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("packages"));
    assert!(stdout.contains("patches"));
    assert!(stdout.contains("needs-resources"));
    assert!(stdout.contains("keygen"));
}

#[test]
fn test_cli_invalid_command() {
    let output = rvx()
        .arg("invalid-command")
        .output()
        .expect("Failed to execute rvx");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn test_patches_lists_compatible_json() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("patches.json");
    std::fs::write(
        &bundle,
        r#"[
            {"name": "hide-ads", "compatible_packages": [{"name": "com.example", "versions": ["1.0"]}]},
            {"name": "other", "compatible_packages": [{"name": "org.other"}]}
        ]"#,
    )
    .unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        format!("[paths]\ncache_dir = {:?}\n", dir.path().join("cache")),
    )
    .unwrap();

    let output = rvx()
        .arg("--json")
        .arg("--config")
        .arg(&config)
        .arg("--bundle")
        .arg(&bundle)
        .args(["patches", "--package", "com.example", "--version", "1.0"])
        .output()
        .expect("Failed to execute rvx");

    assert!(output.status.success());
    let stdout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stdout["type"], "PatchList");
    assert_eq!(stdout["data"][0]["name"], "hide-ads");
    assert_eq!(stdout["data"].as_array().unwrap().len(), 1);
}

#[test]
fn test_keygen_writes_keys() {
    let dir = tempfile::tempdir().unwrap();
    let secret = dir.path().join("release.key");
    let public = dir.path().join("release.pub");
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        format!("[paths]\ncache_dir = {:?}\n", dir.path().join("cache")),
    )
    .unwrap();

    let output = rvx()
        .arg("--config")
        .arg(&config)
        .arg("keygen")
        .arg("--secret")
        .arg(&secret)
        .arg("--public")
        .arg(&public)
        .output()
        .expect("Failed to execute rvx");

    assert!(output.status.success());
    assert!(secret.exists());
    assert!(public.exists());
}
