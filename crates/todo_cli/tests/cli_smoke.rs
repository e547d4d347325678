use std::process::Command;

#[test]
fn cli_smoke_help() {
    let exe = env!("CARGO_BIN_EXE_todo");
    let output = Command::new(exe)
        .arg("--help")
        .output()
        .expect("failed to run todo --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("filter"));
}

#[test]
fn cli_rejects_unknown_command() {
    let exe = env!("CARGO_BIN_EXE_todo");
    let output = Command::new(exe)
        .arg("frobnicate")
        .env("TODOAPP_STORE_DIR", std::env::temp_dir().join("todoapp-unused"))
        .output()
        .expect("failed to run todo");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}
