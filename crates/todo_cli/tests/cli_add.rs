use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("todoapp-{nanos}-{name}"))
}

fn run(store_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_todo"))
        .args(args)
        .env("TODOAPP_STORE_DIR", store_dir)
        .env("TODOAPP_CONFIG_PATH", store_dir.join("config.json"))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run todo")
}

fn stored(store_dir: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(store_dir.join("todos.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn add_command_prepends_and_persists() {
    let dir = temp_dir("cli-add");

    let first = run(&dir, &["add", "Walk dog"]);
    let second = run(&dir, &["add", "  Buy milk  "]);
    let tasks = stored(&dir);
    std::fs::remove_dir_all(&dir).ok();

    assert!(first.status.success());
    assert!(second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("Buy milk"));
    assert!(stdout.contains("Walk dog"));

    assert_eq!(tasks.as_array().unwrap().len(), 2);
    assert_eq!(tasks[0]["name"], "Buy milk");
    assert_eq!(tasks[0]["status"], "pending");
    assert_eq!(tasks[1]["name"], "Walk dog");
}

#[test]
fn add_command_ignores_blank_text() {
    let dir = temp_dir("cli-add-blank");

    let missing = run(&dir, &["add"]);
    let blank = run(&dir, &["add", "   "]);
    let exists = dir.join("todos.json").exists();
    std::fs::remove_dir_all(&dir).ok();

    assert!(missing.status.success());
    assert!(blank.status.success());
    assert!(String::from_utf8_lossy(&blank.stdout).contains("Nothing to do"));
    assert!(String::from_utf8_lossy(&blank.stderr).is_empty());
    assert!(!exists);
}

#[test]
fn add_command_json_output() {
    let dir = temp_dir("cli-add-json");

    let output = run(&dir, &["add", "Buy milk", "--json"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    assert_eq!(value["rows"][0]["name"], "Buy milk");
    assert_eq!(value["rows"][0]["index"], 0);
    assert_eq!(value["show_placeholder"], false);
}

#[test]
fn add_command_joins_unquoted_words() {
    let dir = temp_dir("cli-add-words");

    let output = run(&dir, &["add", "Buy", "oat", "milk"]);
    let tasks = stored(&dir);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["name"], "Buy oat milk");
}

#[test]
fn add_command_reports_write_failure() {
    let dir = temp_dir("cli-add-unwritable");
    std::fs::create_dir_all(&dir).unwrap();
    let blocker = dir.join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let store_dir = blocker.join("store");

    let output = run(
        &dir,
        &["add", "Buy milk", "--store-dir", store_dir.to_str().unwrap()],
    );
    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: io_error"));
    assert!(output.stdout.is_empty());
}
