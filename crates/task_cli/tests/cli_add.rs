use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("task-cli-{nanos}-{file_name}"))
}

fn run(store_path: &Path, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_task");
    Command::new(exe)
        .args(args)
        .env("TASK_CLI_STORE_PATH", store_path)
        .env("TASK_CLI_CONFIG_PATH", temp_path("cli-add-config.json"))
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run task")
}

fn stored_tasks(store_path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(store_path).expect("store written");
    serde_json::from_str(&content).expect("valid store")
}

#[test]
fn add_assigns_sequential_ids() {
    let store_path = temp_path("cli-add.json");

    let first = run(&store_path, &["add", "Buy milk"]);
    let second = run(&store_path, &["add", "Pay rent", "--priority", "HIGH"]);
    let tasks = stored_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(first.status.success());
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(stdout.contains("Task added with ID: 1 (Priority: Medium)"));

    assert!(second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("Task added with ID: 2 (Priority: High)"));

    assert_eq!(tasks[0]["title"], "Buy milk");
    assert_eq!(tasks[0]["priority"], 1);
    assert_eq!(tasks[1]["priority"], 2);
    assert!(tasks[1]["completed_at"].is_null());
}

#[test]
fn add_stores_due_date_and_reminder() {
    let store_path = temp_path("cli-add-dates.json");

    let output = run(
        &store_path,
        &[
            "add",
            "Dentist",
            "--due",
            "2099-03-01 15:00",
            "--reminder",
            "2099-02-28 09:00",
        ],
    );
    let tasks = stored_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert!(tasks[0]["due_date"].as_str().unwrap().starts_with("2099-03-01T15:00:00"));
    assert!(tasks[0]["reminder"].as_str().unwrap().starts_with("2099-02-28T09:00:00"));
}

#[test]
fn add_json_outputs_task() {
    let store_path = temp_path("cli-add-json.json");

    let output = run(&store_path, &["--json", "add", "demo", "-p", "low"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["id"], 1);
    assert_eq!(value["title"], "demo");
    assert_eq!(value["priority"], 0);
    assert_eq!(value["time_status"], "normal");
}

#[test]
fn add_rejects_missing_title() {
    let store_path = temp_path("cli-add-missing.json");

    let output = run(&store_path, &["add", "   "]);

    assert!(!output.status.success());
    assert!(!store_path.exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - title is required"));
}

#[test]
fn add_rejects_unknown_priority() {
    let store_path = temp_path("cli-add-priority.json");

    let output = run(&store_path, &["add", "demo", "--priority", "urgent"]);

    assert!(!output.status.success());
    assert!(!store_path.exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_priority"));
}

#[test]
fn add_rejects_malformed_date() {
    let store_path = temp_path("cli-add-date.json");

    let output = run(&store_path, &["add", "demo", "--due", "next tuesday"]);

    assert!(!output.status.success());
    assert!(!store_path.exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_date_format"));
}

#[test]
fn add_rejects_reminder_after_due_date() {
    let store_path = temp_path("cli-add-order.json");

    let output = run(
        &store_path,
        &[
            "add",
            "demo",
            "--due",
            "2099-03-01 15:00",
            "--reminder",
            "2099-03-02 09:00",
        ],
    );

    assert!(!output.status.success());
    assert!(!store_path.exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_time_order"));
}
