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
        .env("TASK_CLI_CONFIG_PATH", temp_path("cli-update-config.json"))
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run task")
}

fn stored_task(store_path: &Path, index: usize) -> serde_json::Value {
    let content = std::fs::read_to_string(store_path).expect("store written");
    let tasks: serde_json::Value = serde_json::from_str(&content).expect("valid store");
    tasks[index].clone()
}

#[test]
fn update_changes_title_priority_and_completion() {
    let store_path = temp_path("cli-update.json");
    assert!(run(&store_path, &["add", "draft"]).status.success());

    let output = run(
        &store_path,
        &["update", "1", "--title", "final", "--priority", "high", "--done"],
    );
    let task = stored_task(&store_path, 0);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Task 1 updated successfully"));
    assert_eq!(task["title"], "final");
    assert_eq!(task["priority"], 2);
    assert_eq!(task["done"], true);
    assert!(task["completed_at"].is_string());

    let output = run(&store_path, &["update", "1", "--undone"]);
    let task = stored_task(&store_path, 0);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert_eq!(task["done"], false);
    assert!(task["completed_at"].is_null());
    assert_eq!(task["title"], "final");
}

#[test]
fn update_without_done_flag_keeps_completion() {
    let store_path = temp_path("cli-update-keep.json");
    assert!(run(&store_path, &["add", "draft"]).status.success());
    assert!(run(&store_path, &["update", "1", "--done"]).status.success());

    let output = run(&store_path, &["update", "1", "--title", "renamed"]);
    let task = stored_task(&store_path, 0);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert_eq!(task["done"], true);
    assert_eq!(task["title"], "renamed");
}

#[test]
fn update_sets_and_removes_dates() {
    let store_path = temp_path("cli-update-dates.json");
    assert!(run(&store_path, &["add", "trip"]).status.success());

    let output = run(
        &store_path,
        &["update", "1", "--due", "2099-05-01 10:00", "--reminder", "2099-04-30 10:00"],
    );
    assert!(output.status.success());
    let task = stored_task(&store_path, 0);
    assert!(task["due_date"].is_string());
    assert!(task["reminder"].is_string());

    let output = run(
        &store_path,
        &["update", "1", "--due", "2099-04-01 10:00", "--reminder", "2099-03-31 10:00"],
    );
    assert!(output.status.success());

    let output = run(&store_path, &["update", "1", "--remove-due", "--remove-reminder"]);
    let task = stored_task(&store_path, 0);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert!(task.get("due_date").is_none());
    assert!(task.get("reminder").is_none());
}

#[test]
fn update_rejects_reminder_after_due_date_and_keeps_store() {
    let store_path = temp_path("cli-update-order.json");
    assert!(run(&store_path, &["add", "trip", "--due", "2099-05-01 10:00"]).status.success());

    let output = run(
        &store_path,
        &["update", "1", "--title", "changed", "--reminder", "2099-05-02 10:00"],
    );
    let task = stored_task(&store_path, 0);
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_time_order"));
    assert_eq!(task["title"], "trip");
    assert!(task.get("reminder").is_none());
}

#[test]
fn update_unknown_id_is_not_found() {
    let store_path = temp_path("cli-update-missing.json");

    let output = run(&store_path, &["update", "42", "--done"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: not_found - task with ID 42 not found"));
}
