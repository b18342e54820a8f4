use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("task-cli-{nanos}-{file_name}"))
}

fn run_interactive_with_store(store_path: &Path, input: &str) -> Output {
    let exe = env!("CARGO_BIN_EXE_task");

    let mut child = Command::new(exe)
        .env("TASK_CLI_STORE_PATH", store_path)
        .env("TASK_CLI_CONFIG_PATH", temp_path("cli-interactive-config.json"))
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn interactive session");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("failed to write to stdin");
    }

    child
        .wait_with_output()
        .expect("failed to read interactive output")
}

fn run_interactive(input: &str) -> Output {
    let store_path = temp_path("cli-interactive.json");
    let output = run_interactive_with_store(&store_path, input);
    std::fs::remove_file(&store_path).ok();
    output
}

#[test]
fn interactive_help_shows_usage() {
    let output = run_interactive("help\nexit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
}

#[test]
fn interactive_question_mark_shows_usage() {
    let output = run_interactive("?\nquit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
}

#[test]
fn interactive_invalid_command_prints_error_and_continues() {
    let output = run_interactive("nope\nadd \"after error\"\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Task added with ID: 1"));
}

#[test]
fn interactive_unterminated_quote_is_reported() {
    let output = run_interactive("add \"broken\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - unterminated quote in command"));
}

#[test]
fn interactive_session_persists_between_commands() {
    let store_path = temp_path("cli-interactive-session.json");
    let output = run_interactive_with_store(
        &store_path,
        "add \"demo task\" --priority low\nupdate 1 --done\nlist --all\n",
    );
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Task added with ID: 1 (Priority: Low)"));
    assert!(stdout.contains("Task 1 updated successfully"));
    assert!(stdout.contains("✓ Done"));
    assert!(stdout.contains("demo task"));
}
