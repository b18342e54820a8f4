use crate::error::AppError;
use crate::model::Task;
use std::path::{Path, PathBuf};

pub const STORE_ENV_VAR: &str = "TASK_CLI_STORE_PATH";
pub const DATA_DIR_NAME: &str = ".task-cli";
const STORE_FILE_NAME: &str = "tasks.json";

/// Directory holding the store and config, `$HOME/.task-cli` (or
/// `%USERPROFILE%\.task-cli` on Windows).
pub fn data_dir() -> Result<PathBuf, AppError> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    let home =
        std::env::var(var).map_err(|_| AppError::invalid_data(format!("{var} is not set")))?;
    Ok(PathBuf::from(home).join(DATA_DIR_NAME))
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(data_dir()?.join(STORE_FILE_NAME))
}

/// Reads the flat task array. A missing file is an empty collection.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>, AppError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "task store missing, starting empty");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let tasks: Vec<Task> = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    tracing::debug!(path = %path.display(), count = tasks.len(), "loaded tasks");

    Ok(tasks)
}

pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let content = serde_json::to_string_pretty(tasks)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    tracing::debug!(path = %path.display(), count = tasks.len(), "saved tasks");
    Ok(())
}
