use crate::clock::Clock;
use crate::error::AppError;
use crate::manager::TaskManager;
use crate::model::{Task, TimeStatus};
use std::sync::{Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

pub const DISABLE_ENV_VAR: &str = "TASK_CLI_DISABLE_NOTIFICATIONS";

/// How long `notify` keeps the process alive for a click on a notification.
pub const ACTIVATION_WAIT: Duration = Duration::from_secs(30);

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub trait Notifier {
    fn notify(&self, task: &Task) -> Result<(), AppError>;

    fn notify_with_action(&self, task: &Task, action: &str) -> Result<(), AppError> {
        let _ = action;
        self.notify(task)
    }

    /// Blocks until every shown notification has been activated or closed,
    /// or until `timeout` passes. Returns how many are still pending.
    fn wait_for_activations(&self, timeout: Duration) -> usize {
        let _ = timeout;
        0
    }
}

/// Background threads listening for notification activations. The process
/// has to outlive them for a click to reach `task get`.
#[derive(Debug, Default)]
pub struct ActivationWaiters {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ActivationWaiters {
    pub fn push(&self, handle: JoinHandle<()>) {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    /// Joins finished waiters until none remain or `timeout` passes.
    /// Returns the number still running.
    pub fn wait(&self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        loop {
            let pending = self.join_finished();
            if pending == 0 || Instant::now() >= deadline {
                return pending;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            std::thread::sleep(WAIT_POLL_INTERVAL.min(remaining));
        }
    }

    fn join_finished(&self) -> usize {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        let (finished, running): (Vec<_>, Vec<_>) =
            handles.drain(..).partition(|handle| handle.is_finished());
        *handles = running;
        drop(handles);

        for handle in finished {
            if handle.join().is_err() {
                tracing::warn!("notification activation listener panicked");
            }
        }
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _task: &Task) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct NotificationOutcome {
    pub tasks: Vec<Task>,
    pub failures: Vec<NotificationFailure>,
}

#[derive(Debug)]
pub struct NotificationFailure {
    pub task_id: u64,
    pub error: AppError,
}

pub fn notifier_from_env() -> Result<Box<dyn Notifier>, AppError> {
    if std::env::var(DISABLE_ENV_VAR).is_ok() {
        return Ok(Box::new(NoopNotifier));
    }

    match platform_notifier() {
        Ok(notifier) => Ok(notifier),
        Err(err) => match err {
            AppError::InvalidData(_) => {
                tracing::debug!(error = %err, "falling back to no-op notifier");
                Ok(Box::new(NoopNotifier))
            }
            other => Err(other),
        },
    }
}

/// Sends one notification per pending task that is overdue, due soon or has
/// an upcoming reminder, most urgent first. Failures are collected per task
/// instead of aborting the sweep.
pub fn notify_due_tasks<C: Clock>(
    manager: &mut TaskManager<C>,
    notifier: &dyn Notifier,
) -> NotificationOutcome {
    let mut notified = Vec::new();
    let mut failures = Vec::new();

    for task in manager.get_tasks_sorted(false, true) {
        if task.done || task.time_status() == TimeStatus::Normal {
            continue;
        }

        let action = activation_argument(task.id);
        match notifier.notify_with_action(&task, &action) {
            Ok(()) => notified.push(task),
            Err(error) => {
                tracing::warn!(task_id = task.id, error = %error, "notification failed");
                failures.push(NotificationFailure {
                    task_id: task.id,
                    error,
                });
            }
        }
    }

    NotificationOutcome {
        tasks: notified,
        failures,
    }
}

/// Notification body: title, id and urgency.
pub fn notification_body(task: &Task) -> String {
    format!("{} (#{}) - {}", task.title, task.id, task.time_status())
}

const ACTION_PREFIX: &str = "get:";

pub fn activation_argument(task_id: u64) -> String {
    format!("{ACTION_PREFIX}{task_id}")
}

pub fn parse_activation_argument(argument: &str) -> Option<u64> {
    argument
        .strip_prefix(ACTION_PREFIX)
        .and_then(|id| id.parse().ok())
}

/// Re-launches the current executable as `get <id>`.
pub fn launch_get(task_id: u64) -> Result<(), AppError> {
    let exe = std::env::current_exe().map_err(|err| AppError::io(err.to_string()))?;
    std::process::Command::new(exe)
        .arg("get")
        .arg(task_id.to_string())
        .spawn()
        .map_err(|err| AppError::io(err.to_string()))?;
    Ok(())
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier::default()))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier::default()))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}
