use crate::error::AppError;
use crate::model::Task;
use crate::notify::{ActivationWaiters, Notifier, launch_get, notification_body};
use notify_rust::Notification;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct LinuxNotifier {
    waiters: ActivationWaiters,
}

impl Notifier for LinuxNotifier {
    fn notify(&self, task: &Task) -> Result<(), AppError> {
        self.notify_with_action(task, "")
    }

    fn notify_with_action(&self, task: &Task, action: &str) -> Result<(), AppError> {
        let mut notification = Notification::new();
        notification.summary("task-cli");
        notification.body(&notification_body(task));
        if !action.trim().is_empty() {
            notification.action(action, "Open");
        }

        let handle = notification
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;

        if !action.trim().is_empty() {
            let action_key = action.to_string();
            let task_id = task.id;
            // Returns once the notification is clicked or closed.
            self.waiters.push(std::thread::spawn(move || {
                handle.wait_for_action(|selected| {
                    if selected == action_key || selected == "default" {
                        if let Err(err) = launch_get(task_id) {
                            tracing::warn!(task_id, error = %err, "could not open task");
                        }
                    }
                });
            }));
        }

        Ok(())
    }

    fn wait_for_activations(&self, timeout: Duration) -> usize {
        self.waiters.wait(timeout)
    }
}
