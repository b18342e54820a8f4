use crate::error::AppError;
use crate::model::Task;
use crate::notify::{
    ACTIVATION_WAIT, ActivationWaiters, Notifier, launch_get, parse_activation_argument,
};
use std::sync::mpsc;
use std::time::Duration;
use tauri_winrt_notification::Toast;

#[derive(Debug, Default)]
pub struct WindowsNotifier {
    waiters: ActivationWaiters,
}

impl Notifier for WindowsNotifier {
    fn notify(&self, task: &Task) -> Result<(), AppError> {
        self.notify_with_action(task, "")
    }

    fn notify_with_action(&self, task: &Task, action: &str) -> Result<(), AppError> {
        let task_id = task.id;
        let action_value = action.to_string();
        let mut toast = Toast::new(Toast::POWERSHELL_APP_ID)
            .title("task-cli")
            .text1(&task.title)
            .text2(&format!("#{} - {}", task.id, task.time_status()));

        if !action_value.trim().is_empty() {
            toast = toast.add_button("Open", &action_value);
        }

        let (activated, activations) = mpsc::channel();
        toast
            .on_activated(move |args| {
                let target = match args.as_deref() {
                    Some(args) if args == action_value => task_id,
                    Some(args) => parse_activation_argument(args).unwrap_or(task_id),
                    None => task_id,
                };
                let _ = activated.send(target);
                Ok(())
            })
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;

        // Toasts report no dismissal here, so the listener gives up on its own.
        self.waiters.push(std::thread::spawn(move || {
            if let Ok(target) = activations.recv_timeout(ACTIVATION_WAIT) {
                if let Err(err) = launch_get(target) {
                    tracing::warn!(task_id = target, error = %err, "could not open task");
                }
            }
        }));
        Ok(())
    }

    fn wait_for_activations(&self, timeout: Duration) -> usize {
        self.waiters.wait(timeout)
    }
}
