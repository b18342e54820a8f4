use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use task_core::config::{Config, Palette};
use task_core::error::AppError;
use task_core::model::priority::COLOR_RESET;
use task_core::model::{Priority, Task, TimeStatus, format_datetime};
use time::OffsetDateTime;
use time::macros::format_description;

const TITLE_WIDTH: usize = 37;
const LIST_SEPARATOR_WIDTH: usize = 50;

/// Colors are on unless `NO_COLOR` is set or output is JSON.
pub fn color_enabled(json: bool) -> bool {
    !json && std::env::var_os("NO_COLOR").is_none()
}

/// Human readable status column text.
pub fn status_label(task: &Task) -> &'static str {
    if task.done {
        return "✓ Done";
    }
    match task.time_status() {
        TimeStatus::Overdue => "! Overdue",
        TimeStatus::DueSoon => "→ DueSoon",
        TimeStatus::Upcoming => "⏰ Upcoming",
        TimeStatus::Normal => "Pending",
    }
}

pub fn status_icon(task: &Task) -> &'static str {
    if task.done {
        return "[✓]";
    }
    match task.time_status() {
        TimeStatus::Overdue => "[!]",
        TimeStatus::DueSoon => "[→]",
        TimeStatus::Upcoming => "[⏰]",
        TimeStatus::Normal => "[ ]",
    }
}

/// Shortens `title` to `max` characters, ending in `...` when cut.
pub fn truncate_title(title: &str, max: usize) -> String {
    if title.chars().count() <= max {
        return title.to_string();
    }
    let kept: String = title.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// JSON view of a task: the persisted fields plus `time_status`.
pub fn task_json(task: &Task) -> Result<Value, AppError> {
    let mut value =
        serde_json::to_value(task).map_err(|err| AppError::invalid_data(err.to_string()))?;
    if let Value::Object(fields) = &mut value {
        fields.insert(
            "time_status".to_string(),
            serde_json::to_value(task.time_status())
                .map_err(|err| AppError::invalid_data(err.to_string()))?,
        );
    }
    Ok(value)
}

pub fn tasks_json(tasks: &[Task]) -> Result<Value, AppError> {
    tasks
        .iter()
        .map(task_json)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Due Date")]
    due_date: String,
    #[tabled(rename = "Reminder")]
    reminder: String,
    #[tabled(rename = "Created")]
    created: String,
}

/// Renders tasks for the terminal, with or without ANSI colors.
#[derive(Debug, Clone)]
pub struct Presenter {
    color: bool,
    palette: Palette,
}

impl Presenter {
    pub fn new(config: &Config, color: bool) -> Self {
        let palette = if color {
            config.palette()
        } else {
            Palette::PLAIN
        };
        Self { color, palette }
    }

    pub fn plain() -> Self {
        Self {
            color: false,
            palette: Palette::PLAIN,
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{COLOR_RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn priority(&self, priority: Priority) -> String {
        self.paint(priority.color_code(), priority.as_str())
    }

    pub fn table(&self, tasks: &[Task]) -> String {
        let rows = tasks.iter().map(|task| {
            let due_date = format_datetime(task.due_date);
            let reminder = format_datetime(task.reminder);
            TaskRow {
                id: task.id,
                status: status_label(task).to_string(),
                priority: self.priority(task.priority),
                title: truncate_title(&task.title, TITLE_WIDTH),
                due_date: if task.is_overdue() {
                    self.paint(TimeStatus::Overdue.color_code(), &due_date)
                } else {
                    due_date
                },
                reminder: if task.is_upcoming() {
                    self.paint(TimeStatus::Upcoming.color_code(), &reminder)
                } else {
                    self.palette.mutedize(&reminder)
                },
                created: format_datetime(Some(task.created_at)),
            }
        });

        let mut table = Table::new(rows);
        table.with(Style::modern());
        table.to_string()
    }

    /// Detailed view of every task, each followed by a separator line.
    pub fn list(&self, tasks: &[Task]) -> String {
        let separator = "-".repeat(LIST_SEPARATOR_WIDTH);
        tasks
            .iter()
            .map(|task| format!("{}\n{separator}", self.detail(task)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn detail(&self, task: &Task) -> String {
        let mut lines = vec![
            String::new(),
            format!(
                "{} {}: {} - {}",
                status_icon(task),
                self.palette.accentize(&format!("Task #{}", task.id)),
                self.priority(task.priority),
                task.title
            ),
            format!("   Created: {}", format_seconds(task.created_at)),
        ];

        if task.due_date.is_some() {
            let line = format!("   Due: {}", format_datetime(task.due_date));
            lines.push(if task.is_overdue() {
                self.paint(TimeStatus::Overdue.color_code(), &line)
            } else {
                line
            });
        }

        if task.reminder.is_some() {
            let line = format!("   Reminder: {}", format_datetime(task.reminder));
            lines.push(if task.is_upcoming() {
                self.paint(TimeStatus::Upcoming.color_code(), &line)
            } else {
                line
            });
        }

        if let Some(completed_at) = task.completed_at.filter(|_| task.done) {
            lines.push(format!("   Completed: {}", format_seconds(completed_at)));
        }

        lines.join("\n")
    }
}

fn format_seconds(value: OffsetDateTime) -> String {
    value
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| format_datetime(Some(value)))
}
