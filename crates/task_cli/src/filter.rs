use task_core::error::AppError;
use task_core::model::{Task, TimeStatus, parse_datetime};
use time::macros::time;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

/// Selection applied by `list --due`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFilter {
    /// Tasks with a due date at or before the cutoff.
    DueBy(OffsetDateTime),
    /// Tasks whose current time status matches.
    Status(TimeStatus),
}

impl TimeFilter {
    /// Resolves a filter keyword or an explicit date relative to `now`.
    ///
    /// Keywords are case-insensitive: `today`, `tomorrow`, `thisweek`,
    /// `nextweek`, `overdue`, `duesoon` and `upcoming`. Anything else is
    /// parsed as a date in the offset of `now`.
    pub fn parse(raw: &str, now: OffsetDateTime) -> Result<Self, AppError> {
        let keyword = raw.trim().to_ascii_lowercase();
        let offset = now.offset();
        let today = now.date();
        let weekday = i64::from(now.weekday().number_days_from_sunday());

        let filter = match keyword.as_str() {
            "today" => Self::DueBy(end_of_day(today, offset)),
            "tomorrow" => Self::DueBy(end_of_day(today + Duration::days(1), offset)),
            "thisweek" => Self::DueBy(end_of_day(today + Duration::days(7 - weekday), offset)),
            "nextweek" => {
                let start = today + Duration::days(7 - weekday + 1);
                Self::DueBy(end_of_day(start + Duration::days(6), offset))
            }
            "overdue" => Self::Status(TimeStatus::Overdue),
            "duesoon" => Self::Status(TimeStatus::DueSoon),
            "upcoming" => Self::Status(TimeStatus::Upcoming),
            _ => {
                let cutoff = parse_datetime(raw, offset).map_err(|_| {
                    AppError::invalid_input(format!(
                        "invalid time filter '{}': use today, tomorrow, thisweek, nextweek, \
                         overdue, duesoon, upcoming or YYYY-MM-DD HH:MM",
                        raw.trim()
                    ))
                })?;
                Self::DueBy(cutoff)
            }
        };

        tracing::debug!(filter = raw, resolved = ?filter, "resolved time filter");
        Ok(filter)
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::DueBy(cutoff) => task.due_date.is_some_and(|due| due <= *cutoff),
            Self::Status(status) => task.time_status() == *status,
        }
    }
}

fn end_of_day(date: Date, offset: UtcOffset) -> OffsetDateTime {
    date.with_time(time!(23:59:59)).assume_offset(offset)
}

/// Drops completed tasks unless `show_completed`, then applies `filter`.
/// Input order is preserved.
pub fn filter_tasks(tasks: Vec<Task>, filter: Option<&TimeFilter>, show_completed: bool) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|task| show_completed || !task.done)
        .filter(|task| filter.is_none_or(|filter| filter.matches(task)))
        .collect()
}
