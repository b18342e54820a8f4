use crate::model::priority::Priority;
use crate::model::time_status::TimeStatus;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub done: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "completed_at")]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub due_date: Option<OffsetDateTime>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub reminder: Option<OffsetDateTime>,
    #[serde(skip)]
    time_status: TimeStatus,
}

impl Task {
    pub fn new(
        id: u64,
        title: impl Into<String>,
        priority: Priority,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            done: false,
            priority,
            created_at,
            completed_at: None,
            due_date: None,
            reminder: None,
            time_status: TimeStatus::Normal,
        }
    }

    /// Live classification at `now`; completed tasks are always `Normal`.
    pub fn time_status_at(&self, now: OffsetDateTime) -> TimeStatus {
        if self.done {
            return TimeStatus::Normal;
        }
        TimeStatus::classify(self.due_date, self.reminder, now)
    }

    /// Recomputes the cached status. `TaskManager` calls this after every
    /// mutation and before handing tasks out.
    pub fn refresh_time_status(&mut self, now: OffsetDateTime) -> TimeStatus {
        self.time_status = self.time_status_at(now);
        self.time_status
    }

    /// Status as of the last refresh.
    pub fn time_status(&self) -> TimeStatus {
        self.time_status
    }

    pub fn is_upcoming(&self) -> bool {
        self.time_status == TimeStatus::Upcoming
    }

    pub fn is_overdue(&self) -> bool {
        self.time_status == TimeStatus::Overdue
    }
}

// The cached status is derived state and takes no part in equality.
impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.done == other.done
            && self.priority == other.priority
            && self.created_at == other.created_at
            && self.completed_at == other.completed_at
            && self.due_date == other.due_date
            && self.reminder == other.reminder
    }
}

impl Eq for Task {}

/// `completed_at` is written as RFC 3339 or `null`. Stores written by older
/// builds carry the zero timestamp `0001-01-01T00:00:00Z` for pending tasks,
/// which loads as absent.
mod completed_at {
    use serde::{Deserializer, Serializer};
    use time::OffsetDateTime;

    pub fn serialize<S: Serializer>(
        value: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        time::serde::rfc3339::option::serialize(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error> {
        let value = time::serde::rfc3339::option::deserialize(deserializer)?;
        Ok(value.filter(|timestamp| timestamp.year() > 1))
    }
}
