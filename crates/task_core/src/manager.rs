//! The task collection and every operation that mutates or queries it.
//!
//! `TaskManager` is the only owner of tasks. Callers receive copies; a copy
//! edited in place is never written back. Every mutation goes through one
//! private `modify` path that refreshes the cached [`TimeStatus`], so the
//! cache is never stale when read back out.

use crate::clock::{Clock, SystemClock};
use crate::error::AppError;
use crate::model::{Priority, Task, TimeStatus, validate_time_order};
use std::cmp::Ordering;
use std::collections::HashSet;
use time::OffsetDateTime;

/// Highest identifier accepted from a store. Keeps the counter far from
/// `u64::MAX` so allocation never wraps.
pub const MAX_TASK_ID: u64 = i64::MAX as u64;

#[derive(Debug)]
pub struct TaskManager<C = SystemClock> {
    tasks: Vec<Task>,
    next_id: u64,
    clock: C,
}

impl<C: Clock> TaskManager<C> {
    pub fn new(clock: C) -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
            clock,
        }
    }

    /// Adopts previously persisted tasks, keeping their order. The next
    /// identifier moves past the highest one loaded.
    ///
    /// Fails with [`AppError::InvalidData`] on a zero or duplicate id, or on
    /// an id above [`MAX_TASK_ID`].
    pub fn from_tasks(tasks: Vec<Task>, clock: C) -> Result<Self, AppError> {
        let mut manager = Self::new(clock);
        let now = manager.clock.now();
        let mut seen = HashSet::with_capacity(tasks.len());
        for mut task in tasks {
            if task.id == 0 {
                return Err(AppError::invalid_data("task id 0 is not allowed"));
            }
            if !seen.insert(task.id) {
                return Err(AppError::invalid_data(format!(
                    "duplicate task id {}",
                    task.id
                )));
            }
            if task.id > MAX_TASK_ID {
                return Err(AppError::invalid_data(format!(
                    "task id {} exceeds the maximum {MAX_TASK_ID}",
                    task.id
                )));
            }
            if task.id >= manager.next_id {
                manager.next_id = task.id + 1;
            }
            task.refresh_time_status(now);
            manager.tasks.push(task);
        }
        Ok(manager)
    }

    /// Stored tasks in insertion order, for persistence.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// Creates a task. `None` priority means Medium. Never fails; title
    /// validation belongs to the caller.
    pub fn add_task(&mut self, title: &str, priority: Option<Priority>) -> Task {
        let now = self.clock.now();
        let mut task = Task::new(
            self.next_id,
            title.trim(),
            priority.unwrap_or_default(),
            now,
        );
        task.refresh_time_status(now);

        self.next_id += 1;
        self.tasks.push(task.clone());
        task
    }

    /// Returns a copy with a fresh time status. The refresh is also written
    /// back to the stored task.
    pub fn get_task_by_id(&mut self, id: u64) -> Result<Task, AppError> {
        self.modify(id, |_, _| Ok(()))
    }

    /// Applies the basic field changes.
    ///
    /// A blank `title` leaves the title untouched and `None` leaves the
    /// priority untouched. `completed_at` is stamped when `done` flips to
    /// true and cleared when it flips back; re-asserting the current value
    /// keeps it as is.
    pub fn update_task(
        &mut self,
        id: u64,
        title: &str,
        done: bool,
        priority: Option<Priority>,
    ) -> Result<Task, AppError> {
        self.modify(id, |task, now| {
            let trimmed = title.trim();
            if !trimmed.is_empty() {
                task.title = trimmed.to_string();
            }
            if let Some(priority) = priority {
                task.priority = priority;
            }
            if done != task.done {
                task.done = done;
                task.completed_at = done.then_some(now);
            }
            Ok(())
        })
    }

    /// Fails with [`AppError::InvalidTimeOrder`] when the task's existing
    /// reminder is later than `due_date`; the task is left unchanged then.
    pub fn set_due_date(&mut self, id: u64, due_date: OffsetDateTime) -> Result<Task, AppError> {
        self.modify(id, |task, _| {
            validate_time_order(Some(due_date), task.reminder)?;
            task.due_date = Some(due_date);
            Ok(())
        })
    }

    /// Fails with [`AppError::InvalidTimeOrder`] when `reminder` is later
    /// than the task's existing due date; the task is left unchanged then.
    pub fn set_reminder(&mut self, id: u64, reminder: OffsetDateTime) -> Result<Task, AppError> {
        self.modify(id, |task, _| {
            validate_time_order(task.due_date, Some(reminder))?;
            task.reminder = Some(reminder);
            Ok(())
        })
    }

    pub fn remove_due_date(&mut self, id: u64) -> Result<Task, AppError> {
        self.modify(id, |task, _| {
            task.due_date = None;
            Ok(())
        })
    }

    pub fn remove_reminder(&mut self, id: u64) -> Result<Task, AppError> {
        self.modify(id, |task, _| {
            task.reminder = None;
            Ok(())
        })
    }

    /// Removes the task for good and returns it. Remaining tasks keep their
    /// relative order and the identifier is never handed out again.
    pub fn delete_task(&mut self, id: u64) -> Result<Task, AppError> {
        let index = self.position(id)?;
        Ok(self.tasks.remove(index))
    }

    /// A sorted copy of every task, most urgent first.
    ///
    /// Keys, in order:
    /// 1. time status, `Overdue` first;
    /// 2. with `by_due_date`, earlier due date first, dated before undated;
    /// 3. with `by_priority`, higher priority first;
    /// 4. ascending id.
    ///
    /// The stored order is untouched.
    pub fn get_tasks_sorted(&mut self, by_priority: bool, by_due_date: bool) -> Vec<Task> {
        self.refresh_all();
        let mut sorted = self.tasks.clone();
        sorted.sort_by(|a, b| compare_urgency(a, b, by_priority, by_due_date));
        sorted
    }

    /// Tasks whose freshly computed status equals `status`, in stored order.
    pub fn get_tasks_by_time_status(&mut self, status: TimeStatus) -> Vec<Task> {
        self.refresh_all();
        self.tasks
            .iter()
            .filter(|task| task.time_status() == status)
            .cloned()
            .collect()
    }

    /// Single mutation path: applies `change` to the task with `id`,
    /// refreshes its status and returns a copy. When `change` fails the
    /// stored task is not touched.
    fn modify<F>(&mut self, id: u64, change: F) -> Result<Task, AppError>
    where
        F: FnOnce(&mut Task, OffsetDateTime) -> Result<(), AppError>,
    {
        let index = self.position(id)?;
        let now = self.clock.now();

        let mut candidate = self.tasks[index].clone();
        change(&mut candidate, now)?;
        candidate.refresh_time_status(now);

        self.tasks[index] = candidate.clone();
        Ok(candidate)
    }

    fn position(&self, id: u64) -> Result<usize, AppError> {
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(AppError::NotFound(id))
    }

    fn refresh_all(&mut self) {
        let now = self.clock.now();
        for task in &mut self.tasks {
            task.refresh_time_status(now);
        }
    }
}

fn compare_urgency(a: &Task, b: &Task, by_priority: bool, by_due_date: bool) -> Ordering {
    b.time_status()
        .cmp(&a.time_status())
        .then_with(|| {
            if !by_due_date {
                return Ordering::Equal;
            }
            match (a.due_date, b.due_date) {
                (Some(left), Some(right)) => left.cmp(&right),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
        .then_with(|| {
            if by_priority {
                b.priority.cmp(&a.priority)
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| a.id.cmp(&b.id))
}
