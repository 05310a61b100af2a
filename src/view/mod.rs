//! Presentation data derived from an owner's task list.
//!
//! Nothing here touches the store. Handlers fetch the list, build a
//! [`Dashboard`] from it and hand that to [`render`].

pub mod render;

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::{Task, TaskPriority, TaskStatus};

/// Headline counts. `pending` counts everything not completed, so
/// `total == completed + pending` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Kpis {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl Kpis {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }
}

/// One slice of the status chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSlice {
    pub status: TaskStatus,
    pub count: usize,
}

/// Count tasks per status, largest group first. Empty groups are left out.
pub fn status_distribution(tasks: &[Task]) -> Vec<StatusSlice> {
    let mut slices: Vec<StatusSlice> = TaskStatus::ALL
        .iter()
        .map(|&status| StatusSlice {
            status,
            count: tasks.iter().filter(|t| t.status == status).count(),
        })
        .filter(|slice| slice.count > 0)
        .collect();
    // stable: equal counts keep enumeration order
    slices.sort_by(|a, b| b.count.cmp(&a.count));
    slices
}

/// A row of the upcoming-deadlines table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deadline {
    pub title: String,
    pub priority: TaskPriority,
    pub due_date: NaiveDate,
}

/// Unfinished tasks with a valid due date, earliest first.
pub fn upcoming_deadlines(tasks: &[Task]) -> Vec<Deadline> {
    let mut deadlines: Vec<Deadline> = tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Completed)
        .filter_map(|t| {
            t.due_date.map(|due_date| Deadline {
                title: t.title.clone(),
                priority: t.priority,
                due_date,
            })
        })
        .collect();
    deadlines.sort_by_key(|d| d.due_date);
    deadlines
}

/// The statuses shown in the editable list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFilter {
    selected: HashSet<TaskStatus>,
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl StatusFilter {
    pub fn all() -> Self {
        Self {
            selected: TaskStatus::ALL.into_iter().collect(),
        }
    }

    pub fn only(statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        Self {
            selected: statuses.into_iter().collect(),
        }
    }

    pub fn contains(&self, status: TaskStatus) -> bool {
        self.selected.contains(&status)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.contains(t.status)).collect()
    }

    /// Query/form fields that reproduce this selection, in the shape
    /// [`StatusFilterParams`] reads back. The default selection needs none.
    pub fn params(&self) -> Vec<(&'static str, &'static str)> {
        if *self == Self::all() {
            return Vec::new();
        }
        let mut params = vec![("filter", "1")];
        params.extend(
            TaskStatus::ALL
                .into_iter()
                .filter(|&status| self.contains(status))
                .map(|status| (render::status_param(status), "on")),
        );
        params
    }
}

/// Filter checkboxes as submitted by the dashboard form.
///
/// Browsers omit unchecked boxes entirely, so the hidden `filter` field tells
/// an all-unchecked submission apart from a first visit with no filter yet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusFilterParams {
    pub filter: Option<String>,
    pub pending: Option<String>,
    pub in_progress: Option<String>,
    pub completed: Option<String>,
}

impl From<&StatusFilterParams> for StatusFilter {
    fn from(params: &StatusFilterParams) -> Self {
        if params.filter.is_none() {
            return Self::all();
        }
        let checked = [
            (TaskStatus::Pending, &params.pending),
            (TaskStatus::InProgress, &params.in_progress),
            (TaskStatus::Completed, &params.completed),
        ];
        Self::only(
            checked
                .into_iter()
                .filter(|(_, value)| value.is_some())
                .map(|(status, _)| status),
        )
    }
}

/// Everything the page shows for one owner.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub owner: String,
    pub tasks: Vec<Task>,
    pub kpis: Kpis,
    pub distribution: Vec<StatusSlice>,
    pub deadlines: Vec<Deadline>,
    pub filter: StatusFilter,
}

impl Dashboard {
    pub fn new(owner: impl Into<String>, tasks: Vec<Task>, filter: StatusFilter) -> Self {
        Self {
            owner: owner.into(),
            kpis: Kpis::from_tasks(&tasks),
            distribution: status_distribution(&tasks),
            deadlines: upcoming_deadlines(&tasks),
            tasks,
            filter,
        }
    }

    /// Tasks passing the status filter, in listing order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.filter.apply(&self.tasks)
    }
}
