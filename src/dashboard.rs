//! Summary counts and "today's focus" for the dashboard.

use chrono::NaiveDate;
use serde::Serialize;

use crate::task::{Priority, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DashboardMetrics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
}

pub fn compute_metrics(tasks: &[Task], today: NaiveDate) -> DashboardMetrics {
    let completed = tasks.iter().filter(|t| t.completed).count();
    let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();
    DashboardMetrics {
        total: tasks.len(),
        completed,
        pending: tasks.len() - completed,
        overdue,
    }
}

/// Incomplete tasks that are due `today` or high priority, in input order.
pub fn select_todays_focus(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| !t.completed)
        .filter(|t| t.due() == Some(today) || t.priority == Priority::High)
        .collect()
}

/// Ids the "clear completed" action would remove.
pub fn completed_ids(tasks: &[Task]) -> Vec<&str> {
    tasks
        .iter()
        .filter(|t| t.completed)
        .map(|t| t.id.as_str())
        .collect()
}

/// Shortens `text` to at most `max_chars` characters, ending in "...".
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData<'a> {
    pub metrics: DashboardMetrics,
    pub focus: Vec<&'a Task>,
}

impl<'a> DashboardData<'a> {
    pub fn build(tasks: &'a [Task], today: NaiveDate) -> Self {
        Self {
            metrics: compute_metrics(tasks, today),
            focus: select_todays_focus(tasks, today),
        }
    }
}
