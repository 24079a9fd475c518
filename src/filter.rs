//! The derivation pipeline: search, filter, then a stable sort.

use std::cmp::Ordering;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::dates::SOON_WINDOW_DAYS;
use crate::state::{TaskAction, TaskState};
use crate::task::{Priority, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Complete,
    Incomplete,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Complete => task.completed,
            StatusFilter::Incomplete => !task.completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityFilter {
    #[default]
    All,
    Low,
    Medium,
    High,
}

impl PriorityFilter {
    fn priority(self) -> Option<Priority> {
        match self {
            PriorityFilter::All => None,
            PriorityFilter::Low => Some(Priority::Low),
            PriorityFilter::Medium => Some(Priority::Medium),
            PriorityFilter::High => Some(Priority::High),
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        self.priority().map_or(true, |p| task.priority == p)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DueDateFilter {
    #[default]
    All,
    Overdue,
    ThisWeek,
    NoDate,
}

impl DueDateFilter {
    /// Malformed due dates count as "no date".
    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            DueDateFilter::All => true,
            DueDateFilter::Overdue => task.is_overdue(today),
            DueDateFilter::ThisWeek => {
                let week_end = today
                    .checked_add_days(Days::new(SOON_WINDOW_DAYS as u64))
                    .unwrap_or(NaiveDate::MAX);
                task.due().is_some_and(|due| due >= today && due <= week_end)
            }
            DueDateFilter::NoDate => task.due().is_none(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub status: StatusFilter,
    pub priority: PriorityFilter,
    pub due_date: DueDateFilter,
}

impl FilterState {
    pub fn is_default(&self) -> bool {
        *self == FilterState::default()
    }

    /// Shallow merge: fields set in `patch` win.
    pub fn merge(&self, patch: &FilterPatch) -> FilterState {
        FilterState {
            status: patch.status.unwrap_or(self.status),
            priority: patch.priority.unwrap_or(self.priority),
            due_date: patch.due_date.unwrap_or(self.due_date),
        }
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        self.status.matches(task)
            && self.priority.matches(task)
            && self.due_date.matches(task, today)
    }
}

/// Partial [`FilterState`] carried by a set-filter action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<PriorityFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DueDateFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    DueDate,
    Priority,
    Title,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// Ordering of two tasks under `sort`. Tasks without a (valid) due date sort
/// after every dated task in ascending order.
pub fn compare_tasks(a: &Task, b: &Task, sort: &SortState) -> Ordering {
    let ordering = match sort.field {
        SortField::DueDate => match (a.due(), b.due()) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
        SortField::Title => compare_titles(&a.title, &b.title),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    match sort.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

// Collation in three levels: base letters (accents and case removed), then
// accents, then case with lowercase first. Raw text breaks any remaining tie.
fn compare_titles(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| case_order(a, b))
        .then_with(|| a.cmp(b))
}

fn base_letters(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn folded(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd().flat_map(char::to_lowercase)
}

fn case_order(a: &str, b: &str) -> Ordering {
    a.nfd()
        .zip(b.nfd())
        .find(|(x, y)| x != y)
        .map_or(Ordering::Equal, |(x, y)| {
            x.is_uppercase().cmp(&y.is_uppercase())
        })
}

/// Runs search, status, priority and due-date narrowing in that order, then
/// sorts stably. The input slice is left untouched.
pub fn derive_visible_tasks<'a>(
    tasks: &'a [Task],
    filters: &FilterState,
    sort: &SortState,
    search_query: &str,
    today: NaiveDate,
) -> Vec<&'a Task> {
    let needle = (!search_query.trim().is_empty()).then(|| search_query.to_lowercase());

    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|task| needle.as_deref().map_or(true, |n| task.matches_query(n)))
        .filter(|task| filters.matches(task, today))
        .collect();
    tracing::trace!(
        total = tasks.len(),
        visible = visible.len(),
        "filtered task list"
    );

    // `sort_by` is stable: equal keys keep their input order.
    visible.sort_by(|a, b| compare_tasks(a, b, sort));
    visible
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKey {
    Search,
    Status,
    Priority,
    DueDate,
}

/// One active criterion, e.g. `Priority: High`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveFilter {
    pub key: FilterKey,
    pub label: &'static str,
    pub value: String,
}

impl ActiveFilter {
    /// The action that removes just this criterion.
    pub fn clear_action(&self) -> TaskAction {
        match self.key {
            FilterKey::Search => TaskAction::SetSearch(String::new()),
            FilterKey::Status => TaskAction::SetFilter(FilterPatch {
                status: Some(StatusFilter::All),
                ..FilterPatch::default()
            }),
            FilterKey::Priority => TaskAction::SetFilter(FilterPatch {
                priority: Some(PriorityFilter::All),
                ..FilterPatch::default()
            }),
            FilterKey::DueDate => TaskAction::SetFilter(FilterPatch {
                due_date: Some(DueDateFilter::All),
                ..FilterPatch::default()
            }),
        }
    }
}

pub fn active_filters(state: &TaskState) -> Vec<ActiveFilter> {
    let mut active = Vec::new();
    let filters = &state.filters;

    if !state.search_query.is_empty() {
        active.push(ActiveFilter {
            key: FilterKey::Search,
            label: "Search",
            value: state.search_query.clone(),
        });
    }

    let status = match filters.status {
        StatusFilter::All => None,
        StatusFilter::Complete => Some("Complete"),
        StatusFilter::Incomplete => Some("Incomplete"),
    };
    if let Some(value) = status {
        active.push(ActiveFilter {
            key: FilterKey::Status,
            label: "Status",
            value: value.to_string(),
        });
    }

    if let Some(priority) = filters.priority.priority() {
        active.push(ActiveFilter {
            key: FilterKey::Priority,
            label: "Priority",
            value: priority.label().to_string(),
        });
    }

    let due = match filters.due_date {
        DueDateFilter::All => None,
        DueDateFilter::Overdue => Some("Overdue"),
        DueDateFilter::ThisWeek => Some("This Week"),
        DueDateFilter::NoDate => Some("No Due Date"),
    };
    if let Some(value) = due {
        active.push(ActiveFilter {
            key: FilterKey::DueDate,
            label: "Due Date",
            value: value.to_string(),
        });
    }

    active
}
