//! Task list derivation: filtering, searching and sorting a task collection,
//! recurrence dates, due-date urgency, dashboard counts, and a pure reducer
//! for task state.
//!
//! Nothing here performs I/O except [`Settings::load`]. Callers own the
//! state and pass it in; every function returns new values.

pub mod config;
pub mod dashboard;
pub mod dates;
pub mod error;
pub mod filter;
pub mod recurrence;
pub mod state;
pub mod task;

pub use config::{Settings, TaskLimits};
pub use dashboard::{compute_metrics, select_todays_focus, DashboardData, DashboardMetrics};
pub use dates::{classify, DateInfo, Urgency};
pub use error::{TaskError, TaskResult};
pub use filter::{
    active_filters, derive_visible_tasks, DueDateFilter, FilterPatch, FilterState,
    PriorityFilter, SortDirection, SortField, SortState, StatusFilter,
};
pub use recurrence::{next_occurrences, next_occurrences_from_str, Frequency, Recurrence};
pub use state::{reduce, reduce_at, TaskAction, TaskState};
pub use task::{parse_tags, NewTask, Priority, Task, TaskUpdate};
