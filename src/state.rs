use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::Settings;
use crate::dashboard::DashboardData;
use crate::filter::{derive_visible_tasks, FilterPatch, FilterState, SortState};
use crate::task::{NewTask, Task, TaskUpdate};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskState {
    pub tasks: Vec<Task>,
    pub filters: FilterState,
    pub sort: SortState,
    pub search_query: String,
}

impl TaskState {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tasks: Vec::new(),
            filters: settings.default_filters,
            sort: settings.default_sort,
            search_query: String::new(),
        }
    }

    pub fn visible_tasks(&self, today: NaiveDate) -> Vec<&Task> {
        derive_visible_tasks(&self.tasks, &self.filters, &self.sort, &self.search_query, today)
    }

    pub fn dashboard(&self, today: NaiveDate) -> DashboardData<'_> {
        DashboardData::build(&self.tasks, today)
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn with_tasks(&self, tasks: Vec<Task>) -> TaskState {
        TaskState {
            tasks,
            filters: self.filters,
            sort: self.sort,
            search_query: self.search_query.clone(),
        }
    }

    fn map_task(&self, id: &str, f: impl Fn(&mut Task)) -> TaskState {
        let tasks = self
            .tasks
            .iter()
            .map(|task| {
                let mut task = task.clone();
                if task.id == id {
                    f(&mut task);
                }
                task
            })
            .collect();
        self.with_tasks(tasks)
    }
}

/// Everything that can change a [`TaskState`].
///
/// On the wire this is `{"type": "ADD_TASK", "payload": {...}}`. A `type`
/// this crate does not know decodes to [`TaskAction::Unknown`] whatever its
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    remote = "Self",
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum TaskAction {
    LoadTasks { tasks: Vec<Task> },
    AddTask(NewTask),
    UpdateTask { id: String, updates: TaskUpdate },
    DeleteTask { id: String },
    ToggleComplete { id: String },
    SetFilter(FilterPatch),
    SetSort(SortState),
    SetSearch(String),
    ClearFilters,
    ClearCompleted,
    Unknown,
}

const KNOWN_KINDS: [&str; 10] = [
    "LOAD_TASKS",
    "ADD_TASK",
    "UPDATE_TASK",
    "DELETE_TASK",
    "TOGGLE_COMPLETE",
    "SET_FILTER",
    "SET_SORT",
    "SET_SEARCH",
    "CLEAR_FILTERS",
    "CLEAR_COMPLETED",
];

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<Value>,
}

impl<'de> Deserialize<'de> for TaskAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let envelope = Envelope::deserialize(deserializer)?;
        if !KNOWN_KINDS.contains(&envelope.kind.as_str()) {
            tracing::debug!(kind = %envelope.kind, "unrecognised action type");
            return Ok(TaskAction::Unknown);
        }

        let mut tagged = Map::new();
        tagged.insert("type".to_string(), Value::String(envelope.kind));
        if let Some(payload) = envelope.payload {
            tagged.insert("payload".to_string(), payload);
        }
        TaskAction::deserialize(Value::Object(tagged)).map_err(serde::de::Error::custom)
    }
}

impl Serialize for TaskAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        TaskAction::serialize(self, serializer)
    }
}

impl TaskAction {
    pub fn kind(&self) -> &'static str {
        match self {
            TaskAction::LoadTasks { .. } => "LOAD_TASKS",
            TaskAction::AddTask(_) => "ADD_TASK",
            TaskAction::UpdateTask { .. } => "UPDATE_TASK",
            TaskAction::DeleteTask { .. } => "DELETE_TASK",
            TaskAction::ToggleComplete { .. } => "TOGGLE_COMPLETE",
            TaskAction::SetFilter(_) => "SET_FILTER",
            TaskAction::SetSort(_) => "SET_SORT",
            TaskAction::SetSearch(_) => "SET_SEARCH",
            TaskAction::ClearFilters => "CLEAR_FILTERS",
            TaskAction::ClearCompleted => "CLEAR_COMPLETED",
            TaskAction::Unknown => "UNKNOWN",
        }
    }
}

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Applies `action` using the current time for new timestamps.
pub fn reduce(state: &TaskState, action: TaskAction) -> Cow<'_, TaskState> {
    reduce_at(state, action, Utc::now())
}

/// Applies `action` with `now` as the mutation time.
///
/// `state` is never modified. When the action changes nothing (an unknown
/// action, an id that matches no task) the result borrows `state` itself.
pub fn reduce_at(state: &TaskState, action: TaskAction, now: DateTime<Utc>) -> Cow<'_, TaskState> {
    let kind = action.kind();
    tracing::debug!(action = kind, "reducing task state");

    match action {
        TaskAction::LoadTasks { tasks } => Cow::Owned(state.with_tasks(tasks)),
        TaskAction::AddTask(new_task) => {
            let task = new_task.into_task(generate_id(), now);
            tracing::debug!(id = %task.id, "task added");
            let mut tasks = state.tasks.clone();
            tasks.push(task);
            Cow::Owned(state.with_tasks(tasks))
        }
        TaskAction::UpdateTask { id, updates } => {
            if state.get_task(&id).is_none() {
                tracing::warn!(action = kind, id = %id, "no task with this id");
                return Cow::Borrowed(state);
            }
            Cow::Owned(state.map_task(&id, |task| {
                updates.apply(task);
                touch(task, now);
            }))
        }
        TaskAction::DeleteTask { id } => {
            if state.get_task(&id).is_none() {
                tracing::warn!(action = kind, id = %id, "no task with this id");
                return Cow::Borrowed(state);
            }
            let tasks = state.tasks.iter().filter(|t| t.id != id).cloned().collect();
            Cow::Owned(state.with_tasks(tasks))
        }
        TaskAction::ToggleComplete { id } => {
            if state.get_task(&id).is_none() {
                tracing::warn!(action = kind, id = %id, "no task with this id");
                return Cow::Borrowed(state);
            }
            Cow::Owned(state.map_task(&id, |task| {
                task.completed = !task.completed;
                touch(task, now);
            }))
        }
        TaskAction::SetFilter(patch) => Cow::Owned(TaskState {
            filters: state.filters.merge(&patch),
            ..state.clone()
        }),
        TaskAction::SetSort(sort) => Cow::Owned(TaskState {
            sort,
            ..state.clone()
        }),
        TaskAction::SetSearch(search_query) => Cow::Owned(TaskState {
            search_query,
            ..state.clone()
        }),
        TaskAction::ClearFilters => Cow::Owned(TaskState {
            filters: FilterState::default(),
            search_query: String::new(),
            ..state.clone()
        }),
        TaskAction::ClearCompleted => {
            if !state.tasks.iter().any(|t| t.completed) {
                return Cow::Borrowed(state);
            }
            let tasks = state.tasks.iter().filter(|t| !t.completed).cloned().collect();
            Cow::Owned(state.with_tasks(tasks))
        }
        TaskAction::Unknown => Cow::Borrowed(state),
    }
}

// updatedAt never moves behind createdAt, even if the clock does.
fn touch(task: &mut Task, now: DateTime<Utc>) {
    task.updated_at = now.max(task.created_at);
}
