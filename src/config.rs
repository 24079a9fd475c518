use std::{fs, path::Path};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TaskResult;
use crate::filter::{FilterState, SortState};
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskLimits {
    pub title_max: usize,
    pub description_max: usize,
    pub tag_max: usize,
}

impl Default for TaskLimits {
    fn default() -> Self {
        Self {
            title_max: 200,
            description_max: 1000,
            tag_max: 30,
        }
    }
}

/// Starting filters, sort order and form limits. Every key is optional in
/// the JSON form; missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub default_filters: FilterState,
    pub default_sort: SortState,
    pub recurrence_preview_count: usize,
    pub limits: TaskLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_filters: FilterState::default(),
            default_sort: SortState::default(),
            recurrence_preview_count: 3,
            limits: TaskLimits::default(),
        }
    }
}

impl Settings {
    pub fn from_json(data: &str) -> TaskResult<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn load(path: impl AsRef<Path>) -> TaskResult<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Upcoming dates of a recurring task, as many as the preview shows.
    pub fn recurrence_preview(&self, task: &Task) -> Vec<NaiveDate> {
        task.upcoming_occurrences(self.recurrence_preview_count)
    }

    /// Like [`Settings::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> TaskResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
