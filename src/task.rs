use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::TaskLimits;
use crate::dates::parse_date;
use crate::error::{TaskError, TaskResult};
use crate::recurrence::{next_occurrences, Recurrence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Ordinal used when sorting by priority: high=3, medium=2, low=1.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    /// Raw `YYYY-MM-DD` string as received. Use [`Task::due`] to read it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Parsed due date. Missing and malformed values both read as `None`.
    pub fn due(&self) -> Option<NaiveDate> {
        self.due_date.as_deref().and_then(|raw| parse_date(raw).ok())
    }

    /// Incomplete and due strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due().is_some_and(|due| due < today)
    }

    /// `needle` must already be lowercased.
    pub fn matches_query(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }

    /// Next `count` dates of a recurring task, counted from its due date.
    /// Empty when the task has no recurrence or no valid due date.
    pub fn upcoming_occurrences(&self, count: usize) -> Vec<NaiveDate> {
        match (self.due(), &self.recurrence) {
            (Some(start), Some(rule)) => next_occurrences(start, rule, count),
            _ => Vec::new(),
        }
    }
}

/// Payload of an add: a task without its id and timestamps. Unset fields
/// take the task defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Normalizes form input and checks it against `limits`.
    ///
    /// Title and description are trimmed, an empty description or due date
    /// becomes `None`, and tags are trimmed with empties dropped.
    pub fn validate(self, limits: &TaskLimits) -> TaskResult<NewTask> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(TaskError::Validation("Task title is required".into()));
        }
        if title.chars().count() > limits.title_max {
            return Err(TaskError::Validation(format!(
                "Task title must be {} characters or less",
                limits.title_max
            )));
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let Some(d) = &description {
            if d.chars().count() > limits.description_max {
                return Err(TaskError::Validation(format!(
                    "Description must be {} characters or less",
                    limits.description_max
                )));
            }
        }

        let due_date = self
            .due_date
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let Some(raw) = &due_date {
            parse_date(raw)?;
        }

        let tags = self.tags.map(|tags| clean_tags(tags.iter().map(String::as_str)));
        if let Some(tag) = tags
            .iter()
            .flatten()
            .find(|t| t.chars().count() > limits.tag_max)
        {
            return Err(TaskError::Validation(format!(
                "Tag \"{}\" must be {} characters or less",
                tag, limits.tag_max
            )));
        }

        if let Some(rule) = &self.recurrence {
            if rule.interval < 1 {
                return Err(TaskError::Validation(
                    "Recurrence interval must be at least 1".into(),
                ));
            }
        }

        Ok(NewTask {
            title,
            description,
            due_date,
            tags,
            ..self
        })
    }

    pub(crate) fn into_task(self, id: String, now: DateTime<Utc>) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            completed: self.completed.unwrap_or(false),
            priority: self.priority.unwrap_or_default(),
            due_date: self.due_date,
            tags: self.tags.unwrap_or_default(),
            recurrence: self.recurrence,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Splits comma-separated tag input, trimming each tag and dropping empties.
pub fn parse_tags(input: &str) -> Vec<String> {
    clean_tags(input.split(','))
}

fn clean_tags<'a>(tags: impl Iterator<Item = &'a str>) -> Vec<String> {
    tags.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Partial update. For the optional fields the outer `Option` means
/// "present in the update" and the inner one carries the new value, so a
/// JSON `null` clears the field while an absent key leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub recurrence: Option<Option<Recurrence>>,
}

impl TaskUpdate {
    pub(crate) fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = &self.due_date {
            task.due_date = due_date.clone();
        }
        if let Some(tags) = &self.tags {
            task.tags = tags.clone();
        }
        if let Some(recurrence) = &self.recurrence {
            task.recurrence = *recurrence;
        }
    }
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::Frequency;
    use chrono::TimeZone;

    fn limits() -> TaskLimits {
        TaskLimits::default()
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags("work, home ,,  urgent"), vec!["work", "home", "urgent"]);
        assert!(parse_tags(" , ").is_empty());
        assert_eq!(parse_tags("a,a"), vec!["a", "a"]);
    }

    #[test]
    fn test_validate_trims_and_normalizes() {
        let input = NewTask {
            title: "  Buy milk  ".into(),
            description: Some("   ".into()),
            due_date: Some(" 2026-01-08 ".into()),
            tags: Some(vec![" shop ".into(), "".into()]),
            ..NewTask::default()
        };
        let task = input.validate(&limits()).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, None);
        assert_eq!(task.due_date.as_deref(), Some("2026-01-08"));
        assert_eq!(task.tags, Some(vec!["shop".to_string()]));
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(NewTask::new("   ").validate(&limits()).is_err());
        assert!(NewTask::new("x".repeat(201)).validate(&limits()).is_err());
        assert!(NewTask::new("x".repeat(200)).validate(&limits()).is_ok());

        let long_description = NewTask {
            description: Some("d".repeat(1001)),
            ..NewTask::new("ok")
        };
        assert!(long_description.validate(&limits()).is_err());

        let bad_date = NewTask {
            due_date: Some("next tuesday".into()),
            ..NewTask::new("ok")
        };
        assert!(matches!(
            bad_date.validate(&limits()),
            Err(TaskError::InvalidDate { .. })
        ));

        let long_tag = NewTask {
            tags: Some(vec!["t".repeat(31)]),
            ..NewTask::new("ok")
        };
        assert!(long_tag.validate(&limits()).is_err());

        let zero_interval = NewTask {
            recurrence: Some(Recurrence::new(Frequency::Daily, 0)),
            ..NewTask::new("ok")
        };
        assert!(zero_interval.validate(&limits()).is_err());
    }

    #[test]
    fn test_malformed_due_date_reads_as_none() {
        let now = Utc.with_ymd_and_hms(2026, 1, 8, 9, 0, 0).unwrap();
        let mut task = NewTask::new("t").into_task("1".into(), now);
        task.due_date = Some("2026-13-45".into());
        assert_eq!(task.due(), None);
        assert!(!task.is_overdue(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    }

    #[test]
    fn test_update_distinguishes_absent_from_null() {
        let now = Utc.with_ymd_and_hms(2026, 1, 8, 9, 0, 0).unwrap();
        let mut task = NewTask {
            description: Some("keep me".into()),
            due_date: Some("2026-01-10".into()),
            ..NewTask::new("t")
        }
        .into_task("1".into(), now);

        let update: TaskUpdate = serde_json::from_str(r#"{"dueDate": null, "priority": "high"}"#).unwrap();
        update.apply(&mut task);

        assert_eq!(task.description.as_deref(), Some("keep me"));
        assert_eq!(task.due_date, None);
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn test_task_wire_shape() {
        let json = r#"{
            "id": "abc",
            "title": "Write report",
            "priority": "high",
            "dueDate": "2026-01-15",
            "tags": ["work"],
            "recurrence": {"frequency": "weekly", "interval": 2},
            "createdAt": "2026-01-01T10:00:00Z",
            "updatedAt": "2026-01-02T10:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due(), NaiveDate::from_ymd_opt(2026, 1, 15));
        assert_eq!(task.upcoming_occurrences(2).len(), 2);

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["dueDate"], "2026-01-15");
        assert!(value.get("description").is_none());
    }
}
