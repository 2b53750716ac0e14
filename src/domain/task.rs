//! Task domain model
//!
//! A task is a single unit of work with a due date, a priority and a
//! completion flag. Tasks are plain values: callers copy them out of a
//! [`TaskCollection`](super::TaskCollection), change the copy and hand it
//! back through `update`.
//!
//! The serialized form of a task is [`TaskRecord`], a loose attribute bag
//! whose date fields are ISO-8601 strings. Deserializing a `Task` always goes
//! through [`Task::from_record`], so records read from storage get the same
//! defaults and date coercion as tasks built in code.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::id::{IdError, TaskId};

#[derive(Debug, Error, PartialEq)]
pub enum TaskError {
    #[error("Invalid {field}: '{value}' is not an ISO-8601 date")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid priority '{0}': expected low, medium or high")]
    InvalidPriority(String),

    #[error(transparent)]
    Id(#[from] IdError),
}

/// Task priority, ordered `High > Medium > Low`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Numeric rank used for ordering (HIGH=3, MEDIUM=2, LOW=1)
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    /// Returns the serialized name
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Ok(Priority::Low),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "high" | "h" => Ok(Priority::High),
            _ => Err(TaskError::InvalidPriority(s.to_string())),
        }
    }
}

/// Editable fields submitted by a task form
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
}

/// Serialized task shape as persisted or exchanged
///
/// Every field is optional on input; missing fields take the same defaults
/// as [`Task::new`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    /// Unique identifier, fixed at creation
    pub id: TaskId,

    /// Display title (non-empty, checked by the form before it reaches the core)
    pub title: String,

    /// Free text, empty when absent
    pub description: String,

    /// When the task is due
    pub due_date: DateTime<Utc>,

    pub priority: Priority,

    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task last changed state
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task due now, with medium priority and a generated ID
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        let title = title.into();
        let id = TaskId::generate(&title, now);
        Self::build(id, title, now)
    }

    /// Creates a new task with an explicit ID
    pub fn with_id(id: TaskId, title: impl Into<String>) -> Self {
        Self::build(id, title.into(), Utc::now())
    }

    fn build(id: TaskId, title: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            description: String::new(),
            due_date: now,
            priority: Priority::default(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new task from a form submission
    pub fn from_fields(fields: TaskFields) -> Self {
        Task::new(fields.title)
            .with_description(fields.description)
            .with_due_date(fields.due_date)
            .with_priority(fields.priority)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Flips the completion flag and refreshes `updated_at`
    pub fn toggle_complete(&mut self) -> &mut Self {
        self.completed = !self.completed;
        self.touch();
        self
    }

    /// Overwrites the form-editable fields, keeping identity and completion
    pub fn apply(&mut self, fields: TaskFields) -> &mut Self {
        self.title = fields.title;
        self.description = fields.description;
        self.due_date = fields.due_date;
        self.priority = fields.priority;
        self.touch();
        self
    }

    /// Returns the form-editable fields of this task
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            priority: self.priority,
        }
    }

    // Never moves backwards, so updated_at >= created_at holds even if the
    // wall clock steps back between calls.
    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }

    /// Rebuilds a task from its serialized form
    pub fn from_record(record: TaskRecord) -> Result<Self, TaskError> {
        let now = Utc::now();

        let id = match record.id {
            Some(raw) => raw.parse()?,
            None => TaskId::generate(&record.title, now),
        };

        let due_date = parse_date_field("dueDate", record.due_date.as_deref())?.unwrap_or(now);
        let created_at =
            parse_date_field("createdAt", record.created_at.as_deref())?.unwrap_or(now);
        let updated_at = parse_date_field("updatedAt", record.updated_at.as_deref())?
            .unwrap_or(now)
            .max(created_at);

        Ok(Self {
            id,
            title: record.title,
            description: record.description,
            due_date,
            priority: record.priority,
            completed: record.completed,
            created_at,
            updated_at,
        })
    }

    /// Returns the serialized form of this task
    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            id: Some(self.id.to_string()),
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: Some(format_date(self.due_date)),
            priority: self.priority,
            completed: self.completed,
            created_at: Some(format_date(self.created_at)),
            updated_at: Some(format_date(self.updated_at)),
        }
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Task::from_record(record)
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        task.to_record()
    }
}

/// Formats an instant as RFC 3339 with as much sub-second precision as it carries
pub fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses an ISO-8601 instant, a naive date-time (taken as UTC) or a plain
/// `YYYY-MM-DD` date (midnight UTC)
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn parse_date_field(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, TaskError> {
    match value {
        None => Ok(None),
        Some(raw) => parse_date(raw).map(Some).ok_or_else(|| TaskError::InvalidDate {
            field,
            value: raw.to_string(),
        }),
    }
}
