//! Task form input and validation
//!
//! Both the command line and the board collect task fields as raw strings.
//! [`TaskForm::validate`] is the single place they are checked before a
//! [`TaskFields`] value reaches the session.

use thiserror::Error;

use crate::domain::{parse_date, Priority, Task, TaskFields};

/// Format used to show and accept due dates in forms
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Due date is required")]
    MissingDueDate,

    #[error("Invalid due date '{0}': expected YYYY-MM-DD")]
    InvalidDueDate(String),

    #[error("Unknown priority '{0}': expected low, medium or high")]
    UnknownPriority(String),
}

/// Raw form input, one string per task field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub due: String,
    pub priority: String,
}

impl TaskForm {
    /// Pre-fills a form with the current values of a task
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due: task.due_date.format(DUE_DATE_FORMAT).to_string(),
            priority: task.priority.to_string(),
        }
    }

    /// Checks the input and converts it into task fields
    ///
    /// A blank priority means [`Priority::Medium`].
    pub fn validate(&self) -> Result<TaskFields, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let due = self.due.trim();
        if due.is_empty() {
            return Err(ValidationError::MissingDueDate);
        }
        let due_date =
            parse_date(due).ok_or_else(|| ValidationError::InvalidDueDate(due.to_string()))?;

        let priority = match self.priority.trim() {
            "" => Priority::default(),
            value => value
                .parse()
                .map_err(|_| ValidationError::UnknownPriority(value.to_string()))?,
        };

        Ok(TaskFields {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            due_date,
            priority,
        })
    }

    /// Validates the form as an edit of `task`
    ///
    /// The form only shows the day of the due date, so a due date left on
    /// the task's current day keeps its stored time.
    pub fn validate_edit(&self, task: &Task) -> Result<TaskFields, ValidationError> {
        let mut fields = self.validate()?;
        if fields.due_date.date_naive() == task.due_date.date_naive() {
            fields.due_date = task.due_date;
        }
        Ok(fields)
    }
}
