//! Domain models for tasksort
//!
//! Contains the core business logic without any I/O concerns.

mod id;
mod task;
mod strategy;
mod collection;

pub use id::{IdError, TaskId};
pub use task::{format_date, parse_date, Priority, Task, TaskError, TaskFields, TaskRecord};
pub use strategy::{
    collate, Alphabetical, ByDueDate, ByPriority, SortError, SortKind, SortStrategy,
};
pub use collection::{CollectionError, Counts, FilterParseError, TaskCollection, ViewFilter};
