//! tasksort - a task list manager with switchable sort strategies
//!
//! Tasks live in a [`TaskCollection`](domain::TaskCollection) whose display
//! order comes from a runtime-selectable [`SortStrategy`](domain::SortStrategy).
//! A [`Session`](session::Session) connects the collection to a persistence
//! adapter; the CLI and the interactive board drive it through intents.

pub mod domain;
pub mod storage;
pub mod session;
pub mod cli;

pub use domain::{Priority, SortKind, Task, TaskCollection, TaskId, ViewFilter};
pub use session::{Intent, Refresh, Session};
