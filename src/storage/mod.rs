//! # Storage Layer
//!
//! Persistence for tasksort: the adapter interface the session saves through,
//! the JSON file store behind it, and project configuration.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSON array of task records | `.tasksort/{storage_key}.json` |
//! | Config | TOML | `.tasksort/config.toml` |
//! | Global config | TOML | `~/.config/tasksort/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`TaskStore`] uses file locking (`fs2`) for concurrent access
//! - All writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Persistence`] - Load/save contract; never surfaces errors to the core
//! - [`TaskStore`] - File-backed [`Persistence`]
//! - [`MemoryStore`] - In-memory [`Persistence`]
//! - [`Project`] - Entry point for accessing a tasksort project
//! - [`Config`] - Project and global configuration

mod adapter;
mod json;
mod config;
mod project;

pub use adapter::{MemoryStore, Persistence};
pub use json::TaskStore;
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig};
pub use project::{Project, ProjectError, PROJECT_DIR};
