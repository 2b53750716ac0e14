//! Project management
//!
//! Handles project initialization and provides access to the task store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, TaskStore};

/// Name of the per-project data directory
pub const PROJECT_DIR: &str = ".tasksort";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a tasksort project. Run 'tasksort init' first.")]
    NotInProject,
}

/// A tasksort project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Running it on an existing project leaves its files alone.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let data_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&data_dir).with_context(|| {
            format!("Failed to create {} directory: {}", PROJECT_DIR, data_dir.display())
        })?;

        // Create default config
        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# tasksort configuration

# Sort strategy for `tasksort list`: due_date, priority or alphabetical
default_sort = "due_date"

# View filter for `tasksort list`: all, active or completed
default_filter = "all"

# Tasks are stored in .tasksort/{storage_key}.json
storage_key = "tasks"
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = data_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = r#"# Ignore interrupted atomic writes, store locks and board logs
*.tmp
*.lock
*.log
"#;
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .tasksort directory path
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Returns the task store for the configured storage key
    pub fn task_store(&self) -> TaskStore {
        TaskStore::for_project(&self.root, &self.config.project.storage_key)
    }
}
