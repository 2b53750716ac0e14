//! Configuration handling for tasksort
//!
//! Configuration is stored in `.tasksort/config.toml` (project) and
//! `~/.config/tasksort/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::project::PROJECT_DIR;
use crate::domain::{SortKind, ViewFilter};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Strategy used when no `--sort` is given
    pub default_sort: SortKind,

    /// View filter used when no `--filter` is given
    pub default_filter: ViewFilter,

    /// Name of the JSON document holding the tasks (`.tasksort/{key}.json`)
    pub storage_key: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            default_sort: SortKind::DueDate,
            default_filter: ViewFilter::All,
            storage_key: "tasks".to_string(),
        }
    }
}

impl ProjectConfig {
    /// Checks values that the type system cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = self.storage_key.as_str();
        if key.is_empty() {
            return Err(ConfigError::Invalid("storage_key cannot be empty".to_string()));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Invalid(format!(
                "storage_key '{}' may only contain letters, digits, '-' and '_'",
                key
            )));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// `strftime` pattern for due dates in text output
    pub date_format: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Text,
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "tasksort", "tasksort")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration, falling back to defaults if there is none
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(PROJECT_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;
        config.validate()?;

        Ok(config)
    }

    /// Finds the project root by looking for a `.tasksort/` directory
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Walks up from `start` looking for a `.tasksort/` directory
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns the project root, or an error if not in a project
    pub fn require_project_root(&self) -> Result<&Path> {
        self.project_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a tasksort project. Run 'tasksort init' first."))
    }

    /// Saves the project configuration
    pub fn save_project(&self) -> Result<()> {
        let root = self.require_project_root()?;
        let config_path = root.join(PROJECT_DIR).join("config.toml");

        let content =
            toml::to_string_pretty(&self.project).context("Failed to serialize project config")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write project config: {}", config_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: None,
        };

        assert_eq!(config.project.default_sort, SortKind::DueDate);
        assert_eq!(config.project.default_filter, ViewFilter::All);
        assert_eq!(config.project.storage_key, "tasks");
        assert_eq!(config.global.default_format, OutputFormat::Text);
        assert_eq!(config.global.date_format, "%Y-%m-%d");
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
default_sort = "priority"
default_filter = "active"
storage_key = "work"
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_sort, SortKind::Priority);
        assert_eq!(config.default_filter, ViewFilter::Active);
        assert_eq!(config.storage_key, "work");
    }

    #[test]
    fn partial_project_config_uses_defaults() {
        let config: ProjectConfig = toml::from_str("default_sort = \"az\"").unwrap();
        assert_eq!(config.default_sort, SortKind::Alphabetical);
        assert_eq!(config.storage_key, "tasks");
    }

    #[test]
    fn unknown_sort_in_config_fails() {
        let result: Result<ProjectConfig, _> = toml::from_str("default_sort = \"shuffle\"");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("not implemented"));
    }

    #[test]
    fn parse_global_config() {
        let toml = r#"
default_format = "json"
date_format = "%d/%m/%Y"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
        assert_eq!(config.date_format, "%d/%m/%Y");
    }

    #[test]
    fn storage_key_validation() {
        let mut config = ProjectConfig::default();
        assert!(config.validate().is_ok());

        config.storage_key = "../escape".to_string();
        assert!(config.validate().is_err());

        config.storage_key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn find_project_root_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(PROJECT_DIR)).unwrap();

        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();

        let root = Config::find_project_root_from(&sub_dir);
        assert_eq!(root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn find_project_root_outside_project() {
        let dir = TempDir::new().unwrap();
        // Temp dirs normally live outside any project; only check the walk
        // does not report the temp dir itself.
        let root = Config::find_project_root_from(dir.path());
        assert_ne!(root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn load_project_config_from_disk() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(PROJECT_DIR)).unwrap();
        fs::write(
            dir.path().join(PROJECT_DIR).join("config.toml"),
            "default_filter = \"completed\"\n",
        )
        .unwrap();

        let config = Config::for_project(dir.path()).unwrap();
        assert_eq!(config.project.default_filter, ViewFilter::Completed);
        assert_eq!(config.project_root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn invalid_storage_key_on_disk_fails() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(PROJECT_DIR)).unwrap();
        fs::write(
            dir.path().join(PROJECT_DIR).join("config.toml"),
            "storage_key = \"a/b\"\n",
        )
        .unwrap();

        assert!(Config::for_project(dir.path()).is_err());
    }

    #[test]
    fn save_project_round_trip() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(PROJECT_DIR)).unwrap();

        let mut config = Config::for_project(dir.path()).unwrap();
        config.project.default_sort = SortKind::Alphabetical;
        config.save_project().unwrap();

        let reloaded = Config::for_project(dir.path()).unwrap();
        assert_eq!(reloaded.project.default_sort, SortKind::Alphabetical);
    }

    #[test]
    fn config_not_in_project() {
        let config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: None,
        };

        assert!(config.require_project_root().is_err());
    }
}
