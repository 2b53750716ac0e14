//! JSON file storage for tasks
//!
//! Tasks are stored in `.tasksort/{storage_key}.json` as a single JSON array
//! of task records. Reads and writes lock a `{storage_key}.json.lock` file
//! next to the store; the store itself is replaced by an atomic rename.
//!
//! After a lossy load (an unreadable file, or skipped records) the first save
//! moves the original file aside to `{storage_key}.json.corrupt-{timestamp}`
//! instead of overwriting it.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use chrono::Utc;
use fs2::FileExt;
use tracing::{debug, warn};

use super::adapter::Persistence;
use super::project::PROJECT_DIR;
use crate::domain::{Task, TaskRecord};

/// Store for task data as a JSON document
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    lossy: AtomicBool,
}

impl TaskStore {
    /// Creates a new task store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lossy: AtomicBool::new(false),
        }
    }

    /// Creates the store for a storage key inside a project
    pub fn for_project(project_root: &Path, key: &str) -> Self {
        Self::new(project_root.join(PROJECT_DIR).join(format!("{}.json", key)))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of `suffix` appended to the store file name
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Returns the path of the lock file guarding the store
    pub fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    fn lock_file(&self) -> Result<File> {
        let path = self.lock_path();
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))
    }

    /// Reads every record from the store
    ///
    /// Entries that are not task records are skipped with a warning and mark
    /// the load as lossy; an unreadable or malformed file is an error.
    pub fn read_all(&self) -> Result<Vec<TaskRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let lock = self.lock_file()?;
        lock.lock_shared()
            .context("Failed to acquire read lock on task store")?;

        let mut content = String::new();
        File::open(&self.path)
            .and_then(|mut file| file.read_to_string(&mut content))
            .with_context(|| format!("Failed to read task store: {}", self.path.display()))?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<serde_json::Value> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse task store: {}", self.path.display()))?;

        let mut records = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<TaskRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(index, error = %e, "Skipping unreadable task record");
                    self.lossy.store(true, Ordering::SeqCst);
                }
            }
        }

        // Lock is released when the lock file is dropped
        Ok(records)
    }

    /// Writes all tasks to the store (full rewrite)
    pub fn write_all(&self, tasks: &[Task]) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let lock = self.lock_file()?;
        lock.lock_exclusive()
            .context("Failed to acquire write lock on task store")?;

        if self.lossy.load(Ordering::SeqCst) {
            self.move_aside()?;
            self.lossy.store(false, Ordering::SeqCst);
        }

        // Write to temp file first
        let temp_path = self.sibling(".tmp");

        {
            let file = File::create(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
            let mut writer = BufWriter::new(&file);

            let records: Vec<TaskRecord> = tasks.iter().map(Task::to_record).collect();
            serde_json::to_writer_pretty(&mut writer, &records)
                .context("Failed to serialize tasks")?;
            writeln!(writer).context("Failed to write task store")?;

            writer.flush().context("Failed to flush task store")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        debug!(path = %self.path.display(), count = tasks.len(), "Saved tasks");
        Ok(())
    }

    /// Renames the current store file to a timestamped backup
    fn move_aside(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let backup = self.sibling(&format!(".corrupt-{}", stamp));
        fs::rename(&self.path, &backup).with_context(|| {
            format!(
                "Failed to back up {} to {}",
                self.path.display(),
                backup.display()
            )
        })?;

        warn!(
            backup = %backup.display(),
            "Task store could not be fully read; original moved aside"
        );
        Ok(())
    }
}

impl Persistence for TaskStore {
    fn load(&self) -> Vec<TaskRecord> {
        match self.read_all() {
            Ok(records) => {
                debug!(path = %self.path.display(), count = records.len(), "Loaded tasks");
                records
            }
            Err(e) => {
                warn!(path = %self.path.display(), "Failed to load tasks from storage: {:#}", e);
                self.preserve_original();
                Vec::new()
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> bool {
        match self.write_all(tasks) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %self.path.display(), "Failed to save tasks to storage: {:#}", e);
                false
            }
        }
    }

    fn preserve_original(&self) {
        self.lossy.store(true, Ordering::SeqCst);
    }
}
