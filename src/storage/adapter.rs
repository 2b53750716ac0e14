//! Persistence adapter interface
//!
//! The core never sees storage errors. An adapter loads whatever records it
//! can (an empty list when it cannot read at all) and reports saves as a
//! plain success flag, logging the cause of any failure itself.
//!
//! A load that could not keep every stored record is lossy: the next save
//! would overwrite what was dropped. The session reports this through
//! [`Persistence::preserve_original`] so a file-backed adapter can keep a
//! copy of the original data.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::warn;

use crate::domain::{Task, TaskRecord};

/// Loads and saves the task set of a session
pub trait Persistence {
    /// Returns every stored record, or an empty list if storage is unreadable
    fn load(&self) -> Vec<TaskRecord>;

    /// Replaces the stored task set, returning false on failure
    fn save(&self, tasks: &[Task]) -> bool;

    /// Marks the last load as lossy; the original data must survive the
    /// next save
    fn preserve_original(&self) {}
}

impl<P: Persistence + ?Sized> Persistence for &P {
    fn load(&self) -> Vec<TaskRecord> {
        (**self).load()
    }

    fn save(&self, tasks: &[Task]) -> bool {
        (**self).save(tasks)
    }

    fn preserve_original(&self) {
        (**self).preserve_original()
    }
}

/// In-memory adapter
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<TaskRecord>>,
    fail_saves: AtomicBool,
    lossy: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with records
    pub fn with_records(records: Vec<TaskRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Makes every following save fail (or succeed again)
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// True once a load has been reported as lossy
    pub fn is_lossy(&self) -> bool {
        self.lossy.load(Ordering::SeqCst)
    }

    /// Returns a copy of the stored records
    pub fn records(&self) -> Vec<TaskRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl Persistence for MemoryStore {
    fn load(&self) -> Vec<TaskRecord> {
        self.records()
    }

    fn save(&self, tasks: &[Task]) -> bool {
        if self.fail_saves.load(Ordering::SeqCst) {
            warn!(count = tasks.len(), "Failed to save tasks: memory store rejected write");
            return false;
        }

        match self.records.lock() {
            Ok(mut records) => {
                *records = tasks.iter().map(Task::to_record).collect();
                true
            }
            Err(_) => {
                warn!("Failed to save tasks: memory store lock poisoned");
                false
            }
        }
    }

    fn preserve_original(&self) {
        self.lossy.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        let task = Task::new("Remember me");

        assert!(store.load().is_empty());
        assert!(store.save(&[task.clone()]));

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(Task::from_record(loaded[0].clone()).unwrap(), task);
    }

    #[test]
    fn failing_store_keeps_previous_records() {
        let store = MemoryStore::new();
        assert!(store.save(&[Task::new("kept")]));

        store.set_fail_saves(true);
        assert!(!store.save(&[]));
        assert_eq!(store.load().len(), 1);

        store.set_fail_saves(false);
        assert!(store.save(&[]));
        assert!(store.load().is_empty());
    }

    #[test]
    fn references_are_adapters() {
        fn save_through<P: Persistence>(adapter: P) -> bool {
            adapter.save(&[Task::new("via ref")])
        }

        let store = MemoryStore::new();
        assert!(save_through(&store));
        assert_eq!(store.records().len(), 1);
    }
}
