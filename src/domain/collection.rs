//! Task collection
//!
//! [`TaskCollection`] is the aggregate root: it owns every task and the
//! active [`SortKind`]. Tasks are kept in insertion order; display order is
//! whatever the active strategy produces from the (optionally filtered)
//! sequence.
//!
//! The collection does no locking. Share it between threads only behind a
//! single `Mutex` covering the whole collection, since `update` is a lookup
//! followed by a write.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::TaskId;
use super::strategy::SortKind;
use super::task::Task;

#[derive(Debug, Error, PartialEq)]
pub enum CollectionError {
    #[error("A task with ID {0} already exists")]
    DuplicateId(TaskId),
}

#[derive(Debug, Error, PartialEq)]
#[error("Invalid view filter '{0}': expected all, active or completed")]
pub struct FilterParseError(String);

/// Which tasks a view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl ViewFilter {
    pub const ALL: [ViewFilter; 3] = [ViewFilter::All, ViewFilter::Active, ViewFilter::Completed];

    /// Returns true if `task` belongs in this view
    pub fn matches(self, task: &Task) -> bool {
        match self {
            ViewFilter::All => true,
            ViewFilter::Active => !task.completed,
            ViewFilter::Completed => task.completed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewFilter::All => "all",
            ViewFilter::Active => "active",
            ViewFilter::Completed => "completed",
        }
    }

    /// Next filter in tab order, wrapping around
    pub fn next(self) -> Self {
        match self {
            ViewFilter::All => ViewFilter::Active,
            ViewFilter::Active => ViewFilter::Completed,
            ViewFilter::Completed => ViewFilter::All,
        }
    }
}

impl fmt::Display for ViewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewFilter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ViewFilter::All),
            "active" | "open" | "todo" => Ok(ViewFilter::Active),
            "completed" | "done" => Ok(ViewFilter::Completed),
            _ => Err(FilterParseError(s.to_string())),
        }
    }
}

/// Task tallies per view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Counts {
    pub all: usize,
    pub active: usize,
    pub completed: usize,
}

impl Counts {
    pub fn get(&self, filter: ViewFilter) -> usize {
        match filter {
            ViewFilter::All => self.all,
            ViewFilter::Active => self.active,
            ViewFilter::Completed => self.completed,
        }
    }
}

/// Owns a set of tasks and the strategy used to order them
#[derive(Debug, Clone, Default)]
pub struct TaskCollection {
    tasks: Vec<Task>,
    strategy: SortKind,
}

impl TaskCollection {
    /// Creates a collection with the given strategy and initial tasks
    ///
    /// Fails if two of the initial tasks share an ID.
    pub fn new(
        strategy: SortKind,
        tasks: impl IntoIterator<Item = Task>,
    ) -> Result<Self, CollectionError> {
        let mut collection = Self {
            tasks: Vec::new(),
            strategy,
        };
        for task in tasks {
            collection.add(task)?;
        }
        Ok(collection)
    }

    /// Creates an empty collection sorted by due date
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the active strategy
    pub fn strategy(&self) -> SortKind {
        self.strategy
    }

    /// Replaces the active strategy; takes effect on the next view request
    pub fn set_strategy(&mut self, strategy: SortKind) {
        self.strategy = strategy;
    }

    /// Appends a task, rejecting duplicate IDs
    pub fn add(&mut self, task: Task) -> Result<(), CollectionError> {
        if self.contains(&task.id) {
            return Err(CollectionError::DuplicateId(task.id));
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Removes a task by ID, returning whether it was present
    pub fn remove(&mut self, id: &TaskId) -> bool {
        let len_before = self.tasks.len();
        self.tasks.retain(|t| &t.id != id);
        self.tasks.len() != len_before
    }

    /// Replaces the task with ID `id`, keeping its position
    ///
    /// Returns `Ok(false)` and leaves the collection untouched when no task
    /// has that ID. The replacement may carry a different ID only if no other
    /// task already uses it.
    pub fn update(&mut self, id: &TaskId, task: Task) -> Result<bool, CollectionError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        if &task.id != id && self.contains(&task.id) {
            return Err(CollectionError::DuplicateId(task.id));
        }

        self.tasks[index] = task;
        Ok(true)
    }

    /// Looks up a task by ID
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    /// All tasks in insertion order, unsorted and unfiltered
    pub fn list_all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks matching `filter`, in insertion order
    pub fn filter(&self, filter: ViewFilter) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    /// All tasks ordered by the active strategy
    pub fn sorted_view(&self) -> Vec<Task> {
        self.strategy.sort(&self.tasks)
    }

    /// Tasks matching `filter`, ordered by the active strategy
    pub fn filtered_sorted_view(&self, filter: ViewFilter) -> Vec<Task> {
        self.strategy.sort(&self.filter(filter))
    }

    /// Number of tasks in each view
    pub fn counts(&self) -> Counts {
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        Counts {
            all: self.tasks.len(),
            active: self.tasks.len() - completed,
            completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::Priority;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn make_task(title: &str) -> Task {
        Task::new(title)
    }

    fn due(title: &str, m: u32) -> Task {
        make_task(title).with_due_date(Utc.with_ymd_and_hms(2024, m, 1, 0, 0, 0).unwrap())
    }

    fn titles(tasks: &[Task]) -> Vec<String> {
        tasks.iter().map(|t| t.title.clone()).collect()
    }

    fn ids(tasks: &[Task]) -> HashSet<TaskId> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn default_is_empty_by_due_date() {
        let collection = TaskCollection::empty();
        assert!(collection.is_empty());
        assert_eq!(collection.strategy(), SortKind::DueDate);
        assert!(collection.sorted_view().is_empty());
    }

    #[test]
    fn new_rejects_duplicate_initial_tasks() {
        let task = make_task("Dup");
        let result = TaskCollection::new(SortKind::DueDate, vec![task.clone(), task.clone()]);

        assert_eq!(result.unwrap_err(), CollectionError::DuplicateId(task.id));
    }

    #[test]
    fn add_appends_in_insertion_order() {
        let mut collection = TaskCollection::empty();
        collection.add(make_task("first")).unwrap();
        collection.add(make_task("second")).unwrap();

        assert_eq!(titles(collection.list_all()), vec!["first", "second"]);
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut collection = TaskCollection::empty();
        let task = make_task("Once");
        collection.add(task.clone()).unwrap();

        let result = collection.add(task.clone().with_priority(Priority::High));
        assert_eq!(result, Err(CollectionError::DuplicateId(task.id.clone())));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get(&task.id).unwrap().priority, Priority::Medium);
    }

    #[test]
    fn remove_reports_presence() {
        let mut collection = TaskCollection::empty();
        let task = make_task("Gone");
        collection.add(task.clone()).unwrap();

        assert!(collection.remove(&task.id));
        assert!(!collection.remove(&task.id));
        assert!(collection.is_empty());
    }

    #[test]
    fn add_then_remove_restores_contents() {
        let mut collection =
            TaskCollection::new(SortKind::DueDate, vec![make_task("a"), make_task("b")]).unwrap();
        let before = collection.list_all().to_vec();

        let extra = make_task("extra");
        collection.add(extra.clone()).unwrap();
        collection.remove(&extra.id);

        assert_eq!(collection.list_all(), before.as_slice());
    }

    #[test]
    fn update_preserves_position() {
        let a = make_task("a");
        let b = make_task("b");
        let c = make_task("c");
        let mut collection =
            TaskCollection::new(SortKind::DueDate, vec![a, b.clone(), c]).unwrap();

        let mut copy = collection.get(&b.id).unwrap().clone();
        copy.title = "b2".to_string();
        assert_eq!(collection.update(&b.id, copy), Ok(true));

        assert_eq!(titles(collection.list_all()), vec!["a", "b2", "c"]);
    }

    #[test]
    fn update_unknown_id_changes_nothing() {
        let mut collection = TaskCollection::new(SortKind::DueDate, vec![make_task("a")]).unwrap();
        let before = collection.list_all().to_vec();

        let stranger = make_task("stranger");
        assert_eq!(collection.update(&stranger.id, stranger.clone()), Ok(false));
        assert_eq!(collection.list_all(), before.as_slice());
    }

    #[test]
    fn update_rejects_id_collision() {
        let a = make_task("a");
        let b = make_task("b");
        let mut collection =
            TaskCollection::new(SortKind::DueDate, vec![a.clone(), b.clone()]).unwrap();

        let result = collection.update(&a.id, b.clone().with_priority(Priority::Low));
        assert_eq!(result, Err(CollectionError::DuplicateId(b.id.clone())));
        assert_eq!(collection.get(&a.id), Some(&a));
    }

    #[test]
    fn get_unknown_is_none() {
        let collection = TaskCollection::empty();
        assert!(collection.get(&"t-missing".parse().unwrap()).is_none());
    }

    #[test]
    fn edits_go_through_update() {
        let task = make_task("Toggle me");
        let mut collection = TaskCollection::new(SortKind::DueDate, vec![task.clone()]).unwrap();

        let mut copy = collection.get(&task.id).unwrap().clone();
        copy.toggle_complete();
        assert!(!collection.get(&task.id).unwrap().completed);

        collection.update(&task.id, copy).unwrap();
        assert!(collection.get(&task.id).unwrap().completed);
    }

    #[test]
    fn sorted_view_by_due_date() {
        let collection = TaskCollection::new(
            SortKind::DueDate,
            vec![due("march", 3), due("january", 1), due("february", 2)],
        )
        .unwrap();

        assert_eq!(
            titles(&collection.filtered_sorted_view(ViewFilter::All)),
            vec!["january", "february", "march"]
        );
        // Underlying order untouched
        assert_eq!(
            titles(collection.list_all()),
            vec!["march", "january", "february"]
        );
    }

    #[test]
    fn sorted_view_by_priority() {
        let collection = TaskCollection::new(
            SortKind::Priority,
            vec![
                make_task("low").with_priority(Priority::Low),
                make_task("high-1").with_priority(Priority::High),
                make_task("medium").with_priority(Priority::Medium),
                make_task("high-2").with_priority(Priority::High),
            ],
        )
        .unwrap();

        assert_eq!(
            titles(&collection.filtered_sorted_view(ViewFilter::All)),
            vec!["high-1", "high-2", "medium", "low"]
        );
    }

    #[test]
    fn set_strategy_applies_to_next_view() {
        let mut collection = TaskCollection::new(
            SortKind::DueDate,
            vec![due("b", 1), due("a", 2)],
        )
        .unwrap();

        assert_eq!(titles(&collection.sorted_view()), vec!["b", "a"]);

        collection.set_strategy(SortKind::Alphabetical);
        assert_eq!(collection.strategy(), SortKind::Alphabetical);
        assert_eq!(titles(&collection.sorted_view()), vec!["a", "b"]);
    }

    #[test]
    fn filter_active_and_completed() {
        let collection = TaskCollection::new(
            SortKind::DueDate,
            vec![
                make_task("open-1"),
                make_task("done-1").with_completed(true),
                make_task("open-2"),
                make_task("done-2").with_completed(true),
            ],
        )
        .unwrap();

        assert_eq!(titles(&collection.filter(ViewFilter::Active)), vec!["open-1", "open-2"]);
        assert_eq!(
            titles(&collection.filter(ViewFilter::Completed)),
            vec!["done-1", "done-2"]
        );
        assert_eq!(collection.filter(ViewFilter::All).len(), 4);
    }

    #[test]
    fn filter_then_sort() {
        let collection = TaskCollection::new(
            SortKind::Alphabetical,
            vec![
                make_task("zeta"),
                make_task("beta").with_completed(true),
                make_task("alpha"),
            ],
        )
        .unwrap();

        assert_eq!(
            titles(&collection.filtered_sorted_view(ViewFilter::Active)),
            vec!["alpha", "zeta"]
        );
    }

    #[test]
    fn counts_per_view() {
        let collection = TaskCollection::new(
            SortKind::DueDate,
            vec![make_task("a"), make_task("b").with_completed(true), make_task("c")],
        )
        .unwrap();

        let counts = collection.counts();
        assert_eq!(counts, Counts { all: 3, active: 2, completed: 1 });
        assert_eq!(counts.get(ViewFilter::Active), 2);
    }

    #[test]
    fn view_filter_parse() {
        assert_eq!("ALL".parse::<ViewFilter>().unwrap(), ViewFilter::All);
        assert_eq!("done".parse::<ViewFilter>().unwrap(), ViewFilter::Completed);
        assert_eq!("active".parse::<ViewFilter>().unwrap(), ViewFilter::Active);
        assert!("someday".parse::<ViewFilter>().is_err());
    }

    #[test]
    fn collection_is_shareable_behind_a_mutex() {
        use std::sync::{Arc, Mutex};

        let shared = Arc::new(Mutex::new(TaskCollection::empty()));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    shared.lock().unwrap().add(make_task(&format!("t{}", i))).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.lock().unwrap().len(), 4);
    }

    proptest! {
        #[test]
        fn active_and_completed_partition_all(flags in prop::collection::vec(any::<bool>(), 0..32)) {
            let tasks: Vec<Task> = flags
                .iter()
                .enumerate()
                .map(|(i, done)| make_task(&format!("task {}", i)).with_completed(*done))
                .collect();
            let collection = TaskCollection::new(SortKind::Priority, tasks).unwrap();

            let active = collection.filtered_sorted_view(ViewFilter::Active);
            let completed = collection.filtered_sorted_view(ViewFilter::Completed);

            prop_assert!(active.iter().all(|t| !t.completed));
            prop_assert!(completed.iter().all(|t| t.completed));

            let active_ids = ids(&active);
            let completed_ids = ids(&completed);
            prop_assert!(active_ids.is_disjoint(&completed_ids));

            let union: HashSet<_> = active_ids.union(&completed_ids).cloned().collect();
            prop_assert_eq!(union, ids(collection.list_all()));
        }
    }
}
