//! Sessions
//!
//! A [`Session`] wires a [`TaskCollection`] to a [`Persistence`] adapter and
//! remembers the active view filter. Presentation code sends it [`Intent`]s;
//! every intent maps to one collection operation, mutations are saved right
//! after they are applied, and the caller gets back the refreshed view.
//!
//! Saving happens only after the collection call has returned. A failed save
//! is logged by the adapter and reported in [`Refresh::saved`]; the in-memory
//! collection keeps the applied change either way.

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{
    CollectionError, Counts, SortKind, Task, TaskCollection, TaskFields, TaskId, ViewFilter,
};
use crate::storage::Persistence;

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Collection(#[from] CollectionError),
}

/// A user request coming from the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Add(TaskFields),
    Edit(TaskId, TaskFields),
    Toggle(TaskId),
    Delete(TaskId),
    ChangeStrategy(SortKind),
    ChangeFilter(ViewFilter),
}

/// Result of dispatching an intent
#[derive(Debug, Clone, PartialEq)]
pub struct Refresh {
    /// The task set was modified
    pub changed: bool,

    /// The modified task set was written by the adapter
    pub saved: bool,

    /// The task the intent acted on, as it is after the intent (before
    /// removal, for deletes)
    pub affected: Option<Task>,

    /// Current filter applied, ordered by the current strategy
    pub view: Vec<Task>,
}

/// Owns one collection, its persistence adapter and the current filter
pub struct Session<P: Persistence> {
    collection: TaskCollection,
    store: P,
    filter: ViewFilter,
}

impl<P: Persistence> Session<P> {
    /// Loads the stored task set and starts a session over it
    ///
    /// Records that cannot be turned into tasks, and records repeating an
    /// ID already loaded, are skipped with a warning. Skipping any of them
    /// asks the store to preserve its original data.
    pub fn open(store: P, strategy: SortKind, filter: ViewFilter) -> Self {
        let mut collection = TaskCollection::empty();
        collection.set_strategy(strategy);

        let mut skipped = 0;
        for record in store.load() {
            let title = record.title.clone();
            let added = Task::from_record(record)
                .map_err(|e| e.to_string())
                .and_then(|task| collection.add(task).map_err(|e| e.to_string()));
            if let Err(e) = added {
                warn!(title = %title, "Skipping stored task: {}", e);
                skipped += 1;
            }
        }
        if skipped > 0 {
            store.preserve_original();
        }

        debug!(
            count = collection.len(),
            strategy = %strategy,
            filter = %filter,
            "Opened session"
        );

        Self {
            collection,
            store,
            filter,
        }
    }

    /// Applies an intent and returns the refreshed view
    pub fn dispatch(&mut self, intent: Intent) -> Result<Refresh, SessionError> {
        debug!(?intent, "Dispatching intent");

        let (changed, affected) = match intent {
            Intent::Add(fields) => {
                let task = Task::from_fields(fields);
                self.collection.add(task.clone())?;
                (true, Some(task))
            }
            Intent::Edit(id, fields) => match self.collection.get(&id).cloned() {
                Some(mut copy) => {
                    copy.apply(fields);
                    let found = self.collection.update(&id, copy.clone())?;
                    (found, Some(copy))
                }
                None => (false, None),
            },
            Intent::Toggle(id) => match self.collection.get(&id).cloned() {
                Some(mut copy) => {
                    copy.toggle_complete();
                    let found = self.collection.update(&id, copy.clone())?;
                    (found, Some(copy))
                }
                None => (false, None),
            },
            Intent::Delete(id) => {
                let existing = self.collection.get(&id).cloned();
                (self.collection.remove(&id), existing)
            }
            Intent::ChangeStrategy(kind) => {
                self.collection.set_strategy(kind);
                (false, None)
            }
            Intent::ChangeFilter(filter) => {
                self.filter = filter;
                (false, None)
            }
        };

        let saved = changed && self.store.save(self.collection.list_all());
        if changed && !saved {
            warn!("Changes were applied in memory but not saved");
        }

        Ok(Refresh {
            changed,
            saved,
            affected,
            view: self.view(),
        })
    }

    /// Current filter applied, ordered by the current strategy
    pub fn view(&self) -> Vec<Task> {
        self.collection.filtered_sorted_view(self.filter)
    }

    /// Looks up a task by ID
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.collection.get(id)
    }

    pub fn collection(&self) -> &TaskCollection {
        &self.collection
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn filter(&self) -> ViewFilter {
        self.filter
    }

    pub fn strategy(&self) -> SortKind {
        self.collection.strategy()
    }

    pub fn counts(&self) -> Counts {
        self.collection.counts()
    }
}
