//! Sorting strategies
//!
//! A [`SortStrategy`] orders a slice of tasks without touching it. The three
//! built-in strategies are unit structs; [`SortKind`] names them and hands out
//! the matching `&'static dyn SortStrategy`, so the active strategy can be
//! swapped at runtime by changing a single `Copy` value.
//!
//! All strategies sort stably: tasks with equal keys keep their input order.
//! Views are resorted in full after every change, and stability is what keeps
//! unrelated tasks from jumping around between refreshes.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::task::Task;

#[derive(Debug, Error, PartialEq)]
pub enum SortError {
    #[error("Sort strategy '{0}' is not implemented (expected due_date, priority or alphabetical)")]
    NotImplemented(String),
}

/// A comparison algorithm over tasks
pub trait SortStrategy: Send + Sync {
    /// Short name of the strategy
    fn name(&self) -> &'static str;

    /// Orders two tasks
    fn compare(&self, a: &Task, b: &Task) -> Ordering;

    /// Returns a new, stably sorted copy of `tasks`
    fn sort(&self, tasks: &[Task]) -> Vec<Task> {
        let mut sorted = tasks.to_vec();
        // `sort_by` is a stable merge sort
        sorted.sort_by(|a, b| self.compare(a, b));
        sorted
    }
}

/// Earliest due date first
#[derive(Debug, Clone, Copy, Default)]
pub struct ByDueDate;

impl SortStrategy for ByDueDate {
    fn name(&self) -> &'static str {
        "due_date"
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        a.due_date.cmp(&b.due_date)
    }
}

/// Highest priority first
#[derive(Debug, Clone, Copy, Default)]
pub struct ByPriority;

impl SortStrategy for ByPriority {
    fn name(&self) -> &'static str {
        "priority"
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        b.priority.rank().cmp(&a.priority.rank())
    }
}

/// Title order, ignoring case and common accents
#[derive(Debug, Clone, Copy, Default)]
pub struct Alphabetical;

impl SortStrategy for Alphabetical {
    fn name(&self) -> &'static str {
        "alphabetical"
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        collate(&a.title, &b.title)
    }
}

/// Compares two strings the way a human-facing list expects.
///
/// Letters are compared case- and accent-insensitively first. Only when that
/// ties do accents (unaccented first) and then case (lowercase first) break
/// the tie. Identical strings compare equal.
pub fn collate(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let primary = fold(a).cmp(fold(b));
    if primary != Ordering::Equal {
        return primary;
    }

    let accents = a
        .chars()
        .map(|c| base_letter(c).is_some())
        .cmp(b.chars().map(|c| base_letter(c).is_some()));
    if accents != Ordering::Equal {
        return accents;
    }

    let case = a
        .chars()
        .map(char::is_uppercase)
        .cmp(b.chars().map(char::is_uppercase));
    case.then_with(|| a.cmp(b))
}

fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| base_letter(c).unwrap_or(c))
}

/// Maps an accented Latin-1 letter to its base letter
fn base_letter(c: char) -> Option<char> {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'a',
        'ç' | 'Ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => 'i',
        'ñ' | 'Ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => 'u',
        'ý' | 'ÿ' | 'Ý' => 'y',
        _ => return None,
    };
    Some(base)
}

/// Names the available strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SortKind {
    #[default]
    DueDate,
    Priority,
    Alphabetical,
}

impl SortKind {
    pub const ALL: [SortKind; 3] = [SortKind::DueDate, SortKind::Priority, SortKind::Alphabetical];

    /// Returns the strategy implementing this kind
    pub fn strategy(self) -> &'static dyn SortStrategy {
        match self {
            SortKind::DueDate => &ByDueDate,
            SortKind::Priority => &ByPriority,
            SortKind::Alphabetical => &Alphabetical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.strategy().name()
    }

    /// Short label for sort controls
    pub fn label(&self) -> &'static str {
        match self {
            SortKind::DueDate => "Date",
            SortKind::Priority => "Priority",
            SortKind::Alphabetical => "A-Z",
        }
    }

    /// One-line description of the ordering
    pub fn describe(&self) -> &'static str {
        match self {
            SortKind::DueDate => "Sorts tasks by their due dates",
            SortKind::Priority => "Sorts tasks by priority level (high to low)",
            SortKind::Alphabetical => "Sorts tasks alphabetically by title",
        }
    }

    /// Next kind in control order, wrapping around
    pub fn next(self) -> Self {
        match self {
            SortKind::DueDate => SortKind::Priority,
            SortKind::Priority => SortKind::Alphabetical,
            SortKind::Alphabetical => SortKind::DueDate,
        }
    }

    /// Sorts `tasks` with this kind's strategy
    pub fn sort(self, tasks: &[Task]) -> Vec<Task> {
        self.strategy().sort(tasks)
    }
}

impl fmt::Display for SortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKind {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "due_date" | "due-date" | "due" | "date" => Ok(SortKind::DueDate),
            "priority" | "prio" => Ok(SortKind::Priority),
            "alphabetical" | "alpha" | "title" | "az" | "a-z" => Ok(SortKind::Alphabetical),
            _ => Err(SortError::NotImplemented(s.to_string())),
        }
    }
}

impl TryFrom<String> for SortKind {
    type Error = SortError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortKind> for String {
    fn from(kind: SortKind) -> Self {
        kind.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::Priority;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn task(title: &str) -> Task {
        Task::new(title)
    }

    fn due(title: &str, y: i32, m: u32, d: u32) -> Task {
        task(title).with_due_date(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap())
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn empty_input_gives_empty_output() {
        for kind in SortKind::ALL {
            assert!(kind.sort(&[]).is_empty());
        }
    }

    #[test]
    fn by_due_date_ascending() {
        let tasks = vec![
            due("march", 2024, 3, 1),
            due("january", 2024, 1, 1),
            due("february", 2024, 2, 1),
        ];

        let sorted = ByDueDate.sort(&tasks);
        assert_eq!(titles(&sorted), vec!["january", "february", "march"]);
    }

    #[test]
    fn by_due_date_ties_keep_input_order() {
        let tasks = vec![
            due("b", 2024, 1, 1),
            due("a", 2024, 1, 1),
            due("c", 2023, 12, 31),
        ];

        let sorted = ByDueDate.sort(&tasks);
        assert_eq!(titles(&sorted), vec!["c", "b", "a"]);
    }

    #[test]
    fn by_priority_descending_and_stable() {
        let tasks = vec![
            task("low").with_priority(Priority::Low),
            task("high-1").with_priority(Priority::High),
            task("medium").with_priority(Priority::Medium),
            task("high-2").with_priority(Priority::High),
        ];

        let sorted = ByPriority.sort(&tasks);
        assert_eq!(titles(&sorted), vec!["high-1", "high-2", "medium", "low"]);
    }

    #[test]
    fn alphabetical_ignores_case() {
        let tasks = vec![task("banana"), task("Apple"), task("cherry")];

        let sorted = Alphabetical.sort(&tasks);
        assert_eq!(titles(&sorted), vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn alphabetical_folds_accents() {
        let tasks = vec![task("fig"), task("éclair"), task("apple"), task("date")];

        let sorted = Alphabetical.sort(&tasks);
        assert_eq!(titles(&sorted), vec!["apple", "date", "éclair", "fig"]);
    }

    #[test]
    fn alphabetical_equal_titles_keep_input_order() {
        let first = Task::new("Same");
        let second = Task::new("Same");
        let tasks = vec![first.clone(), task("Other"), second.clone()];

        let sorted = Alphabetical.sort(&tasks);
        assert_eq!(sorted[0].title, "Other");
        assert_eq!(sorted[1].id, first.id);
        assert_eq!(sorted[2].id, second.id);
    }

    #[test]
    fn collate_tie_breaks() {
        assert_eq!(collate("apple", "Apple"), Ordering::Less);
        assert_eq!(collate("resume", "résumé"), Ordering::Less);
        assert_eq!(collate("Zebra", "apple"), Ordering::Greater);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }

    #[test]
    fn sort_does_not_mutate_input() {
        let tasks = vec![task("b"), task("a")];
        let before = tasks.clone();

        let _ = Alphabetical.sort(&tasks);
        assert_eq!(tasks, before);
    }

    #[test]
    fn kind_parse_and_aliases() {
        assert_eq!("due_date".parse::<SortKind>().unwrap(), SortKind::DueDate);
        assert_eq!("date".parse::<SortKind>().unwrap(), SortKind::DueDate);
        assert_eq!("Priority".parse::<SortKind>().unwrap(), SortKind::Priority);
        assert_eq!("a-z".parse::<SortKind>().unwrap(), SortKind::Alphabetical);
    }

    #[test]
    fn unknown_kind_fails_fast() {
        assert_eq!(
            "random".parse::<SortKind>(),
            Err(SortError::NotImplemented("random".to_string()))
        );
    }

    #[test]
    fn kind_serde_uses_names() {
        let json = serde_json::to_string(&SortKind::Alphabetical).unwrap();
        assert_eq!(json, "\"alphabetical\"");

        let parsed: SortKind = serde_json::from_str("\"priority\"").unwrap();
        assert_eq!(parsed, SortKind::Priority);

        let err = serde_json::from_str::<SortKind>("\"shuffle\"").unwrap_err();
        assert!(err.to_string().contains("not implemented"));
    }

    #[test]
    fn kind_next_cycles_through_all() {
        let mut kind = SortKind::default();
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(kind);
            kind = kind.next();
        }
        assert_eq!(seen, SortKind::ALL.to_vec());
        assert_eq!(kind, SortKind::DueDate);
    }

    #[test]
    fn kind_names_match_strategies() {
        for kind in SortKind::ALL {
            assert_eq!(kind.as_str().parse::<SortKind>().unwrap(), kind);
        }
    }

    fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
        let titles = prop::sample::select(vec!["alpha", "Alpha", "beta", "gamma", "élan"]);
        let priorities = prop::sample::select(vec![Priority::Low, Priority::Medium, Priority::High]);
        prop::collection::vec((titles, priorities, 0u32..4), 0..24).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (title, priority, day))| {
                    Task::with_id(format!("t-{}", i).parse().unwrap(), title)
                        .with_priority(priority)
                        .with_due_date(Utc.with_ymd_and_hms(2024, 1, day + 1, 0, 0, 0).unwrap())
                })
                .collect()
        })
    }

    fn position(task: &Task) -> usize {
        task.id.as_str()[2..].parse().unwrap()
    }

    proptest! {
        #[test]
        fn every_strategy_is_stable(tasks in arb_tasks()) {
            for kind in SortKind::ALL {
                let strategy = kind.strategy();
                let sorted = strategy.sort(&tasks);

                prop_assert_eq!(sorted.len(), tasks.len());
                for pair in sorted.windows(2) {
                    let order = strategy.compare(&pair[0], &pair[1]);
                    prop_assert_ne!(order, Ordering::Greater);
                    if order == Ordering::Equal {
                        prop_assert!(position(&pair[0]) < position(&pair[1]));
                    }
                }
            }
        }

        #[test]
        fn resorting_changes_nothing(tasks in arb_tasks()) {
            for kind in SortKind::ALL {
                let once = kind.sort(&tasks);
                let twice = kind.sort(&once);
                prop_assert_eq!(once, twice);
            }
        }
    }
}
