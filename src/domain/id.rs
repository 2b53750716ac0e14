//! Task identifiers
//!
//! ID Format:
//! - Generated IDs: `t-{10-char-hash}` (e.g., `t-9d3e5f2a41`)
//! - Rehydrated IDs: any non-empty string (records written elsewhere may carry UUIDs)
//!
//! The hash is derived from title + creation timestamp + a per-process counter,
//! so two tasks created with the same title in the same instant still differ.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Task ID cannot be empty")]
    Empty,

    #[error("Task ID cannot contain whitespace: '{0}'")]
    Whitespace(String),
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generates a 10-character hash from title, timestamp and the process sequence
fn generate_hash(title: &str, timestamp: DateTime<Utc>) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let input = format!(
        "{}{}{}",
        title,
        timestamp.timestamp_nanos_opt().unwrap_or(0),
        seq
    );
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..10].to_string()
}

/// Opaque task identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh ID for a task created now with the given title
    pub fn generate(title: &str, timestamp: DateTime<Utc>) -> Self {
        Self(format!("t-{}", generate_hash(title, timestamp)))
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(IdError::Whitespace(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}
