//! Interactive task board
//!
//! A terminal view over one [`Session`](crate::session::Session) built with
//! ratatui: filter tabs with counts, sort controls, the sorted task list and
//! add/edit forms. Every key that changes something is turned into an intent
//! and dispatched to the session, which saves after each mutation.
//!
//! The board owns the terminal while it runs, so logs go to
//! `.tasksort/board.log` (see [`open_log`]) instead of stderr.

mod app;
mod board;
mod event;
mod terminal;

use std::fs::{File, OpenOptions};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::debug;

use crate::session::Session;
use crate::storage::{Config, Project, PROJECT_DIR};
use app::App;
use event::EventHandler;

const TICK_RATE: Duration = Duration::from_millis(250);

/// Name of the board's log file inside the project directory
pub const LOG_FILE: &str = "board.log";

/// Opens the board log of the project containing `start` for appending
pub fn open_log(start: &Path) -> Option<File> {
    let root = Config::find_project_root_from(start)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(root.join(PROJECT_DIR).join(LOG_FILE))
        .ok()
}

/// Opens the board for the current project
pub fn run() -> Result<()> {
    // Open before touching the terminal so errors print normally
    let project = Project::open_current()?;
    let config = &project.config().project;
    let session = Session::open(
        project.task_store(),
        config.default_sort,
        config.default_filter,
    );
    let mut app = App::new(session);

    debug!(root = %project.root().display(), "Opening board");
    let mut terminal = terminal::init()?;
    let events = EventHandler::new(TICK_RATE);

    // Restore the terminal even if drawing panics
    let result = panic::catch_unwind(AssertUnwindSafe(|| app.run(&mut terminal, events)));
    let restored = terminal::restore();

    match result {
        Ok(inner) => {
            restored?;
            inner
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown error".to_string());
            Err(anyhow!("Board panicked: {}", message))
        }
    }
}
