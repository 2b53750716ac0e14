//! # Command-Line Interface
//!
//! User-facing commands, output formatting and the interactive board.
//!
//! ## Commands
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Tasks | Create and change tasks | `add`, `edit`, `toggle`, `delete`, `show` |
//! | Views | Sorted, filtered listing | `list`, `sort`, `filter` |
//! | Board | Interactive terminal UI | `board` |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! Without the flag, `default_format` from the global config is used.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logs on stderr (the board writes them
//! to `.tasksort/board.log`); `RUST_LOG` overrides it:
//! ```bash
//! tasksort --verbose list
//! RUST_LOG=tasksort=trace tasksort list
//! ```
//!
//! ## Entry Point
//!
//! Parse a [`Cli`] and pass it to [`run()`].

mod app;
mod form;
mod output;
mod task;
mod tui;

pub use app::{run, Cli, Commands};
pub use form::{TaskForm, ValidationError};
pub use output::{Output, OutputFormat};
pub use tui::open_log as open_board_log;
