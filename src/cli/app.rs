//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use super::output::{Output, OutputFormat};
use super::task::{self, FieldArgs};
use super::tui;
use crate::domain::{SortKind, ViewFilter};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "tasksort")]
#[command(author, version, about = "Task list manager with switchable sort strategies")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true, env = "TASKSORT_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new tasksort project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Add a task
    ///
    /// Examples:
    ///   tasksort add "Write report" --due 2024-03-01 -p high
    ///   tasksort add "Call back" -d "About the invoice"
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Due date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        due: Option<String>,

        /// Priority: low, medium or high (defaults to medium)
        #[arg(long, short = 'p')]
        priority: Option<String>,
    },

    /// Change fields of a task
    Edit {
        /// Task ID
        id: String,

        /// New title
        #[arg(long, short = 't')]
        title: Option<String>,

        /// New description
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// New due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,

        /// New priority: low, medium or high
        #[arg(long, short = 'p')]
        priority: Option<String>,
    },

    /// Mark a task completed, or active again
    Toggle {
        /// Task ID
        id: String,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },

    /// List tasks, filtered and sorted
    List {
        /// Sort strategy: due_date, priority or alphabetical
        #[arg(long, short = 's')]
        sort: Option<SortKind>,

        /// View filter: all, active or completed
        #[arg(long)]
        filter: Option<ViewFilter>,
    },

    /// Set the project's default sort strategy
    Sort {
        /// due_date, priority or alphabetical
        kind: SortKind,
    },

    /// Set the project's default view filter
    Filter {
        /// all, active or completed
        kind: ViewFilter,
    },

    /// Open the interactive task board
    Board,
}

/// Main entry point for the CLI
///
/// Logging must already be initialised; see `main`.
pub fn run(cli: Cli) -> Result<()> {
    let global = Config::load_global()?;
    let format = cli.format.unwrap_or_else(|| global.default_format.into());
    let output = Output::new(format, global.date_format);

    debug!(?format, "tasksort starting");

    match cli.command {
        Commands::Init { path } => {
            let project = Project::init(&path)?;
            debug!(path = %project.data_dir().display(), "Initialized project directory");
            output.success(&format!(
                "Initialized tasksort project at {}",
                project.root().display()
            ));
        }

        Commands::Add {
            title,
            description,
            due,
            priority,
        } => task::add_task(
            &output,
            FieldArgs {
                title: Some(title),
                description,
                due,
                priority,
            },
        )?,

        Commands::Edit {
            id,
            title,
            description,
            due,
            priority,
        } => task::edit_task(
            &output,
            &id,
            FieldArgs {
                title,
                description,
                due,
                priority,
            },
        )?,

        Commands::Toggle { id } => task::toggle_task(&output, &id)?,
        Commands::Delete { id } => task::delete_task(&output, &id)?,
        Commands::Show { id } => task::show_task(&output, &id)?,
        Commands::List { sort, filter } => task::list_tasks(&output, sort, filter)?,
        Commands::Sort { kind } => task::set_sort(&output, kind)?,
        Commands::Filter { kind } => task::set_filter(&output, kind)?,
        Commands::Board => tui::run()?,
    }

    debug!("Command completed successfully");
    Ok(())
}
