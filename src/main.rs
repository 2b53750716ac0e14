//! tasksort - task list manager with switchable sort strategies

use std::env;
use std::io;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tasksort::cli::{self, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, matches!(cli.command, Commands::Board));

    if let Err(e) = cli::run(cli) {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Logs go to stderr so they never mix with command output
///
/// The board draws over the whole terminal, so while it runs logs go to the
/// project's board log, or nowhere outside a project.
fn init_logging(verbose: bool, board: bool) {
    let default = if verbose { "tasksort=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if !board {
        subscriber.with_writer(io::stderr).init();
        return;
    }

    match env::current_dir().ok().and_then(|dir| cli::open_board_log(&dir)) {
        Some(file) => subscriber
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => subscriber.with_writer(io::sink).init(),
    }
}
