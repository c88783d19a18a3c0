//! # Chorewheel - Household Chore Board
//!
//! A file-backed chore-tracking board for a household: define recurring
//! chores, assign them to members, mark them done, and let the recurrence
//! engine flip them back to pending when their cadence comes around.
//!
//! ## Key Features
//!
//! - **Recurring resets**: daily chores reset at local midnight; weekly,
//!   monthly, quarterly and annual chores reset after 6/28/90/360 days.
//! - **SOS flags**: raise urgency on a pending chore; cleared automatically
//!   on completion.
//! - **Two Interfaces**: full CLI for scripting + an interactive TUI board
//!   that runs the recurrence scheduler while open.
//! - **Local File Storage**: one JSON file under `~/.chorewheel/`, with
//!   import/export and a reset to the built-in starter board.
//! - **Voice-style briefing**: a short natural-language household status
//!   summary, ready to pipe into a speech layer.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the board UI
//! chores ui
//!
//! # Add a chore from the activity library, assigned to user2
//! chores add --template bins --assign user2
//!
//! # Mark it done, then see who did what
//! chores done 12
//! chores history
//!
//! # Hear how the household is doing
//! chores briefing
//! ```
//!
//! Data is stored locally in `~/.chorewheel/board.json`. Back it up or sync
//! it however you like; the board never talks to a server.

use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Parser;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};

pub mod board;
pub mod briefing;
pub mod cli;
pub mod cmd;
pub mod defaults;
pub mod fields;
pub mod recurrence;
pub mod task;
pub mod views;
pub mod tui {
    pub mod app;
    pub mod colors;
}

use board::Board;
use cli::Cli;
use cmd::*;

const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Start file logging under the data directory. Logging is best-effort:
/// a failure is reported and the program carries on without it.
fn init_logging(data_dir: &Path) -> Option<LoggerHandle> {
    let spec = FileSpec::default()
        .directory(data_dir.join("logs"))
        .basename("chorewheel");
    match Logger::try_with_env_or_str("info") {
        Ok(logger) => match logger
            .log_to_file(spec)
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .start()
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                eprintln!("Logging disabled: {e}");
                None
            }
        },
        Err(e) => {
            eprintln!("Logging disabled: {e}");
            None
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Determine the data directory.
    let data_dir = if let Some(db_path) = cli.db.as_ref() {
        db_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let dir = PathBuf::from(home).join(".chorewheel");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("Failed to create data directory {}: {}", dir.display(), e);
            std::process::exit(1);
        }
        dir
    };

    let _logger = init_logging(&data_dir);
    let db_path = cli.db.unwrap_or_else(|| data_dir.join("board.json"));
    let now = Local::now();

    // Commands that do not operate on a loaded board.
    match cli.command {
        Commands::Completions { shell } => {
            cmd_completions(shell);
            return;
        }
        Commands::Library { search, category } => {
            cmd_library(search, category);
            return;
        }
        Commands::Reset { force } => {
            cmd_reset(&db_path, force, now);
            return;
        }
        Commands::Ui => {
            // The TUI owns the board and the scheduler for its lifetime.
            cmd_ui(&db_path);
            return;
        }
        _ => {}
    }

    let mut board = Board::load(&db_path, now);

    // One recurrence pass on every start, before the command runs, so the
    // board a command sees is always consistent with the clock. `sync` runs
    // its own reporting pass instead.
    if !matches!(cli.command, Commands::Sync) && recurrence::run_pass(&mut board, now) > 0 {
        if let Err(e) = board.save(&db_path) {
            eprintln!("Warning: could not save board: {e}");
        }
    }

    match cli.command {
        Commands::Ui
        | Commands::Completions { .. }
        | Commands::Library { .. }
        | Commands::Reset { .. } => unreachable!("handled above"),

        Commands::Add { title, template, category, frequency, assignees } => {
            cmd_add(&mut board, &db_path, title, template, category, frequency, assignees, now)
        }

        Commands::List { frequency, sos, assignee, all } => {
            cmd_list(&board, frequency, sos, assignee, all, now)
        }

        Commands::Done { id } => cmd_done(&mut board, &db_path, id, now),

        Commands::Sos { id } => cmd_sos(&mut board, &db_path, id),

        Commands::Assign { id, users } => cmd_assign(&mut board, &db_path, id, users),

        Commands::Delete { id } => cmd_delete(&mut board, &db_path, id),

        Commands::Stats => cmd_stats(&board),

        Commands::History => cmd_history(&board),

        Commands::Briefing => cmd_briefing(&board, now),

        Commands::Sync => cmd_sync(&mut board, &db_path, now),

        Commands::Export { output } => cmd_export(&board, output),

        Commands::Import { input } => cmd_import(&mut board, &db_path, input),

        Commands::User { action } => cmd_user(&mut board, &db_path, action),
    }
}
