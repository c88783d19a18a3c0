//! Command implementations for the CLI interface.
//!
//! This module contains the subcommand definitions and their handlers, from
//! basic board operations (add, done, sos, assign, delete) through the derived
//! views (list, stats, history, briefing) to data import/export and the TUI.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use log::warn;

use crate::board::{self, Board};
use crate::briefing;
use crate::cli::Cli;
use crate::defaults;
use crate::fields::*;
use crate::recurrence;
use crate::tui::app::run_tui;
use crate::views;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive board UI.
    Ui,

    /// Add a new chore to the board.
    Add {
        /// Title of the chore. May be omitted when --template is given.
        title: Option<String>,
        /// Create from an activity-library entry (id or title); see `library`.
        #[arg(long)]
        template: Option<String>,
        /// Category: kitchen | living | bedrooms | bathrooms | entry | outdoor | general | admin.
        #[arg(long, value_enum, default_value_t = Category::General)]
        category: Category,
        /// Recurrence: daily | weekly | monthly | quarterly | annual.
        /// Defaults to daily, or the library suggestion with --template.
        #[arg(long, value_enum)]
        frequency: Option<Frequency>,
        /// Assignee user id. May be repeated; defaults to the first member.
        #[arg(long = "assign")]
        assignees: Vec<String>,
    },

    /// Browse the built-in activity library.
    Library {
        /// Only show entries whose title contains this text.
        #[arg(long)]
        search: Option<String>,
        /// Only show entries in this category.
        #[arg(long, value_enum)]
        category: Option<Category>,
    },

    /// List chores for a frequency view.
    List {
        /// Frequency view to show; defaults to daily.
        #[arg(long, value_enum, default_value_t = Frequency::Daily)]
        frequency: Frequency,
        /// Only pending SOS chores.
        #[arg(long)]
        sos: bool,
        /// Only chores assigned to this user id.
        #[arg(long)]
        assignee: Option<String>,
        /// Include completed chores.
        #[arg(long)]
        all: bool,
    },

    /// Toggle a chore between pending and done.
    Done {
        /// Chore ID.
        id: u64,
    },

    /// Toggle the SOS urgency flag on a chore.
    Sos {
        /// Chore ID.
        id: u64,
    },

    /// Replace a chore's assignees.
    Assign {
        /// Chore ID.
        id: u64,
        /// New assignee user ids (at least one).
        #[arg(required = true)]
        users: Vec<String>,
    },

    /// Delete a chore permanently.
    Delete {
        /// Chore ID.
        id: u64,
    },

    /// Show board completion statistics.
    Stats,

    /// Show the most recently completed chores.
    History,

    /// Print the household voice briefing.
    Briefing,

    /// Run a recurrence pass now and report any resets.
    Sync,

    /// Export the board as JSON.
    Export {
        /// Write to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Import a board from a JSON file, replacing current state.
    Import {
        /// File containing a `{ tasks, users, lang? }` payload.
        input: PathBuf,
    },

    /// Clear saved state and restore the built-in default board.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Manage household members.
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// List household members.
    List,
    /// Edit a member's profile.
    Edit {
        /// User id (e.g. user1).
        id: String,
        /// Display name.
        #[arg(long)]
        name: Option<String>,
        /// Accent colour, e.g. "#0EA5E9".
        #[arg(long)]
        color: Option<String>,
        /// Avatar reference (path, URL or emoji).
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Remove a member. Rejected while they are still assigned to chores.
    Remove {
        /// User id.
        id: String,
    },
}

/// Persist the board, reporting failure without touching in-memory state.
fn save_board(board: &Board, path: &Path) {
    if let Err(e) = board.save(path) {
        warn!("failed to save board to {}: {e}", path.display());
        eprintln!("Warning: could not save board: {e}");
    }
}

pub fn cmd_ui(path: &Path) {
    if let Err(e) = run_tui(path) {
        eprintln!("UI error: {e}");
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    board: &mut Board,
    path: &Path,
    title: Option<String>,
    template: Option<String>,
    category: Category,
    frequency: Option<Frequency>,
    assignees: Vec<String>,
    now: DateTime<Local>,
) {
    let (title, category, frequency) = match template {
        Some(ref query) => match defaults::find_library_task(query) {
            Some(item) => (
                title.unwrap_or(item.title),
                item.category,
                frequency.unwrap_or(item.suggested_frequency),
            ),
            None => {
                eprintln!("No library entry matches '{query}'. Try `chores library`.");
                return;
            }
        },
        None => match title {
            Some(t) => (t, category, frequency.unwrap_or(Frequency::Daily)),
            None => {
                eprintln!("A title is required unless --template is given.");
                return;
            }
        },
    };

    let assignees = if assignees.is_empty() {
        match board.users.first() {
            Some(u) => vec![u.id.clone()],
            None => {
                eprintln!("The board has no members to assign.");
                return;
            }
        }
    } else {
        assignees
    };

    for uid in &assignees {
        if board.user(uid).is_none() {
            eprintln!("Unknown member '{uid}'. Try `chores user list`.");
            return;
        }
    }

    match board.create(&title, category, frequency, assignees, now) {
        Some(id) => {
            save_board(board, path);
            println!(
                "Added #{id} '{title}' ({}, {}).",
                board::format_category(category),
                board::format_frequency(frequency)
            );
        }
        None => eprintln!("Could not add the chore: title and assignees are required."),
    }
}

pub fn cmd_library(search: Option<String>, category: Option<Category>) {
    let needle = search.map(|s| s.to_lowercase());
    println!("{:<14} {:<10} {:<10} {}", "ID", "Category", "Suggested", "Title");
    for item in defaults::task_library() {
        if let Some(ref n) = needle {
            if !item.title.to_lowercase().contains(n) {
                continue;
            }
        }
        if let Some(cat) = category {
            if item.category != cat {
                continue;
            }
        }
        println!(
            "{:<14} {:<10} {:<10} {}",
            item.id,
            board::format_category(item.category),
            board::format_frequency(item.suggested_frequency),
            item.title
        );
    }
}

pub fn cmd_list(
    board: &Board,
    frequency: Frequency,
    sos: bool,
    assignee: Option<String>,
    all: bool,
    now: DateTime<Local>,
) {
    if let Some(ref uid) = assignee {
        if board.user(uid).is_none() {
            eprintln!("Unknown member '{uid}'. Try `chores user list`.");
            return;
        }
    }
    let mut tasks = views::filter_tasks(&board.tasks, frequency, sos, assignee.as_deref());
    if !all {
        tasks.retain(|t| !t.is_done);
    }
    if tasks.is_empty() {
        println!("Nothing on the {} board.", board::frequency_view_label(frequency));
        return;
    }
    board::print_table(&tasks, board, now);
}

pub fn cmd_done(board: &mut Board, path: &Path, id: u64, now: DateTime<Local>) {
    match board.toggle_done(id, now) {
        Some(true) => {
            save_board(board, path);
            let who = board
                .get(id)
                .map(|t| {
                    t.completed_by
                        .iter()
                        .map(|uid| board.user(uid).map(|u| u.name.as_str()).unwrap_or(uid.as_str()))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            println!("★ Chore #{id} done ({who}). Nice work!");
        }
        Some(false) => {
            save_board(board, path);
            println!("Chore #{id} is pending again.");
        }
        None => println!("No chore with id {id}; nothing to do."),
    }
}

pub fn cmd_sos(board: &mut Board, path: &Path, id: u64) {
    if board.get(id).is_none() {
        println!("No chore with id {id}; nothing to do.");
        return;
    }
    board.toggle_sos(id);
    save_board(board, path);
    let flagged = board.get(id).map(|t| t.is_sos).unwrap_or(false);
    println!(
        "Chore #{id} SOS {}.",
        if flagged { "raised" } else { "cleared" }
    );
}

pub fn cmd_assign(board: &mut Board, path: &Path, id: u64, users: Vec<String>) {
    if board.get(id).is_none() {
        println!("No chore with id {id}; nothing to do.");
        return;
    }
    for uid in &users {
        if board.user(uid).is_none() {
            eprintln!("Unknown member '{uid}'. Try `chores user list`.");
            return;
        }
    }
    let before = board.get(id).map(|t| t.assigned_to.clone());
    board.update_assignees(id, &users);
    if board.get(id).map(|t| t.assigned_to.clone()) == before {
        eprintln!("Assignees unchanged; a chore always keeps at least one member.");
    } else {
        save_board(board, path);
        println!("Chore #{id} reassigned to {}.", users.join(", "));
    }
}

pub fn cmd_delete(board: &mut Board, path: &Path, id: u64) {
    let existed = board.get(id).is_some();
    board.delete(id);
    if existed {
        save_board(board, path);
        println!("Chore #{id} deleted.");
    } else {
        println!("No chore with id {id}; nothing to do.");
    }
}

pub fn cmd_stats(board: &Board) {
    let stats = views::completion_stats(board);
    println!(
        "Board: {}/{} done ({}%).",
        stats.completed, stats.total, stats.percentage
    );
    let sos = views::sos_count(&board.tasks);
    if sos > 0 {
        println!("SOS alerts: {sos}");
    }
    println!();
    println!("Pending by view:");
    for (frequency, count) in views::pending_by_frequency(&board.tasks) {
        println!("  {:<8} {count}", board::frequency_view_label(frequency));
    }
    println!();
    println!("By member:");
    for (uid, count) in &stats.per_user {
        let name = board.user(uid).map(|u| u.name.as_str()).unwrap_or(uid.as_str());
        println!("  {:<12} {count} completed", name);
    }
    println!();
    println!("By category:");
    for cat in &stats.per_category {
        if cat.total > 0 {
            println!(
                "  {:<10} {}/{} done",
                board::format_category(cat.category),
                cat.done,
                cat.total
            );
        }
    }
}

pub fn cmd_history(board: &Board) {
    let history = views::recent_history(&board.tasks);
    if history.is_empty() {
        println!("Nothing completed yet.");
        return;
    }
    println!("{:<5} {:<17} {:<18} {}", "ID", "Completed", "By", "Title");
    for task in history {
        let when = task
            .completed_at
            .map(|at| at.format("%d %b %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let by: Vec<&str> = task
            .completed_by
            .iter()
            .map(|uid| board.user(uid).map(|u| u.name.as_str()).unwrap_or(uid.as_str()))
            .collect();
        println!(
            "{:<5} {:<17} {:<18} {}",
            task.id,
            when,
            board::truncate(&by.join(","), 18),
            task.title
        );
    }
}

pub fn cmd_briefing(board: &Board, now: DateTime<Local>) {
    println!("{}", briefing::household_briefing(board, now));
}

pub fn cmd_sync(board: &mut Board, path: &Path, now: DateTime<Local>) {
    let resets = recurrence::run_pass(board, now);
    if resets > 0 {
        save_board(board, path);
        println!("{resets} chore(s) reset to pending.");
    } else {
        println!("Everything already up to date.");
    }
}

pub fn cmd_export(board: &Board, output: Option<PathBuf>) {
    let payload = match serde_json::to_string_pretty(board) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Export failed: {e}");
            return;
        }
    };
    match output {
        Some(path) => match fs::write(&path, payload) {
            Ok(_) => println!("Board exported to {}.", path.display()),
            Err(e) => eprintln!("Could not write {}: {e}", path.display()),
        },
        None => println!("{payload}"),
    }
}

pub fn cmd_import(board: &mut Board, path: &Path, input: PathBuf) {
    let blob = match fs::read_to_string(&input) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Could not read {}: {e}", input.display());
            return;
        }
    };
    match board::parse_import(&blob) {
        Ok(imported) => {
            *board = imported;
            save_board(board, path);
            println!(
                "Imported {} chore(s) and {} member(s).",
                board.tasks.len(),
                board.users.len()
            );
        }
        // Current state is left untouched on any failure.
        Err(e) => eprintln!("Import failed, board unchanged: {e}"),
    }
}

pub fn cmd_reset(path: &Path, force: bool, now: DateTime<Local>) {
    if !force {
        eprintln!("This clears the saved board and restores the defaults.");
        eprintln!("Re-run with --force to confirm.");
        return;
    }
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            eprintln!("Could not clear {}: {e}", path.display());
            return;
        }
    }
    let board = defaults::default_board(now);
    save_board(&board, path);
    println!("Board reset to the built-in defaults.");
}

pub fn cmd_user(board: &mut Board, path: &Path, action: UserAction) {
    match action {
        UserAction::List => {
            println!("{:<8} {:<12} {:<9} {}", "ID", "Name", "Colour", "Avatar");
            for user in &board.users {
                println!(
                    "{:<8} {:<12} {:<9} {}",
                    user.id, user.name, user.color, user.avatar
                );
            }
        }
        UserAction::Edit { id, name, color, avatar } => {
            if board.user(&id).is_none() {
                eprintln!("No household member with id '{id}'.");
                return;
            }
            board.update_user(&id, name, color, avatar);
            save_board(board, path);
            println!("Member '{id}' updated.");
        }
        UserAction::Remove { id } => match board.remove_user(&id) {
            Ok(_) => {
                save_board(board, path);
                println!("Member '{id}' removed.");
            }
            Err(e) => eprintln!("Cannot remove member: {e}"),
        },
    }
}

pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
