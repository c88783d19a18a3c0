//! Board storage and task lifecycle operations.
//!
//! This module provides the `Board` struct, the sole owner of the task and user
//! collections, along with persistence (JSON file with atomic writes and a
//! default-dataset fallback), the task lifecycle operations, and formatting
//! helpers for the CLI table output.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, Local};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::fields::*;
use crate::task::{Task, User};
use crate::views;

/// In-memory board holding the authoritative task and user collections.
///
/// All task mutations go through the methods below; operations on a missing
/// task id are silent no-ops rather than errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct Board {
    pub tasks: Vec<Task>,
    pub users: Vec<User>,
    /// Opaque language tag carried through import/export.
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_lang() -> String {
    "en".to_string()
}

impl Board {
    /// Load the board from a JSON file, falling back to the built-in default
    /// dataset when the file is missing or cannot be parsed. Load never fails
    /// hard: a corrupt file is reported and replaced in memory by defaults.
    pub fn load(path: &Path, now: DateTime<Local>) -> Self {
        if !path.exists() {
            info!("no board file at {}, starting with defaults", path.display());
            return defaults::default_board(now);
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(board) => board,
                Err(e) => {
                    warn!("could not parse board file, using defaults: {e}");
                    eprintln!("Board file is unreadable, starting from defaults: {e}");
                    defaults::default_board(now)
                }
            },
            Err(e) => {
                warn!("could not read board file, using defaults: {e}");
                eprintln!("Board file could not be read, starting from defaults: {e}");
                defaults::default_board(now)
            }
        }
    }

    /// Save the board to a JSON file using an atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Generate the next available task ID.
    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Get a task by ID.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Look up a user by ID.
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Create a new pending task at the front of the board (most recent
    /// first). Returns the assigned id, or `None` when the title is blank or
    /// no assignee was given.
    pub fn create(
        &mut self,
        title: &str,
        category: Category,
        frequency: Frequency,
        assignees: Vec<String>,
        now: DateTime<Local>,
    ) -> Option<u64> {
        let title = title.trim();
        let assignees = dedup_preserving_order(assignees);
        if title.is_empty() || assignees.is_empty() {
            return None;
        }
        let id = self.next_id();
        self.tasks.insert(
            0,
            Task {
                id,
                title: title.to_string(),
                description: None,
                category,
                frequency,
                assigned_to: assignees,
                completed_by: Vec::new(),
                is_sos: false,
                due_date: now,
                is_done: false,
                completed_at: None,
                last_reset_at: now,
            },
        );
        Some(id)
    }

    /// Flip a task between pending and done.
    ///
    /// To done: the current assignees are snapshotted into `completed_by`,
    /// `completed_at` is stamped and the SOS flag is forced off. Back to
    /// pending (a manual un-complete): both are cleared and SOS is left as-is.
    ///
    /// Returns `Some(true)` when the task just became done (so the UI can run
    /// its celebration effect), `Some(false)` when it went back to pending,
    /// and `None` for an unknown id.
    pub fn toggle_done(&mut self, id: u64, now: DateTime<Local>) -> Option<bool> {
        let task = self.get_mut(id)?;
        task.is_done = !task.is_done;
        if task.is_done {
            task.completed_by = task.assigned_to.clone();
            task.completed_at = Some(now);
            task.is_sos = false;
        } else {
            task.completed_by.clear();
            task.completed_at = None;
        }
        Some(task.is_done)
    }

    /// Flip the SOS flag. No-op for an unknown id.
    pub fn toggle_sos(&mut self, id: u64) {
        if let Some(task) = self.get_mut(id) {
            task.is_sos = !task.is_sos;
        }
    }

    /// Replace a task's assignees. An empty set (after removing duplicates)
    /// is ignored so a task can never lose its last assignee.
    pub fn update_assignees(&mut self, id: u64, user_ids: &[String]) {
        let next = dedup_preserving_order(user_ids.to_vec());
        if next.is_empty() {
            return;
        }
        if let Some(task) = self.get_mut(id) {
            task.assigned_to = next;
        }
    }

    /// Remove a task permanently. No tombstone, no cascade.
    pub fn delete(&mut self, id: u64) {
        self.tasks.retain(|t| t.id != id);
    }

    /// Replace the whole task collection in one step. Used by the recurrence
    /// scheduler's reset commit and by data import, so observers only ever see
    /// a fully pre- or post-pass state.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Update a user's profile fields. No-op for an unknown id.
    pub fn update_user(
        &mut self,
        id: &str,
        name: Option<String>,
        color: Option<String>,
        avatar: Option<String>,
    ) {
        if let Some(user) = self.users.iter_mut().find(|u| u.id == id) {
            if let Some(name) = name {
                if !name.trim().is_empty() {
                    user.name = name.trim().to_string();
                }
            }
            if let Some(color) = color {
                user.color = color;
            }
            if let Some(avatar) = avatar {
                user.avatar = avatar;
            }
        }
    }

    /// Remove a household member.
    ///
    /// Removal is rejected while the user is still assigned to any task, so
    /// the board never holds a dangling `assigned_to` reference. History
    /// tolerates absence: `completed_by` entries for the removed user are
    /// scrubbed.
    pub fn remove_user(&mut self, id: &str) -> Result<(), String> {
        if self.user(id).is_none() {
            return Err(format!("No household member with id '{id}'"));
        }
        let still_assigned = self
            .tasks
            .iter()
            .filter(|t| t.assigned_to.iter().any(|a| a == id))
            .count();
        if still_assigned > 0 {
            return Err(format!(
                "'{id}' is still assigned to {still_assigned} task(s); reassign them first"
            ));
        }
        self.users.retain(|u| u.id != id);
        for task in self.tasks.iter_mut() {
            task.completed_by.retain(|c| c != id);
        }
        Ok(())
    }
}

/// Parse an import blob of the shape `{ tasks, users, lang? }`.
///
/// Any parse or shape failure is reported as an error and the caller leaves
/// the current board untouched; there is no partial import.
pub fn parse_import(blob: &str) -> Result<Board, String> {
    let board: Board = serde_json::from_str(blob).map_err(|e| format!("invalid payload: {e}"))?;
    for task in &board.tasks {
        if task.title.trim().is_empty() {
            return Err(format!("task {} has an empty title", task.id));
        }
        if task.assigned_to.is_empty() {
            return Err(format!("task {} ('{}') has no assignees", task.id, task.title));
        }
        if !task.is_done && (!task.completed_by.is_empty() || task.completed_at.is_some()) {
            return Err(format!(
                "task {} ('{}') is pending but carries completion data",
                task.id, task.title
            ));
        }
    }
    if board.users.is_empty() {
        return Err("payload has no users".to_string());
    }
    Ok(board)
}

fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for id in ids {
        let id = id.trim().to_string();
        if !id.is_empty() && !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// Format a category for display.
pub fn format_category(c: Category) -> &'static str {
    match c {
        Category::Kitchen => "Kitchen",
        Category::Living => "Living",
        Category::Bedrooms => "Bedrooms",
        Category::Bathrooms => "Bathrooms",
        Category::Entry => "Entry",
        Category::Outdoor => "Outdoor",
        Category::General => "General",
        Category::Admin => "Admin",
    }
}

/// Format a frequency for display.
pub fn format_frequency(f: Frequency) -> &'static str {
    match f {
        Frequency::Daily => "Daily",
        Frequency::Weekly => "Weekly",
        Frequency::Monthly => "Monthly",
        Frequency::Quarterly => "Quarterly",
        Frequency::Annual => "Annual",
    }
}

/// Short label for the board-view tab of a frequency bucket.
pub fn frequency_view_label(f: Frequency) -> &'static str {
    match f {
        Frequency::Daily => "Day",
        Frequency::Weekly => "Week",
        Frequency::Monthly => "Month",
        Frequency::Quarterly => "Quarter",
        Frequency::Annual => "Year",
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task], board: &Board, now: DateTime<Local>) {
    println!(
        "{:<5} {:<10} {:<10} {:<9} {:<4} {:<18} {}",
        "ID", "Freq", "Category", "Status", "SOS", "Assigned", "Title"
    );
    for t in tasks {
        let status = if t.is_done {
            "done"
        } else if views::is_stale(t, now) {
            "late"
        } else {
            "pending"
        };
        let names: Vec<&str> = t
            .assigned_to
            .iter()
            .map(|uid| board.user(uid).map(|u| u.name.as_str()).unwrap_or(uid.as_str()))
            .collect();
        println!(
            "{:<5} {:<10} {:<10} {:<9} {:<4} {:<18} {}",
            t.id,
            format_frequency(t.frequency),
            format_category(t.category),
            status,
            if t.is_sos { "SOS" } else { "-" },
            truncate(&names.join(","), 18),
            t.title
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_board() -> Board {
        defaults::default_board(Local::now())
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn create_inserts_at_front_with_pending_state() {
        let mut board = test_board();
        let now = Local::now();
        let id = board
            .create("Water the plants", Category::Living, Frequency::Weekly, vec!["user1".into()], now)
            .unwrap();
        let task = &board.tasks[0];
        assert_eq!(task.id, id);
        assert_eq!(task.title, "Water the plants");
        assert!(!task.is_done);
        assert!(!task.is_sos);
        assert!(task.completed_by.is_empty());
        assert!(task.completed_at.is_none());
        assert_eq!(task.last_reset_at, now);
    }

    #[test]
    fn create_rejects_blank_title_and_empty_assignees() {
        let mut board = test_board();
        let now = Local::now();
        assert!(board.create("  ", Category::Kitchen, Frequency::Daily, vec!["user1".into()], now).is_none());
        assert!(board.create("Mop", Category::Kitchen, Frequency::Daily, vec![], now).is_none());
    }

    #[test]
    fn toggle_done_snapshots_assignees_and_clears_sos() {
        let mut board = test_board();
        let now = Local::now();
        let id = board
            .create("Fix the tap", Category::Bathrooms, Frequency::Weekly, vec!["user1".into(), "user2".into()], now)
            .unwrap();
        board.toggle_sos(id);
        assert!(board.get(id).unwrap().is_sos);

        assert_eq!(board.toggle_done(id, now), Some(true));
        let task = board.get(id).unwrap();
        assert!(task.is_done);
        assert_eq!(task.completed_by, vec!["user1".to_string(), "user2".to_string()]);
        assert_eq!(task.completed_at, Some(now));
        assert!(!task.is_sos, "SOS must be forced off at completion");
    }

    #[test]
    fn manual_uncomplete_clears_completion_data() {
        let mut board = test_board();
        let now = Local::now();
        let id = board.tasks[0].id;
        board.toggle_done(id, now);
        assert_eq!(board.toggle_done(id, now), Some(false));
        let task = board.get(id).unwrap();
        assert!(!task.is_done);
        assert!(task.completed_by.is_empty());
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn operations_on_missing_id_are_no_ops() {
        let mut board = test_board();
        let before = board.tasks.len();
        assert_eq!(board.toggle_done(9999, Local::now()), None);
        board.toggle_sos(9999);
        board.update_assignees(9999, &["user1".to_string()]);
        board.delete(9999);
        assert_eq!(board.tasks.len(), before);
    }

    #[test]
    fn empty_assignee_update_is_rejected() {
        let mut board = test_board();
        let id = board.tasks[0].id;
        let before = board.get(id).unwrap().assigned_to.clone();
        board.update_assignees(id, &[]);
        board.update_assignees(id, &["  ".to_string()]);
        assert_eq!(board.get(id).unwrap().assigned_to, before);
    }

    #[test]
    fn assignee_update_dedups_preserving_order() {
        let mut board = test_board();
        let id = board.tasks[0].id;
        board.update_assignees(
            id,
            &["user2".to_string(), "user1".to_string(), "user2".to_string()],
        );
        assert_eq!(
            board.get(id).unwrap().assigned_to,
            vec!["user2".to_string(), "user1".to_string()]
        );
    }

    #[test]
    fn delete_is_permanent() {
        let mut board = test_board();
        let id = board.tasks[0].id;
        board.delete(id);
        assert!(board.get(id).is_none());
    }

    #[test]
    fn remove_user_rejected_while_assigned() {
        let mut board = test_board();
        assert!(board.remove_user("user1").is_err());
        assert!(board.user("user1").is_some());
    }

    #[test]
    fn remove_user_scrubs_completion_history() {
        let mut board = test_board();
        let now = Local::now();
        // Complete a task as user2, then take user2 off every assignment.
        let id = board
            .tasks
            .iter()
            .find(|t| t.assigned_to == vec!["user2".to_string()])
            .unwrap()
            .id;
        board.toggle_done(id, now);
        let ids: Vec<u64> = board.tasks.iter().map(|t| t.id).collect();
        for tid in ids {
            board.update_assignees(tid, &["user1".to_string()]);
        }
        assert!(board.remove_user("user2").is_ok());
        assert!(board.user("user2").is_none());
        for task in &board.tasks {
            assert!(!task.completed_by.iter().any(|c| c == "user2"));
        }
    }

    #[test]
    fn remove_unknown_user_is_an_error() {
        let mut board = test_board();
        assert!(board.remove_user("user9").is_err());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        let mut board = test_board();
        let now = at(2026, 3, 14, 9, 0, 0);
        let id = board
            .create("Sweep the porch", Category::Outdoor, Frequency::Weekly, vec!["user2".into()], now)
            .unwrap();
        board.toggle_done(id, now);
        board.save(&path).unwrap();

        let loaded = Board::load(&path, Local::now());
        let task = loaded.get(id).unwrap();
        assert!(task.is_done);
        assert_eq!(task.completed_at, Some(now));
        assert_eq!(loaded.users.len(), board.users.len());
        assert_eq!(loaded.lang, "en");
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        fs::write(&path, "{ this is not json").unwrap();
        let board = Board::load(&path, Local::now());
        assert_eq!(board.users.len(), defaults::default_users().len());
        assert!(!board.tasks.is_empty());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let board = Board::load(&dir.path().join("nope.json"), Local::now());
        assert!(!board.tasks.is_empty());
    }

    #[test]
    fn import_rejects_malformed_payloads() {
        assert!(parse_import("not json at all").is_err());
        assert!(parse_import("{\"tasks\": [], \"users\": []}").is_err());
    }

    #[test]
    fn import_rejects_pending_task_with_completion_data() {
        let mut board = test_board();
        let id = board.tasks[0].id;
        board.toggle_done(id, Local::now());
        // Hand-corrupt the exported payload: pending but with completed_by.
        let mut exported: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&board).unwrap()).unwrap();
        let task = exported["tasks"]
            .as_array_mut()
            .unwrap()
            .iter_mut()
            .find(|t| t["id"] == id)
            .unwrap();
        task["isDone"] = serde_json::Value::Bool(false);
        assert!(parse_import(&exported.to_string()).is_err());
    }

    #[test]
    fn import_round_trips_an_export() {
        let board = test_board();
        let blob = serde_json::to_string_pretty(&board).unwrap();
        let imported = parse_import(&blob).unwrap();
        assert_eq!(imported.tasks.len(), board.tasks.len());
        assert_eq!(imported.users.len(), board.users.len());
    }

    #[test]
    fn truncate_handles_wide_strings() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a rather long name", 8), "a rathe…");
    }
}
