//! Task and user data structures.
//!
//! This module defines the core `Task` struct representing one recurring chore
//! occurrence, the `User` it can be assigned to, and the `LibraryTask` template
//! used by the built-in activity library.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A recurring chore on the board.
///
/// A task cycles between pending and done: marking it done records who finished
/// it and when, and the recurrence scheduler flips it back to pending once the
/// configured frequency window has elapsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: Category,
    pub frequency: Frequency,
    /// Who is expected to do the chore. Never empty while the task is pending.
    pub assigned_to: Vec<String>,
    /// Who marked the current occurrence done. Empty while pending.
    #[serde(default)]
    pub completed_by: Vec<String>,
    /// Urgency flag raised by a user. Forced off when the task is completed.
    #[serde(default, rename = "isSOS")]
    pub is_sos: bool,
    /// Informational only; the reset logic never looks at it.
    pub due_date: DateTime<Local>,
    #[serde(default)]
    pub is_done: bool,
    /// Set exactly when the task transitions to done, cleared on reset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Local>>,
    /// Most recent automatic reset, or creation time. Lets the board flag
    /// chores that have sat pending for days.
    pub last_reset_at: DateTime<Local>,
}

/// A household member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Display accent, as a hex colour string.
    pub color: String,
    /// Free-form image reference (path, URL or emoji).
    pub avatar: String,
}

/// A template in the activity library, used to create tasks with a
/// pre-filled title and category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryTask {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub suggested_frequency: Frequency,
}
