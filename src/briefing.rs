//! Household briefing synthesis.
//!
//! The briefing collaborator turns a read-only board snapshot into a short
//! natural-language status message: greeting, congratulations to today's top
//! performer, SOS priorities and an encouragement line. The core never depends
//! on the result for its own state transitions, and a board that cannot be
//! summarised yields a canned fallback rather than an error.

use chrono::{DateTime, Local, Timelike};

use crate::board::Board;
use crate::views;

/// Message used whenever a real summary cannot be produced.
pub const FALLBACK_BRIEFING: &str =
    "The board is quiet right now. Add a few chores and check back for your briefing.";

/// Build the household briefing for the current board snapshot.
pub fn household_briefing(board: &Board, now: DateTime<Local>) -> String {
    if board.tasks.is_empty() || board.users.is_empty() {
        return FALLBACK_BRIEFING.to_string();
    }

    let pending: Vec<_> = board.tasks.iter().filter(|t| !t.is_done).collect();
    let sos = views::sos_count(&board.tasks);

    let mut lines = Vec::new();
    lines.push(format!("{}!", greeting(now)));

    if let Some((name, count)) = top_performer_today(board, now) {
        lines.push(format!(
            "Big cheer for {name}, already {count} chore{} done today.",
            if count == 1 { "" } else { "s" }
        ));
    }

    if sos > 0 {
        lines.push(format!(
            "Priority first: {sos} SOS chore{} waiting for a hero.",
            if sos == 1 { " is" } else { "s are" }
        ));
    }

    if pending.is_empty() {
        lines.push("Everything on the board is done. Enjoy the calm!".to_string());
    } else {
        lines.push(format!(
            "{} chore{} still pending overall.",
            pending.len(),
            if pending.len() == 1 { " is" } else { "s are" }
        ));
        lines.push("Pick one off the board and keep the streak going.".to_string());
    }

    lines.join(" ")
}

fn greeting(now: DateTime<Local>) -> &'static str {
    match now.hour() {
        5..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

/// The user with the most completions today, if anyone completed anything.
fn top_performer_today(board: &Board, now: DateTime<Local>) -> Option<(String, usize)> {
    let today = now.date_naive();
    let mut best: Option<(String, usize)> = None;
    for user in &board.users {
        let count = board
            .tasks
            .iter()
            .filter(|t| {
                t.is_done
                    && t.completed_by.iter().any(|c| c == &user.id)
                    && t.completed_at.map(|at| at.date_naive()) == Some(today)
            })
            .count();
        if count > 0 && best.as_ref().map_or(true, |(_, b)| count > *b) {
            best = Some((user.name.clone(), count));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;
    use crate::fields::{Category, Frequency};
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 7, 10, h, 30, 0).unwrap()
    }

    #[test]
    fn empty_board_yields_the_canned_fallback() {
        let board = Board {
            tasks: Vec::new(),
            users: defaults::default_users(),
            lang: "en".to_string(),
        };
        assert_eq!(household_briefing(&board, at(9)), FALLBACK_BRIEFING);
    }

    #[test]
    fn briefing_mentions_sos_and_pending_counts() {
        let now = at(9);
        let mut board = defaults::default_board(now);
        let id = board.tasks[0].id;
        board.toggle_sos(id);
        let text = household_briefing(&board, now);
        assert!(text.starts_with("Good morning"));
        assert!(text.contains("SOS"));
        assert!(text.contains("pending"));
    }

    #[test]
    fn briefing_congratulates_todays_top_performer() {
        let now = at(14);
        let mut board = defaults::default_board(now);
        let id = board
            .create("Sort the mail", Category::Admin, Frequency::Daily, vec!["user2".into()], now)
            .unwrap();
        board.toggle_done(id, now);
        let text = household_briefing(&board, now);
        assert!(text.starts_with("Good afternoon"));
        assert!(text.contains("Sam"), "expected the completing user's name: {text}");
    }

    #[test]
    fn yesterdays_completions_do_not_count_today() {
        let now = at(9);
        let yesterday = now - chrono::Duration::days(1);
        let mut board = defaults::default_board(yesterday);
        let id = board.tasks[0].id;
        board.toggle_done(id, yesterday);
        let text = household_briefing(&board, now);
        assert!(!text.contains("Big cheer"), "stale completion praised: {text}");
    }
}
