//! Read-only projections over the board.
//!
//! Everything here is a full recomputation over the current task collection
//! plus the caller's filter state, so a view can never be incorrectly stale.
//! Nothing in this module mutates the board.

use chrono::{DateTime, Duration, Local};

use crate::board::Board;
use crate::fields::{Category, Frequency};
use crate::task::Task;

/// How many completed tasks the history view shows.
pub const HISTORY_LIMIT: usize = 15;

/// Days a task may sit pending since its last reset before being flagged late.
pub const STALE_AFTER_DAYS: i64 = 3;

/// Per-category completion breakdown.
#[derive(Debug, Clone)]
pub struct CategoryStat {
    pub category: Category,
    pub total: usize,
    pub done: usize,
}

/// Board-wide completion statistics.
#[derive(Debug, Clone)]
pub struct CompletionStats {
    pub total: usize,
    pub completed: usize,
    /// Rounded percentage; 0 for an empty board, never NaN.
    pub percentage: u32,
    /// Completed-task counts per user id, in board user order.
    pub per_user: Vec<(String, usize)>,
    pub per_category: Vec<CategoryStat>,
}

/// Compute completion statistics over the current board snapshot.
pub fn completion_stats(board: &Board) -> CompletionStats {
    let total = board.tasks.len();
    let completed = board.tasks.iter().filter(|t| t.is_done).count();
    let percentage = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };
    let per_user = board
        .users
        .iter()
        .map(|u| {
            let count = board
                .tasks
                .iter()
                .filter(|t| t.is_done && t.completed_by.iter().any(|c| c == &u.id))
                .count();
            (u.id.clone(), count)
        })
        .collect();
    let per_category = Category::ALL
        .iter()
        .map(|&category| CategoryStat {
            category,
            total: board.tasks.iter().filter(|t| t.category == category).count(),
            done: board
                .tasks
                .iter()
                .filter(|t| t.category == category && t.is_done)
                .count(),
        })
        .collect();

    CompletionStats {
        total,
        completed,
        percentage,
        per_user,
        per_category,
    }
}

/// Pending-task count per frequency bucket, in board-view order.
pub fn pending_by_frequency(tasks: &[Task]) -> [(Frequency, usize); 5] {
    Frequency::ALL.map(|frequency| {
        let count = tasks
            .iter()
            .filter(|t| !t.is_done && t.frequency == frequency)
            .count();
        (frequency, count)
    })
}

/// Tasks for the active view: matching frequency, optionally narrowed to
/// pending SOS tasks, optionally narrowed to a single assignee.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    frequency: Frequency,
    sos_only: bool,
    assignee: Option<&str>,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.frequency == frequency)
        .filter(|t| !sos_only || (t.is_sos && !t.is_done))
        .filter(|t| assignee.map_or(true, |uid| t.assigned_to.iter().any(|a| a == uid)))
        .collect()
}

/// Completed tasks, most recent first, truncated to `HISTORY_LIMIT`.
pub fn recent_history(tasks: &[Task]) -> Vec<&Task> {
    let mut done: Vec<&Task> = tasks.iter().filter(|t| t.is_done).collect();
    done.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    done.truncate(HISTORY_LIMIT);
    done
}

/// Pending SOS count, shown as the board's alert badge.
pub fn sos_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| t.is_sos && !t.is_done).count()
}

/// Whether a pending task has sat untouched long enough to flag as late.
pub fn is_stale(task: &Task, now: DateTime<Local>) -> bool {
    !task.is_done
        && now.signed_duration_since(task.last_reset_at) >= Duration::days(STALE_AFTER_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn empty_board() -> Board {
        Board {
            tasks: Vec::new(),
            users: defaults::default_users(),
            lang: "en".to_string(),
        }
    }

    fn board_with_n_tasks(n: usize, now: DateTime<Local>) -> Board {
        let mut board = empty_board();
        for i in 0..n {
            board.create(
                &format!("Chore {i}"),
                Category::General,
                Frequency::Daily,
                vec!["user1".into()],
                now,
            );
        }
        board
    }

    #[test]
    fn empty_board_is_zero_percent_not_nan() {
        let stats = completion_stats(&empty_board());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.percentage, 0);
    }

    #[test]
    fn three_of_four_rounds_to_75() {
        let now = Local::now();
        let mut board = board_with_n_tasks(4, now);
        let ids: Vec<u64> = board.tasks.iter().map(|t| t.id).take(3).collect();
        for id in ids {
            board.toggle_done(id, now);
        }
        let stats = completion_stats(&board);
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.percentage, 75);
    }

    #[test]
    fn one_of_three_rounds_to_33() {
        let now = Local::now();
        let mut board = board_with_n_tasks(3, now);
        let id = board.tasks[0].id;
        board.toggle_done(id, now);
        assert_eq!(completion_stats(&board).percentage, 33);
    }

    #[test]
    fn per_user_counts_follow_completed_by() {
        let now = Local::now();
        let mut board = empty_board();
        let a = board
            .create("A", Category::Kitchen, Frequency::Daily, vec!["user1".into()], now)
            .unwrap();
        let b = board
            .create("B", Category::Kitchen, Frequency::Daily, vec!["user1".into(), "user2".into()], now)
            .unwrap();
        board.toggle_done(a, now);
        board.toggle_done(b, now);
        let stats = completion_stats(&board);
        assert_eq!(stats.per_user, vec![("user1".to_string(), 2), ("user2".to_string(), 1)]);
    }

    #[test]
    fn pending_counts_ignore_done_tasks() {
        let now = Local::now();
        let mut board = empty_board();
        board.create("A", Category::Kitchen, Frequency::Daily, vec!["user1".into()], now);
        board.create("B", Category::Kitchen, Frequency::Weekly, vec!["user1".into()], now);
        let done = board
            .create("C", Category::Kitchen, Frequency::Weekly, vec!["user1".into()], now)
            .unwrap();
        board.toggle_done(done, now);

        let counts = pending_by_frequency(&board.tasks);
        assert_eq!(counts[0], (Frequency::Daily, 1));
        assert_eq!(counts[1], (Frequency::Weekly, 1));
        assert_eq!(counts[2], (Frequency::Monthly, 0));
    }

    #[test]
    fn filters_compose() {
        let now = Local::now();
        let mut board = empty_board();
        let a = board
            .create("A", Category::Kitchen, Frequency::Weekly, vec!["user1".into()], now)
            .unwrap();
        let b = board
            .create("B", Category::Kitchen, Frequency::Weekly, vec!["user2".into()], now)
            .unwrap();
        board.create("C", Category::Kitchen, Frequency::Daily, vec!["user1".into()], now);
        board.toggle_sos(a);
        board.toggle_sos(b);

        let weekly = filter_tasks(&board.tasks, Frequency::Weekly, false, None);
        assert_eq!(weekly.len(), 2);

        let weekly_sos_user1 = filter_tasks(&board.tasks, Frequency::Weekly, true, Some("user1"));
        assert_eq!(weekly_sos_user1.len(), 1);
        assert_eq!(weekly_sos_user1[0].id, a);

        // A completed SOS task drops out of the SOS filter.
        board.toggle_done(b, now);
        let weekly_sos = filter_tasks(&board.tasks, Frequency::Weekly, true, None);
        assert_eq!(weekly_sos.len(), 1);
    }

    #[test]
    fn history_is_sorted_and_truncated() {
        let base = at(2026, 4, 1, 8, 0, 0);
        let mut board = board_with_n_tasks(20, base);
        let ids: Vec<u64> = board.tasks.iter().map(|t| t.id).collect();
        for (i, id) in ids.iter().enumerate() {
            board.toggle_done(*id, base + Duration::minutes(i as i64));
        }
        let history = recent_history(&board.tasks);
        assert_eq!(history.len(), HISTORY_LIMIT);
        // Most recent completion first.
        assert!(history[0].completed_at > history[1].completed_at);
        for pair in history.windows(2) {
            assert!(pair[0].completed_at >= pair[1].completed_at);
        }
    }

    #[test]
    fn staleness_flags_old_pending_tasks_only() {
        let created = at(2026, 4, 1, 8, 0, 0);
        let mut board = board_with_n_tasks(1, created);
        let task = board.tasks[0].clone();
        assert!(!is_stale(&task, created + Duration::days(2)));
        assert!(is_stale(&task, created + Duration::days(3)));

        let id = task.id;
        board.toggle_done(id, created);
        assert!(!is_stale(board.get(id).unwrap(), created + Duration::days(10)));
    }
}
