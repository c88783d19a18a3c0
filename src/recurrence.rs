//! Recurrence policy and the reset scheduler.
//!
//! The policy decides, for a completed task, whether enough wall-clock time has
//! elapsed for it to revert to pending. The scheduler applies that decision to
//! every task on the board and commits resets as a single atomic replacement of
//! the task collection.
//!
//! Daily chores reset on the local calendar-day boundary (a task finished at
//! 23:59 is available again at midnight), while the longer cadences use fixed
//! elapsed thresholds deliberately shorter than the exact calendar period
//! (6 not 7 days, 28 not 30, 90, 360) so a chore becomes available slightly
//! before its true anniversary. The clock is always passed in, never read
//! internally, so every path is testable with a fixed time.

use chrono::{DateTime, Duration, Local};
use log::info;

use crate::board::Board;
use crate::fields::Frequency;
use crate::task::Task;

/// Default wall-clock interval between scheduler passes.
pub const PASS_INTERVAL_SECS: i64 = 60;

// Elapsed-day thresholds for the fixed-duration cadences.
const WEEKLY_RESET_DAYS: i64 = 6;
const MONTHLY_RESET_DAYS: i64 = 28;
const QUARTERLY_RESET_DAYS: i64 = 90;
const ANNUAL_RESET_DAYS: i64 = 360;

/// Pure reset decision for one completed task.
///
/// Only meaningful for tasks that are done with a completion timestamp; the
/// scheduler never calls it otherwise. Total over its domain, no side effects.
pub fn should_reset(
    frequency: Frequency,
    completed_at: DateTime<Local>,
    now: DateTime<Local>,
) -> bool {
    let elapsed = now.signed_duration_since(completed_at);
    match frequency {
        Frequency::Daily => now.date_naive() != completed_at.date_naive(),
        Frequency::Weekly => elapsed >= Duration::days(WEEKLY_RESET_DAYS),
        Frequency::Monthly => elapsed >= Duration::days(MONTHLY_RESET_DAYS),
        Frequency::Quarterly => elapsed >= Duration::days(QUARTERLY_RESET_DAYS),
        Frequency::Annual => elapsed >= Duration::days(ANNUAL_RESET_DAYS),
    }
}

/// Run one full reset pass over the board.
///
/// Every done task with a completion timestamp is evaluated against the
/// policy; a done task without one is never eligible (the pass fails closed
/// rather than resetting it). When nothing changes the board is left
/// untouched, so no redundant persistence or downstream recompute is
/// triggered; when anything changed the whole collection is replaced in one
/// step. Returns the number of tasks reset.
pub fn run_pass(board: &mut Board, now: DateTime<Local>) -> usize {
    let mut reset_count = 0usize;
    let next: Vec<Task> = board
        .tasks
        .iter()
        .map(|task| match task.completed_at {
            Some(completed_at)
                if task.is_done && should_reset(task.frequency, completed_at, now) =>
            {
                reset_count += 1;
                let mut t = task.clone();
                t.is_done = false;
                t.completed_by.clear();
                t.completed_at = None;
                t.last_reset_at = now;
                t
            }
            _ => task.clone(),
        })
        .collect();

    if reset_count > 0 {
        info!("recurrence pass reset {reset_count} task(s)");
        board.replace_all(next);
    }
    reset_count
}

/// Cancellable periodic driver for `run_pass`.
///
/// The scheduler is owned by whichever loop is active (the TUI event loop, or
/// a single startup pass for one-shot CLI commands) and runs cooperatively on
/// that loop's thread, so passes never overlap. Dropping it with its owner
/// cancels the cadence. Re-running a pass immediately after a successful one
/// is a no-op, so frequent ticking is safe.
pub struct ResetScheduler {
    interval: Duration,
    last_pass: Option<DateTime<Local>>,
}

impl ResetScheduler {
    pub fn new() -> Self {
        Self::with_interval(Duration::seconds(PASS_INTERVAL_SECS))
    }

    pub fn with_interval(interval: Duration) -> Self {
        ResetScheduler {
            interval,
            last_pass: None,
        }
    }

    /// Run a pass if one is due: always on the first tick, then whenever the
    /// configured interval has elapsed since the previous pass. Returns the
    /// number of tasks reset (0 when the tick was skipped).
    pub fn on_tick(&mut self, board: &mut Board, now: DateTime<Local>) -> usize {
        if let Some(prev) = self.last_pass {
            if now.signed_duration_since(prev) < self.interval {
                return 0;
            }
        }
        self.last_pass = Some(now);
        run_pass(board, now)
    }
}

impl Default for ResetScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;
    use crate::fields::Category;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn board_with(frequency: Frequency, now: DateTime<Local>) -> (Board, u64) {
        let mut board = Board {
            tasks: Vec::new(),
            users: defaults::default_users(),
            lang: "en".to_string(),
        };
        let id = board
            .create("Test chore", Category::General, frequency, vec!["user1".into()], now)
            .unwrap();
        (board, id)
    }

    #[test]
    fn daily_resets_at_local_midnight_not_after_24h() {
        let done = at(2026, 5, 3, 23, 59, 59);
        assert!(!should_reset(Frequency::Daily, done, at(2026, 5, 3, 23, 59, 59)));
        assert!(should_reset(Frequency::Daily, done, at(2026, 5, 4, 0, 0, 0)));

        // Completed in the morning: still the same day eleven hours later.
        let morning = at(2026, 5, 3, 8, 0, 0);
        assert!(!should_reset(Frequency::Daily, morning, at(2026, 5, 3, 19, 0, 0)));
    }

    #[test]
    fn fixed_thresholds_trigger_exactly_at_the_boundary() {
        let done = at(2026, 1, 1, 12, 0, 0);
        let cases = [
            (Frequency::Weekly, 6i64),
            (Frequency::Monthly, 28),
            (Frequency::Quarterly, 90),
            (Frequency::Annual, 360),
        ];
        for (freq, days) in cases {
            let just_before = done + Duration::days(days) - Duration::seconds(1);
            let exactly = done + Duration::days(days);
            assert!(!should_reset(freq, done, just_before), "{freq:?} reset early");
            assert!(should_reset(freq, done, exactly), "{freq:?} did not reset");
        }
    }

    #[test]
    fn pass_resets_due_task_and_clears_completion_state() {
        let created = at(2026, 2, 1, 10, 0, 0);
        let (mut board, id) = board_with(Frequency::Weekly, created);
        board.toggle_done(id, created);

        // Five days in: still done.
        assert_eq!(run_pass(&mut board, created + Duration::days(5)), 0);
        assert!(board.get(id).unwrap().is_done);

        // Six days in: reset to pending.
        let reset_at = created + Duration::days(6);
        assert_eq!(run_pass(&mut board, reset_at), 1);
        let task = board.get(id).unwrap();
        assert!(!task.is_done);
        assert!(task.completed_by.is_empty());
        assert!(task.completed_at.is_none());
        assert_eq!(task.last_reset_at, reset_at);
        assert!(!task.is_sos);
    }

    #[test]
    fn pass_is_idempotent() {
        let created = at(2026, 2, 1, 10, 0, 0);
        let (mut board, id) = board_with(Frequency::Weekly, created);
        board.toggle_done(id, created);

        let later = created + Duration::days(7);
        assert_eq!(run_pass(&mut board, later), 1);
        let snapshot = serde_json::to_string(&board.tasks).unwrap();
        assert_eq!(run_pass(&mut board, later), 0);
        assert_eq!(serde_json::to_string(&board.tasks).unwrap(), snapshot);
    }

    #[test]
    fn done_task_without_timestamp_is_never_eligible() {
        let created = at(2026, 2, 1, 10, 0, 0);
        let (mut board, id) = board_with(Frequency::Daily, created);
        board.toggle_done(id, created);
        // Simulate a malformed record: done, but the timestamp is gone.
        let mut tasks = board.tasks.clone();
        tasks[0].completed_at = None;
        board.replace_all(tasks);

        assert_eq!(run_pass(&mut board, created + Duration::days(400)), 0);
        assert!(board.get(id).unwrap().is_done, "must fail closed, staying done");
    }

    #[test]
    fn pending_tasks_are_untouched() {
        let created = at(2026, 2, 1, 10, 0, 0);
        let (mut board, id) = board_with(Frequency::Daily, created);
        assert_eq!(run_pass(&mut board, created + Duration::days(30)), 0);
        let task = board.get(id).unwrap();
        assert!(!task.is_done);
        assert_eq!(task.last_reset_at, created);
    }

    #[test]
    fn scheduler_runs_on_first_tick_then_honours_interval() {
        let created = at(2026, 2, 1, 10, 0, 0);
        let (mut board, id) = board_with(Frequency::Daily, created);
        board.toggle_done(id, created);

        let mut scheduler = ResetScheduler::new();
        let next_day = at(2026, 2, 2, 0, 0, 10);
        assert_eq!(scheduler.on_tick(&mut board, next_day), 1);

        // Complete it again; a tick 30s later is inside the interval and skips.
        board.toggle_done(id, next_day);
        assert_eq!(scheduler.on_tick(&mut board, next_day + Duration::seconds(30)), 0);
        assert!(board.get(id).unwrap().is_done);

        // A tick past the interval runs, but the task is not yet due: no change.
        assert_eq!(scheduler.on_tick(&mut board, next_day + Duration::seconds(61)), 0);
        assert!(board.get(id).unwrap().is_done);
    }

    #[test]
    fn weekly_scenario_end_to_end() {
        // Create a weekly task for A, complete it, advance the clock.
        let created = at(2026, 6, 1, 9, 0, 0);
        let (mut board, id) = board_with(Frequency::Weekly, created);

        board.toggle_done(id, created);
        let task = board.get(id).unwrap();
        assert_eq!(task.completed_by, vec!["user1".to_string()]);
        assert!(!task.is_sos);
        assert!(task.completed_at.is_some());

        let mut scheduler = ResetScheduler::new();
        assert_eq!(scheduler.on_tick(&mut board, created + Duration::days(5)), 0);
        assert!(board.get(id).unwrap().is_done, "still done at five days");

        assert_eq!(scheduler.on_tick(&mut board, created + Duration::days(6)), 1);
        let task = board.get(id).unwrap();
        assert!(!task.is_done);
        assert!(task.completed_by.is_empty());
        assert!(task.completed_at.is_none());
        assert_eq!(task.last_reset_at, created + Duration::days(6));
    }
}
