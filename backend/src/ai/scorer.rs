//! Rule-based priority score in `[0, 1]`.

use chrono::{DateTime, Utc};

use crate::task::Task;

const BASE_SCORE: f64 = 0.5;
const PRIORITY_FACTOR: f64 = 0.3;
const MS_PER_DAY: f64 = 86_400_000.0;

pub fn score(task: &Task, now: DateTime<Utc>) -> f64 {
    let mut score = BASE_SCORE + task.priority.weight() * PRIORITY_FACTOR;

    if let Some(days) = task.due_date.map(|due| days_until(due, now)) {
        score += match days {
            d if d <= 1 => 0.3,
            d if d <= 3 => 0.2,
            d if d <= 7 => 0.1,
            _ => 0.0,
        };
    }

    score += task.complexity.adjustment();
    score.clamp(0.0, 1.0)
}

/// Whole days until `due`, rounded up; negative once overdue.
pub fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ((due - now).num_milliseconds() as f64 / MS_PER_DAY).ceil() as i64
}

/// Whole days since `due`, rounded up: 36 hours late counts as 2 days.
pub fn days_overdue(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ((now - due).num_milliseconds() as f64 / MS_PER_DAY).ceil() as i64
}
