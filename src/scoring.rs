//! Daily scores
//!
//! - Habit adherence: how many configured habits were handled according to
//!   their polarity, mapped onto 1-10
//! - Overall quality: unweighted mean of condition, sleep quality and habit score
//!
//! All rounding is half away from zero.

use crate::types::{Habit, HabitStatus};
use std::collections::HashMap;

/// Score reported when no habits are configured
pub const MAX_SCORE: u8 = 10;

/// Score reported when habits exist but none were achieved
pub const MIN_SCORE: u8 = 1;

/// Habit adherence score in `[1, 10]`.
///
/// The denominator is the current habit collection, not the status list: a
/// habit with no status for the day counts as not achieved. Statuses for
/// unknown habit ids are ignored. If a habit id appears more than once, the
/// last status wins.
pub fn calculate_habit_score(statuses: &[HabitStatus], habits: &[Habit]) -> u8 {
    if habits.is_empty() {
        return MAX_SCORE;
    }

    let by_id: HashMap<&str, &Habit> = habits.iter().map(|h| (h.id.as_str(), h)).collect();

    let mut latest: HashMap<&str, bool> = HashMap::with_capacity(statuses.len());
    for status in statuses {
        if by_id.contains_key(status.habit_id.as_str()) {
            latest.insert(status.habit_id.as_str(), status.completed);
        }
    }

    let achieved = latest
        .iter()
        .filter(|(id, completed)| by_id[*id].habit_type.is_achieved(**completed))
        .count();

    let span = (MAX_SCORE - MIN_SCORE) as f64;
    let ratio = achieved as f64 / habits.len() as f64;
    (MIN_SCORE as f64 + ratio * span).round() as u8
}

/// Overall quality: `round((condition + sleep_quality + habit_score) / 3)`
pub fn calculate_overall_quality(condition: u8, sleep_quality: u8, habit_score: u8) -> u8 {
    let sum = condition as u32 + sleep_quality as u32 + habit_score as u32;
    (sum as f64 / 3.0).round() as u8
}
