//! Daily entry editing
//!
//! A [`DailyEntry`] is the unsaved state for one date. It starts from the
//! stored record (or defaults), is edited freely, and is committed as a whole
//! record. Committing snapshots the current habit list: every habit gets a
//! status, habits toggled before being deleted are dropped.

use crate::clock::normalize_clock;
use crate::scoring::calculate_habit_score;
use crate::types::{Habit, HabitStatus, SleepRecord, DEFAULT_RATING, RATING_MAX, RATING_MIN};
use std::collections::HashMap;

/// In-progress edit of a single date's record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyEntry {
    date: String,
    sleep_time: String,
    wake_time: String,
    condition: u8,
    sleep_quality: u8,
    completed: HashMap<String, bool>,
    notes: Option<String>,
}

impl DailyEntry {
    /// Start editing `date`, seeded from `existing` when there is one
    pub fn open(date: impl Into<String>, existing: Option<&SleepRecord>) -> Self {
        let date = date.into();
        match existing {
            Some(record) => Self {
                date,
                sleep_time: record.sleep_time.clone(),
                wake_time: record.wake_time.clone(),
                condition: clamp_rating(record.condition),
                sleep_quality: clamp_rating(record.sleep_quality),
                completed: record
                    .habits
                    .iter()
                    .map(|s| (s.habit_id.clone(), s.completed))
                    .collect(),
                notes: record.notes.clone(),
            },
            None => Self {
                date,
                sleep_time: String::new(),
                wake_time: String::new(),
                condition: DEFAULT_RATING,
                sleep_quality: DEFAULT_RATING,
                completed: HashMap::new(),
                notes: None,
            },
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn sleep_time(&self) -> &str {
        &self.sleep_time
    }

    pub fn wake_time(&self) -> &str {
        &self.wake_time
    }

    pub fn condition(&self) -> u8 {
        self.condition
    }

    pub fn sleep_quality(&self) -> u8 {
        self.sleep_quality
    }

    pub fn set_sleep_time(&mut self, time: impl Into<String>) {
        self.sleep_time = time.into();
    }

    pub fn set_wake_time(&mut self, time: impl Into<String>) {
        self.wake_time = time.into();
    }

    /// Set the morning condition, clamped into 1-10
    pub fn set_condition(&mut self, value: u8) {
        self.condition = clamp_rating(value);
    }

    /// Set the sleep quality rating, clamped into 1-10
    pub fn set_sleep_quality(&mut self, value: u8) {
        self.sleep_quality = clamp_rating(value);
    }

    /// Set the note; blank text clears it
    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes.filter(|n| !n.trim().is_empty());
    }

    pub fn set_completed(&mut self, habit_id: &str, completed: bool) {
        self.completed.insert(habit_id.to_string(), completed);
    }

    /// Flip a habit's completion flag and return the new value
    pub fn toggle_habit(&mut self, habit_id: &str) -> bool {
        let flag = self.completed.entry(habit_id.to_string()).or_insert(false);
        *flag = !*flag;
        *flag
    }

    pub fn is_completed(&self, habit_id: &str) -> bool {
        self.completed.get(habit_id).copied().unwrap_or(false)
    }

    /// Statuses for every habit in `habits`, in list order
    pub fn statuses(&self, habits: &[Habit]) -> Vec<HabitStatus> {
        habits
            .iter()
            .map(|h| HabitStatus::new(h.id.clone(), self.is_completed(&h.id)))
            .collect()
    }

    /// Live adherence preview for the entry as currently edited
    pub fn habit_score(&self, habits: &[Habit]) -> u8 {
        calculate_habit_score(&self.statuses(habits), habits)
    }

    /// Build the record to store for this date
    pub fn to_record(&self, habits: &[Habit]) -> SleepRecord {
        SleepRecord {
            date: self.date.clone(),
            sleep_time: normalize_clock(&self.sleep_time),
            wake_time: normalize_clock(&self.wake_time),
            condition: self.condition,
            sleep_quality: self.sleep_quality,
            habits: self.statuses(habits),
            notes: self.notes.clone(),
        }
    }
}

fn clamp_rating(value: u8) -> u8 {
    value.clamp(RATING_MIN, RATING_MAX)
}
