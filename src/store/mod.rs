//! Record and habit stores
//!
//! Stores exclusively own their collections. Callers get read-only slices and
//! hand those to the derivation functions; nothing in the scoring path writes
//! back.

mod habits;
mod records;

pub use habits::PersistentHabitStore;
pub use records::PersistentRecordStore;

use crate::error::StoreError;
use crate::types::{Habit, HabitType, SleepRecord};

/// One sleep record per calendar date
pub trait RecordStore {
    /// All records, ascending by date
    fn list(&self) -> &[SleepRecord];

    /// Record for `date`, if one was saved
    fn get(&self, date: &str) -> Option<&SleepRecord>;

    /// Replace the record with the same date, or add it
    fn upsert(&mut self, record: SleepRecord) -> Result<(), StoreError>;

    /// Drop every record
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Ordered collection of habit definitions
pub trait HabitStore {
    /// Habits in creation order
    fn list(&self) -> &[Habit];

    fn get(&self, id: &str) -> Option<&Habit>;

    /// Create a habit with a freshly generated id
    fn add(&mut self, name: &str, habit_type: HabitType) -> Result<Habit, StoreError>;

    /// Delete a habit; returns whether it existed
    fn remove(&mut self, id: &str) -> Result<bool, StoreError>;

    /// Drop every habit
    fn clear(&mut self) -> Result<(), StoreError>;
}
