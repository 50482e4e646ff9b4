//! Error types for Sleep Flow
//!
//! The derivation functions are total and never fail. Errors only arise at the
//! edges: validating user input before it is stored, and reading or writing
//! the persisted collections.

use thiserror::Error;

/// Reasons a habit or sleep record is rejected before it reaches a store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("Invalid clock time (expected HH:MM): {0}")]
    InvalidClock(String),

    #[error("{field} must be between {min} and {max}, got {value}")]
    RatingOutOfRange {
        field: &'static str,
        value: u8,
        min: u8,
        max: u8,
    },

    #[error("Habit name must not be empty")]
    EmptyHabitName,

    #[error("Unknown habit type (expected GOOD or BAD): {0}")]
    InvalidHabitType(String),

    #[error("Habit id must not be empty")]
    EmptyHabitId,

    #[error("Habit {0} appears more than once in the same record")]
    DuplicateHabitStatus(String),
}

/// Errors that can occur while loading or persisting collections
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Corrupt data under key {key}: {reason}")]
    Corrupt { key: String, reason: String },
}
