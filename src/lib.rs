//! Sleep Flow - On-device sleep and habit tracking core
//!
//! Nightly records (onset, wake, condition, sleep quality, habit statuses) are
//! turned into presentational values by a set of pure functions:
//! clock arithmetic → quality band → habit adherence → overall quality.
//!
//! ## Modules
//!
//! - **Derivation**: [`clock`], [`evaluation`], [`scoring`], [`report`]
//! - **Data**: [`types`], [`store`] over a [`storage::KeyValueStore`] backend
//! - **Editing**: [`entry`] and the [`Tracker`] facade

pub mod clock;
pub mod entry;
pub mod error;
pub mod evaluation;
pub mod report;
pub mod scoring;
pub mod storage;
pub mod store;
pub mod tracker;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use clock::{calculate_duration, time_to_minutes};
pub use entry::DailyEntry;
pub use error::{StoreError, ValidationError};
pub use evaluation::{evaluate_sleep, SleepBand, SleepEvaluation};
pub use report::{DaySummary, PeriodStats, Trend, TrendPoint, TrendRange};
pub use scoring::{calculate_habit_score, calculate_overall_quality};
pub use store::{HabitStore, RecordStore};
pub use tracker::Tracker;
pub use types::{Habit, HabitStatus, HabitType, SleepRecord};

/// Crate version reported by the CLI and the C API
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name reported by the CLI doctor
pub const PRODUCER_NAME: &str = "sleep-flow";
