//! Sleep quality evaluation
//!
//! Classifies a night's duration into a qualitative band and a progress value
//! normalised against a 10-hour ceiling.

use serde::{Deserialize, Serialize};

/// Below this many minutes a night is POOR (6h)
pub const SHORT_SLEEP_MINUTES: u32 = 360;

/// Start of the ideal range (7h, inclusive)
pub const IDEAL_SLEEP_MINUTES: u32 = 420;

/// End of the ideal range (9h, inclusive)
pub const LONG_SLEEP_MINUTES: u32 = 540;

/// Duration that maps to 100% progress
pub const PROGRESS_CEILING_HOURS: f64 = 10.0;

/// Qualitative sleep duration band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SleepBand {
    NoData,
    Poor,
    Short,
    Ideal,
    Long,
}

impl SleepBand {
    /// Display label used by history and summary views
    pub fn label(&self) -> &'static str {
        match self {
            SleepBand::NoData => "NO DATA",
            SleepBand::Poor => "POOR",
            SleepBand::Short => "SHORT",
            SleepBand::Ideal => "IDEAL",
            SleepBand::Long => "LONG",
        }
    }

    fn classify(minutes: u32) -> Self {
        match minutes {
            0 => SleepBand::NoData,
            m if m < SHORT_SLEEP_MINUTES => SleepBand::Poor,
            m if m < IDEAL_SLEEP_MINUTES => SleepBand::Short,
            m if m <= LONG_SLEEP_MINUTES => SleepBand::Ideal,
            _ => SleepBand::Long,
        }
    }
}

/// Band plus progress (0-100) for one night
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepEvaluation {
    pub band: SleepBand,
    pub progress: f64,
}

/// Evaluate a sleep duration given in minutes
pub fn evaluate_sleep(duration_minutes: u32) -> SleepEvaluation {
    if duration_minutes == 0 {
        return SleepEvaluation {
            band: SleepBand::NoData,
            progress: 0.0,
        };
    }

    let hours = duration_minutes as f64 / 60.0;
    let progress = (hours / PROGRESS_CEILING_HOURS * 100.0).min(100.0);

    SleepEvaluation {
        band: SleepBand::classify(duration_minutes),
        progress,
    }
}
