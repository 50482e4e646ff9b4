//! History and trend reports
//!
//! Everything here is derived on demand from a snapshot of records and
//! habits; nothing is cached or written back.
//!
//! Trend windows count records, not calendar days: a week is the last 7
//! logged nights, whether or not they are consecutive.

use crate::clock::{calculate_duration, clock_minutes, format_duration, MINUTES_PER_DAY};
use crate::evaluation::{evaluate_sleep, SleepEvaluation};
use crate::scoring::{calculate_habit_score, calculate_overall_quality};
use crate::types::{Habit, SleepRecord};
use serde::{Deserialize, Serialize};

/// Clock readings before 10:00 are plotted after midnight of the previous
/// evening, so 23:30 and 00:30 sit next to each other on the axis.
pub const REGULARITY_PIVOT_MINUTES: u32 = 10 * 60;

/// All derived values for one stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: String,
    pub sleep_time: String,
    pub wake_time: String,
    pub duration_minutes: u32,
    /// e.g. "7h 30m"
    pub duration_label: String,
    pub evaluation: SleepEvaluation,
    pub condition: u8,
    pub sleep_quality: u8,
    pub habit_score: u8,
    pub overall: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DaySummary {
    pub fn from_record(record: &SleepRecord, habits: &[Habit]) -> Self {
        let duration_minutes = calculate_duration(&record.sleep_time, &record.wake_time);
        let habit_score = calculate_habit_score(&record.habits, habits);
        let overall = calculate_overall_quality(record.condition, record.sleep_quality, habit_score);

        Self {
            date: record.date.clone(),
            sleep_time: record.sleep_time.clone(),
            wake_time: record.wake_time.clone(),
            duration_minutes,
            duration_label: format_duration(duration_minutes),
            evaluation: evaluate_sleep(duration_minutes),
            condition: record.condition,
            sleep_quality: record.sleep_quality,
            habit_score,
            overall,
            notes: record.notes.clone(),
        }
    }
}

/// Summaries for every record, newest first
pub fn history(records: &[SleepRecord], habits: &[Habit]) -> Vec<DaySummary> {
    let mut sorted: Vec<&SleepRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
        .into_iter()
        .map(|r| DaySummary::from_record(r, habits))
        .collect()
}

/// Size of a trend window, in records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendRange {
    Week,
    Month,
    Year,
}

impl TrendRange {
    pub fn record_count(&self) -> usize {
        match self {
            TrendRange::Week => 7,
            TrendRange::Month => 30,
            TrendRange::Year => 365,
        }
    }
}

/// Select one period of records, ascending by date.
///
/// `offset` 0 is the latest period, -1 the one before it, and so on.
/// Positive offsets are treated as 0.
pub fn trend_window(records: &[SleepRecord], range: TrendRange, offset: i64) -> Vec<&SleepRecord> {
    let mut sorted: Vec<&SleepRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));

    let count = range.record_count() as i64;
    let len = sorted.len() as i64;
    let end = len.saturating_add(offset.min(0).saturating_mul(count)).min(len);
    if end <= 0 {
        return Vec::new();
    }
    let start = end.saturating_sub(count).max(0);

    sorted[start as usize..end as usize].to_vec()
}

/// One plotted night
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Position within the window, used to overlay two periods
    pub index: usize,
    pub date: String,
    /// "MM/DD"
    pub label: String,
    /// Rounded to one decimal
    pub duration_hours: f64,
    /// Onset on the regularity axis, `None` when not recorded
    pub sleep_axis: Option<u32>,
    /// Wake time on the regularity axis, `None` when not recorded
    pub wake_axis: Option<u32>,
    pub score: u8,
}

impl TrendPoint {
    fn from_record(index: usize, record: &SleepRecord, habits: &[Habit]) -> Self {
        let minutes = calculate_duration(&record.sleep_time, &record.wake_time);
        let habit_score = calculate_habit_score(&record.habits, habits);

        Self {
            index,
            date: record.date.clone(),
            label: short_label(&record.date),
            duration_hours: (minutes as f64 / 60.0 * 10.0).round() / 10.0,
            sleep_axis: regularity_axis(&record.sleep_time),
            wake_axis: regularity_axis(&record.wake_time),
            score: calculate_overall_quality(record.condition, record.sleep_quality, habit_score),
        }
    }
}

/// Average and best overall score of a period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub average: u8,
    pub top: u8,
}

impl PeriodStats {
    /// Both values are 0 for an empty period
    pub fn from_points(points: &[TrendPoint]) -> Self {
        if points.is_empty() {
            return Self::default();
        }
        let sum: u32 = points.iter().map(|p| p.score as u32).sum();
        Self {
            average: (sum as f64 / points.len() as f64).round() as u8,
            top: points.iter().map(|p| p.score).max().unwrap_or(0),
        }
    }
}

/// A trend window, optionally with the preceding window for comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub range: TrendRange,
    pub offset: i64,
    pub points: Vec<TrendPoint>,
    pub stats: PeriodStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Vec<TrendPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_stats: Option<PeriodStats>,
}

impl Trend {
    /// Current points paired by index with the previous period's points
    pub fn paired(&self) -> impl Iterator<Item = (&TrendPoint, Option<&TrendPoint>)> + '_ {
        self.points.iter().map(move |p| {
            let prev = self.previous.as_ref().and_then(|prev| prev.get(p.index));
            (p, prev)
        })
    }
}

/// Build the trend for one period
pub fn trend(
    records: &[SleepRecord],
    habits: &[Habit],
    range: TrendRange,
    offset: i64,
    compare: bool,
) -> Trend {
    let offset = offset.min(0);
    let points = trend_points(records, habits, range, offset);
    let stats = PeriodStats::from_points(&points);

    let (previous, previous_stats) = if compare {
        let prev = trend_points(records, habits, range, offset.saturating_sub(1));
        let prev_stats = PeriodStats::from_points(&prev);
        (Some(prev), Some(prev_stats))
    } else {
        (None, None)
    };

    Trend {
        range,
        offset,
        points,
        stats,
        previous,
        previous_stats,
    }
}

fn trend_points(
    records: &[SleepRecord],
    habits: &[Habit],
    range: TrendRange,
    offset: i64,
) -> Vec<TrendPoint> {
    trend_window(records, range, offset)
        .into_iter()
        .enumerate()
        .map(|(idx, r)| TrendPoint::from_record(idx, r, habits))
        .collect()
}

fn regularity_axis(time: &str) -> Option<u32> {
    let minutes = clock_minutes(time)?;
    if minutes < REGULARITY_PIVOT_MINUTES {
        Some(minutes + MINUTES_PER_DAY)
    } else {
        Some(minutes)
    }
}

fn short_label(date: &str) -> String {
    date.split('-').skip(1).collect::<Vec<_>>().join("/")
}
