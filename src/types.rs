//! Core types for Sleep Flow
//!
//! These are the persisted shapes: habits and one sleep record per calendar
//! date. Field names serialize in camelCase so that data written by earlier
//! app versions loads unchanged.

use crate::clock::parse_clock;
use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Lowest value of a subjective rating
pub const RATING_MIN: u8 = 1;

/// Highest value of a subjective rating
pub const RATING_MAX: u8 = 10;

/// Rating pre-filled for a date that has no record yet
pub const DEFAULT_RATING: u8 = 5;

/// Calendar date format used as the record key
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether a habit is something to do or something to avoid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HabitType {
    Good,
    Bad,
}

impl HabitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitType::Good => "GOOD",
            HabitType::Bad => "BAD",
        }
    }

    /// Whether a day's `completed` flag counts toward adherence
    pub fn is_achieved(&self, completed: bool) -> bool {
        match self {
            HabitType::Good => completed,
            HabitType::Bad => !completed,
        }
    }
}

impl fmt::Display for HabitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HabitType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GOOD" => Ok(HabitType::Good),
            "BAD" => Ok(HabitType::Bad),
            _ => Err(ValidationError::InvalidHabitType(s.to_string())),
        }
    }
}

/// A user-defined habit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    /// Stable identifier, generated once at creation
    pub id: String,
    /// Display name
    pub name: String,
    /// Polarity
    #[serde(rename = "type")]
    pub habit_type: HabitType,
}

impl Habit {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyHabitId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyHabitName);
        }
        Ok(())
    }
}

/// One habit's state on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStatus {
    /// May refer to a habit that has since been deleted
    pub habit_id: String,
    pub completed: bool,
}

impl HabitStatus {
    pub fn new(habit_id: impl Into<String>, completed: bool) -> Self {
        Self {
            habit_id: habit_id.into(),
            completed,
        }
    }
}

/// Everything logged for one calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepRecord {
    /// Date this record belongs to (YYYY-MM-DD), the record's identity
    pub date: String,
    /// Sleep onset (HH:MM), empty when not recorded
    #[serde(default)]
    pub sleep_time: String,
    /// Wake time (HH:MM), empty when not recorded
    #[serde(default)]
    pub wake_time: String,
    /// Morning condition (1-10)
    pub condition: u8,
    /// Subjective sleep quality (1-10)
    pub sleep_quality: u8,
    /// Habit statuses as of the time this record was saved
    #[serde(default)]
    pub habits: Vec<HabitStatus>,
    /// Free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SleepRecord {
    /// Create an empty record for `date` with default ratings
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            sleep_time: String::new(),
            wake_time: String::new(),
            condition: DEFAULT_RATING,
            sleep_quality: DEFAULT_RATING,
            habits: Vec::new(),
            notes: None,
        }
    }

    /// Check the record before it is written to a store
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_date(&self.date)?;

        for time in [&self.sleep_time, &self.wake_time] {
            if !time.is_empty() {
                parse_clock(time)?;
            }
        }

        validate_rating("condition", self.condition)?;
        validate_rating("sleepQuality", self.sleep_quality)?;

        let mut seen = HashSet::with_capacity(self.habits.len());
        for status in &self.habits {
            if !seen.insert(status.habit_id.as_str()) {
                return Err(ValidationError::DuplicateHabitStatus(
                    status.habit_id.clone(),
                ));
            }
        }

        Ok(())
    }
}

/// Check that `date` is a real calendar date in zero-padded ISO form.
///
/// Zero padding matters: records are ordered by comparing date strings.
pub fn validate_date(date: &str) -> Result<NaiveDate, ValidationError> {
    if date.len() != 10 {
        return Err(ValidationError::InvalidDate(date.to_string()));
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(date.to_string()))
}

fn validate_rating(field: &'static str, value: u8) -> Result<(), ValidationError> {
    if (RATING_MIN..=RATING_MAX).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange {
            field,
            value,
            min: RATING_MIN,
            max: RATING_MAX,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_record() -> SleepRecord {
        SleepRecord {
            date: "2024-03-02".to_string(),
            sleep_time: "23:30".to_string(),
            wake_time: "06:30".to_string(),
            condition: 8,
            sleep_quality: 7,
            habits: vec![HabitStatus::new("a", true), HabitStatus::new("b", false)],
            notes: None,
        }
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "date": "2024-03-02",
                "sleepTime": "23:30",
                "wakeTime": "06:30",
                "condition": 8,
                "sleepQuality": 7,
                "habits": [
                    { "habitId": "a", "completed": true },
                    { "habitId": "b", "completed": false }
                ]
            })
        );
    }

    #[test]
    fn test_habit_json_shape() {
        let json = r#"{"id":"h1","name":"Caffeine","type":"BAD"}"#;
        let habit: Habit = serde_json::from_str(json).unwrap();
        assert_eq!(habit.habit_type, HabitType::Bad);
        assert_eq!(serde_json::to_string(&habit).unwrap(), json);
    }

    #[test]
    fn test_record_missing_optional_fields() {
        let json = r#"{"date":"2024-03-02","condition":5,"sleepQuality":5}"#;
        let record: SleepRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.sleep_time, "");
        assert!(record.habits.is_empty());
        assert!(record.notes.is_none());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let mut record = sample_record();
        record.date = "2024-3-2".to_string();
        assert!(matches!(
            record.validate(),
            Err(ValidationError::InvalidDate(_))
        ));

        let mut record = sample_record();
        record.wake_time = "25:00".to_string();
        assert!(matches!(
            record.validate(),
            Err(ValidationError::InvalidClock(_))
        ));

        for loose in ["7:5", " 22:15 ", " "] {
            let mut record = sample_record();
            record.sleep_time = loose.to_string();
            assert!(
                matches!(record.validate(), Err(ValidationError::InvalidClock(_))),
                "{loose:?} accepted"
            );
        }

        let mut record = sample_record();
        record.condition = 0;
        assert!(matches!(
            record.validate(),
            Err(ValidationError::RatingOutOfRange { field: "condition", .. })
        ));

        let mut record = sample_record();
        record.habits.push(HabitStatus::new("a", false));
        assert_eq!(
            record.validate(),
            Err(ValidationError::DuplicateHabitStatus("a".to_string()))
        );
    }

    #[test]
    fn test_habit_type_parsing() {
        assert_eq!("good".parse::<HabitType>(), Ok(HabitType::Good));
        assert_eq!(" BAD ".parse::<HabitType>(), Ok(HabitType::Bad));
        assert!("neutral".parse::<HabitType>().is_err());
        assert!(HabitType::Bad.is_achieved(false));
        assert!(!HabitType::Good.is_achieved(false));
    }
}
