use pretty_assertions::assert_eq;
use sleep_flow::storage::STORAGE_KEY_RECORDS;
use sleep_flow::{HabitStore, HabitType, RecordStore, SleepBand, Tracker, TrendRange};

#[test]
fn test_log_night_and_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let (exercise, caffeine) = {
        let mut tracker = Tracker::open_dir(dir.path()).unwrap();
        let exercise = tracker.habits_mut().add("Exercise", HabitType::Good).unwrap();
        let caffeine = tracker.habits_mut().add("Caffeine", HabitType::Bad).unwrap();

        let mut entry = tracker.entry("2024-03-01").unwrap();
        entry.set_sleep_time("23:30");
        entry.set_wake_time("06:30");
        entry.set_condition(8);
        entry.set_sleep_quality(7);
        entry.set_completed(&exercise.id, true);
        entry.set_completed(&caffeine.id, false);
        tracker.save_entry(&entry).unwrap();
        (exercise, caffeine)
    };

    let raw = std::fs::read_to_string(dir.path().join(format!("{STORAGE_KEY_RECORDS}.json"))).unwrap();
    assert!(raw.contains("\"sleepTime\""));
    assert!(raw.contains("\"habitId\""));

    let tracker = Tracker::open_dir(dir.path()).unwrap();
    assert_eq!(tracker.habits().list().len(), 2);
    assert_eq!(tracker.records().list().len(), 1);

    let summary = tracker.summary("2024-03-01").unwrap();
    assert_eq!(summary.duration_minutes, 420);
    assert_eq!(summary.duration_label, "7h 0m");
    assert_eq!(summary.evaluation.band, SleepBand::Ideal);
    assert_eq!(summary.habit_score, 10);
    assert_eq!(summary.overall, 8);

    let entry = tracker.entry("2024-03-01").unwrap();
    assert!(entry.is_completed(&exercise.id));
    assert!(!entry.is_completed(&caffeine.id));
}

#[test]
fn test_new_habit_lowers_past_scores() {
    let dir = tempfile::tempdir().unwrap();
    let mut tracker = Tracker::open_dir(dir.path()).unwrap();
    let walk = tracker.habits_mut().add("Walk", HabitType::Good).unwrap();
    let sugar = tracker.habits_mut().add("Sugar", HabitType::Bad).unwrap();

    let mut entry = tracker.entry("2024-03-02").unwrap();
    entry.set_completed(&walk.id, true);
    entry.set_completed(&sugar.id, false);
    tracker.save_entry(&entry).unwrap();
    assert_eq!(tracker.summary("2024-03-02").unwrap().habit_score, 10);

    // No status recorded for the new habit on that day
    tracker.habits_mut().add("Read", HabitType::Good).unwrap();
    assert_eq!(tracker.summary("2024-03-02").unwrap().habit_score, 7);
}

#[test]
fn test_week_trend_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    let mut tracker = Tracker::open_dir(dir.path()).unwrap();

    for day in 1..=9 {
        let mut entry = tracker.entry(&format!("2024-04-{day:02}")).unwrap();
        entry.set_sleep_time("23:00");
        entry.set_wake_time("07:00");
        tracker.save_entry(&entry).unwrap();
    }

    let trend = tracker.trend(TrendRange::Week, 0, true);
    assert_eq!(trend.points.len(), 7);
    assert_eq!(trend.points[0].date, "2024-04-03");
    assert_eq!(trend.points[6].date, "2024-04-09");
    assert_eq!(trend.points[6].duration_hours, 8.0);
    assert_eq!(trend.previous.as_ref().map(Vec::len), Some(2));

    let history = tracker.history();
    assert_eq!(history.first().map(|d| d.date.as_str()), Some("2024-04-09"));

    tracker.reset().unwrap();
    let reopened = Tracker::open_dir(dir.path()).unwrap();
    assert!(reopened.records().is_empty());
    assert!(reopened.habits().is_empty());
}
