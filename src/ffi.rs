//! FFI bindings for Sleep Flow
//!
//! This module provides C-compatible functions for calling Sleep Flow from an
//! on-device UI shell. Structured values cross the boundary as JSON in the
//! persisted shapes (camelCase records, `{id, name, type}` habits). Returned
//! strings are allocated here and must be freed with `sleepflow_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use serde::Serialize;

use crate::clock::calculate_duration;
use crate::evaluation::evaluate_sleep;
use crate::report::{DaySummary, TrendRange};
use crate::scoring::{calculate_habit_score, calculate_overall_quality};
use crate::storage::FileKeyValueStore;
use crate::store::{HabitStore, RecordStore};
use crate::tracker::Tracker;
use crate::types::{Habit, HabitStatus, HabitType, SleepRecord};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Serialize `value` into a caller-owned C string, recording failures
fn json_to_cstr<T: Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Read a required string argument, recording an error naming `what`
unsafe fn required_arg(ptr: *const c_char, what: &str) -> Option<String> {
    let value = cstr_to_string(ptr);
    if value.is_none() {
        set_last_error(&format!("Invalid {what} string pointer"));
    }
    value
}

/// Parse a JSON argument, recording an error naming `what`
unsafe fn json_arg<T: serde::de::DeserializeOwned>(ptr: *const c_char, what: &str) -> Option<T> {
    let json = required_arg(ptr, what)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            set_last_error(&format!("Invalid {what} JSON: {e}"));
            None
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Sleep duration in minutes between two `HH:MM` clock strings.
///
/// Returns 0 when either side is empty, -1 on a bad pointer.
///
/// # Safety
/// - `start` and `end` must be valid null-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_calculate_duration(
    start: *const c_char,
    end: *const c_char,
) -> i32 {
    clear_last_error();

    let (Some(start), Some(end)) = (required_arg(start, "start"), required_arg(end, "end")) else {
        return -1;
    };

    calculate_duration(&start, &end) as i32
}

/// Evaluate a duration and return `{"band": ..., "progress": ...}` JSON.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `sleepflow_free_string`.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_evaluate_sleep(duration_minutes: u32) -> *mut c_char {
    clear_last_error();
    json_to_cstr(&evaluate_sleep(duration_minutes))
}

/// Habit adherence score (1-10) for a JSON array of statuses against a JSON
/// array of habits. Returns -1 on error.
///
/// # Safety
/// - `statuses_json` and `habits_json` must be valid null-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_habit_score(
    statuses_json: *const c_char,
    habits_json: *const c_char,
) -> i32 {
    clear_last_error();

    let Some(statuses) = json_arg::<Vec<HabitStatus>>(statuses_json, "statuses") else {
        return -1;
    };
    let Some(habits) = json_arg::<Vec<Habit>>(habits_json, "habits") else {
        return -1;
    };

    calculate_habit_score(&statuses, &habits) as i32
}

/// Overall quality: rounded mean of the three 1-10 inputs
#[no_mangle]
pub extern "C" fn sleepflow_overall_quality(condition: u8, sleep_quality: u8, habit_score: u8) -> i32 {
    calculate_overall_quality(condition, sleep_quality, habit_score) as i32
}

/// Derive the full day summary for one record.
///
/// # Safety
/// - `record_json` and `habits_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `sleepflow_free_string`.
/// - Returns NULL on error; call `sleepflow_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_day_summary(
    record_json: *const c_char,
    habits_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(record) = json_arg::<SleepRecord>(record_json, "record") else {
        return ptr::null_mut();
    };
    let Some(habits) = json_arg::<Vec<Habit>>(habits_json, "habits") else {
        return ptr::null_mut();
    };

    json_to_cstr(&DaySummary::from_record(&record, &habits))
}

// ============================================================================
// Stateful Tracker API
// ============================================================================

/// Opaque handle to a file-backed Tracker
pub struct TrackerHandle {
    tracker: Tracker<FileKeyValueStore>,
}

/// Open a tracker persisting under `data_dir`.
///
/// # Safety
/// - `data_dir` must be a valid null-terminated C string.
/// - Must be freed with `sleepflow_tracker_free`.
/// - Returns NULL on error; call `sleepflow_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_tracker_open(data_dir: *const c_char) -> *mut TrackerHandle {
    clear_last_error();

    let Some(dir) = required_arg(data_dir, "data_dir") else {
        return ptr::null_mut();
    };

    match Tracker::open_dir(dir) {
        Ok(tracker) => Box::into_raw(Box::new(TrackerHandle { tracker })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a tracker.
///
/// # Safety
/// - `tracker` must be a pointer returned by `sleepflow_tracker_open`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_tracker_free(tracker: *mut TrackerHandle) {
    if !tracker.is_null() {
        drop(Box::from_raw(tracker));
    }
}

unsafe fn handle<'a>(tracker: *mut TrackerHandle) -> Option<&'a mut TrackerHandle> {
    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return None;
    }
    Some(&mut *tracker)
}

/// Current habits as a JSON array.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `sleepflow_tracker_open`.
/// - Returns a newly allocated string that must be freed with `sleepflow_free_string`.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_tracker_habits(tracker: *mut TrackerHandle) -> *mut c_char {
    clear_last_error();
    let Some(handle) = handle(tracker) else {
        return ptr::null_mut();
    };
    json_to_cstr(&handle.tracker.habits().list())
}

/// Add a habit (`habit_type` is "GOOD" or "BAD") and return it as JSON.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `sleepflow_tracker_open`.
/// - `name` and `habit_type` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `sleepflow_free_string`.
/// - Returns NULL on error; call `sleepflow_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_tracker_add_habit(
    tracker: *mut TrackerHandle,
    name: *const c_char,
    habit_type: *const c_char,
) -> *mut c_char {
    clear_last_error();
    let Some(handle) = handle(tracker) else {
        return ptr::null_mut();
    };
    let (Some(name), Some(habit_type)) =
        (required_arg(name, "name"), required_arg(habit_type, "habit_type"))
    else {
        return ptr::null_mut();
    };

    let habit_type: HabitType = match habit_type.parse() {
        Ok(t) => t,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    match handle.tracker.habits_mut().add(&name, habit_type) {
        Ok(habit) => json_to_cstr(&habit),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Remove a habit. Returns 1 if removed, 0 if unknown, -1 on error.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `sleepflow_tracker_open`.
/// - `id` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_tracker_remove_habit(
    tracker: *mut TrackerHandle,
    id: *const c_char,
) -> i32 {
    clear_last_error();
    let Some(handle) = handle(tracker) else {
        return -1;
    };
    let Some(id) = required_arg(id, "id") else {
        return -1;
    };

    match handle.tracker.habits_mut().remove(&id) {
        Ok(true) => 1,
        Ok(false) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Insert or replace the record for its date. Returns 0 on success, -1 on error.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `sleepflow_tracker_open`.
/// - `record_json` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_tracker_upsert_record(
    tracker: *mut TrackerHandle,
    record_json: *const c_char,
) -> i32 {
    clear_last_error();
    let Some(handle) = handle(tracker) else {
        return -1;
    };
    let Some(record) = json_arg::<SleepRecord>(record_json, "record") else {
        return -1;
    };

    match handle.tracker.records_mut().upsert(record) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Day summaries for every record, newest first, as a JSON array.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `sleepflow_tracker_open`.
/// - Returns a newly allocated string that must be freed with `sleepflow_free_string`.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_tracker_history(tracker: *mut TrackerHandle) -> *mut c_char {
    clear_last_error();
    let Some(handle) = handle(tracker) else {
        return ptr::null_mut();
    };
    json_to_cstr(&handle.tracker.history())
}

/// Trend for one period as JSON.
///
/// `range` is 0 (week), 1 (month) or 2 (year); `compare` non-zero includes
/// the preceding period.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `sleepflow_tracker_open`.
/// - Returns a newly allocated string that must be freed with `sleepflow_free_string`.
/// - Returns NULL on error; call `sleepflow_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_tracker_trend(
    tracker: *mut TrackerHandle,
    range: i32,
    offset: i64,
    compare: i32,
) -> *mut c_char {
    clear_last_error();
    let Some(handle) = handle(tracker) else {
        return ptr::null_mut();
    };

    let range = match range {
        0 => TrendRange::Week,
        1 => TrendRange::Month,
        2 => TrendRange::Year,
        other => {
            set_last_error(&format!("Unknown trend range: {other}"));
            return ptr::null_mut();
        }
    };

    json_to_cstr(&handle.tracker.trend(range, offset, compare != 0))
}

/// Delete every record and habit. Returns 0 on success, -1 on error.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `sleepflow_tracker_open`.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_tracker_reset(tracker: *mut TrackerHandle) -> i32 {
    clear_last_error();
    let Some(handle) = handle(tracker) else {
        return -1;
    };

    match handle.tracker.reset() {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Free a string returned by Sleep Flow functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Sleep Flow function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Sleep Flow call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn sleepflow_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn habits_json() -> CString {
        CString::new(
            r#"[{"id":"ex","name":"Exercise","type":"GOOD"},{"id":"caf","name":"Caffeine","type":"BAD"}]"#,
        )
        .unwrap()
    }

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        sleepflow_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_duration() {
        let start = CString::new("23:30").unwrap();
        let end = CString::new("06:30").unwrap();
        let empty = CString::new("").unwrap();

        unsafe {
            assert_eq!(sleepflow_calculate_duration(start.as_ptr(), end.as_ptr()), 420);
            assert_eq!(sleepflow_calculate_duration(empty.as_ptr(), end.as_ptr()), 0);
            assert_eq!(sleepflow_calculate_duration(ptr::null(), end.as_ptr()), -1);
            assert!(!sleepflow_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_evaluate_and_scores() {
        let statuses =
            CString::new(r#"[{"habitId":"ex","completed":true},{"habitId":"caf","completed":false}]"#)
                .unwrap();
        let habits = habits_json();

        unsafe {
            let eval: serde_json::Value =
                serde_json::from_str(&take_string(sleepflow_evaluate_sleep(420))).unwrap();
            assert_eq!(eval["band"], "IDEAL");
            assert!((eval["progress"].as_f64().unwrap() - 70.0).abs() < 1e-9);

            assert_eq!(sleepflow_habit_score(statuses.as_ptr(), habits.as_ptr()), 10);
        }
        assert_eq!(sleepflow_overall_quality(5, 6, 7), 6);
    }

    #[test]
    fn test_ffi_day_summary() {
        let record = CString::new(
            r#"{"date":"2024-03-02","sleepTime":"23:30","wakeTime":"06:30","condition":8,"sleepQuality":7,
                "habits":[{"habitId":"ex","completed":true},{"habitId":"caf","completed":false}]}"#,
        )
        .unwrap();
        let habits = habits_json();

        unsafe {
            let summary: serde_json::Value = serde_json::from_str(&take_string(
                sleepflow_day_summary(record.as_ptr(), habits.as_ptr()),
            ))
            .unwrap();
            assert_eq!(summary["durationMinutes"], 420);
            assert_eq!(summary["habitScore"], 10);
            assert_eq!(summary["overall"], 8);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let bad = CString::new("not json").unwrap();
        let habits = habits_json();

        unsafe {
            assert_eq!(sleepflow_habit_score(bad.as_ptr(), habits.as_ptr()), -1);

            let error = sleepflow_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("statuses"));
        }
    }

    #[test]
    fn test_ffi_tracker_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = CString::new(dir.path().to_str().unwrap()).unwrap();
        let name = CString::new("Exercise").unwrap();
        let good = CString::new("good").unwrap();

        unsafe {
            let tracker = sleepflow_tracker_open(path.as_ptr());
            assert!(!tracker.is_null());

            let habit: serde_json::Value = serde_json::from_str(&take_string(
                sleepflow_tracker_add_habit(tracker, name.as_ptr(), good.as_ptr()),
            ))
            .unwrap();
            let id = habit["id"].as_str().unwrap().to_string();

            let record = CString::new(format!(
                r#"{{"date":"2024-03-02","sleepTime":"23:00","wakeTime":"07:00","condition":6,"sleepQuality":6,"habits":[{{"habitId":"{id}","completed":true}}]}}"#
            ))
            .unwrap();
            assert_eq!(sleepflow_tracker_upsert_record(tracker, record.as_ptr()), 0);

            let history: serde_json::Value =
                serde_json::from_str(&take_string(sleepflow_tracker_history(tracker))).unwrap();
            assert_eq!(history[0]["durationMinutes"], 480);
            assert_eq!(history[0]["habitScore"], 10);

            let trend: serde_json::Value =
                serde_json::from_str(&take_string(sleepflow_tracker_trend(tracker, 0, 0, 1)))
                    .unwrap();
            assert_eq!(trend["points"].as_array().map(|p| p.len()), Some(1));
            assert!(sleepflow_tracker_trend(tracker, 9, 0, 0).is_null());

            let far_past: serde_json::Value = serde_json::from_str(&take_string(
                sleepflow_tracker_trend(tracker, 2, i64::MIN, 1),
            ))
            .unwrap();
            assert_eq!(far_past["points"].as_array().map(|p| p.len()), Some(0));

            let loose = CString::new(
                r#"{"date":"2024-03-03","sleepTime":"7:5","wakeTime":"","condition":5,"sleepQuality":5,"habits":[]}"#,
            )
            .unwrap();
            assert_eq!(sleepflow_tracker_upsert_record(tracker, loose.as_ptr()), -1);
            assert!(!sleepflow_last_error().is_null());

            let id_c = CString::new(id).unwrap();
            assert_eq!(sleepflow_tracker_remove_habit(tracker, id_c.as_ptr()), 1);
            assert_eq!(sleepflow_tracker_remove_habit(tracker, id_c.as_ptr()), 0);

            assert_eq!(sleepflow_tracker_reset(tracker), 0);
            assert_eq!(take_string(sleepflow_tracker_habits(tracker)), "[]");

            sleepflow_tracker_free(tracker);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = sleepflow_version();
            assert!(!version.is_null());
            assert!(!CStr::from_ptr(version).to_str().unwrap().is_empty());
        }
    }
}
