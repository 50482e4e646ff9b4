//! Tracker facade
//!
//! Owns one record store and one habit store over the same kind of backend.
//! Front ends hold a `Tracker` and pass it around explicitly.

use crate::entry::DailyEntry;
use crate::error::StoreError;
use crate::report::{history, trend, DaySummary, Trend, TrendRange};
use crate::storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
use crate::store::{HabitStore, PersistentHabitStore, PersistentRecordStore, RecordStore};
use crate::types::{validate_date, SleepRecord};
use log::info;
use std::path::PathBuf;

pub struct Tracker<B: KeyValueStore> {
    records: PersistentRecordStore<B>,
    habits: PersistentHabitStore<B>,
}

impl Tracker<MemoryKeyValueStore> {
    /// Tracker with nothing persisted
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(MemoryKeyValueStore::new(), MemoryKeyValueStore::new())
    }
}

impl Tracker<FileKeyValueStore> {
    /// Tracker persisting both collections under `dir`
    pub fn open_dir(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let backend = FileKeyValueStore::open(dir)?;
        Self::open(backend.clone(), backend)
    }
}

impl<B: KeyValueStore> Tracker<B> {
    /// Load both collections; each store gets its own backend handle
    pub fn open(record_backend: B, habit_backend: B) -> Result<Self, StoreError> {
        let records = PersistentRecordStore::open(record_backend)?;
        let habits = PersistentHabitStore::open(habit_backend)?;
        info!(
            "event=tracker_open records={} habits={}",
            records.len(),
            habits.len()
        );
        Ok(Self { records, habits })
    }

    pub fn records(&self) -> &PersistentRecordStore<B> {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut PersistentRecordStore<B> {
        &mut self.records
    }

    pub fn habits(&self) -> &PersistentHabitStore<B> {
        &self.habits
    }

    pub fn habits_mut(&mut self) -> &mut PersistentHabitStore<B> {
        &mut self.habits
    }

    /// Open the editable entry for `date`
    pub fn entry(&self, date: &str) -> Result<DailyEntry, StoreError> {
        validate_date(date)?;
        Ok(DailyEntry::open(date, self.records.get(date)))
    }

    /// Commit an entry against the current habit list
    pub fn save_entry(&mut self, entry: &DailyEntry) -> Result<SleepRecord, StoreError> {
        let record = entry.to_record(self.habits.list());
        self.records.upsert(record.clone())?;
        Ok(record)
    }

    /// Derived values for `date`, if a record exists
    pub fn summary(&self, date: &str) -> Option<DaySummary> {
        self.records
            .get(date)
            .map(|r| DaySummary::from_record(r, self.habits.list()))
    }

    pub fn history(&self) -> Vec<DaySummary> {
        history(self.records.list(), self.habits.list())
    }

    pub fn trend(&self, range: TrendRange, offset: i64, compare: bool) -> Trend {
        trend(
            self.records.list(),
            self.habits.list(),
            range,
            offset,
            compare,
        )
    }

    /// Factory reset: drop every record and habit
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.records.clear()?;
        self.habits.clear()?;
        info!("event=tracker_reset status=ok");
        Ok(())
    }
}
