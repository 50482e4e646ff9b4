use super::RecordStore;
use crate::error::StoreError;
use crate::storage::{KeyValueStore, STORAGE_KEY_RECORDS};
use crate::types::SleepRecord;
use log::{debug, info};

/// Record store persisted as a single JSON array under [`STORAGE_KEY_RECORDS`]
#[derive(Debug)]
pub struct PersistentRecordStore<B: KeyValueStore> {
    backend: B,
    records: Vec<SleepRecord>,
}

impl<B: KeyValueStore> PersistentRecordStore<B> {
    /// Load the persisted records from `backend`.
    ///
    /// Fails with [`StoreError::Corrupt`] if the stored array holds an invalid
    /// record or two records for the same date.
    pub fn open(backend: B) -> Result<Self, StoreError> {
        let mut records: Vec<SleepRecord> = match backend.load(STORAGE_KEY_RECORDS)? {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };

        for record in &records {
            record.validate().map_err(|e| corrupt(e.to_string()))?;
        }

        records.sort_by(|a, b| a.date.cmp(&b.date));
        if let Some(pair) = records.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(corrupt(format!("duplicate record for {}", pair[0].date)));
        }

        debug!("event=records_loaded count={}", records.len());
        Ok(Self { backend, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    fn persist(&mut self, records: &[SleepRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string(records)?;
        self.backend.save(STORAGE_KEY_RECORDS, &json)
    }
}

impl<B: KeyValueStore> RecordStore for PersistentRecordStore<B> {
    fn list(&self) -> &[SleepRecord] {
        &self.records
    }

    fn get(&self, date: &str) -> Option<&SleepRecord> {
        self.records
            .binary_search_by(|r| r.date.as_str().cmp(date))
            .ok()
            .map(|idx| &self.records[idx])
    }

    fn upsert(&mut self, record: SleepRecord) -> Result<(), StoreError> {
        record.validate()?;

        let mut next = self.records.clone();
        let replaced = match next.binary_search_by(|r| r.date.cmp(&record.date)) {
            Ok(idx) => {
                next[idx] = record;
                true
            }
            Err(idx) => {
                next.insert(idx, record);
                false
            }
        };

        self.persist(&next)?;
        self.records = next;
        debug!(
            "event=record_upsert replaced={replaced} count={}",
            self.records.len()
        );
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.remove(STORAGE_KEY_RECORDS)?;
        info!("event=records_cleared count={}", self.records.len());
        self.records.clear();
        Ok(())
    }
}

fn corrupt(reason: String) -> StoreError {
    StoreError::Corrupt {
        key: STORAGE_KEY_RECORDS.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use crate::types::HabitStatus;

    fn record(date: &str, condition: u8) -> SleepRecord {
        SleepRecord {
            condition,
            ..SleepRecord::new(date)
        }
    }

    #[test]
    fn test_upsert_inserts_in_date_order() {
        let mut store = PersistentRecordStore::open(MemoryKeyValueStore::new()).unwrap();
        store.upsert(record("2024-01-03", 5)).unwrap();
        store.upsert(record("2024-01-01", 5)).unwrap();
        store.upsert(record("2024-01-02", 5)).unwrap();

        let dates: Vec<&str> = store.list().iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
    }

    #[test]
    fn test_upsert_replaces_same_date() {
        let mut store = PersistentRecordStore::open(MemoryKeyValueStore::new()).unwrap();
        store.upsert(record("2024-01-01", 3)).unwrap();

        let mut updated = record("2024-01-01", 9);
        updated.habits = vec![HabitStatus::new("h", true)];
        store.upsert(updated.clone()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("2024-01-01"), Some(&updated));
    }

    #[test]
    fn test_upsert_rejects_invalid_record() {
        let mut store = PersistentRecordStore::open(MemoryKeyValueStore::new()).unwrap();
        let result = store.upsert(record("2024-01-01", 11));
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_reopen_reads_persisted_records() {
        let mut store = PersistentRecordStore::open(MemoryKeyValueStore::new()).unwrap();
        store.upsert(record("2024-02-10", 7)).unwrap();
        store.upsert(record("2024-02-09", 6)).unwrap();

        let reopened = PersistentRecordStore::open(store.into_backend()).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.list()[0].date, "2024-02-09");
        assert_eq!(reopened.get("2024-02-10").map(|r| r.condition), Some(7));
    }

    #[test]
    fn test_open_sorts_unsorted_data() {
        let mut backend = MemoryKeyValueStore::new();
        backend
            .save(
                STORAGE_KEY_RECORDS,
                r#"[{"date":"2024-05-02","sleepTime":"","wakeTime":"","condition":5,"sleepQuality":5,"habits":[]},
                    {"date":"2024-05-01","sleepTime":"","wakeTime":"","condition":5,"sleepQuality":5,"habits":[]}]"#,
            )
            .unwrap();

        let store = PersistentRecordStore::open(backend).unwrap();
        assert_eq!(store.list()[0].date, "2024-05-01");
    }

    #[test]
    fn test_open_rejects_duplicate_dates() {
        let mut backend = MemoryKeyValueStore::new();
        let json = serde_json::to_string(&vec![record("2024-05-01", 5), record("2024-05-01", 6)])
            .unwrap();
        backend.save(STORAGE_KEY_RECORDS, &json).unwrap();

        let result = PersistentRecordStore::open(backend);
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_open_rejects_malformed_json() {
        let mut backend = MemoryKeyValueStore::new();
        backend.save(STORAGE_KEY_RECORDS, "{not json").unwrap();
        assert!(matches!(
            PersistentRecordStore::open(backend),
            Err(StoreError::JsonError(_))
        ));
    }

    #[test]
    fn test_clear_persists() {
        let mut store = PersistentRecordStore::open(MemoryKeyValueStore::new()).unwrap();
        for day in 1..=5 {
            store.upsert(record(&format!("2024-01-0{day}"), 5)).unwrap();
        }
        assert_eq!(store.len(), 5);

        store.clear().unwrap();
        assert!(store.is_empty());
        let reopened = PersistentRecordStore::open(store.into_backend()).unwrap();
        assert!(reopened.is_empty());
    }
}
