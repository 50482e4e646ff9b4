use super::HabitStore;
use crate::error::StoreError;
use crate::storage::{KeyValueStore, STORAGE_KEY_HABITS};
use crate::types::{Habit, HabitType};
use log::{debug, info};
use std::collections::HashSet;
use uuid::Uuid;

/// Habit store persisted as a single JSON array under [`STORAGE_KEY_HABITS`]
#[derive(Debug)]
pub struct PersistentHabitStore<B: KeyValueStore> {
    backend: B,
    habits: Vec<Habit>,
}

impl<B: KeyValueStore> PersistentHabitStore<B> {
    pub fn open(backend: B) -> Result<Self, StoreError> {
        let habits: Vec<Habit> = match backend.load(STORAGE_KEY_HABITS)? {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };

        let mut ids = HashSet::with_capacity(habits.len());
        for habit in &habits {
            habit.validate().map_err(|e| corrupt(e.to_string()))?;
            if !ids.insert(habit.id.as_str()) {
                return Err(corrupt(format!("duplicate habit id {}", habit.id)));
            }
        }

        debug!("event=habits_loaded count={}", habits.len());
        Ok(Self { backend, habits })
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    fn persist(&mut self, habits: &[Habit]) -> Result<(), StoreError> {
        let json = serde_json::to_string(habits)?;
        self.backend.save(STORAGE_KEY_HABITS, &json)
    }
}

impl<B: KeyValueStore> HabitStore for PersistentHabitStore<B> {
    fn list(&self) -> &[Habit] {
        &self.habits
    }

    fn get(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    fn add(&mut self, name: &str, habit_type: HabitType) -> Result<Habit, StoreError> {
        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            habit_type,
        };
        habit.validate()?;

        let mut next = self.habits.clone();
        next.push(habit.clone());
        self.persist(&next)?;
        self.habits = next;

        info!("event=habit_added id={} type={}", habit.id, habit.habit_type);
        Ok(habit)
    }

    fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.get(id).is_none() {
            return Ok(false);
        }

        let next: Vec<Habit> = self.habits.iter().filter(|h| h.id != id).cloned().collect();
        self.persist(&next)?;
        self.habits = next;

        info!("event=habit_removed id={id}");
        Ok(true)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.remove(STORAGE_KEY_HABITS)?;
        info!("event=habits_cleared count={}", self.habits.len());
        self.habits.clear();
        Ok(())
    }
}

fn corrupt(reason: String) -> StoreError {
    StoreError::Corrupt {
        key: STORAGE_KEY_HABITS.to_string(),
        reason,
    }
}
