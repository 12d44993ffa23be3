// Snapshot store backed by a single JSON payload
//
// Mirrors the local-storage model of the original client: the payload is
// read once at open and written back in full on every change. The query
// engine only ever sees the in-memory snapshot.

use crate::command::{complete_task, reopen_task, CompletionOutcome};
use crate::model::Task;
use chrono::{DateTime, Utc};
use eyre::{eyre, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const PAYLOAD_FILE: &str = "tasks.json";

/// Persistent task collection with seed-dataset recovery.
pub struct Store {
    base_path: PathBuf,
    tasks: Vec<Task>,
}

impl Store {
    /// Open or create a store in a `.taskdeck` subdirectory of the given
    /// path, seeding with the built-in dataset when no usable payload exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_seed(path, crate::seed::default_tasks())
    }

    /// Open with an explicit fallback dataset.
    ///
    /// A corrupt payload is logged and replaced by the seed in memory; the
    /// file on disk is left untouched until the next change so nothing is
    /// clobbered silently.
    pub fn open_with_seed<P: AsRef<Path>>(path: P, seed: Vec<Task>) -> Result<Self> {
        let base_path = path.as_ref().join(".taskdeck");
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;

        let payload_path = base_path.join(PAYLOAD_FILE);
        let tasks = if payload_path.exists() {
            let raw = fs::read_to_string(&payload_path).context("Failed to read task payload")?;
            match serde_json::from_str::<Vec<Task>>(&raw) {
                Ok(tasks) => {
                    debug!(count = tasks.len(), "Loaded task payload");
                    tasks
                }
                Err(e) => {
                    warn!(path = ?payload_path, error = ?e, "Corrupt task payload, falling back to seed dataset");
                    seed
                }
            }
        } else {
            info!(path = ?payload_path, "No task payload found, seeding");
            let store = Self {
                base_path: base_path.clone(),
                tasks: seed,
            };
            store.persist()?;
            return Ok(store);
        };

        Ok(Self { base_path, tasks })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Current snapshot. Hand this to the query engine.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Swap in a whole new collection and persist it.
    pub fn replace(&mut self, tasks: Vec<Task>) -> Result<()> {
        self.tasks = tasks;
        self.persist()
    }

    /// Add a task and persist. Returns the task's id.
    pub fn insert(&mut self, task: Task) -> Result<String> {
        if task.id.trim().is_empty() {
            return Err(eyre!("Task id cannot be empty"));
        }
        let id = task.id.clone();
        self.tasks.push(task);
        self.persist()?;
        Ok(id)
    }

    /// Remove a task by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Complete a task, applying the update and any spawned recurrence
    /// sibling in one persisted step. Returns None for an unknown id.
    pub fn complete(&mut self, id: &str, now: DateTime<Utc>) -> Result<Option<CompletionOutcome>> {
        let Some(pos) = self.tasks.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let outcome = complete_task(&self.tasks[pos], now);
        self.tasks[pos] = outcome.updated.clone();
        if let Some(spawned) = &outcome.spawned {
            info!(original = id, spawned = %spawned.id, "Recurring task spawned next occurrence");
            self.tasks.push(spawned.clone());
        }
        self.persist()?;
        Ok(Some(outcome))
    }

    /// Reopen a done task. Returns whether the id was found.
    pub fn reopen(&mut self, id: &str) -> Result<bool> {
        let Some(pos) = self.tasks.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        self.tasks[pos] = reopen_task(&self.tasks[pos]);
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        let payload =
            serde_json::to_string_pretty(&self.tasks).context("Failed to serialize task payload")?;
        fs::write(self.base_path.join(PAYLOAD_FILE), payload)
            .context("Failed to write task payload")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::new_task;
    use crate::model::{Recurrence, RecurrenceKind, TaskStatus};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn ts(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_open_seeds_missing_payload() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path()).unwrap();

        assert!(temp.path().join(".taskdeck/tasks.json").exists());
        assert!(!store.tasks().is_empty());
    }

    #[test]
    fn test_insert_persists_across_reopen() {
        let temp = TempDir::new().unwrap();
        let now = ts(2024, 1, 1, 9);

        let mut store = Store::open_with_seed(temp.path(), Vec::new()).unwrap();
        let id = store.insert(new_task("Restock bar", now)).unwrap();
        drop(store);

        let store = Store::open_with_seed(temp.path(), Vec::new()).unwrap();
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.get(&id).unwrap().title, "Restock bar");
    }

    #[test]
    fn test_corrupt_payload_falls_back_to_seed() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".taskdeck");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("tasks.json"), "{not json").unwrap();

        let seed = vec![new_task("Seeded", ts(2024, 1, 1, 9))];
        let store = Store::open_with_seed(temp.path(), seed).unwrap();
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].title, "Seeded");
        // The broken file is only replaced once something changes
        assert_eq!(fs::read_to_string(dir.join("tasks.json")).unwrap(), "{not json");
    }

    #[test]
    fn test_remove() {
        let temp = TempDir::new().unwrap();
        let now = ts(2024, 1, 1, 9);
        let mut store = Store::open_with_seed(temp.path(), Vec::new()).unwrap();
        let id = store.insert(new_task("Short lived", now)).unwrap();

        assert!(store.remove(&id).unwrap());
        assert!(!store.remove(&id).unwrap());
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_insert_rejects_empty_id() {
        let temp = TempDir::new().unwrap();
        let mut store = Store::open_with_seed(temp.path(), Vec::new()).unwrap();
        let mut task = new_task("Bad id", ts(2024, 1, 1, 9));
        task.id = "  ".to_string();
        assert!(store.insert(task).is_err());
    }

    #[test]
    fn test_complete_applies_update_and_spawn_atomically() {
        let temp = TempDir::new().unwrap();
        let now = ts(2024, 1, 1, 12);
        let mut store = Store::open_with_seed(temp.path(), Vec::new()).unwrap();

        let mut task = new_task("Weekly deep clean", now);
        task.due_time = Some(ts(2024, 1, 1, 10));
        task.recurrence = Some(Recurrence::new(RecurrenceKind::Weekly, 1));
        let id = store.insert(task).unwrap();

        let outcome = store.complete(&id, now).unwrap().expect("known id");
        assert!(outcome.spawned.is_some());
        assert_eq!(store.tasks().len(), 2);
        assert_eq!(store.get(&id).unwrap().status, TaskStatus::Done);

        // Both records survive a reload
        let store = Store::open_with_seed(temp.path(), Vec::new()).unwrap();
        assert_eq!(store.tasks().len(), 2);

        // Unknown ids are not an error
        let mut store = store;
        assert!(store.complete("missing", now).unwrap().is_none());
    }

    #[test]
    fn test_reopen() {
        let temp = TempDir::new().unwrap();
        let now = ts(2024, 1, 1, 12);
        let mut store = Store::open_with_seed(temp.path(), Vec::new()).unwrap();
        let id = store.insert(new_task("Flip back", now)).unwrap();

        store.complete(&id, now).unwrap();
        assert!(store.reopen(&id).unwrap());
        assert_eq!(store.get(&id).unwrap().status, TaskStatus::Open);
        assert!(!store.reopen("missing").unwrap());
    }
}
