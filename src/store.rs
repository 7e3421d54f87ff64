// Task store: owns the task collection and persists it to a key-value store

use crate::confirm::Confirm;
use crate::filter::Filter;
use crate::kv::KeyValueStore;
use crate::models::{DEFAULT_CATEGORY, Priority, Stats, Task, TaskDetails, TaskId, now_ms};
use chrono::Utc;
use eyre::{Context, Result, eyre};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Key holding the serialized task collection
pub const TASKS_KEY: &str = "tasks";

/// Key where unreadable task data is moved aside on load
pub const CORRUPT_TASKS_KEY: &str = "tasks.corrupt";

pub const CLEAR_ALL_PROMPT: &str = "Are you sure you want to delete all tasks?";

/// Notification sent to subscribers after a successful mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added(TaskId),
    Toggled { id: TaskId, toggle: Toggle },
    Edited(TaskId),
    Deleted(TaskId),
    Cleared { removed: usize },
}

/// Result of flipping a task's completion flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    /// New value of the task's `completed` flag
    pub completed: bool,
    /// True when the completed count went from zero to one
    pub first_completion: bool,
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Field values given to tasks created with `add`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub priority: Priority,
    pub category: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            priority: Priority::default(),
            category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

/// Hands out increasing ids, never below the current time in milliseconds
#[derive(Debug, Clone)]
struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    fn seeded<'a>(existing: impl IntoIterator<Item = &'a Task>) -> Self {
        let last = existing.into_iter().map(|t| t.id.0).max().unwrap_or(0);
        Self { last }
    }

    fn next(&mut self) -> Result<TaskId> {
        let after_last = self
            .last
            .checked_add(1)
            .ok_or_else(|| eyre!("Task ids exhausted (last id is {})", self.last))?;
        self.last = now_ms().max(after_last);
        Ok(TaskId(self.last))
    }
}

/// Ordered, persistent task collection (newest first)
pub struct TaskStore<S: KeyValueStore> {
    kv: S,
    tasks: Vec<Task>,
    ids: IdGenerator,
    defaults: Defaults,
    listeners: Vec<Listener>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Open the store, loading any previously saved tasks
    pub fn open(kv: S) -> Result<Self> {
        Self::open_with_defaults(kv, Defaults::default())
    }

    /// Open the store, using `defaults` for tasks created with `add`
    pub fn open_with_defaults(mut kv: S, defaults: Defaults) -> Result<Self> {
        let tasks = Self::load(&mut kv)?;
        let ids = IdGenerator::seeded(&tasks);

        info!(count = tasks.len(), "Loaded tasks");

        Ok(Self {
            kv,
            tasks,
            ids,
            defaults,
            listeners: Vec::new(),
        })
    }

    /// Get a reference to the backing key-value store
    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Consume the store, returning the backing key-value store
    pub fn into_inner(self) -> S {
        self.kv
    }

    /// All tasks, newest first
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Register a listener called after every successful mutation
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a task with default details. Blank text is ignored.
    pub fn add(&mut self, text: &str) -> Result<Option<TaskId>> {
        let details = TaskDetails::new(text)
            .with_priority(self.defaults.priority)
            .with_category(self.defaults.category.clone());
        self.add_with_details(details)
    }

    /// Add a task with the given details. Blank text is ignored.
    pub fn add_with_details(&mut self, details: TaskDetails) -> Result<Option<TaskId>> {
        if details.text.trim().is_empty() {
            debug!("add: blank text, ignoring");
            return Ok(None);
        }

        let mut ids = self.ids.clone();
        let id = ids.next()?;

        let Some(task) = Task::new(id, details, Utc::now()) else {
            debug!("add: blank text, ignoring");
            return Ok(None);
        };

        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(task);
        next.extend(self.tasks.iter().cloned());

        self.commit(next)?;
        self.ids = ids;

        info!(%id, "Added task");
        self.emit(StoreEvent::Added(id));
        Ok(Some(id))
    }

    /// Flip a task's completion flag. Unknown ids are ignored.
    pub fn toggle_complete(&mut self, id: TaskId) -> Result<Option<Toggle>> {
        let Some(index) = self.position(id) else {
            debug!(%id, "toggle_complete: no such task");
            return Ok(None);
        };

        let completed_before = self.completed_count();

        let mut next = self.tasks.clone();
        next[index].completed = !next[index].completed;
        let completed = next[index].completed;

        self.commit(next)?;

        let toggle = Toggle {
            completed,
            first_completion: completed && completed_before == 0,
        };

        info!(%id, completed, "Toggled task");
        self.emit(StoreEvent::Toggled { id, toggle });
        Ok(Some(toggle))
    }

    /// Remove a task. Returns false if there was no such task.
    pub fn delete(&mut self, id: TaskId) -> Result<bool> {
        if self.position(id).is_none() {
            debug!(%id, "delete: no such task");
            return Ok(false);
        }

        let next = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        self.commit(next)?;

        info!(%id, "Deleted task");
        self.emit(StoreEvent::Deleted(id));
        Ok(true)
    }

    /// Remove every task after the user confirms.
    ///
    /// An empty store returns false without prompting.
    pub fn clear_all<C: Confirm + ?Sized>(&mut self, confirm: &mut C) -> Result<bool> {
        if self.tasks.is_empty() {
            debug!("clear_all: nothing to clear");
            return Ok(false);
        }

        if !confirm.confirm(CLEAR_ALL_PROMPT) {
            debug!("clear_all: declined");
            return Ok(false);
        }

        let removed = self.tasks.len();
        self.commit(Vec::new())?;

        info!(removed, "Cleared all tasks");
        self.emit(StoreEvent::Cleared { removed });
        Ok(true)
    }

    /// Replace a task's editable fields.
    ///
    /// Returns false, without saving, if the text is blank or the id is unknown.
    pub fn edit(&mut self, id: TaskId, details: TaskDetails) -> Result<bool> {
        let Some(details) = details.normalized() else {
            debug!(%id, "edit: blank text, ignoring");
            return Ok(false);
        };

        let Some(index) = self.position(id) else {
            debug!(%id, "edit: no such task");
            return Ok(false);
        };

        let mut next = self.tasks.clone();
        next[index].apply(details);
        self.commit(next)?;

        info!(%id, "Edited task");
        self.emit(StoreEvent::Edited(id));
        Ok(true)
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Tasks matching `filter`, newest first. The iterator can be cloned to restart.
    pub fn filtered_view(&self, filter: Filter) -> impl Iterator<Item = &Task> + Clone + '_ {
        self.tasks.iter().filter(move |t| filter.matches(t))
    }

    pub fn stats(&self) -> Stats {
        Stats::from_counts(self.tasks.len(), self.completed_count())
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Persist `next`, then make it the current collection
    fn commit(&mut self, next: Vec<Task>) -> Result<()> {
        let json = serde_json::to_string(&next).context("Failed to serialize tasks")?;
        self.kv.set(TASKS_KEY, &json).context("Failed to save tasks")?;
        self.tasks = next;
        Ok(())
    }

    fn emit(&mut self, event: StoreEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    /// Read the saved collection.
    ///
    /// Unparseable entries and repeated ids are skipped with a warning, after
    /// the raw value is backed up. If the stored value is not a list at all, it
    /// is moved to a backup key and the store starts empty.
    fn load(kv: &mut S) -> Result<Vec<Task>> {
        let Some(raw) = kv.get(TASKS_KEY).context("Failed to read tasks")? else {
            debug!("No saved tasks");
            return Ok(Vec::new());
        };

        let entries: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(Value::Array(entries)) => entries,
            Ok(Value::Null) => return Ok(Vec::new()),
            Ok(_) | Err(_) => {
                let backup = Self::back_up(kv, &raw)?;
                warn!(
                    key = TASKS_KEY,
                    backup = %backup,
                    "Saved tasks are not a list, moving them aside and starting empty"
                );
                kv.remove(TASKS_KEY)?;
                return Ok(Vec::new());
            }
        };

        let mut seen = HashSet::new();
        let mut tasks = Vec::with_capacity(entries.len());
        let mut skipped = 0;

        for (index, entry) in entries.into_iter().enumerate() {
            let task: Task = match serde_json::from_value(entry) {
                Ok(t) => t,
                Err(e) => {
                    warn!(index, error = ?e, "Failed to parse task, skipping");
                    skipped += 1;
                    continue;
                }
            };

            if !seen.insert(task.id) {
                warn!(index, id = %task.id, "Duplicate task id, skipping");
                skipped += 1;
                continue;
            }

            tasks.push(task);
        }

        // The next save drops skipped entries, so keep the original around
        if skipped > 0 {
            let backup = Self::back_up(kv, &raw)?;
            warn!(skipped, backup = %backup, "Backed up saved tasks before dropping entries");
        }

        Ok(tasks)
    }

    /// Copy `raw` to a free backup key and return the key used.
    ///
    /// Earlier backups are never overwritten. A backup already holding `raw`
    /// is reused.
    fn back_up(kv: &mut S, raw: &str) -> Result<String> {
        let mut key = CORRUPT_TASKS_KEY.to_string();
        let stamp = now_ms();
        let mut attempt = 0u32;

        while let Some(existing) = kv.get(&key)? {
            if existing == raw {
                return Ok(key);
            }
            attempt += 1;
            key = if attempt == 1 {
                format!("{}.{}", CORRUPT_TASKS_KEY, stamp)
            } else {
                format!("{}.{}-{}", CORRUPT_TASKS_KEY, stamp, attempt)
            };
        }

        kv.set(&key, raw).context("Failed to back up unreadable tasks")?;
        Ok(key)
    }
}
