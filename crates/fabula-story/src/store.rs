//! Keyed storage for story entries

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use indexmap::IndexMap;
use tokio::time::Instant;

use crate::model::{StoryRequest, StoryState};

/// Process-lifetime storage for story entries
///
/// Every operation is total: absence is an expected outcome, never an error.
pub trait StoryStore: Send + Sync {
    /// Insert an entry under its key, replacing any previous entry
    fn put(&self, entry: StoryRequest);

    /// Look up an entry without removing it
    fn get(&self, key: &str) -> Option<StoryRequest>;

    /// Remove an entry, returning whether one existed
    fn delete(&self, key: &str) -> bool;

    /// Atomically remove and return a settled entry
    ///
    /// A `Preparing` entry is returned as a copy and stays in the store.
    fn take_settled(&self, key: &str) -> Option<StoryRequest>;

    /// Move a `Preparing` entry to its final state
    ///
    /// Applies only to the entry whose `generation` matches, so a task
    /// started for a replaced entry cannot settle its successor. Returns
    /// `false`, leaving the store untouched, if the entry is gone, was
    /// replaced, is already settled, or `state` is itself `Preparing`.
    fn settle(&self, key: &str, generation: u64, state: StoryState, now: Instant) -> bool;

    /// Drop entries beyond the age and capacity bounds, returning how many were removed
    fn evict(&self, now: Instant) -> usize;

    /// Number of entries currently held
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store bounded by entry count and entry age
#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<IndexMap<String, StoryRequest>>,
    capacity: usize,
    max_age: Duration,
    pending_max_age: Duration,
}

impl MemoryStore {
    pub fn new(capacity: usize, max_age: Duration) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            capacity: capacity.max(1),
            max_age,
            pending_max_age: max_age,
        }
    }

    /// Keep `Preparing` entries for at least `budget`, the longest a
    /// generation with all its retries can run
    #[must_use]
    pub fn with_generation_budget(mut self, budget: Duration) -> Self {
        self.pending_max_age = self.max_age.max(budget);
        self
    }

    // The map stays consistent even if a holder panicked, so poisoning is ignored
    fn entries(&self) -> MutexGuard<'_, IndexMap<String, StoryRequest>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StoryStore for MemoryStore {
    fn put(&self, entry: StoryRequest) {
        let mut entries = self.entries();
        // Re-inserting moves the key to the back so insertion order tracks recency
        entries.shift_remove(&entry.key);
        entries.insert(entry.key.clone(), entry);
    }

    fn get(&self, key: &str) -> Option<StoryRequest> {
        self.entries().get(key).cloned()
    }

    fn delete(&self, key: &str) -> bool {
        self.entries().shift_remove(key).is_some()
    }

    fn take_settled(&self, key: &str) -> Option<StoryRequest> {
        let mut entries = self.entries();
        match entries.get(key) {
            Some(entry) if entry.is_settled() => entries.shift_remove(key),
            Some(entry) => Some(entry.clone()),
            None => None,
        }
    }

    fn settle(&self, key: &str, generation: u64, state: StoryState, now: Instant) -> bool {
        if matches!(state, StoryState::Preparing) {
            return false;
        }

        let mut entries = self.entries();
        match entries.get_mut(key) {
            Some(entry) if entry.generation == generation && !entry.is_settled() => {
                entry.state = state;
                entry.created_at = now;
                true
            }
            _ => false,
        }
    }

    fn evict(&self, now: Instant) -> usize {
        let mut entries = self.entries();
        let before = entries.len();

        entries.retain(|_, entry| {
            let max_age = if entry.is_settled() { self.max_age } else { self.pending_max_age };
            entry.elapsed(now) < max_age
        });

        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;

            // Stable sort keeps insertion order among entries created at the same instant
            let mut by_age: Vec<(Instant, String)> = entries
                .iter()
                .map(|(key, entry)| (entry.created_at, key.clone()))
                .collect();
            by_age.sort_by_key(|(created_at, _)| *created_at);

            for (_, key) in by_age.into_iter().take(excess) {
                entries.shift_remove(&key);
            }
        }

        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = entries.len(), "story store evicted entries");
        }
        evicted
    }

    fn len(&self) -> usize {
        self.entries().len()
    }
}
