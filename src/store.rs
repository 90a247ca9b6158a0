use crate::state::TrackedEntityState;
use serde::Serialize;
use std::{collections::HashMap, fmt};

/// Stable identifier of one tracked subject across frames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new<S>(id: S) -> Self
    where
        S: Into<String>,
    {
        Self(id.into())
    }

    /// Identity derived from a detection's position within its batch.
    ///
    /// Only stable while the upstream detector keeps emitting detections in
    /// the same order.
    pub fn from_index(index: usize) -> Self {
        Self(format!("prediction_{}", index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
struct Entry {
    state: TrackedEntityState,
    last_seen: u64,
}

/// Registry owning one repetition state machine per tracked entity.
#[derive(Debug, Default)]
pub struct StateStore {
    entries: HashMap<EntityId, Entry>,
    clock: u64,
}

impl StateStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Return the state for `id`, inserting a fresh one if it has never been seen.
    pub fn get_or_create(&mut self, id: EntityId) -> &mut TrackedEntityState {
        let clock = self.clock;
        let entry = self.entries.entry(id).or_insert_with(|| Entry {
            state: TrackedEntityState::default(),
            last_seen: clock,
        });
        entry.last_seen = clock;
        &mut entry.state
    }

    pub fn get(&self, id: &EntityId) -> Option<TrackedEntityState> {
        self.entries.get(id).map(|entry| entry.state)
    }

    /// Reinitialize one entity, or clear the whole store when `id` is `None`.
    ///
    /// Resetting an id that was never seen does nothing.
    pub fn reset(&mut self, id: Option<&EntityId>) {
        match id {
            Some(id) => {
                if let Some(entry) = self.entries.get_mut(id) {
                    tracing::info!(entity = %id, "resetting entity state");
                    entry.state = TrackedEntityState::default();
                }
            }
            None => {
                tracing::info!(entities = self.entries.len(), "clearing state store");
                self.entries.clear();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &TrackedEntityState)> {
        self.entries.iter().map(|(id, entry)| (id, &entry.state))
    }

    /// Advance the logical frame clock used for idle eviction.
    pub fn tick(&mut self) {
        self.clock += 1;
    }

    /// Drop entities not touched by [`get_or_create`](Self::get_or_create) for
    /// more than `max_idle` ticks. Returns how many were removed.
    pub fn evict_idle(&mut self, max_idle: u64) -> usize {
        let clock = self.clock;
        let before = self.entries.len();
        self.entries.retain(|_, entry| clock.saturating_sub(entry.last_seen) <= max_idle);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = self.entries.len(), "evicted idle entities");
        }
        evicted
    }
}
