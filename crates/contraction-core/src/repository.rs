//! The canonical, persisted contraction list.
//!
//! The list is kept newest-first by start time. Every mutation re-sorts and
//! writes through to the [`PersistentStore`]; a failed write leaves the
//! in-memory list updated.
//!
//! Until [`ContractionRepository::hydrate`] has run, the stored list is
//! unknown. Mutations in that window stay in memory and are merged into the
//! stored list on hydration, so they never overwrite recorded history.

use chrono::{DateTime, Utc};

use crate::contraction::{sort_descending, Contraction, ContractionEdit};
use crate::storage::{PersistentStore, Store};

pub struct ContractionRepository<S> {
    store: PersistentStore<S>,
    key: String,
    contractions: Vec<Contraction>,
}

impl<S: Store> ContractionRepository<S> {
    /// An empty, not-yet-hydrated repository persisting under `key`.
    pub fn new(backend: S, key: impl Into<String>) -> Self {
        Self {
            store: PersistentStore::new(backend),
            key: key.into(),
            contractions: Vec::new(),
        }
    }

    /// Load the stored list. Missing or malformed data yields an empty list.
    ///
    /// Records added before hydration are merged in (replacing a stored
    /// record with the same id) and the merged list is written back.
    pub fn hydrate(&mut self) {
        let stored: Vec<Contraction> = self.store.hydrate(&self.key, Vec::new());
        let pending = std::mem::take(&mut self.contractions);
        let merged = !pending.is_empty();
        let mut list: Vec<Contraction> = stored
            .into_iter()
            .filter(|c| pending.iter().all(|p| p.id() != c.id()))
            .collect();
        list.extend(pending);
        self.replace(list);
        if merged {
            self.persist();
        }
        tracing::debug!(count = self.contractions.len(), merged, "contractions loaded");
    }

    pub fn is_hydrated(&self) -> bool {
        self.store.is_hydrated()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Ordered snapshot, newest first.
    pub fn list(&self) -> &[Contraction] {
        &self.contractions
    }

    pub fn get(&self, id: &str) -> Option<&Contraction> {
        self.contractions.iter().find(|c| c.id() == id)
    }

    pub fn len(&self) -> usize {
        self.contractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contractions.is_empty()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Record a manually entered contraction. Overlaps are not checked.
    pub fn add(&mut self, start_time: DateTime<Utc>, end_time: Option<DateTime<Utc>>) -> Contraction {
        let contraction = Contraction::new(start_time, end_time);
        self.insert(contraction.clone());
        contraction
    }

    /// Commit an already-built contraction.
    pub fn insert(&mut self, contraction: Contraction) {
        self.contractions.push(contraction);
        sort_descending(&mut self.contractions);
        self.persist();
    }

    /// Remove by id. Returns `false` (and writes nothing) when absent.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.contractions.len();
        self.contractions.retain(|c| c.id() != id);
        if self.contractions.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Replace the times of `id`, recomputing its duration. `None` when absent.
    pub fn edit(&mut self, id: &str, edit: ContractionEdit) -> Option<Contraction> {
        let target = self.contractions.iter_mut().find(|c| c.id() == id)?;
        target.apply(edit);
        let updated = target.clone();
        sort_descending(&mut self.contractions);
        self.persist();
        Some(updated)
    }

    /// Empty the list. Returns how many were removed.
    ///
    /// Clearing is written even before hydration: the stored history is
    /// discarded along with the in-memory list.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.contractions.len();
        self.contractions.clear();
        self.store.write(&self.key, &self.contractions);
        removed
    }

    // ── Storage access ───────────────────────────────────────────────

    pub fn store(&self) -> &PersistentStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PersistentStore<S> {
        &mut self.store
    }

    fn replace(&mut self, stored: Vec<Contraction>) {
        self.contractions = stored.into_iter().map(Contraction::normalized).collect();
        sort_descending(&mut self.contractions);
    }

    fn persist(&mut self) {
        if !self.store.is_hydrated() {
            tracing::debug!("write held until hydration");
            return;
        }
        self.store.write(&self.key, &self.contractions);
    }
}
