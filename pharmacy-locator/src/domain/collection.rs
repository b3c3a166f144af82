//! Session-scoped pharmacy list and enrichment claims.
//!
//! The collection only grows. Entries are never removed once shown, and the
//! only in-place mutation is replacing an entry's hours and open flag.

use std::collections::HashSet;

use chrono::NaiveDateTime;

use super::operating_hours::OperatingHours;
use super::pharmacy::{Pharmacy, PharmacyKey};

/// Ordered, append-only pharmacy list plus the loaded-keys set.
#[derive(Debug, Clone, Default)]
pub struct PharmacyCollection {
    entries: Vec<Pharmacy>,
    loaded_keys: HashSet<PharmacyKey>,
}

impl PharmacyCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[Pharmacy] {
        &self.entries
    }

    /// Number of stored pharmacies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry with the same identity as `pharmacy` exists.
    pub fn contains(&self, pharmacy: &Pharmacy) -> bool {
        self.entries
            .iter()
            .any(|existing| existing.same_identity(pharmacy))
    }

    /// Whether `key` has already been claimed for enrichment.
    pub fn is_loaded(&self, key: &PharmacyKey) -> bool {
        self.loaded_keys.contains(key)
    }

    /// Number of keys claimed for enrichment.
    pub fn loaded_count(&self) -> usize {
        self.loaded_keys.len()
    }

    /// Append every pharmacy in `batch` whose identity is not already present.
    ///
    /// Arrival order is preserved. Repeats inside the batch are dropped as
    /// well, so merging the same batch twice leaves the collection unchanged.
    /// Returns the pharmacies that were appended.
    ///
    /// # Examples
    /// ```
    /// use pharmacy_locator::domain::{Pharmacy, PharmacyCollection};
    ///
    /// let batch = vec![Pharmacy::new("A약국", "서울 중구 명동", 37.5, 126.9)];
    /// let mut collection = PharmacyCollection::new();
    /// assert_eq!(collection.merge(batch.clone()).len(), 1);
    /// assert!(collection.merge(batch).is_empty());
    /// assert_eq!(collection.len(), 1);
    /// ```
    pub fn merge(&mut self, batch: Vec<Pharmacy>) -> Vec<Pharmacy> {
        let mut added = Vec::new();
        for pharmacy in batch {
            if self.contains(&pharmacy) {
                continue;
            }
            added.push(pharmacy.clone());
            self.entries.push(pharmacy);
        }
        added
    }

    /// Claim enrichment for candidates that have no hours, an address region
    /// and no prior claim.
    ///
    /// Claimed keys are recorded before any request is dispatched and are
    /// never released, so each identity is enriched at most once per session
    /// even when the attempt fails. Pharmacies whose address yields fewer
    /// than two tokens stay listed without hours and are never claimed.
    pub fn claim_for_enrichment(&mut self, candidates: &[Pharmacy]) -> Vec<Pharmacy> {
        candidates
            .iter()
            .filter(|pharmacy| pharmacy.operating_hours.is_empty())
            .filter(|pharmacy| pharmacy.address_region().is_some())
            .filter(|pharmacy| self.loaded_keys.insert(pharmacy.key()))
            .cloned()
            .collect()
    }

    /// Overwrite the hours of the first entry named `name` and re-evaluate
    /// its open flag at `now`.
    ///
    /// Returns `false` when no entry has that name.
    pub fn apply_hours(&mut self, name: &str, hours: OperatingHours, now: NaiveDateTime) -> bool {
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => {
                entry.apply_hours(hours, now);
                true
            }
            None => false,
        }
    }

    /// Re-evaluate every open flag at `now`; returns how many changed.
    pub fn refresh_open_status(&mut self, now: NaiveDateTime) -> usize {
        self.entries
            .iter_mut()
            .map(|entry| entry.refresh_open_status(now))
            .filter(|changed| *changed)
            .count()
    }
}
