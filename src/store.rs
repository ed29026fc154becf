//! Store Module
//!
//! The shared keyed collection every command operates on.
//!
//! ## Responsibilities
//! - Own all city records, keyed by a positive integer
//! - Generate fresh keys without ever producing a duplicate
//! - Run each compound read-modify-write as one critical section
//! - Provide ordered views for `show` and `filter_starts_with_name`

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::config::KeyAllocation;
use crate::error::{CityError, Result};
use crate::model::{City, CityDraft, StandardOfLiving};

/// The in-memory city store
///
/// ## Concurrency Model: one coarse lock
///
/// Every public method takes `inner` exactly once and releases it before
/// returning, so a command never sees another command half-applied. Key
/// generation and replace-if-greater read and write under the same guard.
pub struct Store {
    /// Records and key bookkeeping (single mutex)
    inner: Mutex<Inner>,

    /// Key generation policy
    key_allocation: KeyAllocation,

    /// When this store was created
    initialized_at: DateTime<Utc>,
}

struct Inner {
    records: BTreeMap<i32, City>,

    /// Largest key ever stored, used by `KeyAllocation::Monotonic`
    high_water: i32,
}

/// Summary returned by `info`
#[derive(Debug, Clone, PartialEq)]
pub struct StoreInfo {
    pub collection_type: &'static str,
    pub initialized_at: DateTime<Utc>,
    pub count: usize,
}

impl fmt::Display for StoreInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Collection type: {}\nInitialized: {}\nElements: {}",
            self.collection_type,
            self.initialized_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.count
        )
    }
}

impl Inner {
    fn next_key(&self, policy: KeyAllocation) -> Result<i32> {
        let exhausted = || CityError::InvalidArgument("key space exhausted".to_string());
        match policy {
            KeyAllocation::SmallestFree => {
                let mut candidate: i32 = 1;
                for &key in self.records.keys() {
                    if key == candidate {
                        candidate = candidate.checked_add(1).ok_or_else(exhausted)?;
                    } else if key > candidate {
                        break;
                    }
                }
                Ok(candidate)
            }
            KeyAllocation::Monotonic => self.high_water.checked_add(1).ok_or_else(exhausted),
        }
    }

    fn insert(&mut self, city: City) {
        self.high_water = self.high_water.max(city.id);
        self.records.insert(city.id, city);
    }
}

impl Store {
    const COLLECTION_TYPE: &'static str = "BTreeMap<i32, City>";

    /// Create an empty store
    pub fn new(key_allocation: KeyAllocation) -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: BTreeMap::new(),
                high_water: 0,
            }),
            key_allocation,
            initialized_at: Utc::now(),
        }
    }

    /// Install fully formed records (snapshot bootstrap)
    ///
    /// Ids and creation dates are kept. Fails without changing the store if
    /// any record is invalid or any id is already taken.
    pub fn install(&self, cities: Vec<City>) -> Result<usize> {
        let mut inner = self.inner.lock();

        let mut seen = std::collections::BTreeSet::new();
        for city in &cities {
            city.validate()?;
            if inner.records.contains_key(&city.id) || !seen.insert(city.id) {
                return Err(CityError::DuplicateKey(city.id));
            }
        }

        let count = cities.len();
        for city in cities {
            inner.insert(city);
        }
        Ok(count)
    }

    // =========================================================================
    // Single-record operations
    // =========================================================================

    /// Add a record under `key`, or under a generated key when `None`
    ///
    /// Returns the key (which is also the city's id).
    pub fn add(&self, key: Option<i32>, draft: CityDraft) -> Result<i32> {
        draft.validate()?;

        let mut inner = self.inner.lock();
        let key = match key {
            Some(k) if k <= 0 => {
                return Err(CityError::InvalidArgument(format!(
                    "key must be positive, got {}",
                    k
                )))
            }
            Some(k) if inner.records.contains_key(&k) => return Err(CityError::DuplicateKey(k)),
            Some(k) => k,
            None => inner.next_key(self.key_allocation)?,
        };

        inner.insert(City::from_draft(key, Utc::now(), draft));
        Ok(key)
    }

    /// Get a copy of the record under `key`
    pub fn get(&self, key: i32) -> Option<City> {
        self.inner.lock().records.get(&key).cloned()
    }

    pub fn contains_key(&self, key: i32) -> bool {
        self.inner.lock().records.contains_key(&key)
    }

    /// Remove the record under `key`; false if there was none
    pub fn remove(&self, key: i32) -> bool {
        self.inner.lock().records.remove(&key).is_some()
    }

    /// Replace every field except id and creation date; false if `key` is absent
    pub fn update(&self, key: i32, draft: CityDraft) -> Result<bool> {
        draft.validate()?;

        let mut inner = self.inner.lock();
        match inner.records.get_mut(&key) {
            Some(city) => {
                city.apply(draft);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replace the record under `key` only if `candidate` ranks strictly higher
    ///
    /// Order: area, then population, then name. `Ok(false)` (no change) when
    /// the candidate is not greater; `CityError::NotFound` when `key` is absent.
    pub fn replace_if_greater(&self, key: i32, candidate: CityDraft) -> Result<bool> {
        candidate.validate()?;

        let mut inner = self.inner.lock();
        let current = inner
            .records
            .get_mut(&key)
            .ok_or(CityError::NotFound(key))?;
        if candidate.rank_cmp(current).is_gt() {
            current.apply(candidate);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // =========================================================================
    // Bulk operations
    // =========================================================================

    /// Remove every record whose key is greater than `key`
    pub fn remove_greater_key(&self, key: i32) -> usize {
        self.remove_where(|city| city.id > key)
    }

    /// Remove every record whose key is lower than `key`
    pub fn remove_lower_key(&self, key: i32) -> usize {
        self.remove_where(|city| city.id < key)
    }

    /// Remove every record with the given standard of living
    pub fn remove_all_by_standard_of_living(&self, value: StandardOfLiving) -> usize {
        self.remove_where(|city| city.standard_of_living == value)
    }

    fn remove_where<F: Fn(&City) -> bool>(&self, predicate: F) -> usize {
        let mut inner = self.inner.lock();
        let before = inner.records.len();
        inner.records.retain(|_, city| !predicate(city));
        before - inner.records.len()
    }

    /// Remove all records
    pub fn clear(&self) {
        self.inner.lock().records.clear();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Records whose name starts with `prefix` (case-sensitive), in sorted order
    pub fn filter_starts_with_name(&self, prefix: &str) -> Result<Vec<City>> {
        if prefix.is_empty() {
            return Err(CityError::InvalidArgument(
                "prefix must not be empty".to_string(),
            ));
        }
        if prefix.chars().any(char::is_whitespace) {
            return Err(CityError::InvalidArgument(format!(
                "prefix must be a single token, got '{}'",
                prefix
            )));
        }

        let mut matches: Vec<City> = {
            let inner = self.inner.lock();
            inner
                .records
                .values()
                .filter(|city| city.name.starts_with(prefix))
                .cloned()
                .collect()
        };
        matches.sort_by(City::rank_cmp);
        Ok(matches)
    }

    /// Mean height over all records; 0.0 for an empty store
    pub fn average_meters_above_sea_level(&self) -> f64 {
        self.height_summary().1
    }

    /// Record count and mean height, read under one lock
    pub fn height_summary(&self) -> (usize, f64) {
        let inner = self.inner.lock();
        let count = inner.records.len();
        if count == 0 {
            return (0, 0.0);
        }
        let total: f64 = inner
            .records
            .values()
            .map(|city| city.meters_above_sea_level)
            .sum();
        (count, total / count as f64)
    }

    /// All records ordered by area, population, name, id
    pub fn sorted_view(&self) -> Vec<City> {
        let mut cities: Vec<City> = self.inner.lock().records.values().cloned().collect();
        cities.sort_by(City::rank_cmp);
        cities
    }

    /// Collection summary
    pub fn info(&self) -> StoreInfo {
        StoreInfo {
            collection_type: Self::COLLECTION_TYPE,
            initialized_at: self.initialized_at,
            count: self.len(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys in ascending order
    pub fn keys(&self) -> Vec<i32> {
        self.inner.lock().records.keys().copied().collect()
    }

    pub fn key_allocation(&self) -> KeyAllocation {
        self.key_allocation
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(KeyAllocation::SmallestFree)
    }
}
