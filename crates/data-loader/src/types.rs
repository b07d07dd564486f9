//! Core domain types for rating data.
//!
//! This module defines the in-memory tables the recommender reads:
//! - Type aliases for domain clarity (UserId, ItemId, RatingValue)
//! - `RatingProfile` / `UserRatingTable` for who rated what
//! - `Catalog` for item metadata
//! - `ItemUserIndex`, the inverted item -> users view of a table
//!
//! Profiles and the table are `BTreeMap`s so iteration order is always
//! ascending by id. The similarity and scoring code sums floating point
//! values while walking these maps, and a fixed order keeps every sum
//! bit-for-bit reproducible between runs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a catalog item
pub type ItemId = u32;

/// A single rating value. Conventionally 0.5 - 5.0 in half steps, but any
/// positive real is accepted.
pub type RatingValue = f64;

/// One user's ratings: item id -> rating
pub type RatingProfile = BTreeMap<ItemId, RatingValue>;

// =============================================================================
// UserRatingTable
// =============================================================================

/// All known ratings, keyed by user.
///
/// Every mutation bumps `generation`. An [`ItemUserIndex`] remembers the
/// generation it was built from, which is how a stale index is detected.
#[derive(Debug, Clone, Default)]
pub struct UserRatingTable {
    pub(crate) profiles: BTreeMap<UserId, RatingProfile>,
    pub(crate) generation: u64,
}

impl UserRatingTable {
    /// Creates a new, empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a user's profile
    ///
    /// Returns `None` for unknown users; callers that require the user to
    /// exist turn that into a lookup error.
    pub fn profile(&self, user_id: UserId) -> Option<&RatingProfile> {
        self.profiles.get(&user_id)
    }

    /// Get a single rating
    pub fn rating(&self, user_id: UserId, item_id: ItemId) -> Option<RatingValue> {
        self.profiles.get(&user_id)?.get(&item_id).copied()
    }

    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.profiles.contains_key(&user_id)
    }

    /// Iterate over (user, profile) pairs in ascending user order
    pub fn iter(&self) -> impl Iterator<Item = (UserId, &RatingProfile)> {
        self.profiles.iter().map(|(&user_id, profile)| (user_id, profile))
    }

    /// All user ids, ascending
    pub fn user_ids(&self) -> Vec<UserId> {
        self.profiles.keys().copied().collect()
    }

    /// Number of users
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Total number of (user, item) ratings
    pub fn rating_count(&self) -> usize {
        self.profiles.values().map(|p| p.len()).sum()
    }

    /// Current mutation generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Insert or overwrite a single rating
    pub fn insert_rating(&mut self, user_id: UserId, item_id: ItemId, rating: RatingValue) {
        self.profiles
            .entry(user_id)
            .or_default()
            .insert(item_id, rating);
        self.generation += 1;
    }

    /// Insert (or replace) a user's whole profile
    pub fn insert_profile(&mut self, user_id: UserId, profile: RatingProfile) {
        self.profiles.insert(user_id, profile);
        self.generation += 1;
    }
}

/// Two tables are equal when they hold the same ratings. The generation is
/// bookkeeping and does not take part in the comparison.
impl PartialEq for UserRatingTable {
    fn eq(&self, other: &Self) -> bool {
        self.profiles == other.profiles
    }
}

impl FromIterator<(UserId, RatingProfile)> for UserRatingTable {
    fn from_iter<I: IntoIterator<Item = (UserId, RatingProfile)>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
            generation: 0,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Metadata for one catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: ItemId,
    /// Display name, e.g. "Deadpool"
    pub name: String,
    /// Category tags, e.g. ["Action", "Comedy"]. May be empty.
    pub tags: Vec<String>,
}

/// The set of known items and their metadata
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub(crate) entries: HashMap<ItemId, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an item by ID
    pub fn get(&self, id: ItemId) -> Option<&CatalogEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Insert an entry, replacing any previous entry with the same id
    pub fn insert(&mut self, entry: CatalogEntry) {
        self.entries.insert(entry.id, entry);
    }

    /// The key set used to sanitize a rating table
    pub fn item_ids(&self) -> HashSet<ItemId> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// ItemUserIndex
// =============================================================================

/// Inverted view of a [`UserRatingTable`]: item id -> users who rated it.
///
/// Each user list is ascending and duplicate free. The index is a snapshot;
/// it is never updated in place, so any mutation of the source table makes
/// it stale (see [`ItemUserIndex::is_current_for`]).
#[derive(Debug, Clone, Default)]
pub struct ItemUserIndex {
    pub(crate) users_by_item: HashMap<ItemId, Vec<UserId>>,
    pub(crate) generation: u64,
}

impl ItemUserIndex {
    /// Users who rated `item_id`, ascending. Empty for unknown items.
    pub fn users_who_rated(&self, item_id: ItemId) -> &[UserId] {
        self.users_by_item
            .get(&item_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of users (any rating) who rated `item_id`
    pub fn popularity(&self, item_id: ItemId) -> usize {
        self.users_who_rated(item_id).len()
    }

    pub fn contains_item(&self, item_id: ItemId) -> bool {
        self.users_by_item.contains_key(&item_id)
    }

    /// Number of distinct items
    pub fn len(&self) -> usize {
        self.users_by_item.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users_by_item.is_empty()
    }

    /// Generation of the table this index was built from
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True if `table` has not been mutated since this index was built
    pub fn is_current_for(&self, table: &UserRatingTable) -> bool {
        self.generation == table.generation
    }

    /// Sorted copy of the whole mapping, handy for comparisons and display
    pub fn to_sorted_map(&self) -> BTreeMap<ItemId, Vec<UserId>> {
        self.users_by_item
            .iter()
            .map(|(&item_id, users)| (item_id, users.clone()))
            .collect()
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// A loaded, sanitized catalog plus rating table
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub catalog: Catalog,
    pub ratings: UserRatingTable,
}

/// What a sanitize pass removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub removed_ratings: usize,
    pub removed_users: usize,
}

impl SanitizeReport {
    pub fn is_noop(&self) -> bool {
        self.removed_ratings == 0 && self.removed_users == 0
    }
}
