//! Index building and table maintenance.
//!
//! - `invert` builds the item -> users index from a rating table
//! - `sanitize` prunes ratings for items missing from the catalog
//! - `Dataset::load_from_files` ties parsing and sanitizing together

use crate::error::Result;
use crate::parser;
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Build the item -> users index for `table`.
///
/// User lists come out ascending. Because the table is keyed by a
/// `BTreeMap` users are already visited in order, but the lists are sorted
/// and deduplicated anyway so the guarantee does not hinge on that.
pub fn invert(table: &UserRatingTable) -> ItemUserIndex {
    let mut users_by_item: HashMap<ItemId, Vec<UserId>> = HashMap::new();

    for (user_id, profile) in table.iter() {
        for &item_id in profile.keys() {
            users_by_item.entry(item_id).or_default().push(user_id);
        }
    }

    for users in users_by_item.values_mut() {
        users.sort_unstable();
        users.dedup();
    }

    ItemUserIndex {
        users_by_item,
        generation: table.generation,
    }
}

impl ItemUserIndex {
    /// Same as [`invert`]
    pub fn build(table: &UserRatingTable) -> Self {
        invert(table)
    }
}

/// Remove every rating whose item is not in `known_items`, then every user
/// left with an empty profile.
///
/// Removals are collected first and applied afterwards. Running it a second
/// time with the same item set changes nothing.
pub fn sanitize(table: &mut UserRatingTable, known_items: &HashSet<ItemId>) -> SanitizeReport {
    let unknown: Vec<(UserId, ItemId)> = table
        .profiles
        .iter()
        .flat_map(|(&user_id, profile)| {
            profile
                .keys()
                .filter(move |item_id| !known_items.contains(*item_id))
                .map(move |&item_id| (user_id, item_id))
        })
        .collect();

    for &(user_id, item_id) in &unknown {
        if let Some(profile) = table.profiles.get_mut(&user_id) {
            profile.remove(&item_id);
        }
    }

    let empty_users: Vec<UserId> = table
        .profiles
        .iter()
        .filter(|(_, profile)| profile.is_empty())
        .map(|(&user_id, _)| user_id)
        .collect();

    for user_id in &empty_users {
        table.profiles.remove(user_id);
    }

    let report = SanitizeReport {
        removed_ratings: unknown.len(),
        removed_users: empty_users.len(),
    };
    if !report.is_noop() {
        table.generation += 1;
    }

    debug!(
        "Sanitized rating table: removed {} ratings and {} users",
        report.removed_ratings, report.removed_users
    );
    report
}

impl UserRatingTable {
    /// Method form of [`sanitize`]
    pub fn sanitize(&mut self, known_items: &HashSet<ItemId>) -> SanitizeReport {
        sanitize(self, known_items)
    }
}

impl Dataset {
    /// Load a catalog and a ratings file, then sanitize the ratings so that
    /// only catalog items remain.
    ///
    /// The two files are parsed in parallel with `rayon::join`.
    pub fn load_from_files(catalog_path: &Path, ratings_path: &Path) -> Result<Self> {
        info!(
            "Loading catalog from {:?} and ratings from {:?}",
            catalog_path, ratings_path
        );

        let (catalog, ratings) = rayon::join(
            || parser::parse_catalog(catalog_path),
            || parser::parse_ratings(ratings_path),
        );
        let catalog = catalog?;
        let mut ratings = ratings?;

        info!(
            "Loaded {} items, {} users, {} ratings",
            catalog.len(),
            ratings.len(),
            ratings.rating_count()
        );

        let report = ratings.sanitize(&catalog.item_ids());
        if !report.is_noop() {
            info!(
                "Dropped {} ratings for unknown items and {} users with no ratings left",
                report.removed_ratings, report.removed_users
            );
        }

        Ok(Self { catalog, ratings })
    }
}
