//! Session catalog of shopping lists and fuzzy lookup by spoken name.
//!
//! The catalog is loaded once from the store and never changes afterwards;
//! [`crate::skill::Skill::reload_catalog`] swaps in a fresh one.

use anyhow::{Result, bail};

use crate::store::ListId;

/// Known list names and their ids, in the order the store returned them.
#[derive(Debug, Clone)]
pub struct ListCatalog {
    entries: Vec<(String, ListId)>,
}

/// The best catalog entry for a spoken name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub name: &'a str,
    pub id: &'a ListId,
    pub score: u8,
}

impl ListCatalog {
    /// Build a catalog. Resolution needs at least one list to pick from.
    pub fn new(entries: Vec<(String, ListId)>) -> Result<Self> {
        if entries.is_empty() {
            bail!("the account has no shopping lists");
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn entries(&self) -> &[(String, ListId)] {
        &self.entries
    }

    /// Highest-scoring entry. Ties go to the earliest entry; there is no
    /// minimum score, so a poor match is still a match.
    pub fn best_match(&self, spoken_name: &str) -> Match<'_> {
        let (first_name, first_id) = &self.entries[0];
        let mut best = Match {
            name: first_name,
            id: first_id,
            score: similarity(first_name, spoken_name),
        };
        for (name, id) in &self.entries[1..] {
            let score = similarity(name, spoken_name);
            if score > best.score {
                best = Match { name, id, score };
            }
        }
        best
    }
}

/// Case-insensitive edit-distance ratio in `0..=100`.
pub fn similarity(a: &str, b: &str) -> u8 {
    let ratio = strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase());
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Map a spoken list name to the id of the closest known list.
pub fn resolve<'a>(spoken_name: &str, catalog: &'a ListCatalog) -> &'a ListId {
    catalog.best_match(spoken_name).id
}

/// Like [`resolve`], but refuses matches scoring below `min_score`.
pub fn resolve_strict<'a>(
    spoken_name: &str,
    catalog: &'a ListCatalog,
    min_score: u8,
) -> Option<&'a ListId> {
    let best = catalog.best_match(spoken_name);
    (best.score >= min_score).then_some(best.id)
}
