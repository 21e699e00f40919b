//! Frozen categorical vocabularies
//!
//! A vocabulary is fit once over the training corpus and never renumbered
//! afterwards. Code 0 is reserved for values that were not observed during
//! fitting, so the default-to-zero behavior is a declared part of the
//! contract rather than an incidental catch-all.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Code reserved for values never observed during fitting
pub const UNKNOWN_CODE: u32 = 0;

/// Stable mapping from observed text value to an integer code.
///
/// Observed values are numbered 1..=n in sorted order, which makes the
/// fitted codes reproducible for a given corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    codes: BTreeMap<String, u32>,
}

impl CategoryVocabulary {
    /// Build a vocabulary from the observed values of one categorical field
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect();
        let codes = unique
            .into_iter()
            .enumerate()
            .map(|(i, value)| (value, i as u32 + 1))
            .collect();
        Self { codes }
    }

    /// Look up the code for a value; unseen values map to [`UNKNOWN_CODE`]
    pub fn code(&self, value: &str) -> u32 {
        self.codes.get(value).copied().unwrap_or(UNKNOWN_CODE)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.codes.contains_key(value)
    }

    /// Number of distinct observed values (the unknown code not included)
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
