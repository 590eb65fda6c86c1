//! Category score map with stable insertion order.

use serde::ser::{Serialize, SerializeMap, Serializer};
use spicesense_core::UNCATEGORIZED;

/// Delimiter for the batch label and score columns.
const LIST_DELIMITER: &str = "; ";

/// Ordered `category -> score` map returned by the classifier.
///
/// Insertion order is kept: keyword categories first in taxonomy order,
/// then semantic additions in scorer order. Ranking ties fall back to it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryScores {
    entries: Vec<(String, f32)>,
}

impl CategoryScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `{"Uncategorized": 0.0}` sentinel.
    pub fn uncategorized() -> Self {
        Self {
            entries: vec![(UNCATEGORIZED.to_string(), 0.0)],
        }
    }

    /// Insert a category unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, category: impl Into<String>, score: f32) -> bool {
        let category = category.into();
        if self.contains(&category) {
            return false;
        }
        self.entries.push((category, score));
        true
    }

    pub fn get(&self, category: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, score)| *score)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == category)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_uncategorized(&self) -> bool {
        self.entries.len() == 1 && self.entries[0].0 == UNCATEGORIZED
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(name, score)| (name.as_str(), *score))
    }

    /// Category names in insertion order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Entries by descending score; equal scores keep insertion order.
    pub fn ranked(&self) -> Vec<(&str, f32)> {
        let mut ranked: Vec<(&str, f32)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    /// Highest-ranked category.
    pub fn primary(&self) -> Option<&str> {
        self.ranked().first().map(|(name, _)| *name)
    }

    /// Ranked category names joined with `"; "`.
    pub fn labels(&self) -> String {
        self.ranked()
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(LIST_DELIMITER)
    }

    /// Ranked scores at three decimals, parallel to [`labels`](Self::labels).
    pub fn formatted_scores(&self) -> String {
        self.ranked()
            .iter()
            .map(|(_, score)| format!("{:.3}", score))
            .collect::<Vec<_>>()
            .join(LIST_DELIMITER)
    }
}

impl Serialize for CategoryScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, score) in &self.entries {
            map.serialize_entry(name, score)?;
        }
        map.end()
    }
}
