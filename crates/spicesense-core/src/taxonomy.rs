//! SPICES taxonomy — ordered category → trigger phrase mapping.
//!
//! Category order is significant: downstream tie-breaks between equal
//! scores follow it, so the taxonomy is stored as an ordered `Vec`, never
//! as a hash map. A taxonomy is immutable once constructed.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sentinel label used when no category can be determined.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Delimiter used when joining trigger phrases into a concept phrase.
const CONCEPT_DELIMITER: &str = "; ";

/// Compiled-in SPICES keyword table. Committee members extend these lists.
const SPICES_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Service",
        &[
            "volunteer", "volunteering", "donation", "community", "service", "fundraiser",
            "outreach", "food drive", "service hours", "charity", "donate",
        ],
    ),
    (
        "Professional Development",
        &[
            "career", "resume", "cv", "interview", "network", "professional", "job fair",
            "internship", "employer", "mentorship", "leadership", "career services",
        ],
    ),
    (
        "Intellectual Achievement",
        &[
            "research", "seminar", "academic", "paper", "poster", "conference",
            "presentation", "lecture", "symposium", "study", "colloquium", "workshop",
        ],
    ),
    (
        "Cultural Exploration",
        &[
            "culture", "heritage", "festival", "diversity", "international", "tradition",
            "language", "global", "cultural", "ethnic",
        ],
    ),
    (
        "Engaged Living",
        &[
            "wellness", "health", "yoga", "mindfulness", "fitness", "self-care",
            "well-being", "meditation", "stress", "balance",
        ],
    ),
    (
        "Skill Development",
        &[
            "workshop", "training", "communication", "teamwork", "problem-solving",
            "public speaking", "presentation", "coding", "skill", "skills", "bootcamp",
        ],
    ),
];

static SPICES: Lazy<Taxonomy> = Lazy::new(|| {
    let categories = SPICES_KEYWORDS
        .iter()
        .map(|(name, phrases)| Category {
            name: (*name).to_string(),
            phrases: phrases.iter().map(|p| (*p).to_string()).collect(),
        })
        .collect();
    Taxonomy { categories }
});

/// A single category and its trigger phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub phrases: Vec<String>,
}

impl Category {
    /// Create a category from a name and its trigger phrases.
    pub fn new<S: Into<String>>(name: impl Into<String>, phrases: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            phrases: phrases.into_iter().map(Into::into).collect(),
        }
    }

    /// All trigger phrases joined into one descriptive phrase, used to
    /// embed the category's concept vector.
    pub fn concept_phrase(&self) -> String {
        self.phrases.join(CONCEPT_DELIMITER)
    }
}

/// Ordered, validated collection of categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Taxonomy {
    categories: Vec<Category>,
}

impl Taxonomy {
    /// Build a taxonomy, normalizing phrases to trimmed lowercase.
    ///
    /// Fails when the list is empty, a name is blank, duplicated or equal to
    /// the `Uncategorized` sentinel, or a category has no usable phrase.
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        if categories.is_empty() {
            return Err(Error::Taxonomy("taxonomy has no categories".into()));
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(categories.len());

        for category in categories {
            let name = category.name.trim().to_string();
            if name.is_empty() {
                return Err(Error::Taxonomy("category name is empty".into()));
            }
            if name == UNCATEGORIZED {
                return Err(Error::Taxonomy(format!("'{}' is reserved", UNCATEGORIZED)));
            }
            if !seen.insert(name.clone()) {
                return Err(Error::Taxonomy(format!("duplicate category '{}'", name)));
            }

            let mut phrases: Vec<String> = Vec::with_capacity(category.phrases.len());
            for phrase in category.phrases {
                let phrase = phrase.trim().to_lowercase();
                if phrase.is_empty() {
                    return Err(Error::Taxonomy(format!("blank trigger phrase in '{}'", name)));
                }
                if !phrases.contains(&phrase) {
                    phrases.push(phrase);
                }
            }
            if phrases.is_empty() {
                return Err(Error::Taxonomy(format!("category '{}' has no trigger phrases", name)));
            }

            normalized.push(Category { name, phrases });
        }

        Ok(Self { categories: normalized })
    }

    /// The compiled-in six-category SPICES taxonomy.
    pub fn spices() -> Self {
        SPICES.clone()
    }

    /// Parse a taxonomy from an ordered JSON array of
    /// `{"name": ..., "phrases": [...]}` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let categories: Vec<Category> = serde_json::from_str(json)?;
        Self::new(categories)
    }

    /// Load a taxonomy file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let taxonomy = Self::from_json(&raw)?;
        tracing::info!(
            "Loaded taxonomy from {} ({} categories)",
            path.display(),
            taxonomy.len()
        );
        Ok(taxonomy)
    }

    /// Load `path` if it exists, otherwise fall back to [`Taxonomy::spices`].
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No taxonomy file at {}; using built-in SPICES", path.display());
            Ok(Self::spices())
        }
    }

    /// Categories in taxonomy order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.categories.iter()
    }

    /// Category names in taxonomy order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Column name for a per-category 0/1 indicator, e.g.
    /// `"Engaged Living"` → `"SPICES_Engaged_Living"`.
    pub fn indicator_column(name: &str) -> String {
        format!("SPICES_{}", name.replace(' ', "_"))
    }
}

impl<'a> IntoIterator for &'a Taxonomy {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}
