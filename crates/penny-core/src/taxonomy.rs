//! Merchant category taxonomy
//!
//! A two-level mapping loaded once at startup:
//!
//! ```text
//! general category -> subcategory -> CategoryDetail { code, description, need }
//! ```
//!
//! The taxonomy is read-only after loading. "Other" is the reserved fallback
//! category and carries no subcategories.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Reserved fallback general category
pub const OTHER_CATEGORY: &str = "Other";

/// Subcategory reported when no subcategory applies
pub const UNKNOWN_SUBCATEGORY: &str = "Unknown";

/// Final classification outcome for a (general category, subcategory) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDetail {
    /// Merchant category code (MCC)
    pub code: i64,
    pub description: String,
    /// Need level, e.g. "Need", "Want"
    pub need: String,
}

impl CategoryDetail {
    /// Placeholder returned when the LLM answer is not a known key
    pub fn unknown() -> Self {
        Self {
            code: 0,
            description: "Unknown category".to_string(),
            need: "Unidentified".to_string(),
        }
    }
}

/// The loaded category taxonomy
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Taxonomy {
    categories: BTreeMap<String, BTreeMap<String, CategoryDetail>>,
}

impl Taxonomy {
    /// Load and validate the taxonomy from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Taxonomy(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Parse and validate the taxonomy from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        let taxonomy: Taxonomy = serde_json::from_str(content)
            .map_err(|e| Error::Taxonomy(format!("Invalid taxonomy JSON: {}", e)))?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    fn validate(&self) -> Result<()> {
        if !self.categories.contains_key(OTHER_CATEGORY) {
            return Err(Error::Taxonomy(format!(
                "Missing reserved \"{}\" category",
                OTHER_CATEGORY
            )));
        }

        if let Some((name, _)) = self
            .categories
            .iter()
            .find(|(name, subs)| name.as_str() != OTHER_CATEGORY && subs.is_empty())
        {
            return Err(Error::Taxonomy(format!(
                "Category \"{}\" has no subcategories",
                name
            )));
        }

        Ok(())
    }

    /// Top-level category names, including "Other"
    pub fn general_categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Subcategory names under a general category (empty if unknown)
    pub fn subcategories(&self, general: &str) -> Vec<&str> {
        self.categories
            .get(general)
            .map(|subs| subs.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether a general category exists (exact match)
    pub fn contains_category(&self, general: &str) -> bool {
        self.categories.contains_key(general)
    }

    /// Look up the detail for an exact (general, subcategory) pair.
    ///
    /// No normalization is applied: an answer that differs from the canonical
    /// key by case or punctuation falls through to the placeholder.
    pub fn lookup(&self, general: &str, subcategory: &str) -> CategoryDetail {
        self.categories
            .get(general)
            .and_then(|subs| subs.get(subcategory))
            .cloned()
            .unwrap_or_else(CategoryDetail::unknown)
    }

    /// Number of general categories
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Total number of subcategories across all categories
    pub fn subcategory_count(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    /// Iterate over categories and their subcategory details
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, CategoryDetail>)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }
}
