use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One summarized update inside a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDigestEntry {
    /// Headline for the update, up to about two sentences
    pub headline: String,
    /// Link to the source article
    pub link: String,
}

/// A titled group of updates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDigest {
    pub emoji: String,
    pub title: String,
    #[serde(default)]
    pub entries: Vec<CategoryDigestEntry>,
}

/// The categorized summary handed to delivery
///
/// Grouping and ordering come from the summarizer; this type only checks
/// that the structure is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub categories: Vec<CategoryDigest>,
}

impl Digest {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total entries across all categories
    pub fn entry_count(&self) -> usize {
        self.categories.iter().map(|c| c.entries.len()).sum()
    }

    /// Check that every category has a title and every entry a headline and link
    pub fn validate(&self) -> Result<()> {
        for (ci, category) in self.categories.iter().enumerate() {
            if category.title.trim().is_empty() {
                return Err(Error::Summarizer(format!("Category {} has an empty title", ci)));
            }

            for (ei, entry) in category.entries.iter().enumerate() {
                if entry.headline.trim().is_empty() {
                    return Err(Error::Summarizer(format!(
                        "Entry {} of category '{}' has an empty headline",
                        ei, category.title
                    )));
                }
                if entry.link.trim().is_empty() {
                    return Err(Error::Summarizer(format!(
                        "Entry {} of category '{}' has no link",
                        ei, category.title
                    )));
                }
            }
        }

        Ok(())
    }
}
