//! Content Data Types
//!
//! Defines the normalized record produced by the loader and the bookkeeping
//! structures that describe what was skipped during a load.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Editorial category of a content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "City Guide")]
    CityGuide,
    Transport,
    #[serde(rename = "Hidden Gem")]
    HiddenGem,
    Dining,
    Entertainment,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::CityGuide => "City Guide",
            Category::Transport => "Transport",
            Category::HiddenGem => "Hidden Gem",
            Category::Dining => "Dining",
            Category::Entertainment => "Entertainment",
        }
    }
}

/// A single piece of content, normalized from any of the on-disk shapes.
///
/// `id` is unique within one index (collection + slug + item id) and `url` is the
/// canonical page link, which doubles as the de-duplication key of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: String,
    /// Name of the collection the record was loaded from.
    pub collection: String,
    /// File slug for directory collections (city slug or topic id).
    pub slug: Option<String>,
    pub title: String,
    pub intro_text: Option<String>,
    pub tags: Vec<String>,
    pub category: Category,
    /// Only present for city-guide records.
    pub city_slug: Option<String>,
    pub url: String,
    pub hero_image: Option<String>,
}

/// Something the loader skipped while reading a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadIssue {
    pub collection: String,
    pub file: PathBuf,
    pub reason: String,
}

/// Outcome of loading one or more collections.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub records: Vec<ContentRecord>,
    pub issues: Vec<LoadIssue>,
}

impl LoadReport {
    /// Records paired with the name of their source collection, in load order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ContentRecord)> + '_ {
        self.records
            .iter()
            .map(|record| (record.collection.as_str(), record))
    }

    pub fn merge(&mut self, other: LoadReport) {
        self.records.extend(other.records);
        self.issues.extend(other.issues);
    }
}
