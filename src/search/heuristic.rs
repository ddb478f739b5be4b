//! Heuristic Matcher
//!
//! Substring rules that run beside the tokenized index. They guarantee that obvious,
//! exact-ish hits surface even when the tokenizer would miss them or rank them low,
//! e.g. a city slug containing underscores.
//!
//! A record matches when any rule matches:
//! - **Slug**: the query contains the slug or the slug contains the query.
//! - **Tag**: some lowercased tag contains the query.
//! - **Category keyword**: the query contains one of the keywords of the record's category.

use crate::content::types::{Category, ContentRecord};

/// Lowercases and trims a raw query.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Keyword sets per category.
#[derive(Debug, Clone)]
pub struct HeuristicRules {
    keywords: Vec<(Category, Vec<String>)>,
}

impl Default for HeuristicRules {
    fn default() -> Self {
        Self::new()
            .with_keywords(
                Category::Transport,
                &["transport", "traffic", "train", "bus", "mrt", "metro", "hsr", "交通"],
            )
            .with_keywords(Category::HiddenGem, &["hidden gem", "hidden", "secret", "秘境"])
            .with_keywords(Category::Dining, &["dining", "food", "restaurant", "美食"])
            .with_keywords(Category::Entertainment, &["entertainment", "nightlife", "娛樂"])
            .with_keywords(Category::CityGuide, &["city guide", "城市"])
    }
}

impl HeuristicRules {
    /// Rules with no category keywords; slug and tag rules still apply.
    pub fn new() -> Self {
        Self {
            keywords: Vec::new(),
        }
    }

    /// Adds keywords for a category. Keywords are stored lowercased.
    pub fn with_keywords(mut self, category: Category, keywords: &[&str]) -> Self {
        let keywords = keywords
            .iter()
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty());
        match self.keywords.iter_mut().find(|(c, _)| *c == category) {
            Some((_, existing)) => existing.extend(keywords),
            None => self.keywords.push((category, keywords.collect())),
        }
        self
    }

    pub fn keywords_for(&self, category: Category) -> &[String] {
        self.keywords
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, keywords)| keywords.as_slice())
            .unwrap_or(&[])
    }

    /// Whether an already normalized query matches `record` under any rule.
    pub fn matches(&self, normalized: &str, record: &ContentRecord) -> bool {
        if normalized.is_empty() {
            return false;
        }
        slug_matches(normalized, record)
            || tag_matches(normalized, record)
            || self
                .keywords_for(record.category)
                .iter()
                .any(|keyword| normalized.contains(keyword.as_str()))
    }

    /// Records matching `query`, in the order they appear in `records`.
    pub fn heuristic_match<'a>(
        &self,
        query: &str,
        records: &'a [ContentRecord],
    ) -> Vec<&'a ContentRecord> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Vec::new();
        }
        records
            .iter()
            .filter(|record| self.matches(&normalized, record))
            .collect()
    }
}

fn slug_matches(normalized: &str, record: &ContentRecord) -> bool {
    record
        .city_slug
        .iter()
        .chain(record.slug.iter())
        .map(|slug| slug.to_lowercase())
        .filter(|slug| !slug.is_empty())
        .any(|slug| {
            let spaced = slug.replace(['_', '-'], " ");
            contains_either_way(normalized, &slug) || contains_either_way(normalized, &spaced)
        })
}

fn contains_either_way(query: &str, slug: &str) -> bool {
    slug.contains(query) || query.contains(slug)
}

fn tag_matches(normalized: &str, record: &ContentRecord) -> bool {
    record
        .tags
        .iter()
        .any(|tag| tag.to_lowercase().contains(normalized))
}
