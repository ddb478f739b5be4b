use crate::content::types::Category;
use serde::{Deserialize, Serialize};

/// Query string of the search endpoint. `q` may be absent.
#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

impl SearchParams {
    /// Picks `q` out of raw query pairs. A repeated `q` is not a single string
    /// and is treated as absent.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut values = pairs
            .into_iter()
            .filter(|(key, _)| key == "q")
            .map(|(_, value)| value);
        match (values.next(), values.next()) {
            (Some(q), None) => Self { q: Some(q) },
            _ => Self::default(),
        }
    }
}

/// One search result as returned to the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseItem {
    pub title: String,
    pub url: String,
    /// Intro text cut to a short snippet.
    pub description: String,
    /// Hero image, or the site placeholder when the record has none.
    pub image: String,
    pub category: Category,
    pub tags: Vec<String>,
}

/// Body of a failed request. Never carries paths or internal error details.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn internal(message: &str) -> Self {
        Self {
            error: "Internal Server Error".to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub documents: usize,
    pub skipped: usize,
    pub build_id: String,
    pub index_mode: String,
}
