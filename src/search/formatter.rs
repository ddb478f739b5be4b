//! Result Formatter
//!
//! Shapes stored records into the response contract of the search endpoint.

use super::types::ResponseItem;
use crate::content::types::ContentRecord;

/// Image used when a record has no hero image.
pub const DEFAULT_IMAGE: &str = "/images/placeholder.jpg";
/// Number of intro characters kept in the description snippet.
pub const DESCRIPTION_CHARS: usize = 60;

pub fn format_results<'a, I>(records: I) -> Vec<ResponseItem>
where
    I: IntoIterator<Item = &'a ContentRecord>,
{
    records.into_iter().map(format_record).collect()
}

pub fn format_record(record: &ContentRecord) -> ResponseItem {
    ResponseItem {
        title: record.title.clone(),
        url: record.url.clone(),
        description: snippet(record.intro_text.as_deref().unwrap_or_default()),
        image: record
            .hero_image
            .as_deref()
            .map(str::trim)
            .filter(|image| !image.is_empty())
            .unwrap_or(DEFAULT_IMAGE)
            .to_string(),
        category: record.category,
        tags: record.tags.clone(),
    }
}

/// First `DESCRIPTION_CHARS` characters, with an ellipsis when text was cut.
pub fn snippet(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(DESCRIPTION_CHARS) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}
