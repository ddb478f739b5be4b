//! Multi-Field Search Index
//!
//! An in-memory forward index over `ContentRecord`s. Each record is indexed under three
//! fields (title, tags, intro); every token is stored under all of its prefixes.
//!
//! ## Scoring
//! A field's *resolution* is the number of score slots available to it. A token's slot is its
//! position in the field scaled into `0..resolution`, so earlier tokens score better in
//! high-resolution fields while a resolution of 1 ranks purely by insertion order.
//! A record matches a field only when every query term is present in that field (AND).
//! Hits are ordered by summed slot, then by insertion order.

use super::tokenizer::{forward_prefixes, query_terms, tokenize};
use crate::config::SearchConfig;
use crate::content::types::ContentRecord;

use std::collections::{HashMap, HashSet};

/// A searchable field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Tags,
    Intro,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Tags => "tags",
            Field::Intro => "intro",
        }
    }

    fn text(&self, record: &ContentRecord) -> String {
        match self {
            Field::Title => record.title.clone(),
            Field::Tags => record.tags.join(" "),
            Field::Intro => record.intro_text.clone().unwrap_or_default(),
        }
    }
}

/// A field together with its resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub resolution: u8,
}

/// Fields in priority order (title, tags, intro) with the configured resolutions.
pub fn field_specs(config: &SearchConfig) -> Vec<FieldSpec> {
    vec![
        FieldSpec {
            field: Field::Title,
            resolution: config.title_resolution,
        },
        FieldSpec {
            field: Field::Tags,
            resolution: config.tags_resolution,
        },
        FieldSpec {
            field: Field::Intro,
            resolution: config.intro_resolution,
        },
    ]
}

/// Hits of one field, best first.
#[derive(Debug)]
pub struct FieldHits<'a> {
    pub field: Field,
    pub hits: Vec<&'a ContentRecord>,
}

struct FieldIndex {
    spec: FieldSpec,
    /// prefix -> (document position, best slot), in document order.
    postings: HashMap<String, Vec<(u32, u8)>>,
}

impl FieldIndex {
    fn new(spec: FieldSpec) -> Self {
        Self {
            spec,
            postings: HashMap::new(),
        }
    }

    fn insert(&mut self, doc: u32, text: &str) {
        let tokens = tokenize(text);
        let resolution = self.spec.resolution.max(1) as usize;
        let span = tokens.len().max(resolution);

        for (position, token) in tokens.iter().enumerate() {
            let slot = ((position * resolution) / span).min(resolution - 1) as u8;
            for prefix in forward_prefixes(token) {
                let list = self.postings.entry(prefix.to_string()).or_default();
                // Earlier positions always carry the lower slot, so the first entry wins.
                if list.last().map(|(d, _)| *d) != Some(doc) {
                    list.push((doc, slot));
                }
            }
        }
    }

    fn search(&self, terms: &[String], limit: usize) -> Vec<u32> {
        if terms.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut matched: HashMap<u32, (usize, u32)> = HashMap::new();
        for term in terms {
            let Some(list) = self.postings.get(term) else {
                return Vec::new();
            };
            for &(doc, slot) in list {
                let entry = matched.entry(doc).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += slot as u32;
            }
        }

        let mut ranked: Vec<(u32, u32)> = matched
            .into_iter()
            .filter(|(_, (count, _))| *count == terms.len())
            .map(|(doc, (_, score))| (score, doc))
            .collect();
        ranked.sort_unstable();
        ranked.into_iter().take(limit).map(|(_, doc)| doc).collect()
    }
}

/// The index plus the stored projection of every record it holds.
pub struct SearchIndex {
    documents: Vec<ContentRecord>,
    ids: HashSet<String>,
    fields: Vec<FieldIndex>,
}

impl SearchIndex {
    pub fn new(fields: &[FieldSpec]) -> Self {
        Self {
            documents: Vec::new(),
            ids: HashSet::new(),
            fields: fields.iter().copied().map(FieldIndex::new).collect(),
        }
    }

    /// Adds a record under every field. Returns `false` if its id is already present.
    pub fn add(&mut self, record: ContentRecord) -> bool {
        if self.ids.contains(&record.id) {
            tracing::warn!("Duplicate document id '{}' ignored", record.id);
            return false;
        }

        let doc = self.documents.len() as u32;
        for field_index in &mut self.fields {
            let text = field_index.spec.field.text(&record);
            field_index.insert(doc, &text);
        }
        self.ids.insert(record.id.clone());
        self.documents.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Stored records in insertion order.
    pub fn documents(&self) -> &[ContentRecord] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&ContentRecord> {
        self.documents.iter().find(|record| record.id == id)
    }

    /// Searches one field, returning at most `limit` records.
    pub fn search_field(&self, field: Field, query: &str, limit: usize) -> Vec<&ContentRecord> {
        let terms = query_terms(query);
        self.fields
            .iter()
            .find(|field_index| field_index.spec.field == field)
            .map(|field_index| self.resolve(field_index.search(&terms, limit)))
            .unwrap_or_default()
    }

    /// Searches every field, returning the non-empty hit lists in field priority order.
    pub fn search(&self, query: &str, limit_per_field: usize) -> Vec<FieldHits<'_>> {
        let terms = query_terms(query);
        self.fields
            .iter()
            .map(|field_index| FieldHits {
                field: field_index.spec.field,
                hits: self.resolve(field_index.search(&terms, limit_per_field)),
            })
            .filter(|group| !group.hits.is_empty())
            .collect()
    }

    fn resolve(&self, docs: Vec<u32>) -> Vec<&ContentRecord> {
        docs.into_iter()
            .filter_map(|doc| self.documents.get(doc as usize))
            .collect()
    }
}

/// Builds an index from records in the given order.
pub fn build_index(records: Vec<ContentRecord>, fields: &[FieldSpec]) -> SearchIndex {
    let mut index = SearchIndex::new(fields);
    for record in records {
        index.add(record);
    }
    index
}
