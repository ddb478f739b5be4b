//! Search Service Module
//!
//! The core component responsible for answering user queries over the travel content.
//!
//! ## Overview
//! Every query runs two tiers over the same set of records and merges them:
//! a heuristic tier of substring rules (slugs, tags, category keywords) and a tokenized
//! tier backed by a forward-prefix index over title, tags and intro. Heuristic hits always
//! rank first; results are de-duplicated by URL and capped.
//!
//! ## Submodules
//! - **`tokenizer`**: Normalization (lowercase, Latin diacritic folding) and forward prefixes.
//! - **`index`**: The multi-field weighted index and its stored record projection.
//! - **`heuristic`**: Slug, tag and category-keyword containment rules.
//! - **`engine`**: Query validation, tier merging, de-duplication and capping.
//! - **`formatter`**: Shapes records into the response contract.
//! - **`service`**: Owns load + index lifecycle (per request or cached with invalidation).
//! - **`handlers`**: HTTP request handlers for the Axum web server.
//! - **`types`**: Data Transfer Objects (DTOs) for API communication.

pub mod engine;
pub mod formatter;
pub mod handlers;
pub mod heuristic;
pub mod index;
pub mod service;
pub mod tokenizer;
pub mod types;

#[cfg(test)]
mod tests;
