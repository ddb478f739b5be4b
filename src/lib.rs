//! TaiwanMe Travel Search Library
//!
//! This library crate defines the modules behind the travel-content search service.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of four loosely coupled subsystems:
//!
//! - **`config`**: Runtime configuration assembled from environment variables and
//!   command-line flags (bind address, content root, result caps, field resolutions).
//! - **`content`**: The content loader. Walks the known JSON collections on disk
//!   (city guides, transport topics, hidden gems, dining, entertainment) and normalizes
//!   every item into a `ContentRecord`. Missing directories and malformed files are tolerated.
//! - **`search`**: The core information retrieval logic. Contains the forward tokenizer,
//!   the multi-field weighted index, the heuristic slug/tag/keyword matcher, the query
//!   engine that merges both tiers, the response formatter and the index cache.
//! - **`sitemap`**: Enumerates the same collections into sitemap URL entries and renders
//!   them as sitemaps.org XML.

pub mod config;
pub mod content;
pub mod search;
pub mod sitemap;

use axum::routing::get;
use axum::{Extension, Router};
use std::sync::Arc;

use config::AppConfig;
use search::service::SearchService;

/// Builds the HTTP router with every public endpoint wired to its shared state.
pub fn create_router(config: Arc<AppConfig>, service: Arc<SearchService>) -> Router {
    Router::new()
        .route("/api/search", get(search::handlers::handle_search))
        .route("/health", get(search::handlers::handle_health))
        .route("/sitemap.xml", get(sitemap::handlers::handle_sitemap))
        .layer(Extension(service))
        .layer(Extension(config))
}
