//! Content Loader Module
//!
//! Reads the travel content collections from disk and normalizes them into
//! `ContentRecord`s, the unit that the search index stores and returns.
//!
//! ## Workflow
//! 1. **Registry**: `collections` names every collection, where it lives under the content
//!    root, which category it carries and how its URLs are built.
//! 2. **Enumeration**: Collection directories are listed deterministically (sorted by file name).
//!    A missing directory or file contributes nothing and is not an error.
//! 3. **Normalization**: Each JSON file is parsed and mapped to records. Directory files may hold an
//!    array of articles or a single object. Malformed files and items are skipped and reported.
//!
//! The same enumeration feeds the sitemap and the index cache fingerprint.

pub mod collections;
pub mod loader;
pub mod types;
