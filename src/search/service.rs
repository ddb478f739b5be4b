//! Search Service
//!
//! Owns the full pipeline for one content root: load -> index -> query -> format.
//! The service is created at startup and passed to the HTTP layer explicitly.
//!
//! ## Index Lifecycle
//! - **`IndexMode::PerRequest`**: every query loads the collections and builds a fresh index.
//! - **`IndexMode::Cached`**: the last snapshot is reused while the content fingerprint
//!   (file names, sizes, modification times) is unchanged. When it changes, only the
//!   collections whose fingerprint moved are reloaded and the index is rebuilt, so an
//!   edit on disk is visible to the very next query.
//!
//! Filesystem work always runs on the blocking thread pool.

use super::engine::{execute_query, validate_query, QueryOptions};
use super::formatter::format_results;
use super::heuristic::HeuristicRules;
use super::index::{build_index, field_specs, FieldSpec, SearchIndex};
use super::types::ResponseItem;
use crate::config::{IndexMode, SearchConfig};
use crate::content::collections::{CollectionSpec, DEFAULT_COLLECTIONS};
use crate::content::loader::{collection_fingerprint, load_collection, CollectionFingerprint};
use crate::content::types::ContentRecord;

use anyhow::{Context, Result};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// An immutable, fully built index together with the content state it reflects.
pub struct IndexSnapshot {
    pub build_id: Uuid,
    pub index: SearchIndex,
    /// Number of files or items skipped while loading.
    pub skipped: usize,
    fingerprints: Vec<CollectionFingerprint>,
}

struct CachedCollection {
    fingerprint: CollectionFingerprint,
    records: Arc<Vec<ContentRecord>>,
    skipped: usize,
}

pub struct SearchService {
    root: PathBuf,
    collections: &'static [CollectionSpec],
    config: SearchConfig,
    rules: HeuristicRules,
    snapshot: RwLock<Option<Arc<IndexSnapshot>>>,
    collection_cache: Arc<DashMap<&'static str, CachedCollection>>,
}

impl SearchService {
    pub fn new(root: impl Into<PathBuf>, config: SearchConfig) -> Self {
        Self::with_collections(root, DEFAULT_COLLECTIONS, config)
    }

    pub fn with_collections(
        root: impl Into<PathBuf>,
        collections: &'static [CollectionSpec],
        config: SearchConfig,
    ) -> Self {
        Self {
            root: root.into(),
            collections,
            config,
            rules: HeuristicRules::default(),
            snapshot: RwLock::new(None),
            collection_cache: Arc::new(DashMap::new()),
        }
    }

    pub fn with_rules(mut self, rules: HeuristicRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn index_mode(&self) -> IndexMode {
        self.config.index_mode
    }

    /// Answers a query with formatted results.
    ///
    /// Empty or missing queries return an empty list without touching the disk.
    pub async fn search(&self, query: Option<&str>) -> Result<Vec<ResponseItem>> {
        let Some(query) = validate_query(query) else {
            return Ok(Vec::new());
        };

        let snapshot = self.snapshot().await?;
        let options = QueryOptions {
            result_cap: self.config.result_cap,
            field_limit: self.config.field_limit,
        };
        let hits = execute_query(&snapshot.index, &self.rules, Some(query), options);
        Ok(format_results(hits))
    }

    /// Returns an index reflecting the current content on disk.
    pub async fn snapshot(&self) -> Result<Arc<IndexSnapshot>> {
        match self.config.index_mode {
            IndexMode::PerRequest => {
                let root = self.root.clone();
                let collections = self.collections;
                let fields = field_specs(&self.config);
                let snapshot = tokio::task::spawn_blocking(move || {
                    build_snapshot(&root, collections, &fields, None)
                })
                .await
                .context("index build task failed")??;
                Ok(Arc::new(snapshot))
            }
            IndexMode::Cached => self.cached_snapshot().await,
        }
    }

    async fn cached_snapshot(&self) -> Result<Arc<IndexSnapshot>> {
        let current = self.fingerprints().await?;

        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            if snapshot.fingerprints == current {
                tracing::trace!("Reusing index snapshot {}", snapshot.build_id);
                return Ok(snapshot.clone());
            }
        }

        let mut guard = self.snapshot.write().await;
        if let Some(snapshot) = guard.as_ref() {
            if snapshot.fingerprints == current {
                return Ok(snapshot.clone());
            }
        }

        let root = self.root.clone();
        let collections = self.collections;
        let fields = field_specs(&self.config);
        let cache = self.collection_cache.clone();
        let snapshot = tokio::task::spawn_blocking(move || {
            build_snapshot(&root, collections, &fields, Some(cache.as_ref()))
        })
        .await
        .context("index build task failed")??;

        let snapshot = Arc::new(snapshot);
        *guard = Some(snapshot.clone());
        Ok(snapshot)
    }

    async fn fingerprints(&self) -> Result<Vec<CollectionFingerprint>> {
        let root = self.root.clone();
        let collections = self.collections;
        tokio::task::spawn_blocking(move || {
            collections
                .iter()
                .map(|spec| collection_fingerprint(&root, spec))
                .collect::<Result<Vec<_>>>()
        })
        .await
        .context("fingerprint task failed")?
    }
}

/// Loads the collections (reusing unchanged ones from `cache`) and builds an index.
fn build_snapshot(
    root: &Path,
    collections: &'static [CollectionSpec],
    fields: &[FieldSpec],
    cache: Option<&DashMap<&'static str, CachedCollection>>,
) -> Result<IndexSnapshot> {
    let mut fingerprints = Vec::with_capacity(collections.len());
    let mut records: Vec<ContentRecord> = Vec::new();
    let mut skipped = 0;

    for spec in collections {
        let fingerprint = collection_fingerprint(root, spec)?;

        if let Some(cached) = cache.and_then(|cache| cache.get(spec.name)) {
            if cached.fingerprint == fingerprint {
                records.extend(cached.records.iter().cloned());
                skipped += cached.skipped;
                fingerprints.push(fingerprint);
                continue;
            }
        }

        let report = load_collection(root, spec)?;
        skipped += report.issues.len();
        let loaded = Arc::new(report.records);
        records.extend(loaded.iter().cloned());

        if let Some(cache) = cache {
            cache.insert(
                spec.name,
                CachedCollection {
                    fingerprint: fingerprint.clone(),
                    records: loaded,
                    skipped: report.issues.len(),
                },
            );
        }
        fingerprints.push(fingerprint);
    }

    let index = build_index(records, fields);
    let build_id = Uuid::new_v4();
    tracing::info!(
        "Built search index {} with {} documents ({} skipped)",
        build_id,
        index.len(),
        skipped
    );

    Ok(IndexSnapshot {
        build_id,
        index,
        skipped,
        fingerprints,
    })
}
