//! Collection Loader
//!
//! Walks the registered collections and turns their JSON files into `ContentRecord`s.
//!
//! ## Failure Policy
//! - A missing collection directory or list file contributes zero records.
//! - A file that cannot be read or parsed is skipped and reported as a `LoadIssue`.
//! - An item without the fields it needs is skipped and reported; its siblings still load.
//! - Any other failure to list a collection directory is returned as an error.

use super::collections::{CollectionLayout, CollectionSpec, DEFAULT_COLLECTIONS};
use super::types::{Category, ContentRecord, LoadIssue, LoadReport};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A JSON file found in a collection directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFile {
    pub slug: String,
    pub path: PathBuf,
}

/// Cheap change detector for one collection: file names, sizes and modification times.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionFingerprint {
    pub present: bool,
    pub files: Vec<(String, u64, Option<SystemTime>)>,
}

/// Loads every registered collection under `root`.
pub fn load_all_collections(root: &Path) -> Result<LoadReport> {
    load_collections(root, DEFAULT_COLLECTIONS)
}

pub fn load_collections(root: &Path, specs: &[CollectionSpec]) -> Result<LoadReport> {
    let mut report = LoadReport::default();
    for spec in specs {
        report.merge(load_collection(root, spec)?);
    }
    Ok(report)
}

/// Loads a single collection, logging every skipped file or item.
pub fn load_collection(root: &Path, spec: &CollectionSpec) -> Result<LoadReport> {
    let mut report = LoadReport::default();

    match spec.layout {
        CollectionLayout::Directory(_) => {
            let Some(files) = list_json_files(&spec.location(root))? else {
                tracing::warn!(
                    "Collection '{}' not found at {}",
                    spec.name,
                    spec.location(root).display()
                );
                return Ok(report);
            };

            for file in files {
                match read_json(&file.path) {
                    Ok(value) => {
                        normalize_directory_file(spec, &file.slug, &file.path, value, &mut report)
                    }
                    Err(reason) => report.issues.push(issue(spec, &file.path, reason)),
                }
            }
        }
        CollectionLayout::ListFile(_) => {
            let path = spec.location(root);
            if !path.is_file() {
                tracing::warn!("Collection '{}' not found at {}", spec.name, path.display());
                return Ok(report);
            }
            match read_json(&path) {
                Ok(value) => normalize_list_file(spec, &path, value, &mut report),
                Err(reason) => report.issues.push(issue(spec, &path, reason)),
            }
        }
    }

    for skipped in &report.issues {
        tracing::warn!(
            "Skipped content in '{}' ({}): {}",
            skipped.collection,
            skipped.file.display(),
            skipped.reason
        );
    }
    tracing::debug!(
        "Loaded {} {} records from collection '{}'",
        report.records.len(),
        spec.category.label(),
        spec.name
    );

    Ok(report)
}

/// Lists the `*.json` files of a directory sorted by name.
///
/// Returns `Ok(None)` when the directory does not exist.
pub fn list_json_files(dir: &Path) -> Result<Option<Vec<CollectionFile>>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to list {}", dir.display()));
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        if let Some(slug) = path.file_stem().and_then(|stem| stem.to_str()) {
            files.push(CollectionFile {
                slug: slug.to_string(),
                path: path.clone(),
            });
        }
    }

    files.sort_by(|a, b| a.slug.cmp(&b.slug));
    Ok(Some(files))
}

/// Slugs (file stems) of a directory collection, sorted. List-file collections have none.
pub fn list_collection_slugs(root: &Path, spec: &CollectionSpec) -> Result<Vec<String>> {
    match spec.layout {
        CollectionLayout::Directory(_) => Ok(list_json_files(&spec.location(root))?
            .unwrap_or_default()
            .into_iter()
            .map(|file| file.slug)
            .collect()),
        CollectionLayout::ListFile(_) => Ok(Vec::new()),
    }
}

/// Computes the change fingerprint of a collection without reading file contents.
pub fn collection_fingerprint(root: &Path, spec: &CollectionSpec) -> Result<CollectionFingerprint> {
    match spec.layout {
        CollectionLayout::Directory(_) => {
            let Some(files) = list_json_files(&spec.location(root))? else {
                return Ok(CollectionFingerprint::default());
            };
            let files = files
                .into_iter()
                .map(|file| {
                    let (len, modified) = file_stamp(&file.path);
                    (file.slug, len, modified)
                })
                .collect();
            Ok(CollectionFingerprint {
                present: true,
                files,
            })
        }
        CollectionLayout::ListFile(name) => {
            let path = spec.location(root);
            if !path.is_file() {
                return Ok(CollectionFingerprint::default());
            }
            let (len, modified) = file_stamp(&path);
            Ok(CollectionFingerprint {
                present: true,
                files: vec![(name.to_string(), len, modified)],
            })
        }
    }
}

fn file_stamp(path: &Path) -> (u64, Option<SystemTime>) {
    match fs::metadata(path) {
        Ok(meta) => (meta.len(), meta.modified().ok()),
        Err(_) => (0, None),
    }
}

fn read_json(path: &Path) -> Result<Value, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read failed: {}", e))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid JSON: {}", e))
}

fn issue(spec: &CollectionSpec, path: &Path, reason: String) -> LoadIssue {
    LoadIssue {
        collection: spec.name.to_string(),
        file: path.to_path_buf(),
        reason,
    }
}

/// Maps one file of a directory collection to records.
///
/// An array becomes one record per article; an object becomes a single page record.
pub fn normalize_directory_file(
    spec: &CollectionSpec,
    slug: &str,
    path: &Path,
    value: Value,
    report: &mut LoadReport,
) {
    match value {
        Value::Array(items) => {
            for (position, item) in items.into_iter().enumerate() {
                let Value::Object(fields) = item else {
                    report
                        .issues
                        .push(issue(spec, path, format!("item {} is not an object", position)));
                    continue;
                };
                let Some(item_id) = item_id(&fields) else {
                    report
                        .issues
                        .push(issue(spec, path, format!("item {} has no id", position)));
                    continue;
                };
                let url = spec.item_url(slug, &item_id);
                report
                    .records
                    .push(build_record(spec, Some(slug), &item_id, url, &fields));
            }
        }
        Value::Object(fields) => {
            let item_id = item_id(&fields).unwrap_or_else(|| slug.to_string());
            let url = spec.page_url(slug);
            report
                .records
                .push(build_record(spec, Some(slug), &item_id, url, &fields));
        }
        _ => report.issues.push(issue(
            spec,
            path,
            "expected an array or an object".to_string(),
        )),
    }
}

/// Maps a list file (`dining.json`) to records addressed by fragment.
pub fn normalize_list_file(spec: &CollectionSpec, path: &Path, value: Value, report: &mut LoadReport) {
    let Value::Array(items) = value else {
        report
            .issues
            .push(issue(spec, path, "expected an array".to_string()));
        return;
    };

    for (position, item) in items.into_iter().enumerate() {
        let Value::Object(fields) = item else {
            report
                .issues
                .push(issue(spec, path, format!("item {} is not an object", position)));
            continue;
        };
        let Some(item_id) = item_id(&fields) else {
            report
                .issues
                .push(issue(spec, path, format!("item {} has no id", position)));
            continue;
        };
        let url = spec.anchor_url(&item_id);
        report
            .records
            .push(build_record(spec, None, &item_id, url, &fields));
    }
}

fn build_record(
    spec: &CollectionSpec,
    slug: Option<&str>,
    item_id: &str,
    url: String,
    fields: &Map<String, Value>,
) -> ContentRecord {
    let id_slug = slug.unwrap_or(spec.name);
    ContentRecord {
        id: spec.record_id(id_slug, item_id),
        collection: spec.name.to_string(),
        slug: slug.map(str::to_string),
        title: string_field(fields, &["title"]).unwrap_or_default(),
        intro_text: string_field(fields, &["intro", "introText"]),
        tags: tags_field(fields),
        category: spec.category,
        city_slug: match spec.category {
            Category::CityGuide => slug.map(str::to_string),
            _ => None,
        },
        url,
        hero_image: string_field(fields, &["heroImage", "hero_image"]),
    }
}

fn item_id(fields: &Map<String, Value>) -> Option<String> {
    match fields.get("id")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn string_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.get(*key) {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
        _ => None,
    })
}

/// Tags are kept only when they are an array; non-string entries are dropped.
fn tags_field(fields: &Map<String, Value>) -> Vec<String> {
    match fields.get("tags") {
        Some(Value::Array(tags)) => tags
            .iter()
            .filter_map(|tag| tag.as_str())
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
