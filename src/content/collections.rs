//! Collection Registry
//!
//! Describes every content collection of the site: its on-disk location relative
//! to the content root, the category its records carry and the public route used
//! to build record URLs.

use super::types::Category;
use std::path::{Path, PathBuf};

/// Where a collection lives under the content root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionLayout {
    /// A directory with one `<slug>.json` file per city or topic.
    Directory(&'static str),
    /// A single JSON file holding an array of items.
    ListFile(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSpec {
    pub name: &'static str,
    pub layout: CollectionLayout,
    pub category: Category,
    /// Public route prefix, e.g. `/search_by_city`.
    pub route: &'static str,
    /// Whether the site serves one page per array item (`<route>/<slug>/<id>`).
    pub article_routes: bool,
}

pub const CITY_GUIDES: CollectionSpec = CollectionSpec {
    name: "search_by_city",
    layout: CollectionLayout::Directory("search_by_city"),
    category: Category::CityGuide,
    route: "/search_by_city",
    article_routes: true,
};

pub const TRANSPORT: CollectionSpec = CollectionSpec {
    name: "transport",
    layout: CollectionLayout::Directory("transport"),
    category: Category::Transport,
    route: "/transport",
    article_routes: false,
};

pub const HIDDEN_GEMS: CollectionSpec = CollectionSpec {
    name: "hiddengems",
    layout: CollectionLayout::Directory("hiddengems"),
    category: Category::HiddenGem,
    route: "/hidden_gems",
    article_routes: false,
};

pub const DINING: CollectionSpec = CollectionSpec {
    name: "dining",
    layout: CollectionLayout::ListFile("dining.json"),
    category: Category::Dining,
    route: "/dining",
    article_routes: false,
};

pub const ENTERTAINMENT: CollectionSpec = CollectionSpec {
    name: "entertainment",
    layout: CollectionLayout::ListFile("entertainment.json"),
    category: Category::Entertainment,
    route: "/entertainment",
    article_routes: false,
};

/// All collections, in the order they are loaded and searched.
pub const DEFAULT_COLLECTIONS: &[CollectionSpec] =
    &[CITY_GUIDES, TRANSPORT, HIDDEN_GEMS, DINING, ENTERTAINMENT];

impl CollectionSpec {
    /// Absolute location of the collection directory or list file.
    pub fn location(&self, root: &Path) -> PathBuf {
        match self.layout {
            CollectionLayout::Directory(dir) => root.join(dir),
            CollectionLayout::ListFile(file) => root.join(file),
        }
    }

    /// URL of a whole file in a directory collection (`/hidden_gems/<slug>`).
    pub fn page_url(&self, slug: &str) -> String {
        format!("{}/{}", self.route, slug)
    }

    /// URL of one article inside a directory file (`/search_by_city/<slug>/<id>`).
    pub fn article_url(&self, slug: &str, item_id: &str) -> String {
        format!("{}/{}/{}", self.route, slug, item_id)
    }

    /// URL of one array item of a directory file. Collections without article
    /// routes link every item to the file's page.
    pub fn item_url(&self, slug: &str, item_id: &str) -> String {
        if self.article_routes {
            self.article_url(slug, item_id)
        } else {
            self.page_url(slug)
        }
    }

    /// URL of one entry of a list file, addressed by fragment (`/dining#<id>`).
    pub fn anchor_url(&self, item_id: &str) -> String {
        format!("{}#{}", self.route, item_id)
    }

    /// Globally unique record id: collection + slug + item id.
    pub fn record_id(&self, slug: &str, item_id: &str) -> String {
        format!("{}-{}-{}", self.name, slug, item_id)
    }
}
