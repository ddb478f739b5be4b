use crate::content::collections::{CITY_GUIDES, HIDDEN_GEMS, TRANSPORT};
use crate::content::loader::{list_collection_slugs, load_collection};

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Pages that exist regardless of content.
pub const STATIC_PAGES: &[&str] = &[
    "",
    "/culture",
    "/festivals",
    "/search_by_city",
    "/transport",
    "/dining",
    "/entertainment",
    "/souvenirs",
    "/philosophy",
];

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub changefreq: &'static str,
    pub priority: f32,
}

impl SitemapEntry {
    fn new(base_url: &str, path: &str, changefreq: &'static str, priority: f32) -> Self {
        Self {
            loc: format!("{}{}", base_url, path),
            changefreq,
            priority,
        }
    }
}

/// Enumerates every public URL of the site.
///
/// City files contribute their list page even when their articles cannot be read.
pub fn build_sitemap(root: &Path, base_url: &str) -> Result<Vec<SitemapEntry>> {
    let base_url = base_url.trim_end_matches('/');
    let mut entries: Vec<SitemapEntry> = STATIC_PAGES
        .iter()
        .map(|page| SitemapEntry::new(base_url, page, "weekly", 0.8))
        .collect();

    let city_slugs = list_collection_slugs(root, &CITY_GUIDES)?;
    let articles = load_collection(root, &CITY_GUIDES)?;
    for slug in &city_slugs {
        let page = CITY_GUIDES.page_url(slug);
        entries.push(SitemapEntry::new(base_url, &page, "weekly", 0.8));

        let mut seen: HashSet<&str> = HashSet::new();
        for article in articles
            .records
            .iter()
            .filter(|record| record.slug.as_deref() == Some(slug.as_str()))
            .filter(|record| record.url != page)
        {
            if seen.insert(article.url.as_str()) {
                entries.push(SitemapEntry::new(base_url, &article.url, "monthly", 0.6));
            }
        }
    }

    for spec in [&HIDDEN_GEMS, &TRANSPORT] {
        for slug in list_collection_slugs(root, spec)? {
            entries.push(SitemapEntry::new(
                base_url,
                &spec.page_url(&slug),
                "monthly",
                0.7,
            ));
        }
    }

    Ok(entries)
}

/// Renders entries as a sitemaps.org `urlset` document.
pub fn render_sitemap_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str("    <url>\n");
        xml.push_str(&format!("        <loc>{}</loc>\n", escape_xml(&entry.loc)));
        xml.push_str(&format!(
            "        <changefreq>{}</changefreq>\n",
            entry.changefreq
        ));
        xml.push_str(&format!(
            "        <priority>{:.1}</priority>\n",
            entry.priority
        ));
        xml.push_str("    </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Builds the sitemap and writes it to `output`, creating the parent directory.
pub fn write_sitemap(root: &Path, base_url: &str, output: &Path) -> Result<usize> {
    let entries = build_sitemap(root, base_url)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(output, render_sitemap_xml(&entries))
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(entries.len())
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
