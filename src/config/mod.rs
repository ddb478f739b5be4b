//! Runtime Configuration
//!
//! Collects every tunable of the service in one place. Values are read from the
//! environment first and may then be overridden by command-line flags.
//!
//! ## Sources
//! - **Environment**: `BIND_ADDR`, `PORT`, `CONTENT_DIR`, `SITE_BASE_URL`,
//!   `SEARCH_RESULT_CAP`, `SEARCH_FIELD_LIMIT`, `SEARCH_INDEX_MODE`.
//!   `LOG_LEVEL` is read by the binary before anything else so configuration warnings are logged.
//! - **Flags**: `--bind`, `--data`, `--base-url`, `--index-mode`, `--generate-sitemap`.

use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_CONTENT_DIR: &str = "data";
pub const DEFAULT_BASE_URL: &str = "https://taiwanme-dynamic.vercel.app";
pub const DEFAULT_RESULT_CAP: usize = 20;
pub const DEFAULT_FIELD_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

/// Default resolutions for the title, tags and intro fields.
pub const DEFAULT_TITLE_RESOLUTION: u8 = 9;
pub const DEFAULT_TAGS_RESOLUTION: u8 = 5;
pub const DEFAULT_INTRO_RESOLUTION: u8 = 1;

/// How the search index is kept between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// Load and build the index for every query.
    PerRequest,
    /// Keep a snapshot and rebuild it when the content fingerprint changes.
    Cached,
}

impl IndexMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "per_request" | "per-request" => Some(IndexMode::PerRequest),
            "cached" => Some(IndexMode::Cached),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexMode::PerRequest => "per_request",
            IndexMode::Cached => "cached",
        }
    }
}

/// Search tuning knobs.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of results returned for one query.
    pub result_cap: usize,
    /// Maximum number of hits taken from each indexed field.
    pub field_limit: usize,
    pub title_resolution: u8,
    pub tags_resolution: u8,
    pub intro_resolution: u8,
    pub index_mode: IndexMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_cap: DEFAULT_RESULT_CAP,
            field_limit: DEFAULT_FIELD_LIMIT,
            title_resolution: DEFAULT_TITLE_RESOLUTION,
            tags_resolution: DEFAULT_TAGS_RESOLUTION,
            intro_resolution: DEFAULT_INTRO_RESOLUTION,
            index_mode: IndexMode::Cached,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Root directory holding the content collections (`data/` in the site layout).
    pub content_root: PathBuf,
    /// Absolute site URL used for sitemap entries, without a trailing slash.
    pub base_url: String,
    /// When set, the binary writes the sitemap to this path and exits.
    pub generate_sitemap: Option<PathBuf>,
    pub search: SearchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 3000))),
            content_root: PathBuf::from(DEFAULT_CONTENT_DIR),
            base_url: DEFAULT_BASE_URL.to_string(),
            generate_sitemap: None,
            search: SearchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Builds the configuration from the process environment and arguments.
    pub fn load() -> anyhow::Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.apply_args(&args)?;
        Ok(config)
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("invalid BIND_ADDR '{}'", addr))?;
        } else if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => config.bind_addr.set_port(port),
                Err(_) => tracing::warn!("Ignoring invalid PORT '{}'", port),
            }
        }

        if let Some(dir) = lookup("CONTENT_DIR").filter(|v| !v.trim().is_empty()) {
            config.content_root = PathBuf::from(dir);
        }

        if let Some(url) = lookup("SITE_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = normalize_base_url(&url);
        }

        if let Some(cap) = lookup("SEARCH_RESULT_CAP") {
            config.search.result_cap = parse_limit("SEARCH_RESULT_CAP", &cap, DEFAULT_RESULT_CAP);
        }

        if let Some(limit) = lookup("SEARCH_FIELD_LIMIT") {
            config.search.field_limit =
                parse_limit("SEARCH_FIELD_LIMIT", &limit, DEFAULT_FIELD_LIMIT);
        }

        if let Some(mode) = lookup("SEARCH_INDEX_MODE") {
            match IndexMode::parse(&mode) {
                Some(mode) => config.search.index_mode = mode,
                None => tracing::warn!("Ignoring unknown SEARCH_INDEX_MODE '{}'", mode),
            }
        }

        Ok(config)
    }

    /// Applies command-line overrides on top of the environment values.
    pub fn apply_args(&mut self, args: &[String]) -> anyhow::Result<()> {
        let mut i = 0;
        while i < args.len() {
            let value = args.get(i + 1);
            match (args[i].as_str(), value) {
                ("--bind", Some(value)) => {
                    self.bind_addr = value
                        .parse()
                        .with_context(|| format!("invalid --bind '{}'", value))?;
                    i += 2;
                }
                ("--data", Some(value)) => {
                    self.content_root = PathBuf::from(value);
                    i += 2;
                }
                ("--base-url", Some(value)) => {
                    self.base_url = normalize_base_url(value);
                    i += 2;
                }
                ("--index-mode", Some(value)) => {
                    self.search.index_mode = IndexMode::parse(value)
                        .ok_or_else(|| anyhow::anyhow!("unknown --index-mode '{}'", value))?;
                    i += 2;
                }
                ("--generate-sitemap", Some(value)) => {
                    self.generate_sitemap = Some(PathBuf::from(value));
                    i += 2;
                }
                (
                    flag @ ("--bind" | "--data" | "--base-url" | "--index-mode"
                    | "--generate-sitemap"),
                    None,
                ) => {
                    return Err(anyhow::anyhow!("missing value for {}", flag));
                }
                (other, _) => {
                    tracing::warn!("Ignoring unknown argument '{}'", other);
                    i += 1;
                }
            }
        }
        Ok(())
    }
}

fn parse_limit(name: &str, raw: &str, default: usize) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(value) => value.clamp(1, MAX_LIMIT),
        Err(_) => {
            tracing::warn!("Ignoring invalid {} '{}', using {}", name, raw, default);
            default
        }
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
