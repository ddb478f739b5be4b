//! Sitemap Module
//!
//! Turns the content collections into sitemaps.org URL entries.
//!
//! ## Responsibilities
//! - **Enumeration**: Static pages plus one entry per city, city article, hidden gem and
//!   transport topic, using the same directory listing as the content loader.
//! - **Rendering**: Serializes entries into `urlset` XML.
//! - **Delivery**: Served live at `/sitemap.xml` or written to a file by the binary.

pub mod builder;
pub mod handlers;
