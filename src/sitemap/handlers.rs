use super::builder::{build_sitemap, render_sitemap_xml};
use crate::config::AppConfig;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use std::sync::Arc;

pub async fn handle_sitemap(Extension(config): Extension<Arc<AppConfig>>) -> Response {
    let root = config.content_root.clone();
    let base_url = config.base_url.clone();

    let built = tokio::task::spawn_blocking(move || build_sitemap(&root, &base_url)).await;

    match built {
        Ok(Ok(entries)) => {
            tracing::debug!("Serving sitemap with {} entries", entries.len());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/xml")],
                render_sitemap_xml(&entries),
            )
                .into_response()
        }
        Ok(Err(err)) => {
            tracing::error!("Failed to build sitemap: {:#}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error generating sitemap").into_response()
        }
        Err(err) => {
            tracing::error!("Sitemap task failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error generating sitemap").into_response()
        }
    }
}
