use std::sync::Arc;
use taiwanme_search::config::AppConfig;
use taiwanme_search::create_router;
use taiwanme_search::search::service::SearchService;
use taiwanme_search::sitemap::builder::write_sitemap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| level.trim().parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::fmt().with_max_level(log_level).init();

    let config = AppConfig::load()?;

    // 1. Offline sitemap generation:
    if let Some(output) = &config.generate_sitemap {
        let count = write_sitemap(&config.content_root, &config.base_url, output)?;
        tracing::info!("Wrote {} sitemap entries to {}", count, output.display());
        return Ok(());
    }

    tracing::info!("Content root: {}", config.content_root.display());
    tracing::info!("Index mode: {}", config.search.index_mode.as_str());

    // 2. Search service (owned, passed to handlers):
    let service = Arc::new(SearchService::new(
        config.content_root.clone(),
        config.search.clone(),
    ));

    // 3. HTTP Router:
    let bind_addr = config.bind_addr;
    let app = create_router(Arc::new(config), service);

    // 4. Start HTTP server:
    tracing::info!("Search API listening on http://{}/api/search", bind_addr);
    tracing::info!("Sitemap available at http://{}/sitemap.xml", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
