use super::service::SearchService;
use super::types::{ErrorResponse, HealthResponse, ResponseItem, SearchParams};

use axum::extract::Query;
use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;

pub async fn handle_search(
    Query(pairs): Query<Vec<(String, String)>>,
    Extension(service): Extension<Arc<SearchService>>,
) -> Result<Json<Vec<ResponseItem>>, (StatusCode, Json<ErrorResponse>)> {
    let params = SearchParams::from_pairs(pairs);
    let query = params.q.as_deref().unwrap_or_default();
    tracing::debug!("Search request: q={:?}", query);

    match service.search(params.q.as_deref()).await {
        Ok(results) => {
            tracing::debug!("Returning {} results for {:?}", results.len(), query);
            Ok(Json(results))
        }
        Err(err) => {
            tracing::error!("Search failed for {:?}: {:#}", query, err);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("The search service failed to answer")),
            ))
        }
    }
}

pub async fn handle_health(
    Extension(service): Extension<Arc<SearchService>>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<ErrorResponse>)> {
    match service.snapshot().await {
        Ok(snapshot) => Ok(Json(HealthResponse {
            status: "ok".to_string(),
            documents: snapshot.index.len(),
            skipped: snapshot.skipped,
            build_id: snapshot.build_id.to_string(),
            index_mode: service.index_mode().as_str().to_string(),
        })),
        Err(err) => {
            tracing::error!("Health check failed: {:#}", err);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("The search index is unavailable")),
            ))
        }
    }
}
