use actix_web::{web, HttpResponse};
use std::sync::Arc;
use validator::Validate;

use crate::core::{Recommender, SearchEngine};
use crate::models::{HealthResponse, RecommendRequest, RecommendResponse, SearchRequest, SearchResult};
use crate::routes::ApiError;
use crate::services::{CacheKey, CacheManager, CreatorRepository};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: SearchEngine,
    pub recommender: Recommender,
    pub repository: Arc<dyn CreatorRepository>,
    pub cache: Option<Arc<CacheManager>>,
}

/// Configure all creator-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/creators/search", web::post().to(search_creators))
        .route("/creators/interpret", web::post().to(interpret_query))
        .route("/recommendations", web::post().to(recommend_creators))
        .route("/cache/stats", web::get().to(cache_stats))
        .route("/cache/invalidate", web::post().to(invalidate_cache));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let healthy = match state.repository.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Repository health check failed: {}", e);
            false
        }
    };

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

async fn cached<T: for<'de> serde::Deserialize<'de>>(state: &AppState, key: &str) -> Option<T> {
    let cache = state.cache.as_ref()?;
    match cache.get(key).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Cache read failed for {}: {}", key, e);
            None
        }
    }
}

async fn store<T: serde::Serialize>(state: &AppState, key: &str, value: &T) {
    if let Some(cache) = &state.cache {
        if let Err(e) = cache.set(key, value).await {
            tracing::warn!("Cache write failed for {}: {}", key, e);
        }
    }
}

/// Creator search endpoint
///
/// POST /api/v1/creators/search
///
/// Request body:
/// ```json
/// {
///   "query": "string",
///   "presetCriteria": { ... },
///   "page": 1
/// }
/// ```
async fn search_creators(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for search request: {:?}", errors);
        return Err(ApiError::bad_request("Validation failed", errors.to_string()));
    }

    let key = CacheKey::search(&req);
    if let Some(result) = cached::<SearchResult>(&state, &key).await {
        tracing::debug!("Serving search from cache");
        return Ok(HttpResponse::Ok().json(result));
    }

    tracing::info!("Searching creators for query: {:?}", req.query);

    let (_, result) = state
        .engine
        .search(&req.query, req.preset_criteria.as_ref(), req.page)
        .await
        .map_err(|e| {
            tracing::error!("Search failed: {}", e);
            ApiError::internal("Search failed", e.to_string())
        })?;

    store(&state, &key, &result).await;

    Ok(HttpResponse::Ok().json(result))
}

/// Query interpretation preview
///
/// POST /api/v1/creators/interpret
///
/// Returns the validated criteria a search would run with, without running it.
async fn interpret_query(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        return Err(ApiError::bad_request("Validation failed", errors.to_string()));
    }

    let mut criteria = state
        .engine
        .interpret(&req.query, req.preset_criteria.as_ref())
        .await;
    if let Some(page) = req.page {
        criteria.page = page.max(1);
    }

    Ok(HttpResponse::Ok().json(criteria))
}

/// Campaign recommendations endpoint
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "campaign": {
///     "vertical": "casino",
///     "region": "MEXICO",
///     "budget": 5000,
///     "minVerticalFit": 40,
///     "platforms": ["kick"],
///     "count": 20
///   }
/// }
/// ```
async fn recommend_creators(
    state: web::Data<AppState>,
    req: web::Json<RecommendRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommendation request: {:?}", errors);
        return Err(ApiError::bad_request("Validation failed", errors.to_string()));
    }

    let request_id = uuid::Uuid::new_v4().to_string();

    let key = CacheKey::recommendations(&req);
    if let Some(mut response) = cached::<RecommendResponse>(&state, &key).await {
        response.request_id = request_id;
        return Ok(HttpResponse::Ok().json(response));
    }

    tracing::info!(
        "Recommending {} creators (request {}, user {:?})",
        req.campaign.count,
        request_id,
        req.user_id
    );

    let outcome = state
        .recommender
        .recommend(&req.campaign, req.user_id.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Recommendation failed for request {}: {}", request_id, e);
            ApiError::internal("Recommendation failed", e.to_string())
        })?;

    let response = RecommendResponse {
        request_id,
        tier_counts: outcome.tier_counts(),
        total_candidates: outcome.total_candidates,
        creators: outcome.creators,
    };

    store(&state, &key, &response).await;

    Ok(HttpResponse::Ok().json(response))
}

fn cache_disabled() -> ApiError {
    ApiError::new(
        actix_web::http::StatusCode::NOT_FOUND,
        "cache_disabled",
        "Response caching is not enabled",
    )
}

/// GET /api/v1/cache/stats
async fn cache_stats(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let cache = state.cache.as_ref().ok_or_else(cache_disabled)?;
    Ok(HttpResponse::Ok().json(cache.stats()))
}

/// Flush cached responses after the creator store has been refreshed
///
/// POST /api/v1/cache/invalidate
async fn invalidate_cache(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let cache = state.cache.as_ref().ok_or_else(cache_disabled)?;

    cache.invalidate_all().await.map_err(|e| {
        tracing::error!("Cache invalidation failed: {}", e);
        ApiError::internal("Cache invalidation failed", e.to_string())
    })?;

    tracing::info!("Cached responses invalidated");
    Ok(HttpResponse::NoContent().finish())
}
