//! HTTP route handlers for the recommendation API.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assembler::Recommendation;
use crate::error::RecommenderError;
use crate::index::SimilarityIndex;
use crate::server::AppState;

// --- Request/Response types ---

#[derive(Deserialize)]
pub struct TitleQuery {
    pub title: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct CountQuery {
    /// Signed so that negative counts reach validation instead of failing to parse.
    pub count: Option<i64>,
}

#[derive(Serialize)]
pub struct BookResponse {
    pub book_id: usize,
    pub title: String,
    pub authors: String,
}

#[derive(Serialize)]
pub struct RecommendationsResponse {
    pub seed_id: usize,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub items: usize,
    pub books: usize,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub total_requests: u64,
    pub failed_requests: u64,
    pub avg_latency_us: f64,
    pub p50_latency_us: f64,
    pub p95_latency_us: f64,
    pub p99_latency_us: f64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: RecommenderError) -> ApiError {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_invalid_argument() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

// --- Router ---

pub fn create_router<I: SimilarityIndex + 'static>(state: Arc<AppState<I>>) -> Router {
    Router::new()
        .route("/health", get(health::<I>))
        .route("/books", get(find_books::<I>))
        .route("/books/:id/recommendations", get(recommend::<I>))
        .route("/metrics", get(get_metrics::<I>))
        .with_state(state)
}

// --- Handlers ---

async fn health<I: SimilarityIndex + 'static>(
    State(state): State<Arc<AppState<I>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        items: state.recommender.store().len(),
        books: state.recommender.catalog().len(),
    })
}

/// Malformed path or query values are reported as InvalidArgument.
fn rejected(reason: String) -> RecommenderError {
    RecommenderError::invalid_argument(reason)
}

async fn find_books<I: SimilarityIndex + 'static>(
    State(state): State<Arc<AppState<I>>>,
    query: Result<Query<TitleQuery>, QueryRejection>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let Query(query) = query.map_err(|r| api_error(rejected(r.body_text())))?;
    let fragment = query.title.unwrap_or_default();
    let limit = query.limit.unwrap_or(20);

    let books = state
        .recommender
        .catalog()
        .find_by_title(&fragment)
        .into_iter()
        .take(limit)
        .map(|(book_id, info)| BookResponse {
            book_id,
            title: info.title.clone(),
            authors: info.authors.clone(),
        })
        .collect();

    Ok(Json(books))
}

async fn recommend<I: SimilarityIndex + 'static>(
    State(state): State<Arc<AppState<I>>>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<CountQuery>, QueryRejection>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let start = Instant::now();

    let result = request_params(path, query)
        .and_then(|(id, count)| validate_request(id, count, state.default_count))
        .and_then(|(seed_id, count)| {
            state
                .recommender
                .recommend(seed_id, count)
                .map(|recommendations| RecommendationsResponse {
                    seed_id,
                    recommendations,
                })
        });

    if let Ok(mut metrics) = state.metrics.write() {
        match &result {
            Ok(_) => metrics.record_request(start.elapsed()),
            Err(_) => metrics.record_failure(),
        }
    }

    result.map(Json).map_err(|e| {
        debug!(error = %e, "recommendation request rejected");
        api_error(e)
    })
}

fn request_params(
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<CountQuery>, QueryRejection>,
) -> Result<(i64, Option<i64>), RecommenderError> {
    let Path(id) = path.map_err(|r| rejected(r.body_text()))?;
    let Query(query) = query.map_err(|r| rejected(r.body_text()))?;
    Ok((id, query.count))
}

/// Map raw path/query values onto the recommender's domain. A negative id can
/// never be in the store; a non-positive count is always invalid.
fn validate_request(
    id: i64,
    count: Option<i64>,
    default_count: usize,
) -> Result<(usize, usize), RecommenderError> {
    let seed_id = usize::try_from(id).map_err(|_| RecommenderError::NotFound {
        what: "item",
        id: id.to_string(),
    })?;
    let count = match count {
        None => default_count,
        Some(c) if c <= 0 => {
            return Err(RecommenderError::invalid_argument(format!(
                "count must be positive, got {}",
                c
            )))
        }
        Some(c) => usize::try_from(c)
            .map_err(|_| RecommenderError::invalid_argument("count is too large"))?,
    };
    Ok((seed_id, count))
}

async fn get_metrics<I: SimilarityIndex + 'static>(
    State(state): State<Arc<AppState<I>>>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let metrics = state.metrics.read().map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Lock poisoned".to_string(),
            }),
        )
    })?;

    Ok(Json(MetricsResponse {
        total_requests: metrics.total_requests(),
        failed_requests: metrics.failed_requests(),
        avg_latency_us: metrics.avg_latency_us(),
        p50_latency_us: metrics.percentile_latency_us(50.0),
        p95_latency_us: metrics.percentile_latency_us(95.0),
        p99_latency_us: metrics.percentile_latency_us(99.0),
    }))
}
