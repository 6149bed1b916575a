//! HTTP API over a built recommender.

pub mod routes;

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::index::SimilarityIndex;
use crate::metrics::MetricsCollector;
use crate::recommender::Recommender;

/// Shared application state for the HTTP server.
///
/// The recommender is read-only and shared without a lock; only the metrics
/// collector is mutated per request.
pub struct AppState<I: SimilarityIndex> {
    pub recommender: Recommender<I>,
    pub metrics: RwLock<MetricsCollector>,
    pub default_count: usize,
}

impl<I: SimilarityIndex> AppState<I> {
    pub fn new(recommender: Recommender<I>, default_count: usize) -> Self {
        Self {
            recommender,
            metrics: RwLock::new(MetricsCollector::new()),
            default_count,
        }
    }
}

/// Serve the API on `addr` until the process is stopped.
pub async fn serve<I: SimilarityIndex + 'static>(addr: &str, state: AppState<I>) -> anyhow::Result<()> {
    let app = routes::create_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
