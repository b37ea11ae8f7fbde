//! HTTP request layer
//!
//! One `POST` route per registered job, taking a JSON array of records and
//! answering with the job's shaped output, plus `GET /health`.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::HealthResponse;

use anyhow::Result;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::engine::Engine;
use crate::job::JobRegistry;
use crate::store::KeyValueStore;

/// Shared API state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub registry: Arc<JobRegistry>,
    pub store: Arc<dyn KeyValueStore>,
}

/// Build the router with a route for every registered job
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new().route("/health", get(handlers::health));

    for job in state.registry.iter() {
        let job_id = job.id;
        router = router.route(
            &job.endpoint,
            post(
                move |State(state): State<AppState>, Json(payload): Json<Vec<Value>>| async move {
                    handlers::run_job(state, job_id, payload).await
                },
            ),
        );
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    for job in state.registry.iter() {
        info!("POST {} -> {} (job {})", job.endpoint, job.name, job.id);
    }
    let app = build_router(state);

    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
