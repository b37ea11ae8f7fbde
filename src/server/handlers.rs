use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use super::error::ApiError;
use super::AppState;
use crate::job::JobId;
use crate::store::HealthStatus;

/// Run `job_id` over the request body and answer with the job's shaped output
pub async fn run_job(
    state: AppState,
    job_id: JobId,
    payload: Vec<Value>,
) -> Result<Json<Value>, ApiError> {
    let job = state
        .registry
        .get(job_id)
        .ok_or_else(|| ApiError::not_found(format!("job {job_id} is not registered")))?;

    info!("Running {} over {} records", job.name, payload.len());
    let results = state.engine.run(job_id, payload).await.map_err(|e| {
        error!("Run of {} failed: {}", job.name, e);
        ApiError::from(e)
    })?;

    Ok(Json(job.shape_output(results)))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: HealthStatus,
    pub jobs: usize,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = match state.store.health_check().await {
        Ok(status) => status,
        Err(e) => HealthStatus::unhealthy("unknown", e.to_string()),
    };

    let (code, status) = if store.healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            store,
            jobs: state.registry.len(),
        }),
    )
}
