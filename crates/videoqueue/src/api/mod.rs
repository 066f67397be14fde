use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

use crate::api::models::{ListQueueResponse, SubmitResponse, TriggerResponse};
use crate::queue::{QueueError, QueueItem, SharedQueueStore, StatusCounts, Submission};
use crate::trigger::{TriggerError, TriggerGateway};

pub mod error;
pub mod models;

pub use error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct ApiState {
    pub store: SharedQueueStore,
    /// `None` when the trigger settings were incomplete at startup.
    pub trigger: Option<TriggerGateway>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        // Queue
        .route("/queue", get(list_queue).post(submit_batch))
        .route("/queue/:id", get(get_item).delete(delete_item))
        // Worker dispatch
        .route(
            "/api/trigger-worker",
            post(trigger_worker).fallback(method_not_allowed),
        )
        // Health
        .route("/health", get(health))
        .with_state(state)
}

pub async fn list_queue(State(state): State<ApiState>) -> ApiResult<Json<ListQueueResponse>> {
    let items = state.store.list().await?;
    let counts = StatusCounts::from_items(&items);
    Ok(Json(ListQueueResponse { items, counts }))
}

pub async fn submit_batch(
    State(state): State<ApiState>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    let Json(body) = payload?;
    let batch = body.into_batch()?;
    let items = state.store.insert(batch).await?;
    info!(batch_size = items.len(), "queued video links");

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            inserted: items.len(),
            items,
        }),
    ))
}

pub async fn get_item(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<QueueItem>> {
    let item = state
        .store
        .get(id)
        .await?
        .ok_or(QueueError::NotFound(id))?;
    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.delete(id).await?;
    info!(item_id = %id, "deleted queue item");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn trigger_worker(State(state): State<ApiState>) -> ApiResult<Json<TriggerResponse>> {
    let gateway = state.trigger.as_ref().ok_or(TriggerError::MissingConfig)?;
    gateway.trigger().await?;
    Ok(Json(TriggerResponse::triggered()))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
