use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use slate_core::protocol::{
    FullSyncRequest, FullSyncResponse, PullRequest, PullResponse, PushRequest, PushResponse,
};

use crate::auth::{extract_bearer_token, verify_token, AuthenticatedUser};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::reconciler::Reconciler;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    reconciler: Reconciler,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, reconciler: Reconciler) -> Self {
        Self { config, reconciler }
    }
}

pub fn app_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/sync/push", post(sync_push))
        .route("/sync/pull", post(sync_pull))
        .route("/sync/full", post(sync_full))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/v1", protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
    })
}

async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())?;
    let user = verify_token(&state.config.jwt_secret, token)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn sync_push(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<PushRequest>,
) -> Result<Json<PushResponse>, AppError> {
    let response = state.reconciler.apply_push(&user.user_id, &request).await?;
    tracing::info!(
        endpoint = "sync_push",
        lists = response.synced_lists,
        tasks = response.synced_tasks,
        tombstones = response.deleted_lists + response.deleted_tasks,
        "Applied push batch"
    );
    Ok(Json(response))
}

async fn sync_pull(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<PullRequest>,
) -> Result<Json<PullResponse>, AppError> {
    let response = state
        .reconciler
        .delta(&user.user_id, request.last_sync)
        .await?;
    tracing::info!(
        endpoint = "sync_pull",
        lists = response.lists.len(),
        tasks = response.tasks.len(),
        deleted = response.deleted_list_ids.len() + response.deleted_task_ids.len(),
        cursor = response.server_time,
        "Served pull delta"
    );
    Ok(Json(response))
}

async fn sync_full(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<FullSyncRequest>,
) -> Result<Json<FullSyncResponse>, AppError> {
    let response = state.reconciler.full_sync(&user.user_id, &request).await?;
    tracing::info!(
        endpoint = "sync_full",
        pushed = response.push.synced_lists + response.push.synced_tasks,
        pulled = response.pull.lists.len() + response.pull.tasks.len(),
        cursor = response.pull.server_time,
        "Completed full sync round trip"
    );
    Ok(Json(response))
}
