//! Route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::AppState;
use crate::settings::WorkgroupId;

/// Images are always labelled JPEG, whatever the stored format.
const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

const NOTIFY_SECRET_HEADER: &str = "x-notify-secret";

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct ImageQuery {
    workgroup: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: i64,
    cached_workgroups: u64,
    change_subscribers: usize,
    invalidation_listener: &'static str,
    caches: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ChangeAccepted {
    workgroup: WorkgroupId,
    subscribers: usize,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/images/:name", get(get_image))
        .route("/workgroups/:workgroup/settings/:key", get(get_setting))
        .route("/workgroups/:workgroup/changed", post(workgroup_changed))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        cached_workgroups: state.settings.entry_count(),
        change_subscribers: state.notifier.subscriber_count(),
        invalidation_listener: if state.listener.is_finished() {
            "stopped"
        } else {
            "running"
        },
        caches: state.cache.cache_names(),
    })
}

/// Image bytes for `name`. Always 200: failures serve the blank image.
async fn get_image(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Response {
    let workgroup = query
        .workgroup
        .as_deref()
        .and_then(|raw| match WorkgroupId::parse(raw) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(image = %name, error = %e, "Ignoring workgroup parameter");
                None
            }
        });

    let bytes = state.images.resolve_image(&name, workgroup.as_ref()).await;
    ([(header::CONTENT_TYPE, IMAGE_CONTENT_TYPE)], bytes).into_response()
}

async fn get_setting(
    State(state): State<AppState>,
    Path((workgroup, key)): Path<(String, String)>,
) -> Response {
    let workgroup = match WorkgroupId::parse(&workgroup) {
        Ok(id) => id,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match state.settings.get(&workgroup, &key).await {
        Some(slot) => Json(slot).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Setting not found"),
    }
}

/// Entry point for change notifications from the workgroup service.
async fn workgroup_changed(
    State(state): State<AppState>,
    Path(workgroup): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Some(secret) = &state.notify_secret {
        let provided = headers
            .get(NOTIFY_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided != Some(secret.as_ref()) {
            warn!(workgroup = %workgroup, "Rejected change notification with bad secret");
            return error_response(StatusCode::UNAUTHORIZED, "Invalid notification secret");
        }
    }

    let workgroup = match WorkgroupId::parse(&workgroup) {
        Ok(id) => id,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let subscribers = state.notifier.notify(workgroup.clone());
    debug!(workgroup = %workgroup, subscribers, "Change notification accepted");

    (
        StatusCode::ACCEPTED,
        Json(ChangeAccepted {
            workgroup,
            subscribers,
        }),
    )
        .into_response()
}
