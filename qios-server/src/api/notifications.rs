//! Notification feed

use axum::extract::{Query, State};
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use shared::models::{Notification, NotificationCreate, NotificationList, NotificationMarkRead};

use super::{ApiResult, ok};
use crate::auth::Access;
use crate::db;
use crate::db::notifications::NewNotification;
use crate::error::internal;
use crate::state::AppState;
use crate::util::now_millis;
use crate::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_required_text};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(list).post(create))
        .route("/api/notifications/read", put(mark_read))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub store_id: i64,
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

/// GET /api/notifications
pub async fn list(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<ListQuery>,
) -> ApiResult<NotificationList> {
    access.ensure_store(q.store_id)?;
    let limit = q.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let notifications = db::notifications::list(&state.pool, q.store_id, q.unread_only, limit)
        .await
        .map_err(internal)?;
    let unread_count = db::notifications::unread_count(&state.pool, q.store_id)
        .await
        .map_err(internal)?;
    ok(NotificationList {
        notifications,
        unread_count,
    })
}

/// POST /api/notifications
pub async fn create(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Json(data): Json<NotificationCreate>,
) -> ApiResult<Notification> {
    access.ensure_store(data.store_id)?;
    validate_required_text(&data.title, "title", MAX_NAME_LEN)?;
    validate_required_text(&data.message, "message", MAX_NOTE_LEN)?;

    let mut conn = state.pool.acquire().await.map_err(internal)?;
    let notification = db::notifications::insert(
        &mut *conn,
        data.store_id,
        &NewNotification::new(data.kind, data.title.trim(), data.message.trim()),
        now_millis(),
    )
    .await
    .map_err(internal)?;
    ok(notification)
}

/// PUT /api/notifications/read: returns the number of rows marked
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Json(data): Json<NotificationMarkRead>,
) -> ApiResult<u64> {
    access.ensure_store(data.store_id)?;
    let updated = db::notifications::mark_read(&state.pool, data.store_id, data.ids.as_deref())
        .await
        .map_err(internal)?;
    ok(updated)
}
