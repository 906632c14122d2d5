//! Orders

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{OrderCreate, OrderDetail, OrderStatus, OrderSummary};

use super::{ApiResult, StoreQuery, ok};
use crate::auth::Access;
use crate::db;
use crate::db::orders::OrderFilter;
use crate::error::internal;
use crate::orders;
use crate::state::AppState;

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list).post(create))
        .route("/api/orders/{id}", get(get_by_id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub store_id: i64,
    pub status: Option<OrderStatus>,
    /// Unix millis, inclusive
    pub from: Option<i64>,
    /// Unix millis, exclusive
    pub to: Option<i64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<OrderSummary>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// `(page, per_page, offset)` with page ≥ 1 and per_page in 1..=100
pub fn pagination(page: Option<i64>, per_page: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    (page, per_page, (page - 1).saturating_mul(per_page))
}

/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Json(data): Json<OrderCreate>,
) -> ApiResult<OrderDetail> {
    access.ensure_store(data.store_id)?;
    let order = orders::create_order(&state.pool, &data).await?;
    ok(order)
}

/// GET /api/orders
pub async fn list(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<ListQuery>,
) -> ApiResult<OrderPage> {
    access.ensure_store(q.store_id)?;
    let (page, per_page, offset) = pagination(q.page, q.per_page);
    let filter = OrderFilter {
        status: q.status,
        from: q.from,
        to: q.to,
        customer_id: None,
    };
    let (orders, total) = db::orders::list(&state.pool, q.store_id, &filter, per_page, offset)
        .await
        .map_err(internal)?;
    ok(OrderPage {
        orders,
        total,
        page,
        per_page,
    })
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Path(id): Path<i64>,
    Query(q): Query<StoreQuery>,
) -> ApiResult<OrderDetail> {
    access.ensure_store(q.store_id)?;
    let order = db::orders::find(&state.pool, q.store_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    let customer_name = match order.customer_id {
        Some(customer_id) => db::customers::find(&state.pool, q.store_id, customer_id)
            .await
            .map_err(internal)?
            .map(|c| c.name),
        None => None,
    };
    let items = db::orders::items(&state.pool, id).await.map_err(internal)?;
    ok(OrderDetail {
        order,
        customer_name,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(pagination(None, None), (1, 20, 0));
        assert_eq!(pagination(Some(3), Some(10)), (3, 10, 20));
        assert_eq!(pagination(Some(0), Some(1000)), (1, 100, 0));
        assert_eq!(pagination(Some(-2), Some(0)), (1, 1, 0));
    }

    #[test]
    fn huge_page_saturates_offset() {
        let (page, per_page, offset) = pagination(Some(i64::MAX), Some(100));
        assert_eq!((page, per_page), (i64::MAX, 100));
        assert_eq!(offset, i64::MAX);
    }
}
