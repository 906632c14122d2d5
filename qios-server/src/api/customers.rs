//! Customers
//!
//! Aggregates (`totalSpent`, `totalTransactions`, `lastVisit`) are written by
//! the order flow only; create/update never touch them.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Customer, CustomerCreate, CustomerDetail, CustomerSegment, CustomerUpdate};

use super::{ApiResult, StoreQuery, ok};
use crate::auth::Access;
use crate::db;
use crate::error::internal;
use crate::state::AppState;
use crate::util::{now_millis, snowflake_id};
use crate::validation::{
    MAX_ADDRESS_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN,
    validate_optional_text, validate_required_text,
};

const RECENT_ORDERS: i64 = 10;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list).post(create))
        .route("/api/customers/{id}", get(get_by_id).put(update))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub store_id: i64,
    pub search: Option<String>,
    pub segment: Option<CustomerSegment>,
}

fn validate_contact(
    phone: &Option<String>,
    email: &Option<String>,
    address: &Option<String>,
    notes: &Option<String>,
) -> Result<(), AppError> {
    validate_optional_text(phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(notes, "notes", MAX_NOTE_LEN)?;
    Ok(())
}

/// GET /api/customers
pub async fn list(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Vec<Customer>> {
    access.ensure_store(q.store_id)?;
    let search = q.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let customers = db::customers::list(&state.pool, q.store_id, search, q.segment)
        .await
        .map_err(internal)?;
    ok(customers)
}

/// GET /api/customers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Path(id): Path<i64>,
    Query(q): Query<StoreQuery>,
) -> ApiResult<CustomerDetail> {
    access.ensure_store(q.store_id)?;
    let customer = db::customers::find(&state.pool, q.store_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;
    let recent_orders =
        db::orders::recent_for_customer(&state.pool, q.store_id, id, RECENT_ORDERS)
            .await
            .map_err(internal)?;
    ok(CustomerDetail {
        customer,
        recent_orders,
    })
}

/// POST /api/customers
pub async fn create(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Json(data): Json<CustomerCreate>,
) -> ApiResult<Customer> {
    access.ensure_store(data.store_id)?;
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_contact(&data.phone, &data.email, &data.address, &data.notes)?;

    let mut conn = state.pool.acquire().await.map_err(internal)?;
    let customer = db::customers::create(&mut *conn, snowflake_id(), &data, now_millis())
        .await
        .map_err(internal)?;
    tracing::info!(store_id = customer.store_id, customer_id = customer.id, "Customer created");
    ok(customer)
}

/// PUT /api/customers/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Path(id): Path<i64>,
    Json(data): Json<CustomerUpdate>,
) -> ApiResult<Customer> {
    access.ensure_store(data.store_id)?;
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_contact(&data.phone, &data.email, &data.address, &data.notes)?;

    let customer = db::customers::update(&state.pool, id, &data, now_millis())
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;
    ok(customer)
}
