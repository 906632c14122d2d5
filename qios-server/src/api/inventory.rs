//! Raw material inventory
//!
//! Every stock change goes through a row lock and appends a movement with
//! before/after values.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    NotificationKind, RawMaterial, RawMaterialCreate, RawMaterialMovement,
    RawMaterialMovementType, RawMaterialSummary, RawMaterialUpdate, StockAdjustment,
};
use sqlx::PgPool;

use super::{ApiResult, ok};
use crate::auth::Access;
use crate::db;
use crate::db::movements::MaterialEntry;
use crate::db::notifications::NewNotification;
use crate::error::{ServiceResult, internal};
use crate::orders::money::to_decimal;
use crate::orders::plan::quantity_f64;
use crate::state::AppState;
use crate::util::{now_millis, snowflake_id};
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_amount,
    validate_optional_text, validate_required_text,
};

const DEFAULT_MOVEMENT_LIMIT: i64 = 50;
const MAX_MOVEMENT_LIMIT: i64 = 500;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/inventory", get(list).post(create))
        .route("/api/inventory/movements", get(movements))
        .route("/api/inventory/{id}", put(update))
        .route("/api/inventory/{id}/adjust", post(adjust))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub store_id: i64,
    #[serde(default)]
    pub low_stock_only: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementQuery {
    pub store_id: i64,
    pub raw_material_id: Option<i64>,
    pub limit: Option<i64>,
}

/// Stock after applying a signed delta; must stay ≥ 0
pub fn adjusted_stock(before: f64, delta: f64) -> Result<f64, AppError> {
    let after = quantity_f64(to_decimal(before) + to_decimal(delta));
    if after < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidStockAdjustment,
            "Stock cannot go below zero",
        )
        .with_detail("stock", before)
        .with_detail("quantity", delta));
    }
    Ok(after)
}

/// True when a change moves the stock from above the minimum to at or below it
pub fn crosses_min(before: f64, after: f64, min_stock_level: f64) -> bool {
    before > min_stock_level && after <= min_stock_level
}

/// GET /api/inventory
pub async fn list(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Vec<RawMaterialSummary>> {
    access.ensure_store(q.store_id)?;
    let materials = db::raw_materials::list(&state.pool, q.store_id, q.low_stock_only)
        .await
        .map_err(internal)?;
    ok(materials)
}

/// POST /api/inventory
pub async fn create(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Json(data): Json<RawMaterialCreate>,
) -> ApiResult<RawMaterial> {
    access.ensure_store(data.store_id)?;
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&data.unit, "unit", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.supplier, "supplier", MAX_NAME_LEN)?;
    validate_optional_amount(data.stock, "stock")?;
    validate_optional_amount(data.min_stock_level, "minStockLevel")?;
    validate_optional_amount(data.cost_per_unit, "costPerUnit")?;

    let material = create_with_movement(&state.pool, &data).await?;
    tracing::info!(
        store_id = material.store_id,
        raw_material_id = material.id,
        "Raw material created"
    );
    ok(material)
}

async fn create_with_movement(pool: &PgPool, data: &RawMaterialCreate) -> ServiceResult<RawMaterial> {
    let mut tx = pool.begin().await?;
    let now = now_millis();
    let material = db::raw_materials::create(&mut *tx, snowflake_id(), data, now).await?;
    if material.stock > 0.0 {
        db::movements::insert_material_movements(
            &mut *tx,
            material.store_id,
            RawMaterialMovementType::Restock,
            &[MaterialEntry {
                raw_material_id: material.id,
                quantity: material.stock,
                stock_before: 0.0,
                stock_after: material.stock,
            }],
            None,
            Some("Stok awal"),
            now,
        )
        .await?;
    }
    tx.commit().await?;
    Ok(material)
}

/// PUT /api/inventory/{id}: metadata only, stock changes go through adjust
pub async fn update(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Path(id): Path<i64>,
    Json(data): Json<RawMaterialUpdate>,
) -> ApiResult<RawMaterial> {
    access.ensure_store(data.store_id)?;
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(unit) = &data.unit {
        validate_required_text(unit, "unit", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&data.supplier, "supplier", MAX_NAME_LEN)?;
    validate_optional_amount(data.min_stock_level, "minStockLevel")?;
    validate_optional_amount(data.cost_per_unit, "costPerUnit")?;

    let material = db::raw_materials::update(&state.pool, id, &data, now_millis())
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::RawMaterialNotFound))?;
    ok(material)
}

/// POST /api/inventory/{id}/adjust
pub async fn adjust(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Path(id): Path<i64>,
    Json(data): Json<StockAdjustment>,
) -> ApiResult<RawMaterial> {
    access.ensure_store(data.store_id)?;
    validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
    if !data.movement_type.accepts_manual_delta(data.quantity) {
        return Err(AppError::with_message(
            ErrorCode::InvalidStockAdjustment,
            "RESTOCK must be positive, WASTE negative, ADJUSTMENT non-zero",
        )
        .with_detail("movementType", serde_json::json!(data.movement_type))
        .with_detail("quantity", data.quantity));
    }

    let material = apply_adjustment(&state.pool, id, &data).await?;
    tracing::info!(
        store_id = data.store_id,
        raw_material_id = id,
        quantity = data.quantity,
        stock = material.stock,
        "Raw material stock adjusted"
    );
    ok(material)
}

async fn apply_adjustment(
    pool: &PgPool,
    id: i64,
    data: &StockAdjustment,
) -> ServiceResult<RawMaterial> {
    let mut tx = pool.begin().await?;
    let material = db::raw_materials::lock_one(&mut *tx, data.store_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RawMaterialNotFound))?;

    let before = material.stock;
    let after = adjusted_stock(before, data.quantity)?;
    let now = now_millis();

    db::raw_materials::set_stock(&mut *tx, id, after, now).await?;
    db::movements::insert_material_movements(
        &mut *tx,
        data.store_id,
        data.movement_type,
        &[MaterialEntry {
            raw_material_id: id,
            quantity: quantity_f64(to_decimal(after) - to_decimal(before)),
            stock_before: before,
            stock_after: after,
        }],
        None,
        data.notes.as_deref(),
        now,
    )
    .await?;

    if crosses_min(before, after, material.min_stock_level) {
        db::notifications::insert(
            &mut *tx,
            data.store_id,
            &NewNotification::new(
                NotificationKind::LowStock,
                "Stok bahan baku menipis",
                format!("Stok {} tersisa {} {}", material.name, after, material.unit),
            ),
            now,
        )
        .await?;
    }
    tx.commit().await?;

    Ok(RawMaterial {
        stock: after,
        updated_at: now,
        ..material
    })
}

/// GET /api/inventory/movements
pub async fn movements(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<MovementQuery>,
) -> ApiResult<Vec<RawMaterialMovement>> {
    access.ensure_store(q.store_id)?;
    let limit = q
        .limit
        .unwrap_or(DEFAULT_MOVEMENT_LIMIT)
        .clamp(1, MAX_MOVEMENT_LIMIT);
    let rows = db::movements::list_material_movements(
        &state.pool,
        q.store_id,
        q.raw_material_id,
        limit,
    )
    .await
    .map_err(internal)?;
    ok(rows)
}
