//! Product catalog and recipes

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    NotificationKind, Product, ProductCreate, ProductDetail, ProductStockAdjustment,
    ProductSummary, ProductUpdate, RecipeInput, RecipeReplace, StockMovementType,
};
use sqlx::{PgConnection, PgPool};

use super::inventory::crosses_min;
use super::{ApiResult, StoreQuery, ok};
use crate::auth::Access;
use crate::db;
use crate::db::notifications::NewNotification;
use crate::error::{ServiceResult, internal};
use crate::state::AppState;
use crate::util::{now_millis, snowflake_id};
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_amount,
    validate_optional_amount, validate_optional_text, validate_required_text,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/categories", get(categories))
        .route(
            "/api/products/{id}",
            get(get_by_id).put(update).delete(deactivate),
        )
        .route("/api/products/{id}/recipe", put(replace_recipe))
        .route("/api/products/{id}/adjust", post(adjust))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub store_id: i64,
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// Blank optional text becomes `None`
fn blank_to_none(value: &mut Option<String>) {
    if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
        *value = None;
    } else if let Some(v) = value {
        *v = v.trim().to_string();
    }
}

fn validate_stock_level(value: Option<i32>, field: &str) -> Result<(), AppError> {
    if value.is_some_and(|v| v < 0) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must not be negative"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// Unit stock after a signed delta; must stay ≥ 0
pub fn adjusted_units(before: i32, delta: i32) -> Result<i32, AppError> {
    match before.checked_add(delta) {
        Some(after) if after >= 0 => Ok(after),
        _ => Err(AppError::with_message(
            ErrorCode::InvalidStockAdjustment,
            "Stock cannot go below zero",
        )
        .with_detail("stock", before)
        .with_detail("quantity", delta)),
    }
}

/// Recipe lines: positive finite quantities, each raw material at most once.
/// Returns the raw material ids.
pub fn validate_recipe(lines: &[RecipeInput]) -> Result<Vec<i64>, AppError> {
    let mut seen = HashSet::new();
    for line in lines {
        if !line.quantity.is_finite() || line.quantity <= 0.0 {
            return Err(AppError::with_message(
                ErrorCode::RecipeInvalid,
                "Recipe quantity must be greater than 0",
            )
            .with_detail("rawMaterialId", line.raw_material_id));
        }
        if !seen.insert(line.raw_material_id) {
            return Err(AppError::with_message(
                ErrorCode::RecipeInvalid,
                "Raw material appears twice in the recipe",
            )
            .with_detail("rawMaterialId", line.raw_material_id));
        }
    }
    Ok(lines.iter().map(|l| l.raw_material_id).collect())
}

fn validate_create(data: &ProductCreate) -> Result<(), AppError> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&data.sku, "sku", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&data.unit, "unit", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.image_url, "imageUrl", MAX_URL_LEN)?;
    validate_amount(data.price, "price")?;
    validate_optional_amount(data.cost, "cost")?;
    validate_stock_level(data.stock_quantity, "stockQuantity")?;
    validate_stock_level(data.min_stock_level, "minStockLevel")?;
    validate_recipe(&data.recipe)?;
    Ok(())
}

fn validate_update(data: &ProductUpdate) -> Result<(), AppError> {
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&data.sku, "sku", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&data.unit, "unit", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.image_url, "imageUrl", MAX_URL_LEN)?;
    validate_optional_amount(data.price, "price")?;
    validate_optional_amount(data.cost, "cost")?;
    validate_stock_level(data.min_stock_level, "minStockLevel")?;
    Ok(())
}

/// Every recipe material must belong to the store
async fn check_materials(conn: &mut PgConnection, store_id: i64, ids: &[i64]) -> ServiceResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = db::raw_materials::count_in_store(conn, store_id, ids).await?;
    if found != ids.len() as i64 {
        return Err(AppError::new(ErrorCode::RawMaterialNotFound).into());
    }
    Ok(())
}

async fn ensure_sku_free(
    pool: &PgPool,
    store_id: i64,
    sku: Option<&str>,
    exclude_id: Option<i64>,
) -> Result<(), AppError> {
    let Some(sku) = sku else {
        return Ok(());
    };
    if db::products::sku_taken(pool, store_id, sku, exclude_id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::ProductSkuExists).with_detail("sku", sku));
    }
    Ok(())
}

/// GET /api/products
pub async fn list(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Vec<ProductSummary>> {
    access.ensure_store(q.store_id)?;
    let search = q.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let category = q.category.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let products =
        db::products::list(&state.pool, q.store_id, search, category, q.include_inactive)
            .await
            .map_err(internal)?;
    ok(products)
}

/// GET /api/products/categories
pub async fn categories(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<StoreQuery>,
) -> ApiResult<Vec<String>> {
    access.ensure_store(q.store_id)?;
    let categories = db::products::categories(&state.pool, q.store_id)
        .await
        .map_err(internal)?;
    ok(categories)
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Path(id): Path<i64>,
    Query(q): Query<StoreQuery>,
) -> ApiResult<ProductDetail> {
    access.ensure_store(q.store_id)?;
    let product = db::products::find(&state.pool, q.store_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    let recipe = db::products::recipe_lines(&state.pool, id)
        .await
        .map_err(internal)?;
    ok(ProductDetail { product, recipe })
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Json(mut data): Json<ProductCreate>,
) -> ApiResult<ProductDetail> {
    access.ensure_store(data.store_id)?;
    blank_to_none(&mut data.sku);
    blank_to_none(&mut data.category);
    validate_create(&data)?;
    ensure_sku_free(&state.pool, data.store_id, data.sku.as_deref(), None).await?;

    let product = create_with_recipe(&state.pool, &data).await?;
    let recipe = db::products::recipe_lines(&state.pool, product.id)
        .await
        .map_err(internal)?;
    tracing::info!(store_id = product.store_id, product_id = product.id, "Product created");
    ok(ProductDetail { product, recipe })
}

async fn create_with_recipe(pool: &PgPool, data: &ProductCreate) -> ServiceResult<Product> {
    let material_ids: Vec<i64> = data.recipe.iter().map(|l| l.raw_material_id).collect();
    let mut tx = pool.begin().await?;
    check_materials(&mut *tx, data.store_id, &material_ids).await?;

    let now = now_millis();
    let product = db::products::create(&mut *tx, snowflake_id(), data, now).await?;
    db::products::replace_recipe(&mut *tx, product.id, &data.recipe).await?;
    if product.stock_quantity > 0 {
        db::movements::insert_stock_movements(
            &mut *tx,
            product.store_id,
            StockMovementType::Restock,
            &[product.id],
            &[product.stock_quantity],
            None,
            Some("Stok awal"),
            now,
        )
        .await?;
    }
    tx.commit().await?;
    Ok(product)
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Path(id): Path<i64>,
    Json(mut data): Json<ProductUpdate>,
) -> ApiResult<Product> {
    access.ensure_store(data.store_id)?;
    blank_to_none(&mut data.sku);
    validate_update(&data)?;
    ensure_sku_free(&state.pool, data.store_id, data.sku.as_deref(), Some(id)).await?;

    let product = db::products::update(&state.pool, id, &data, now_millis())
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    ok(product)
}

/// DELETE /api/products/{id}: deactivates, history keeps its references
pub async fn deactivate(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Path(id): Path<i64>,
    Query(q): Query<StoreQuery>,
) -> ApiResult<bool> {
    access.ensure_store(q.store_id)?;
    let found = db::products::deactivate(&state.pool, q.store_id, id, now_millis())
        .await
        .map_err(internal)?;
    if !found {
        return Err(AppError::new(ErrorCode::ProductNotFound));
    }
    tracing::info!(store_id = q.store_id, product_id = id, "Product deactivated");
    ok(true)
}

/// PUT /api/products/{id}/recipe
pub async fn replace_recipe(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Path(id): Path<i64>,
    Json(data): Json<RecipeReplace>,
) -> ApiResult<ProductDetail> {
    access.ensure_store(data.store_id)?;
    let material_ids = validate_recipe(&data.lines)?;

    write_recipe(&state.pool, data.store_id, id, &material_ids, &data.lines).await?;

    let product = db::products::find(&state.pool, data.store_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    let recipe = db::products::recipe_lines(&state.pool, id)
        .await
        .map_err(internal)?;
    ok(ProductDetail { product, recipe })
}

async fn write_recipe(
    pool: &PgPool,
    store_id: i64,
    product_id: i64,
    material_ids: &[i64],
    lines: &[RecipeInput],
) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;
    if !db::products::lock_one(&mut *tx, store_id, product_id).await? {
        return Err(AppError::new(ErrorCode::ProductNotFound).into());
    }
    check_materials(&mut *tx, store_id, material_ids).await?;
    db::products::replace_recipe(&mut *tx, product_id, lines).await?;
    tx.commit().await?;
    Ok(())
}

/// POST /api/products/{id}/adjust
pub async fn adjust(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Path(id): Path<i64>,
    Json(data): Json<ProductStockAdjustment>,
) -> ApiResult<Product> {
    access.ensure_store(data.store_id)?;
    validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
    if !data.movement_type.accepts_manual_delta(data.quantity) {
        return Err(AppError::with_message(
            ErrorCode::InvalidStockAdjustment,
            "RESTOCK must be positive, ADJUSTMENT non-zero",
        )
        .with_detail("movementType", serde_json::json!(data.movement_type))
        .with_detail("quantity", data.quantity));
    }

    let product = apply_adjustment(&state.pool, id, &data).await?;
    tracing::info!(
        store_id = data.store_id,
        product_id = id,
        quantity = data.quantity,
        stock = product.stock_quantity,
        "Product stock adjusted"
    );
    ok(product)
}

async fn apply_adjustment(
    pool: &PgPool,
    id: i64,
    data: &ProductStockAdjustment,
) -> ServiceResult<Product> {
    let mut tx = pool.begin().await?;
    let product = db::products::lock_for_adjustment(&mut *tx, data.store_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    let before = product.stock_quantity;
    let after = adjusted_units(before, data.quantity)?;
    let now = now_millis();

    db::products::apply_stock_deltas(&mut *tx, &[id], &[data.quantity], now).await?;
    db::movements::insert_stock_movements(
        &mut *tx,
        data.store_id,
        data.movement_type,
        &[id],
        &[data.quantity],
        None,
        data.notes.as_deref(),
        now,
    )
    .await?;

    let min = product.min_stock_level;
    if crosses_min(f64::from(before), f64::from(after), f64::from(min)) {
        db::notifications::insert(
            &mut *tx,
            data.store_id,
            &NewNotification::new(
                NotificationKind::LowStock,
                "Stok produk menipis",
                format!("Stok {} tersisa {}", product.name, after),
            ),
            now,
        )
        .await?;
    }
    tx.commit().await?;

    Ok(Product {
        stock_quantity: after,
        updated_at: now,
        ..product
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(raw_material_id: i64, quantity: f64) -> RecipeInput {
        RecipeInput {
            raw_material_id,
            quantity,
        }
    }

    #[test]
    fn recipe_rules() {
        assert_eq!(validate_recipe(&[line(1, 0.5), line(2, 3.0)]).unwrap(), vec![1, 2]);
        assert!(validate_recipe(&[]).unwrap().is_empty());
        assert_eq!(
            validate_recipe(&[line(1, 0.0)]).unwrap_err().code,
            ErrorCode::RecipeInvalid
        );
        assert_eq!(
            validate_recipe(&[line(1, f64::NAN)]).unwrap_err().code,
            ErrorCode::RecipeInvalid
        );
        assert_eq!(
            validate_recipe(&[line(1, 1.0), line(1, 2.0)]).unwrap_err().code,
            ErrorCode::RecipeInvalid
        );
    }

    #[test]
    fn adjustment_keeps_units_non_negative() {
        assert_eq!(adjusted_units(0, 10).unwrap(), 10);
        assert_eq!(adjusted_units(5, -5).unwrap(), 0);
        assert_eq!(
            adjusted_units(5, -6).unwrap_err().code,
            ErrorCode::InvalidStockAdjustment
        );
        assert_eq!(
            adjusted_units(i32::MAX, 1).unwrap_err().code,
            ErrorCode::InvalidStockAdjustment
        );
    }

    #[test]
    fn blank_optional_text_is_cleared() {
        let mut sku = Some("  ".to_string());
        blank_to_none(&mut sku);
        assert_eq!(sku, None);
        let mut sku = Some(" KOPI-01 ".to_string());
        blank_to_none(&mut sku);
        assert_eq!(sku.as_deref(), Some("KOPI-01"));
    }

    #[test]
    fn negative_stock_is_rejected() {
        let data = ProductCreate {
            store_id: 1,
            name: "Kopi".into(),
            sku: None,
            category: None,
            description: None,
            price: 18_000.0,
            cost: None,
            stock_quantity: Some(-1),
            min_stock_level: None,
            unit: None,
            image_url: None,
            recipe: vec![],
        };
        assert_eq!(validate_create(&data).unwrap_err().code, ErrorCode::ValueOutOfRange);
    }
}
