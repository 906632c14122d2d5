//! Development-only endpoints
//!
//! POST /api/dev/seed         - demo store with materials, recipe products, customers
//! POST /api/dev/reset        - delete all store-scoped rows (store and users stay)
//! POST /api/dev/cancel-order - cancel an order and restore its stock
//!
//! Outside `ENVIRONMENT=development` every route answers 404.

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderCancel, RawMaterialMovementType, StockMovementType, UserRole};
use sqlx::PgPool;

use super::{ApiResult, ok};
use crate::db;
use crate::db::movements::MaterialEntry;
use crate::db::seed;
use crate::error::{ServiceResult, internal};
use crate::orders;
use crate::state::AppState;
use crate::util::{hash_password, now_millis, snowflake_id};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/dev/seed", post(seed_demo))
        .route("/api/dev/reset", post(reset))
        .route("/api/dev/cancel-order", post(cancel_order))
        .layer(middleware::from_fn_with_state(state, dev_only))
}

async fn dev_only(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.config.is_development() {
        return AppError::new(ErrorCode::DevOnly).into_response();
    }
    next.run(request).await
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRequest {
    pub store_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    pub store_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub store_id: i64,
    /// Login of the demo owner, when one was created
    pub owner_email: Option<String>,
    pub raw_materials: usize,
    pub products: usize,
    pub customers: usize,
}

/// POST /api/dev/seed
pub async fn seed_demo(
    State(state): State<AppState>,
    body: Option<Json<SeedRequest>>,
) -> ApiResult<SeedSummary> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let existing = match request.store_id {
        Some(store_id) => db::stores::exists(&state.pool, store_id)
            .await
            .map_err(internal)?
            .then_some(store_id),
        None => None,
    };
    let hashed = hash_password(seed::DEMO_OWNER_PASSWORD).map_err(internal)?;

    let summary = seed_store(&state.pool, existing, &hashed).await?;
    tracing::info!(
        store_id = summary.store_id,
        products = summary.products,
        raw_materials = summary.raw_materials,
        "Demo data seeded"
    );
    ok(summary)
}

async fn seed_store(
    pool: &PgPool,
    existing: Option<i64>,
    hashed_password: &str,
) -> ServiceResult<SeedSummary> {
    let mut tx = pool.begin().await?;
    let now = now_millis();

    let (store_id, owner_email) = match existing {
        Some(store_id) => (store_id, None),
        None => {
            let store = db::stores::create(
                &mut *tx,
                snowflake_id(),
                seed::DEMO_STORE_NAME,
                Some("Jl. Braga No. 10, Bandung"),
                Some("022-1234567"),
                None,
                now,
            )
            .await?;
            let owner = if db::users::email_exists(&mut *tx, seed::DEMO_OWNER_EMAIL).await? {
                None
            } else {
                db::users::create(
                    &mut *tx,
                    snowflake_id(),
                    store.id,
                    seed::DEMO_OWNER_NAME,
                    seed::DEMO_OWNER_EMAIL,
                    hashed_password,
                    UserRole::Owner,
                    now,
                )
                .await?;
                Some(seed::DEMO_OWNER_EMAIL.to_string())
            };
            (store.id, owner)
        }
    };

    let materials = seed::raw_materials(store_id);
    let mut material_ids = Vec::with_capacity(materials.len());
    let mut entries = Vec::with_capacity(materials.len());
    for data in &materials {
        let material = db::raw_materials::create(&mut *tx, snowflake_id(), data, now).await?;
        material_ids.push(material.id);
        entries.push(MaterialEntry {
            raw_material_id: material.id,
            quantity: material.stock,
            stock_before: 0.0,
            stock_after: material.stock,
        });
    }
    db::movements::insert_material_movements(
        &mut *tx,
        store_id,
        RawMaterialMovementType::Restock,
        &entries,
        None,
        Some("Stok awal"),
        now,
    )
    .await?;

    let products = seed::products(store_id);
    let mut product_ids = Vec::with_capacity(products.len());
    let mut stocks = Vec::with_capacity(products.len());
    for demo in &products {
        let product = db::products::create(&mut *tx, snowflake_id(), &demo.data, now).await?;
        db::products::replace_recipe(&mut *tx, product.id, &demo.recipe_inputs(&material_ids))
            .await?;
        product_ids.push(product.id);
        stocks.push(product.stock_quantity);
    }
    db::movements::insert_stock_movements(
        &mut *tx,
        store_id,
        StockMovementType::Restock,
        &product_ids,
        &stocks,
        None,
        Some("Stok awal"),
        now,
    )
    .await?;

    let customers = seed::customers(store_id);
    for data in &customers {
        db::customers::create(&mut *tx, snowflake_id(), data, now).await?;
    }

    tx.commit().await?;
    Ok(SeedSummary {
        store_id,
        owner_email,
        raw_materials: materials.len(),
        products: products.len(),
        customers: customers.len(),
    })
}

/// POST /api/dev/reset
pub async fn reset(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> ApiResult<bool> {
    if !db::stores::exists(&state.pool, request.store_id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::StoreNotFound));
    }
    db::stores::reset_data(&state.pool, request.store_id)
        .await
        .map_err(internal)?;
    tracing::warn!(store_id = request.store_id, "Store data reset");
    ok(true)
}

/// POST /api/dev/cancel-order
pub async fn cancel_order(
    State(state): State<AppState>,
    Json(request): Json<OrderCancel>,
) -> ApiResult<Order> {
    let order = orders::cancel_order(&state.pool, request.store_id, request.order_id).await?;
    ok(order)
}
