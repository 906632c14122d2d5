//! AI analytics
//!
//! GET /api/analytics/{insights,sales,inventory,customers}?storeId

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Extension, Router};
use shared::models::Insight;
use shared::util::start_of_day_wib;

use super::dashboard::{window_start, zero_fill};
use super::{ApiResult, StoreQuery, ok};
use crate::ai::{generate_insights, prompts};
use crate::auth::Access;
use crate::db;
use crate::error::internal;
use crate::state::AppState;
use crate::util::now_millis;

/// Days of history summarized in a prompt
const HISTORY_DAYS: i64 = 7;
const SALES_HISTORY_DAYS: i64 = 30;
const TOP_PRODUCTS: i64 = 10;
const TOP_CUSTOMERS: usize = 10;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/analytics/insights", get(insights))
        .route("/api/analytics/sales", get(sales))
        .route("/api/analytics/inventory", get(inventory))
        .route("/api/analytics/customers", get(customers))
}

async fn run(state: &AppState, store_id: i64, topic: &str, prompt: String) -> ApiResult<Vec<Insight>> {
    tracing::info!(store_id, topic, "Generating AI insights");
    let insights = generate_insights(state.ai.as_deref(), &prompt).await?;
    ok(insights)
}

/// GET /api/analytics/insights
pub async fn insights(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<StoreQuery>,
) -> ApiResult<Vec<Insight>> {
    access.ensure_store(q.store_id)?;
    let now = now_millis();
    let from = window_start(now, HISTORY_DAYS);

    let stats = db::dashboard::stats(&state.pool, q.store_id, start_of_day_wib(now))
        .await
        .map_err(internal)?;
    let rows = db::dashboard::daily_sales(&state.pool, q.store_id, from)
        .await
        .map_err(internal)?;
    let top = db::dashboard::top_products(&state.pool, q.store_id, from, TOP_PRODUCTS)
        .await
        .map_err(internal)?;
    let materials = db::raw_materials::list(&state.pool, q.store_id, false)
        .await
        .map_err(internal)?;
    let customers = db::dashboard::customer_overview(&state.pool, q.store_id, now)
        .await
        .map_err(internal)?;

    let week = zero_fill(&rows, from, HISTORY_DAYS);
    let prompt = prompts::insights_prompt(&stats, &week, &top, &materials, &customers);
    run(&state, q.store_id, "insights", prompt).await
}

/// GET /api/analytics/sales
pub async fn sales(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<StoreQuery>,
) -> ApiResult<Vec<Insight>> {
    access.ensure_store(q.store_id)?;
    let from = window_start(now_millis(), SALES_HISTORY_DAYS);

    let rows = db::dashboard::daily_sales(&state.pool, q.store_id, from)
        .await
        .map_err(internal)?;
    let top = db::dashboard::top_products(&state.pool, q.store_id, from, TOP_PRODUCTS)
        .await
        .map_err(internal)?;
    let payment_mix = db::dashboard::payment_mix(&state.pool, q.store_id, from)
        .await
        .map_err(internal)?;

    let history = zero_fill(&rows, from, SALES_HISTORY_DAYS);
    let prompt = prompts::sales_prompt(&history, &top, &payment_mix);
    run(&state, q.store_id, "sales", prompt).await
}

/// GET /api/analytics/inventory
pub async fn inventory(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<StoreQuery>,
) -> ApiResult<Vec<Insight>> {
    access.ensure_store(q.store_id)?;
    let from = window_start(now_millis(), HISTORY_DAYS);

    let materials = db::raw_materials::list(&state.pool, q.store_id, false)
        .await
        .map_err(internal)?;
    let products = db::products::list(&state.pool, q.store_id, None, None, false)
        .await
        .map_err(internal)?;
    let top = db::dashboard::top_products(&state.pool, q.store_id, from, TOP_PRODUCTS)
        .await
        .map_err(internal)?;

    let prompt = prompts::inventory_prompt(&materials, &products, &top);
    run(&state, q.store_id, "inventory", prompt).await
}

/// GET /api/analytics/customers
pub async fn customers(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<StoreQuery>,
) -> ApiResult<Vec<Insight>> {
    access.ensure_store(q.store_id)?;

    let overview = db::dashboard::customer_overview(&state.pool, q.store_id, now_millis())
        .await
        .map_err(internal)?;
    // Already ordered by total_spent desc
    let mut best = db::customers::list(&state.pool, q.store_id, None, None)
        .await
        .map_err(internal)?;
    best.truncate(TOP_CUSTOMERS);

    let prompt = prompts::customers_prompt(&overview, &best);
    run(&state, q.store_id, "customers", prompt).await
}
