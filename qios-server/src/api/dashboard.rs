//! Dashboard figures. Cancelled orders never count toward revenue.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Extension, Router};
use serde::Deserialize;
use shared::models::{DailySales, DashboardStats, OrderSummary, TopProduct};
use shared::util::start_of_day_wib;

use super::{ApiResult, StoreQuery, ok};
use crate::auth::Access;
use crate::db;
use crate::db::dashboard::{DAY_MS, WIB_OFFSET_MS};
use crate::db::orders::OrderFilter;
use crate::error::internal;
use crate::state::AppState;
use crate::util::now_millis;

const DEFAULT_DAYS: i64 = 7;
const MAX_DAYS: i64 = 90;
const DEFAULT_LIMIT: i64 = 5;
const MAX_LIMIT: i64 = 50;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard", get(stats))
        .route("/api/dashboard/sales", get(sales))
        .route("/api/dashboard/top-products", get(top_products))
        .route("/api/dashboard/recent-orders", get(recent_orders))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub store_id: i64,
    pub days: Option<i64>,
    pub limit: Option<i64>,
}

fn clamp_days(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_DAYS).clamp(1, MAX_DAYS)
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Start of the first day of a `days`-long window ending today (UTC+7)
pub(crate) fn window_start(now: i64, days: i64) -> i64 {
    start_of_day_wib(now) - (days - 1) * DAY_MS
}

/// One entry per day from `from`, oldest first; days without rows get zeros.
/// `rows` are `(day_index, revenue, orders)` with `day_index` counted in UTC+7 days.
pub fn zero_fill(rows: &[(i64, f64, i64)], from: i64, days: i64) -> Vec<DailySales> {
    let first = (from + WIB_OFFSET_MS).div_euclid(DAY_MS);
    (first..first + days)
        .map(|day| {
            let (revenue, orders) = rows
                .iter()
                .find(|(d, _, _)| *d == day)
                .map(|(_, revenue, orders)| (*revenue, *orders))
                .unwrap_or((0.0, 0));
            let date = chrono::DateTime::from_timestamp_millis(day * DAY_MS)
                .unwrap_or_default()
                .format("%Y-%m-%d")
                .to_string();
            DailySales {
                date,
                revenue,
                orders,
            }
        })
        .collect()
}

/// GET /api/dashboard
pub async fn stats(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<StoreQuery>,
) -> ApiResult<DashboardStats> {
    access.ensure_store(q.store_id)?;
    let stats = db::dashboard::stats(&state.pool, q.store_id, start_of_day_wib(now_millis()))
        .await
        .map_err(internal)?;
    ok(stats)
}

/// GET /api/dashboard/sales
pub async fn sales(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<RangeQuery>,
) -> ApiResult<Vec<DailySales>> {
    access.ensure_store(q.store_id)?;
    let days = clamp_days(q.days);
    let from = window_start(now_millis(), days);
    let rows = db::dashboard::daily_sales(&state.pool, q.store_id, from)
        .await
        .map_err(internal)?;
    ok(zero_fill(&rows, from, days))
}

/// GET /api/dashboard/top-products
pub async fn top_products(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<RangeQuery>,
) -> ApiResult<Vec<TopProduct>> {
    access.ensure_store(q.store_id)?;
    let from = window_start(now_millis(), clamp_days(q.days));
    let rows = db::dashboard::top_products(&state.pool, q.store_id, from, clamp_limit(q.limit))
        .await
        .map_err(internal)?;
    ok(rows)
}

/// GET /api/dashboard/recent-orders
pub async fn recent_orders(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Query(q): Query<RangeQuery>,
) -> ApiResult<Vec<OrderSummary>> {
    access.ensure_store(q.store_id)?;
    let (orders, _) = db::orders::list(
        &state.pool,
        q.store_id,
        &OrderFilter::default(),
        clamp_limit(q.limit),
        0,
    )
    .await
    .map_err(internal)?;
    ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-03-11 00:00 WIB
    const DAY_START: i64 = 1_741_626_000_000;

    #[test]
    fn window_covers_today_and_previous_days() {
        let now = DAY_START + 5 * 60 * 60 * 1000;
        assert_eq!(window_start(now, 1), DAY_START);
        assert_eq!(window_start(now, 7), DAY_START - 6 * DAY_MS);
    }

    #[test]
    fn missing_days_are_zero_filled() {
        let from = DAY_START - 2 * DAY_MS;
        let first = (from + WIB_OFFSET_MS) / DAY_MS;
        let rows = vec![(first, 150_000.0, 3), (first + 2, 55_500.0, 1)];

        let sales = zero_fill(&rows, from, 3);
        let dates: Vec<&str> = sales.iter().map(|s| s.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-03-09", "2025-03-10", "2025-03-11"]);
        assert_eq!(sales[0].revenue, 150_000.0);
        assert_eq!(sales[1].revenue, 0.0);
        assert_eq!(sales[1].orders, 0);
        assert_eq!(sales[2].orders, 1);
    }

    #[test]
    fn day_range_is_bounded() {
        assert_eq!(clamp_days(None), 7);
        assert_eq!(clamp_days(Some(365)), 90);
        assert_eq!(clamp_days(Some(0)), 1);
    }
}
