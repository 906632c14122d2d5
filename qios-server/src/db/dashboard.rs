//! Dashboard and analytics read queries
//!
//! Cancelled orders are excluded from every revenue figure.

use shared::models::{DashboardStats, TopProduct};
use sqlx::PgPool;

use super::BoxError;

/// Milliseconds between UTC and Asia/Jakarta
pub const WIB_OFFSET_MS: i64 = 7 * 60 * 60 * 1000;
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub async fn stats(pool: &PgPool, store_id: i64, day_start: i64) -> Result<DashboardStats, BoxError> {
    let today: (f64, i64) = sqlx::query_as(
        "SELECT COALESCE(SUM(total), 0)::double precision, COUNT(*)
         FROM orders WHERE store_id = $1 AND status = 'COMPLETED' AND created_at >= $2",
    )
    .bind(store_id)
    .bind(day_start)
    .fetch_one(pool)
    .await?;

    let counts: (i64, i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM customers WHERE store_id = $1),
            (SELECT COUNT(*) FROM products WHERE store_id = $1 AND is_active),
            (SELECT COUNT(*) FROM products
                WHERE store_id = $1 AND is_active AND stock_quantity <= min_stock_level),
            (SELECT COUNT(*) FROM raw_materials WHERE store_id = $1 AND stock <= min_stock_level),
            (SELECT COUNT(*) FROM notifications WHERE store_id = $1 AND NOT is_read)
        "#,
    )
    .bind(store_id)
    .fetch_one(pool)
    .await?;

    let (today_revenue, today_orders) = today;
    let average_order_value = if today_orders > 0 {
        crate::orders::money::to_f64(
            crate::orders::money::to_decimal(today_revenue) / rust_decimal::Decimal::from(today_orders),
        )
    } else {
        0.0
    };

    Ok(DashboardStats {
        today_revenue,
        today_orders,
        average_order_value,
        total_customers: counts.0,
        active_products: counts.1,
        low_stock_products: counts.2,
        low_stock_materials: counts.3,
        unread_notifications: counts.4,
    })
}

/// Completed-order revenue bucketed by UTC+7 day: `(day_index, revenue, orders)`
/// where `day_index = (created_at + 7h) / 1 day`.
pub async fn daily_sales(
    pool: &PgPool,
    store_id: i64,
    from: i64,
) -> Result<Vec<(i64, f64, i64)>, BoxError> {
    let rows: Vec<(i64, f64, i64)> = sqlx::query_as(
        r#"
        SELECT ((created_at + $3) / $4)::bigint AS day,
               COALESCE(SUM(total), 0)::double precision AS revenue,
               COUNT(*) AS orders
        FROM orders
        WHERE store_id = $1 AND status = 'COMPLETED' AND created_at >= $2
        GROUP BY day
        ORDER BY day
        "#,
    )
    .bind(store_id)
    .bind(from)
    .bind(WIB_OFFSET_MS)
    .bind(DAY_MS)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn top_products(
    pool: &PgPool,
    store_id: i64,
    from: i64,
    limit: i64,
) -> Result<Vec<TopProduct>, BoxError> {
    let rows = sqlx::query_as::<_, TopProduct>(
        r#"
        SELECT i.product_id, MAX(i.product_name) AS name,
               SUM(i.quantity)::bigint AS quantity_sold,
               SUM(i.total_price)::double precision AS revenue
        FROM order_items i
        JOIN orders o ON o.id = i.order_id
        WHERE o.store_id = $1 AND o.status = 'COMPLETED' AND o.created_at >= $2
        GROUP BY i.product_id
        ORDER BY quantity_sold DESC, revenue DESC
        LIMIT $3
        "#,
    )
    .bind(store_id)
    .bind(from)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Customer segment distribution for analytics prompts
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerOverview {
    pub total: i64,
    pub vip_count: i64,
    pub regular_count: i64,
    pub new_count: i64,
    pub average_spent: f64,
    pub inactive_30d: i64,
}

pub async fn customer_overview(
    pool: &PgPool,
    store_id: i64,
    now: i64,
) -> Result<CustomerOverview, BoxError> {
    let row = sqlx::query_as::<_, CustomerOverview>(
        r#"
        SELECT COUNT(*) AS total,
               COUNT(*) FILTER (WHERE segment = 'VIP') AS vip_count,
               COUNT(*) FILTER (WHERE segment = 'REGULAR') AS regular_count,
               COUNT(*) FILTER (WHERE segment = 'NEW') AS new_count,
               COALESCE(AVG(total_spent), 0)::double precision AS average_spent,
               COUNT(*) FILTER (WHERE last_visit IS NULL OR last_visit < $2) AS inactive_30d
        FROM customers WHERE store_id = $1
        "#,
    )
    .bind(store_id)
    .bind(now - 30 * DAY_MS)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Payment method mix of completed orders since `from`: `(method, orders, revenue)`
pub async fn payment_mix(
    pool: &PgPool,
    store_id: i64,
    from: i64,
) -> Result<Vec<(String, i64, f64)>, BoxError> {
    let rows: Vec<(String, i64, f64)> = sqlx::query_as(
        r#"
        SELECT payment_method::text, COUNT(*), COALESCE(SUM(total), 0)::double precision
        FROM orders
        WHERE store_id = $1 AND status = 'COMPLETED' AND created_at >= $2
        GROUP BY payment_method
        ORDER BY 2 DESC
        "#,
    )
    .bind(store_id)
    .bind(from)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
