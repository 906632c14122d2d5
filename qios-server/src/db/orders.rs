//! Order database operations

use shared::models::{Order, OrderItem, OrderStatus, OrderSummary, PaymentMethod, PaymentStatus};
use sqlx::{PgConnection, PgPool};

use super::BoxError;

const ORDER_COLUMNS: &str = "id, store_id, order_number, customer_id, subtotal, tax, discount, \
     total, payment_method, payment_status, status, amount_paid, change_amount, notes, \
     created_at, updated_at";

/// Row to insert, amounts already computed
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub id: i64,
    pub store_id: i64,
    pub order_number: &'a str,
    pub customer_id: Option<i64>,
    pub subtotal: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub amount_paid: Option<f64>,
    pub change_amount: Option<f64>,
    pub notes: Option<&'a str>,
    pub now: i64,
}

/// Line to insert
#[derive(Debug, Clone)]
pub struct NewItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
}

pub async fn insert(conn: &mut PgConnection, order: &NewOrder<'_>) -> Result<Order, BoxError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        r#"
        INSERT INTO orders (
            id, store_id, order_number, customer_id, subtotal, tax, discount, total,
            payment_method, payment_status, status, amount_paid, change_amount, notes,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'COMPLETED', $11, $12, $13, $14, $14)
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(order.id)
    .bind(order.store_id)
    .bind(order.order_number)
    .bind(order.customer_id)
    .bind(order.subtotal)
    .bind(order.tax)
    .bind(order.discount)
    .bind(order.total)
    .bind(order.payment_method)
    .bind(order.payment_status)
    .bind(order.amount_paid)
    .bind(order.change_amount)
    .bind(order.notes)
    .bind(order.now)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

pub async fn insert_items(
    conn: &mut PgConnection,
    order_id: i64,
    items: &[NewItem],
) -> Result<Vec<OrderItem>, BoxError> {
    let ids: Vec<i64> = items.iter().map(|_| crate::util::snowflake_id()).collect();
    let order_ids: Vec<i64> = items.iter().map(|_| order_id).collect();
    let product_ids: Vec<i64> = items.iter().map(|i| i.product_id).collect();
    let names: Vec<String> = items.iter().map(|i| i.product_name.clone()).collect();
    let quantities: Vec<i32> = items.iter().map(|i| i.quantity).collect();
    let unit_prices: Vec<f64> = items.iter().map(|i| i.unit_price).collect();
    let totals: Vec<f64> = items.iter().map(|i| i.total_price).collect();
    let rows = sqlx::query_as::<_, OrderItem>(
        r#"
        INSERT INTO order_items (id, order_id, product_id, product_name, quantity, unit_price, total_price)
        SELECT * FROM UNNEST(
            $1::bigint[], $2::bigint[], $3::bigint[], $4::text[],
            $5::integer[], $6::double precision[], $7::double precision[]
        )
        RETURNING id, order_id, product_id, product_name, quantity, unit_price, total_price
        "#,
    )
    .bind(&ids)
    .bind(&order_ids)
    .bind(&product_ids)
    .bind(&names)
    .bind(&quantities)
    .bind(&unit_prices)
    .bind(&totals)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

/// Filters for the order list
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub customer_id: Option<i64>,
}

pub async fn list(
    pool: &PgPool,
    store_id: i64,
    filter: &OrderFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<OrderSummary>, i64), BoxError> {
    let rows = sqlx::query_as::<_, OrderSummary>(
        r#"
        SELECT o.id, o.order_number, o.customer_id, c.name AS customer_name, o.total,
               o.payment_method, o.payment_status, o.status,
               (SELECT COALESCE(SUM(i.quantity), 0)::bigint FROM order_items i WHERE i.order_id = o.id)
                   AS item_count,
               o.created_at
        FROM orders o
        LEFT JOIN customers c ON c.id = o.customer_id
        WHERE o.store_id = $1
          AND ($2::order_status IS NULL OR o.status = $2)
          AND ($3::bigint IS NULL OR o.created_at >= $3)
          AND ($4::bigint IS NULL OR o.created_at < $4)
          AND ($5::bigint IS NULL OR o.customer_id = $5)
        ORDER BY o.created_at DESC, o.id DESC
        LIMIT $6 OFFSET $7
        "#,
    )
    .bind(store_id)
    .bind(filter.status)
    .bind(filter.from)
    .bind(filter.to)
    .bind(filter.customer_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM orders o
        WHERE o.store_id = $1
          AND ($2::order_status IS NULL OR o.status = $2)
          AND ($3::bigint IS NULL OR o.created_at >= $3)
          AND ($4::bigint IS NULL OR o.created_at < $4)
          AND ($5::bigint IS NULL OR o.customer_id = $5)
        "#,
    )
    .bind(store_id)
    .bind(filter.status)
    .bind(filter.from)
    .bind(filter.to)
    .bind(filter.customer_id)
    .fetch_one(pool)
    .await?;

    Ok((rows, total.0))
}

pub async fn find(pool: &PgPool, store_id: i64, id: i64) -> Result<Option<Order>, BoxError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND store_id = $2"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn items(pool: &PgPool, order_id: i64) -> Result<Vec<OrderItem>, BoxError> {
    let rows = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, product_id, product_name, quantity, unit_price, total_price
         FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Lock an order row of the store (cancel flow)
pub async fn lock(
    conn: &mut PgConnection,
    store_id: i64,
    id: i64,
) -> Result<Option<Order>, BoxError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND store_id = $2 FOR UPDATE"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Recorded lines of an order: `(product_id, quantity)`
pub async fn item_quantities(
    conn: &mut PgConnection,
    order_id: i64,
) -> Result<Vec<(i64, i32)>, BoxError> {
    let rows: Vec<(i64, i32)> =
        sqlx::query_as("SELECT product_id, quantity FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .fetch_all(conn)
            .await?;
    Ok(rows)
}

pub async fn mark_cancelled(conn: &mut PgConnection, id: i64, now: i64) -> Result<(), BoxError> {
    sqlx::query("UPDATE orders SET status = 'CANCELLED', updated_at = $2 WHERE id = $1")
        .bind(id)
        .bind(now)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn set_payment_status(
    conn: &mut PgConnection,
    store_id: i64,
    id: i64,
    status: PaymentStatus,
    now: i64,
) -> Result<Option<String>, BoxError> {
    let row: Option<(String,)> = sqlx::query_as(
        "UPDATE orders SET payment_status = $3, updated_at = $4
         WHERE id = $1 AND store_id = $2
         RETURNING order_number",
    )
    .bind(id)
    .bind(store_id)
    .bind(status)
    .bind(now)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(|(n,)| n))
}

/// Most recent orders of a customer
pub async fn recent_for_customer(
    pool: &PgPool,
    store_id: i64,
    customer_id: i64,
    limit: i64,
) -> Result<Vec<OrderSummary>, BoxError> {
    let filter = OrderFilter {
        customer_id: Some(customer_id),
        ..Default::default()
    };
    let (rows, _) = list(pool, store_id, &filter, limit, 0).await?;
    Ok(rows)
}
