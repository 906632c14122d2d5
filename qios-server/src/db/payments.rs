//! Gateway payment database operations

use shared::models::{Payment, PaymentSession, PaymentStatus};
use sqlx::{PgConnection, PgPool};

use super::BoxError;

const PAYMENT_COLUMNS: &str = "id, store_id, order_id, gateway, method, reference, amount, status, \
     payment_url, va_number, qr_string, created_at, updated_at";

pub async fn insert(
    pool: &PgPool,
    id: i64,
    store_id: i64,
    order_id: Option<i64>,
    method: Option<&str>,
    session: &PaymentSession,
    now: i64,
) -> Result<Payment, BoxError> {
    let row = sqlx::query_as::<_, Payment>(&format!(
        r#"
        INSERT INTO payments (
            id, store_id, order_id, gateway, method, reference, amount, status,
            payment_url, va_number, qr_string, raw, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
        RETURNING {PAYMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(store_id)
    .bind(order_id)
    .bind(&session.gateway)
    .bind(method)
    .bind(&session.reference)
    .bind(session.amount)
    .bind(session.status)
    .bind(&session.payment_url)
    .bind(&session.va_number)
    .bind(&session.qr_string)
    .bind(sqlx::types::Json(&session.raw))
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn find_by_reference(
    pool: &PgPool,
    store_id: i64,
    gateway: &str,
    reference: &str,
) -> Result<Option<Payment>, BoxError> {
    let row = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments
         WHERE store_id = $1 AND gateway = $2 AND reference = $3"
    ))
    .bind(store_id)
    .bind(gateway)
    .bind(reference)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Store the latest gateway status. Returns the previous status.
pub async fn update_status(
    conn: &mut PgConnection,
    id: i64,
    status: PaymentStatus,
    raw: &serde_json::Value,
    now: i64,
) -> Result<PaymentStatus, BoxError> {
    let previous: (PaymentStatus,) =
        sqlx::query_as("SELECT status FROM payments WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
    sqlx::query("UPDATE payments SET status = $2, raw = $3, updated_at = $4 WHERE id = $1")
        .bind(id)
        .bind(status)
        .bind(sqlx::types::Json(raw))
        .bind(now)
        .execute(conn)
        .await?;
    Ok(previous.0)
}
