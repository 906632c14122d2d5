//! Customer database operations

use shared::models::{Customer, CustomerCreate, CustomerSegment, CustomerUpdate};
use sqlx::{PgConnection, PgPool};

use super::BoxError;

const CUSTOMER_COLUMNS: &str = "id, store_id, name, phone, email, address, segment, total_spent, \
     total_transactions, last_visit, notes, created_at, updated_at";

pub async fn list(
    pool: &PgPool,
    store_id: i64,
    search: Option<&str>,
    segment: Option<CustomerSegment>,
) -> Result<Vec<Customer>, BoxError> {
    let rows = sqlx::query_as::<_, Customer>(&format!(
        r#"
        SELECT {CUSTOMER_COLUMNS} FROM customers
        WHERE store_id = $1
          AND ($2::text IS NULL OR name ILIKE $2 OR phone ILIKE $2 OR email ILIKE $2)
          AND ($3::customer_segment IS NULL OR segment = $3)
        ORDER BY total_spent DESC, name
        "#
    ))
    .bind(store_id)
    .bind(search.map(super::like_pattern))
    .bind(segment)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find(pool: &PgPool, store_id: i64, id: i64) -> Result<Option<Customer>, BoxError> {
    let row = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1 AND store_id = $2"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create(
    conn: &mut PgConnection,
    id: i64,
    data: &CustomerCreate,
    now: i64,
) -> Result<Customer, BoxError> {
    let row = sqlx::query_as::<_, Customer>(&format!(
        r#"
        INSERT INTO customers (
            id, store_id, name, phone, email, address, segment, notes, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
        RETURNING {CUSTOMER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(data.store_id)
    .bind(data.name.trim())
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.address)
    .bind(data.segment.unwrap_or(CustomerSegment::New))
    .bind(&data.notes)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &CustomerUpdate,
    now: i64,
) -> Result<Option<Customer>, BoxError> {
    let row = sqlx::query_as::<_, Customer>(&format!(
        r#"
        UPDATE customers SET
            name = COALESCE($3, name),
            phone = COALESCE($4, phone),
            email = COALESCE($5, email),
            address = COALESCE($6, address),
            segment = COALESCE($7, segment),
            notes = COALESCE($8, notes),
            updated_at = $9
        WHERE id = $1 AND store_id = $2
        RETURNING {CUSTOMER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(data.store_id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.address)
    .bind(data.segment)
    .bind(&data.notes)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Lock a customer row of the store (order flow)
pub async fn lock(
    conn: &mut PgConnection,
    store_id: i64,
    id: i64,
) -> Result<Option<String>, BoxError> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT name FROM customers WHERE id = $1 AND store_id = $2 FOR UPDATE")
            .bind(id)
            .bind(store_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.map(|(name,)| name))
}

/// Record a completed order on the customer
pub async fn record_order(
    conn: &mut PgConnection,
    id: i64,
    total: f64,
    now: i64,
) -> Result<(), BoxError> {
    sqlx::query(
        r#"
        UPDATE customers SET
            total_spent = total_spent + $2,
            total_transactions = total_transactions + 1,
            last_visit = $3,
            updated_at = $3
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(total)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Reverse a cancelled order on the customer.
/// `last_visit` is recomputed from the remaining completed orders.
pub async fn reverse_order(
    conn: &mut PgConnection,
    id: i64,
    total: f64,
    now: i64,
) -> Result<(), BoxError> {
    sqlx::query(
        r#"
        UPDATE customers SET
            total_spent = GREATEST(total_spent - $2, 0),
            total_transactions = GREATEST(total_transactions - 1, 0),
            last_visit = (
                SELECT MAX(created_at) FROM orders
                WHERE customer_id = $1 AND status = 'COMPLETED'
            ),
            updated_at = $3
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(total)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}
