//! Store database operations

use shared::models::Store;
use sqlx::{PgConnection, PgPool};

use super::BoxError;

const STORE_COLUMNS: &str = "id, name, address, phone, email, created_at, updated_at";

pub async fn create(
    conn: &mut PgConnection,
    id: i64,
    name: &str,
    address: Option<&str>,
    phone: Option<&str>,
    email: Option<&str>,
    now: i64,
) -> Result<Store, BoxError> {
    let store = sqlx::query_as::<_, Store>(&format!(
        "INSERT INTO stores (id, name, address, phone, email, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $6)
         RETURNING {STORE_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(address)
    .bind(phone)
    .bind(email)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(store)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Store>, BoxError> {
    let store = sqlx::query_as::<_, Store>(&format!(
        "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(store)
}

pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM stores WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Delete every store-scoped row, keeping the store and its users
pub async fn reset_data(pool: &PgPool, store_id: i64) -> Result<(), BoxError> {
    let mut tx = pool.begin().await?;

    // Children first (FK order)
    let statements = [
        "DELETE FROM payments WHERE store_id = $1",
        "DELETE FROM notifications WHERE store_id = $1",
        "DELETE FROM stock_movements WHERE store_id = $1",
        "DELETE FROM raw_material_movements WHERE store_id = $1",
        "DELETE FROM order_items WHERE order_id IN (SELECT id FROM orders WHERE store_id = $1)",
        "DELETE FROM orders WHERE store_id = $1",
        "DELETE FROM recipes WHERE product_id IN (SELECT id FROM products WHERE store_id = $1)",
        "DELETE FROM products WHERE store_id = $1",
        "DELETE FROM raw_materials WHERE store_id = $1",
        "DELETE FROM customers WHERE store_id = $1",
    ];
    for sql in statements {
        sqlx::query(sql).bind(store_id).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(())
}
