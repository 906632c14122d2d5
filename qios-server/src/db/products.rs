//! Product and recipe database operations

use shared::models::{Product, ProductCreate, ProductSummary, ProductUpdate, RecipeInput, RecipeLine};
use sqlx::{PgConnection, PgPool};

use super::BoxError;
use crate::orders::plan::{ProductStock, RecipeUse};
use crate::util::snowflake_id;

const PRODUCT_COLUMNS: &str = "id, store_id, name, sku, category, description, price, cost, \
     stock_quantity, min_stock_level, unit, image_url, is_active, created_at, updated_at";

pub async fn list(
    pool: &PgPool,
    store_id: i64,
    search: Option<&str>,
    category: Option<&str>,
    include_inactive: bool,
) -> Result<Vec<ProductSummary>, BoxError> {
    let rows = sqlx::query_as::<_, ProductSummary>(
        r#"
        SELECT p.id, p.name, p.sku, p.category, p.price, p.cost,
               p.stock_quantity, p.min_stock_level, p.unit, p.image_url, p.is_active,
               (SELECT COUNT(*) FROM recipes r WHERE r.product_id = p.id) AS recipe_count,
               (p.stock_quantity <= p.min_stock_level) AS low_stock
        FROM products p
        WHERE p.store_id = $1
          AND ($2::text IS NULL OR p.name ILIKE $2 OR p.sku ILIKE $2)
          AND ($3::text IS NULL OR p.category = $3)
          AND ($4 OR p.is_active)
        ORDER BY p.name
        "#,
    )
    .bind(store_id)
    .bind(search.map(super::like_pattern))
    .bind(category)
    .bind(include_inactive)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find(pool: &PgPool, store_id: i64, id: i64) -> Result<Option<Product>, BoxError> {
    let row = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND store_id = $2"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn recipe_lines(pool: &PgPool, product_id: i64) -> Result<Vec<RecipeLine>, BoxError> {
    let rows = sqlx::query_as::<_, RecipeLine>(
        r#"
        SELECT r.id, r.product_id, r.raw_material_id,
               m.name AS raw_material_name, m.unit, r.quantity
        FROM recipes r
        JOIN raw_materials m ON m.id = r.raw_material_id
        WHERE r.product_id = $1
        ORDER BY m.name
        "#,
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn categories(pool: &PgPool, store_id: i64) -> Result<Vec<String>, BoxError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT category FROM products
         WHERE store_id = $1 AND category IS NOT NULL AND category <> ''
         ORDER BY category",
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(c,)| c).collect())
}

/// Whether another product of the store already uses this SKU
pub async fn sku_taken(
    pool: &PgPool,
    store_id: i64,
    sku: &str,
    exclude_id: Option<i64>,
) -> Result<bool, BoxError> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM products
         WHERE store_id = $1 AND sku = $2 AND ($3::bigint IS NULL OR id <> $3))",
    )
    .bind(store_id)
    .bind(sku)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn create(
    conn: &mut PgConnection,
    id: i64,
    data: &ProductCreate,
    now: i64,
) -> Result<Product, BoxError> {
    let row = sqlx::query_as::<_, Product>(&format!(
        r#"
        INSERT INTO products (
            id, store_id, name, sku, category, description, price, cost,
            stock_quantity, min_stock_level, unit, image_url, is_active, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, TRUE, $13, $13)
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(data.store_id)
    .bind(data.name.trim())
    .bind(&data.sku)
    .bind(&data.category)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.cost.unwrap_or(0.0))
    .bind(data.stock_quantity.unwrap_or(0))
    .bind(data.min_stock_level.unwrap_or(0))
    .bind(data.unit.as_deref().unwrap_or("pcs"))
    .bind(&data.image_url)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &ProductUpdate,
    now: i64,
) -> Result<Option<Product>, BoxError> {
    let row = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products SET
            name = COALESCE($3, name),
            sku = COALESCE($4, sku),
            category = COALESCE($5, category),
            description = COALESCE($6, description),
            price = COALESCE($7, price),
            cost = COALESCE($8, cost),
            min_stock_level = COALESCE($9, min_stock_level),
            unit = COALESCE($10, unit),
            image_url = COALESCE($11, image_url),
            is_active = COALESCE($12, is_active),
            updated_at = $13
        WHERE id = $1 AND store_id = $2
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(data.store_id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.sku)
    .bind(&data.category)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.cost)
    .bind(data.min_stock_level)
    .bind(&data.unit)
    .bind(&data.image_url)
    .bind(data.is_active)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Soft delete
pub async fn deactivate(pool: &PgPool, store_id: i64, id: i64, now: i64) -> Result<bool, BoxError> {
    let result = sqlx::query(
        "UPDATE products SET is_active = FALSE, updated_at = $3 WHERE id = $1 AND store_id = $2",
    )
    .bind(id)
    .bind(store_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Lock a product row of the store for a recipe replacement
pub async fn lock_one(
    conn: &mut PgConnection,
    store_id: i64,
    id: i64,
) -> Result<bool, BoxError> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM products WHERE id = $1 AND store_id = $2 FOR UPDATE")
            .bind(id)
            .bind(store_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.is_some())
}

/// Lock a product row of the store for a manual stock change
pub async fn lock_for_adjustment(
    conn: &mut PgConnection,
    store_id: i64,
    id: i64,
) -> Result<Option<Product>, BoxError> {
    let row = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND store_id = $2 FOR UPDATE"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Replace all recipe lines of a product
pub async fn replace_recipe(
    conn: &mut PgConnection,
    product_id: i64,
    lines: &[RecipeInput],
) -> Result<(), BoxError> {
    sqlx::query("DELETE FROM recipes WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    if lines.is_empty() {
        return Ok(());
    }

    let ids: Vec<i64> = lines.iter().map(|_| snowflake_id()).collect();
    let product_ids: Vec<i64> = lines.iter().map(|_| product_id).collect();
    let material_ids: Vec<i64> = lines.iter().map(|l| l.raw_material_id).collect();
    let quantities: Vec<f64> = lines.iter().map(|l| l.quantity).collect();
    sqlx::query(
        r#"
        INSERT INTO recipes (id, product_id, raw_material_id, quantity)
        SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::bigint[], $4::double precision[])
        "#,
    )
    .bind(&ids)
    .bind(&product_ids)
    .bind(&material_ids)
    .bind(&quantities)
    .execute(conn)
    .await?;
    Ok(())
}

/// Lock products of an order, ordered by id so concurrent orders never deadlock
pub async fn lock_for_order(
    conn: &mut PgConnection,
    store_id: i64,
    ids: &[i64],
) -> Result<Vec<ProductStock>, BoxError> {
    let rows = sqlx::query_as::<_, ProductStock>(
        r#"
        SELECT id, name, price, stock_quantity, min_stock_level, is_active
        FROM products
        WHERE store_id = $1 AND id = ANY($2)
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(store_id)
    .bind(ids)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn recipes_for(
    conn: &mut PgConnection,
    product_ids: &[i64],
) -> Result<Vec<RecipeUse>, BoxError> {
    let rows = sqlx::query_as::<_, RecipeUse>(
        "SELECT product_id, raw_material_id, quantity FROM recipes WHERE product_id = ANY($1)",
    )
    .bind(product_ids)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

/// Apply signed stock deltas in one statement
pub async fn apply_stock_deltas(
    conn: &mut PgConnection,
    ids: &[i64],
    deltas: &[i32],
    now: i64,
) -> Result<(), BoxError> {
    sqlx::query(
        r#"
        UPDATE products p
        SET stock_quantity = p.stock_quantity + d.delta, updated_at = $3
        FROM UNNEST($1::bigint[], $2::integer[]) AS d(id, delta)
        WHERE p.id = d.id
        "#,
    )
    .bind(ids)
    .bind(deltas)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}
