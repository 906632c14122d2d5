//! Raw material database operations

use shared::models::{RawMaterial, RawMaterialCreate, RawMaterialSummary, RawMaterialUpdate};
use sqlx::{PgConnection, PgPool};

use super::BoxError;
use crate::orders::plan::MaterialStock;

const MATERIAL_COLUMNS: &str = "id, store_id, name, unit, stock, min_stock_level, cost_per_unit, \
     supplier, created_at, updated_at";

pub async fn list(
    pool: &PgPool,
    store_id: i64,
    low_stock_only: bool,
) -> Result<Vec<RawMaterialSummary>, BoxError> {
    let rows = sqlx::query_as::<_, RawMaterialSummary>(
        r#"
        SELECT id, name, unit, stock, min_stock_level, cost_per_unit, supplier,
               (stock <= min_stock_level) AS low_stock, updated_at
        FROM raw_materials
        WHERE store_id = $1 AND (NOT $2 OR stock <= min_stock_level)
        ORDER BY name
        "#,
    )
    .bind(store_id)
    .bind(low_stock_only)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(
    conn: &mut PgConnection,
    id: i64,
    data: &RawMaterialCreate,
    now: i64,
) -> Result<RawMaterial, BoxError> {
    let row = sqlx::query_as::<_, RawMaterial>(&format!(
        r#"
        INSERT INTO raw_materials (
            id, store_id, name, unit, stock, min_stock_level, cost_per_unit,
            supplier, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
        RETURNING {MATERIAL_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(data.store_id)
    .bind(data.name.trim())
    .bind(data.unit.trim())
    .bind(data.stock.unwrap_or(0.0))
    .bind(data.min_stock_level.unwrap_or(0.0))
    .bind(data.cost_per_unit.unwrap_or(0.0))
    .bind(&data.supplier)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &RawMaterialUpdate,
    now: i64,
) -> Result<Option<RawMaterial>, BoxError> {
    let row = sqlx::query_as::<_, RawMaterial>(&format!(
        r#"
        UPDATE raw_materials SET
            name = COALESCE($3, name),
            unit = COALESCE($4, unit),
            min_stock_level = COALESCE($5, min_stock_level),
            cost_per_unit = COALESCE($6, cost_per_unit),
            supplier = COALESCE($7, supplier),
            updated_at = $8
        WHERE id = $1 AND store_id = $2
        RETURNING {MATERIAL_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(data.store_id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.unit.as_deref().map(str::trim))
    .bind(data.min_stock_level)
    .bind(data.cost_per_unit)
    .bind(&data.supplier)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Lock one raw material row of the store
pub async fn lock_one(
    conn: &mut PgConnection,
    store_id: i64,
    id: i64,
) -> Result<Option<RawMaterial>, BoxError> {
    let row = sqlx::query_as::<_, RawMaterial>(&format!(
        "SELECT {MATERIAL_COLUMNS} FROM raw_materials WHERE id = $1 AND store_id = $2 FOR UPDATE"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

pub async fn set_stock(
    conn: &mut PgConnection,
    id: i64,
    stock: f64,
    now: i64,
) -> Result<(), BoxError> {
    sqlx::query("UPDATE raw_materials SET stock = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(stock)
        .bind(now)
        .execute(conn)
        .await?;
    Ok(())
}

/// Number of the given ids that belong to the store
pub async fn count_in_store(
    conn: &mut PgConnection,
    store_id: i64,
    ids: &[i64],
) -> Result<i64, BoxError> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM raw_materials WHERE store_id = $1 AND id = ANY($2)",
    )
    .bind(store_id)
    .bind(ids)
    .fetch_one(conn)
    .await?;
    Ok(row.0)
}

/// Lock raw materials of an order, ordered by id
pub async fn lock_for_order(
    conn: &mut PgConnection,
    store_id: i64,
    ids: &[i64],
) -> Result<Vec<MaterialStock>, BoxError> {
    let rows = sqlx::query_as::<_, MaterialStock>(
        r#"
        SELECT id, name, stock, min_stock_level
        FROM raw_materials
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

/// Write new absolute stock values computed by the planner
pub async fn apply_stock(
    conn: &mut PgConnection,
    ids: &[i64],
    stocks: &[f64],
    now: i64,
) -> Result<(), BoxError> {
    sqlx::query(
        r#"
        UPDATE raw_materials m
        SET stock = d.stock, updated_at = $3
        FROM UNNEST($1::bigint[], $2::double precision[]) AS d(id, stock)
        WHERE m.id = d.id
        "#,
    )
    .bind(ids)
    .bind(stocks)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}
