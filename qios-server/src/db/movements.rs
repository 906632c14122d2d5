//! Stock movement ledgers (append-only)

use shared::models::{RawMaterialMovement, RawMaterialMovementType, StockMovementType};
use sqlx::{PgConnection, PgPool};

use super::BoxError;
use crate::util::snowflake_id;

/// One raw material ledger entry to append
#[derive(Debug, Clone)]
pub struct MaterialEntry {
    pub raw_material_id: i64,
    pub quantity: f64,
    pub stock_before: f64,
    pub stock_after: f64,
}

/// Append product movements of one type. `quantities` are signed deltas.
#[allow(clippy::too_many_arguments)]
pub async fn insert_stock_movements(
    conn: &mut PgConnection,
    store_id: i64,
    movement_type: StockMovementType,
    product_ids: &[i64],
    quantities: &[i32],
    reference_id: Option<i64>,
    notes: Option<&str>,
    now: i64,
) -> Result<(), BoxError> {
    if product_ids.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = product_ids.iter().map(|_| snowflake_id()).collect();
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, store_id, product_id, movement_type, quantity, reference_id, notes, created_at
        )
        SELECT d.id, $3, d.product_id, $4, d.quantity, $5, $6, $7
        FROM UNNEST($1::bigint[], $2::bigint[], $8::integer[]) AS d(id, product_id, quantity)
        "#,
    )
    .bind(&ids)
    .bind(product_ids)
    .bind(store_id)
    .bind(movement_type)
    .bind(reference_id)
    .bind(notes)
    .bind(now)
    .bind(quantities)
    .execute(conn)
    .await?;
    Ok(())
}

/// Append raw material movements of one type
pub async fn insert_material_movements(
    conn: &mut PgConnection,
    store_id: i64,
    movement_type: RawMaterialMovementType,
    entries: &[MaterialEntry],
    reference_id: Option<i64>,
    notes: Option<&str>,
    now: i64,
) -> Result<(), BoxError> {
    if entries.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = entries.iter().map(|_| snowflake_id()).collect();
    let material_ids: Vec<i64> = entries.iter().map(|e| e.raw_material_id).collect();
    let quantities: Vec<f64> = entries.iter().map(|e| e.quantity).collect();
    let befores: Vec<f64> = entries.iter().map(|e| e.stock_before).collect();
    let afters: Vec<f64> = entries.iter().map(|e| e.stock_after).collect();
    sqlx::query(
        r#"
        INSERT INTO raw_material_movements (
            id, store_id, raw_material_id, movement_type, quantity,
            stock_before, stock_after, reference_id, notes, created_at
        )
        SELECT d.id, $6, d.raw_material_id, $7, d.quantity, d.stock_before, d.stock_after, $8, $9, $10
        FROM UNNEST(
            $1::bigint[], $2::bigint[], $3::double precision[],
            $4::double precision[], $5::double precision[]
        ) AS d(id, raw_material_id, quantity, stock_before, stock_after)
        "#,
    )
    .bind(&ids)
    .bind(&material_ids)
    .bind(&quantities)
    .bind(&befores)
    .bind(&afters)
    .bind(store_id)
    .bind(movement_type)
    .bind(reference_id)
    .bind(notes)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Raw material ledger, newest first
pub async fn list_material_movements(
    pool: &PgPool,
    store_id: i64,
    raw_material_id: Option<i64>,
    limit: i64,
) -> Result<Vec<RawMaterialMovement>, BoxError> {
    let rows = sqlx::query_as::<_, RawMaterialMovement>(
        r#"
        SELECT mv.id, mv.store_id, mv.raw_material_id, m.name AS raw_material_name,
               mv.movement_type, mv.quantity, mv.stock_before, mv.stock_after,
               mv.reference_id, mv.notes, mv.created_at
        FROM raw_material_movements mv
        JOIN raw_materials m ON m.id = mv.raw_material_id
        WHERE mv.store_id = $1 AND ($2::bigint IS NULL OR mv.raw_material_id = $2)
        ORDER BY mv.created_at DESC, mv.id DESC
        LIMIT $3
        "#,
    )
    .bind(store_id)
    .bind(raw_material_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Raw material consumption recorded for an order: `(raw_material_id, delta)`
pub async fn usage_for_order(
    conn: &mut PgConnection,
    order_id: i64,
) -> Result<Vec<(i64, f64)>, BoxError> {
    let rows: Vec<(i64, f64)> = sqlx::query_as(
        "SELECT raw_material_id, quantity FROM raw_material_movements
         WHERE reference_id = $1 AND movement_type = 'USAGE'",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}
