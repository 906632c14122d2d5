//! Order transactions
//!
//! Lock order: order → customer → products (by id) → raw materials (by id).
//! Every path takes row locks in this order so concurrent orders serialize per
//! row and never deadlock.

use shared::error::{AppError, ErrorCode};
use shared::models::{
    NotificationKind, Order, OrderCreate, OrderDetail, OrderStatus, PaymentMethod, PaymentStatus,
    RawMaterialMovementType, StockMovementType,
};
use sqlx::PgPool;

use super::money;
use super::plan::{self, OrderPlan};
use crate::db;
use crate::db::movements::MaterialEntry;
use crate::db::notifications::NewNotification;
use crate::error::ServiceResult;
use crate::util::{format_rupiah, now_millis, order_number, snowflake_id};
use crate::validation::{MAX_NOTE_LEN, validate_optional_text};

/// Create an order: stock checks, decrements, ledger, customer aggregates and
/// notifications all commit together or not at all.
pub async fn create_order(pool: &PgPool, data: &OrderCreate) -> ServiceResult<OrderDetail> {
    let items = plan::merge_items(&data.items)?;
    validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
    let discount = data.discount.unwrap_or(0.0);

    let mut tx = pool.begin().await?;

    let customer_name = match data.customer_id {
        Some(customer_id) => Some(
            db::customers::lock(&mut *tx, data.store_id, customer_id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?,
        ),
        None => None,
    };

    let mut product_ids: Vec<i64> = items.iter().map(|(id, _)| *id).collect();
    product_ids.sort_unstable();
    let products = db::products::lock_for_order(&mut *tx, data.store_id, &product_ids).await?;
    let recipes = db::products::recipes_for(&mut *tx, &product_ids).await?;

    let mut material_ids: Vec<i64> = recipes.iter().map(|r| r.raw_material_id).collect();
    material_ids.sort_unstable();
    material_ids.dedup();
    let materials = db::raw_materials::lock_for_order(&mut *tx, data.store_id, &material_ids).await?;

    let plan = plan::plan_order(&items, &products, &recipes, &materials, discount)?;

    let (payment_status, amount_paid, change_amount) = match data.payment_method {
        PaymentMethod::Cash => {
            let change = money::cash_change(plan.totals.total, data.amount_paid)?;
            (
                PaymentStatus::Paid,
                data.amount_paid,
                Some(money::to_f64(change)),
            )
        }
        _ => (PaymentStatus::Pending, data.amount_paid, None),
    };

    let now = now_millis();
    let order_id = snowflake_id();
    let number = order_number(now, order_id);
    let total = money::to_f64(plan.totals.total);

    let order = db::orders::insert(
        &mut *tx,
        &db::orders::NewOrder {
            id: order_id,
            store_id: data.store_id,
            order_number: &number,
            customer_id: data.customer_id,
            subtotal: money::to_f64(plan.totals.subtotal),
            tax: money::to_f64(plan.totals.tax),
            discount: money::to_f64(plan.totals.discount),
            total,
            payment_method: data.payment_method,
            payment_status,
            amount_paid,
            change_amount,
            notes: data.notes.as_deref(),
            now,
        },
    )
    .await?;

    let new_items: Vec<db::orders::NewItem> = plan
        .lines
        .iter()
        .map(|l| db::orders::NewItem {
            product_id: l.product_id,
            product_name: l.product_name.clone(),
            quantity: l.quantity,
            unit_price: money::to_f64(l.unit_price),
            total_price: money::to_f64(l.total_price),
        })
        .collect();
    let order_items = db::orders::insert_items(&mut *tx, order_id, &new_items).await?;

    apply_stock_writes(&mut *tx, data.store_id, order_id, &number, &plan, now).await?;

    if let Some(customer_id) = data.customer_id {
        db::customers::record_order(&mut *tx, customer_id, total, now).await?;
    }

    let mut notifications = vec![NewNotification::new(
        NotificationKind::Order,
        "Pesanan baru",
        format!("Pesanan {number} sebesar {}", format_rupiah(total)),
    )];
    notifications.extend(low_stock_notifications(&plan));
    db::notifications::insert_many(&mut *tx, data.store_id, &notifications, now).await?;

    tx.commit().await?;

    tracing::info!(
        order_id,
        store_id = data.store_id,
        order_number = %number,
        total,
        "Order created"
    );

    Ok(OrderDetail {
        order,
        customer_name,
        items: order_items,
    })
}

async fn apply_stock_writes(
    conn: &mut sqlx::PgConnection,
    store_id: i64,
    order_id: i64,
    number: &str,
    plan: &OrderPlan,
    now: i64,
) -> ServiceResult<()> {
    let product_ids: Vec<i64> = plan.products.iter().map(|d| d.product_id).collect();
    let deltas: Vec<i32> = plan.products.iter().map(|d| -d.quantity).collect();
    db::products::apply_stock_deltas(&mut *conn, &product_ids, &deltas, now).await?;
    db::movements::insert_stock_movements(
        &mut *conn,
        store_id,
        StockMovementType::Sale,
        &product_ids,
        &deltas,
        Some(order_id),
        Some(number),
        now,
    )
    .await?;

    if plan.materials.is_empty() {
        return Ok(());
    }
    let material_ids: Vec<i64> = plan.materials.iter().map(|d| d.raw_material_id).collect();
    let stocks: Vec<f64> = plan.materials.iter().map(|d| d.stock_after).collect();
    db::raw_materials::apply_stock(&mut *conn, &material_ids, &stocks, now).await?;
    let entries: Vec<MaterialEntry> = plan
        .materials
        .iter()
        .map(|d| MaterialEntry {
            raw_material_id: d.raw_material_id,
            quantity: -d.consumed,
            stock_before: d.stock_before,
            stock_after: d.stock_after,
        })
        .collect();
    db::movements::insert_material_movements(
        conn,
        store_id,
        RawMaterialMovementType::Usage,
        &entries,
        Some(order_id),
        Some(number),
        now,
    )
    .await?;
    Ok(())
}

/// LOW_STOCK notifications for every row that crossed its minimum
fn low_stock_notifications(plan: &OrderPlan) -> Vec<NewNotification> {
    let products = plan.products.iter().filter(|d| d.crosses_min).map(|d| {
        NewNotification::new(
            NotificationKind::LowStock,
            "Stok produk menipis",
            format!("Stok {} tersisa {}", d.name, d.stock_after),
        )
    });
    let materials = plan.materials.iter().filter(|d| d.crosses_min).map(|d| {
        NewNotification::new(
            NotificationKind::LowStock,
            "Stok bahan baku menipis",
            format!("Stok {} tersisa {}", d.name, d.stock_after),
        )
    });
    products.chain(materials).collect()
}

/// Cancel an order, restoring exactly the recorded product quantities and
/// raw material consumption.
pub async fn cancel_order(pool: &PgPool, store_id: i64, order_id: i64) -> ServiceResult<Order> {
    let mut tx = pool.begin().await?;

    let order = db::orders::lock(&mut *tx, store_id, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    if order.status == OrderStatus::Cancelled {
        return Err(AppError::new(ErrorCode::OrderAlreadyCancelled)
            .with_detail("orderId", order_id)
            .into());
    }
    if let Some(customer_id) = order.customer_id {
        db::customers::lock(&mut *tx, store_id, customer_id).await?;
    }

    let items = db::orders::item_quantities(&mut *tx, order_id).await?;
    let usages = db::movements::usage_for_order(&mut *tx, order_id).await?;
    let (product_restores, material_restores) = plan::restore_quantities(&items, &usages);

    let now = now_millis();
    let notes = format!("Batal {}", order.order_number);

    let product_ids: Vec<i64> = product_restores.iter().map(|(id, _)| *id).collect();
    let quantities: Vec<i32> = product_restores.iter().map(|(_, q)| *q).collect();
    db::products::lock_for_order(&mut *tx, store_id, &product_ids).await?;
    db::products::apply_stock_deltas(&mut *tx, &product_ids, &quantities, now).await?;
    db::movements::insert_stock_movements(
        &mut *tx,
        store_id,
        StockMovementType::Cancel,
        &product_ids,
        &quantities,
        Some(order_id),
        Some(&notes),
        now,
    )
    .await?;

    if !material_restores.is_empty() {
        let material_ids: Vec<i64> = material_restores.iter().map(|(id, _)| *id).collect();
        let locked = db::raw_materials::lock_for_order(&mut *tx, store_id, &material_ids).await?;
        let mut entries = Vec::with_capacity(locked.len());
        for (material_id, restore) in &material_restores {
            let Some(row) = locked.iter().find(|m| m.id == *material_id) else {
                continue;
            };
            let after = plan::quantity_f64(money::to_decimal(row.stock) + money::to_decimal(*restore));
            entries.push(MaterialEntry {
                raw_material_id: row.id,
                quantity: *restore,
                stock_before: row.stock,
                stock_after: after,
            });
        }
        let ids: Vec<i64> = entries.iter().map(|e| e.raw_material_id).collect();
        let stocks: Vec<f64> = entries.iter().map(|e| e.stock_after).collect();
        db::raw_materials::apply_stock(&mut *tx, &ids, &stocks, now).await?;
        db::movements::insert_material_movements(
            &mut *tx,
            store_id,
            RawMaterialMovementType::Cancel,
            &entries,
            Some(order_id),
            Some(&notes),
            now,
        )
        .await?;
    }

    db::orders::mark_cancelled(&mut *tx, order_id, now).await?;
    if let Some(customer_id) = order.customer_id {
        db::customers::reverse_order(&mut *tx, customer_id, order.total, now).await?;
    }

    db::notifications::insert(
        &mut *tx,
        store_id,
        &NewNotification::new(
            NotificationKind::Order,
            "Pesanan dibatalkan",
            format!("Pesanan {} dibatalkan, stok dikembalikan", order.order_number),
        ),
        now,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(order_id, store_id, "Order cancelled");

    Ok(Order {
        status: OrderStatus::Cancelled,
        updated_at: now,
        ..order
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::plan::{MaterialStock, ProductStock, RecipeUse};

    #[test]
    fn low_stock_notifications_only_for_crossings() {
        let products = [
            ProductStock {
                id: 1,
                name: "Kopi Susu".into(),
                price: 18_000.0,
                stock_quantity: 6,
                min_stock_level: 5,
                is_active: true,
            },
            ProductStock {
                id: 2,
                name: "Roti".into(),
                price: 10_000.0,
                stock_quantity: 50,
                min_stock_level: 5,
                is_active: true,
            },
        ];
        let recipes = [RecipeUse {
            product_id: 1,
            raw_material_id: 10,
            quantity: 0.5,
        }];
        let materials = [MaterialStock {
            id: 10,
            name: "Susu".into(),
            stock: 2.0,
            min_stock_level: 1.0,
        }];
        let plan = plan::plan_order(&[(1, 2), (2, 1)], &products, &recipes, &materials, 0.0).unwrap();

        let notes = low_stock_notifications(&plan);
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(|n| n.kind == NotificationKind::LowStock));
        assert_eq!(notes[0].message, "Stok Kopi Susu tersisa 4");
        assert_eq!(notes[1].message, "Stok Susu tersisa 1");
    }
}
