//! Order planning
//!
//! Pure functions that turn a requested order plus the locked stock rows into
//! the exact set of writes the order transaction performs. No I/O here, so
//! every stock and totals rule is checked without a database.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::prelude::*;
use shared::error::{AppError, ErrorCode};
use shared::models::OrderItemInput;

use super::money::{self, Totals};

/// Maximum quantity per order line
pub const MAX_QUANTITY: i32 = 9999;

/// Precision kept for raw material quantities
const QUANTITY_PLACES: u32 = 6;

/// Locked product row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductStock {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock_quantity: i32,
    pub min_stock_level: i32,
    pub is_active: bool,
}

/// Recipe line of a product in the order
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeUse {
    pub product_id: i64,
    pub raw_material_id: i64,
    pub quantity: f64,
}

/// Locked raw material row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MaterialStock {
    pub id: i64,
    pub name: String,
    pub stock: f64,
    pub min_stock_level: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductDelta {
    pub product_id: i64,
    pub name: String,
    pub quantity: i32,
    pub stock_after: i32,
    /// Stock moved from above the minimum to at/below it
    pub crosses_min: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDelta {
    pub raw_material_id: i64,
    pub name: String,
    pub consumed: f64,
    pub stock_before: f64,
    pub stock_after: f64,
    pub crosses_min: bool,
}

/// Everything the order transaction writes
#[derive(Debug, Clone)]
pub struct OrderPlan {
    pub lines: Vec<PlannedLine>,
    /// Sorted by product id
    pub products: Vec<ProductDelta>,
    /// Sorted by raw material id
    pub materials: Vec<MaterialDelta>,
    pub totals: Totals,
}

/// Validate requested lines and merge duplicates, keeping first-seen order.
pub fn merge_items(items: &[OrderItemInput]) -> Result<Vec<(i64, i32)>, AppError> {
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    let mut merged: Vec<(i64, i32)> = Vec::with_capacity(items.len());
    let mut index: HashMap<i64, usize> = HashMap::new();
    for item in items {
        if !(1..=MAX_QUANTITY).contains(&item.quantity) {
            return Err(invalid_quantity(item.product_id, item.quantity));
        }
        match index.get(&item.product_id) {
            Some(&i) => {
                let total = merged[i].1 + item.quantity;
                if total > MAX_QUANTITY {
                    return Err(invalid_quantity(item.product_id, total));
                }
                merged[i].1 = total;
            }
            None => {
                index.insert(item.product_id, merged.len());
                merged.push((item.product_id, item.quantity));
            }
        }
    }
    Ok(merged)
}

fn invalid_quantity(product_id: i64, quantity: i32) -> AppError {
    AppError::with_message(
        ErrorCode::InvalidQuantity,
        format!("quantity must be between 1 and {MAX_QUANTITY}"),
    )
    .with_detail("productId", product_id)
    .with_detail("quantity", quantity)
}

/// Plan an order against locked stock rows.
///
/// `items` must come from [`merge_items`].
pub fn plan_order(
    items: &[(i64, i32)],
    products: &[ProductStock],
    recipes: &[RecipeUse],
    materials: &[MaterialStock],
    discount: f64,
) -> Result<OrderPlan, AppError> {
    let products_by_id: HashMap<i64, &ProductStock> = products.iter().map(|p| (p.id, p)).collect();

    let mut lines = Vec::with_capacity(items.len());
    let mut product_deltas = Vec::with_capacity(items.len());
    for &(product_id, quantity) in items {
        let product = products_by_id.get(&product_id).ok_or_else(|| {
            AppError::new(ErrorCode::ProductNotFound).with_detail("productId", product_id)
        })?;
        if !product.is_active {
            return Err(AppError::new(ErrorCode::ProductInactive)
                .with_detail("productId", product_id)
                .with_detail("name", product.name.clone()));
        }
        if product.stock_quantity < quantity {
            return Err(AppError::with_message(
                ErrorCode::ProductOutOfStock,
                format!("Insufficient stock for {}", product.name),
            )
            .with_detail("productId", product_id)
            .with_detail("available", product.stock_quantity)
            .with_detail("requested", quantity));
        }

        let unit_price = money::to_decimal(product.price);
        lines.push(PlannedLine {
            product_id,
            product_name: product.name.clone(),
            quantity,
            unit_price,
            total_price: unit_price * Decimal::from(quantity),
        });

        let stock_after = product.stock_quantity - quantity;
        product_deltas.push(ProductDelta {
            product_id,
            name: product.name.clone(),
            quantity,
            stock_after,
            crosses_min: product.stock_quantity > product.min_stock_level
                && stock_after <= product.min_stock_level,
        });
    }
    product_deltas.sort_by_key(|d| d.product_id);

    // Raw material consumption: sum(recipe.quantity * ordered quantity)
    let ordered: HashMap<i64, i32> = items.iter().copied().collect();
    let mut required: BTreeMap<i64, Decimal> = BTreeMap::new();
    for recipe in recipes {
        let Some(&qty) = ordered.get(&recipe.product_id) else {
            continue;
        };
        *required.entry(recipe.raw_material_id).or_default() +=
            money::to_decimal(recipe.quantity) * Decimal::from(qty);
    }

    let materials_by_id: HashMap<i64, &MaterialStock> =
        materials.iter().map(|m| (m.id, m)).collect();
    let mut material_deltas = Vec::with_capacity(required.len());
    for (raw_material_id, need) in required {
        let material = materials_by_id.get(&raw_material_id).ok_or_else(|| {
            AppError::new(ErrorCode::RawMaterialNotFound)
                .with_detail("rawMaterialId", raw_material_id)
        })?;
        let before = money::to_decimal(material.stock);
        if before < need {
            return Err(AppError::with_message(
                ErrorCode::InsufficientRawMaterial,
                format!("Insufficient {} in inventory", material.name),
            )
            .with_detail("rawMaterialId", raw_material_id)
            .with_detail("available", material.stock)
            .with_detail("required", quantity_f64(need)));
        }
        let stock_after = quantity_f64(before - need);
        material_deltas.push(MaterialDelta {
            raw_material_id,
            name: material.name.clone(),
            consumed: quantity_f64(need),
            stock_before: material.stock,
            stock_after,
            crosses_min: material.stock > material.min_stock_level
                && stock_after <= material.min_stock_level,
        });
    }

    let totals = money::compute_totals(lines.iter().map(|l| l.total_price), discount)?;

    Ok(OrderPlan {
        lines,
        products: product_deltas,
        materials: material_deltas,
        totals,
    })
}

/// Stock to give back when an order is cancelled.
///
/// `items` are the recorded order lines, `usages` the recorded raw material
/// movements of the order (negative deltas). Results are sorted by id.
pub fn restore_quantities(
    items: &[(i64, i32)],
    usages: &[(i64, f64)],
) -> (Vec<(i64, i32)>, Vec<(i64, f64)>) {
    let mut products: BTreeMap<i64, i32> = BTreeMap::new();
    for &(product_id, quantity) in items {
        *products.entry(product_id).or_default() += quantity;
    }
    let mut materials: BTreeMap<i64, Decimal> = BTreeMap::new();
    for &(raw_material_id, delta) in usages {
        *materials.entry(raw_material_id).or_default() -= money::to_decimal(delta);
    }
    (
        products.into_iter().collect(),
        materials
            .into_iter()
            .filter(|(_, q)| !q.is_zero())
            .map(|(id, q)| (id, quantity_f64(q)))
            .collect(),
    )
}

/// Raw material quantities keep more precision than money
pub fn quantity_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(QUANTITY_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, price: f64, stock: i32, min: i32) -> ProductStock {
        ProductStock {
            id,
            name: format!("Produk {id}"),
            price,
            stock_quantity: stock,
            min_stock_level: min,
            is_active: true,
        }
    }

    fn material(id: i64, stock: f64, min: f64) -> MaterialStock {
        MaterialStock {
            id,
            name: format!("Bahan {id}"),
            stock,
            min_stock_level: min,
        }
    }

    fn recipe(product_id: i64, raw_material_id: i64, quantity: f64) -> RecipeUse {
        RecipeUse {
            product_id,
            raw_material_id,
            quantity,
        }
    }

    fn input(product_id: i64, quantity: i32) -> OrderItemInput {
        OrderItemInput {
            product_id,
            quantity,
        }
    }

    #[test]
    fn merge_rejects_empty_and_bad_quantities() {
        assert_eq!(merge_items(&[]).unwrap_err().code, ErrorCode::OrderEmpty);
        assert_eq!(
            merge_items(&[input(1, 0)]).unwrap_err().code,
            ErrorCode::InvalidQuantity
        );
        assert_eq!(
            merge_items(&[input(1, -3)]).unwrap_err().code,
            ErrorCode::InvalidQuantity
        );
        assert_eq!(
            merge_items(&[input(1, 9000), input(1, 1000)])
                .unwrap_err()
                .code,
            ErrorCode::InvalidQuantity
        );
    }

    #[test]
    fn merge_combines_duplicate_lines() {
        let merged = merge_items(&[input(2, 1), input(1, 2), input(2, 3)]).unwrap();
        assert_eq!(merged, vec![(2, 4), (1, 2)]);
    }

    #[test]
    fn plan_decrements_products_and_materials() {
        // Kopi susu: 0.02 kg coffee + 0.15 l milk; Es teh: 0.01 kg tea
        let products = [product(1, 18_000.0, 50, 5), product(2, 8_000.0, 20, 5)];
        let recipes = [recipe(1, 10, 0.02), recipe(1, 11, 0.15), recipe(2, 12, 0.01)];
        let materials = [
            material(10, 1.0, 0.2),
            material(11, 5.0, 1.0),
            material(12, 0.5, 0.1),
        ];

        let plan = plan_order(&[(1, 3), (2, 2)], &products, &recipes, &materials, 0.0).unwrap();

        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].total_price, Decimal::from(54_000));
        assert_eq!(plan.totals.subtotal, Decimal::from(70_000));
        assert_eq!(plan.totals.tax, Decimal::from(7_700));
        assert_eq!(plan.totals.total, Decimal::from(77_700));

        assert_eq!(plan.products[0].stock_after, 47);
        assert_eq!(plan.products[1].stock_after, 18);

        let coffee = &plan.materials[0];
        assert_eq!(coffee.raw_material_id, 10);
        assert_eq!(coffee.consumed, 0.06);
        assert_eq!(coffee.stock_after, 0.94);
        let milk = &plan.materials[1];
        assert_eq!(milk.consumed, 0.45);
        assert_eq!(milk.stock_after, 4.55);
        assert_eq!(plan.materials[2].stock_after, 0.48);
    }

    #[test]
    fn plan_rejects_product_out_of_stock() {
        let err = plan_order(&[(1, 3)], &[product(1, 10_000.0, 2, 0)], &[], &[], 0.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductOutOfStock);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn plan_rejects_insufficient_raw_material() {
        let err = plan_order(
            &[(1, 10)],
            &[product(1, 10_000.0, 100, 0)],
            &[recipe(1, 10, 0.2)],
            &[material(10, 1.5, 0.0)],
            0.0,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientRawMaterial);
    }

    #[test]
    fn plan_rejects_unknown_and_inactive_products() {
        let err = plan_order(&[(9, 1)], &[product(1, 1.0, 1, 0)], &[], &[], 0.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);

        let mut inactive = product(1, 1.0, 5, 0);
        inactive.is_active = false;
        let err = plan_order(&[(1, 1)], &[inactive], &[], &[], 0.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductInactive);
    }

    #[test]
    fn shared_material_is_summed_across_products() {
        let products = [product(1, 1.0, 10, 0), product(2, 1.0, 10, 0)];
        let recipes = [recipe(1, 10, 0.5), recipe(2, 10, 0.25)];
        // needs 2*0.5 + 4*0.25 = 2.0, only 1.9 available
        let err = plan_order(
            &[(1, 2), (2, 4)],
            &products,
            &recipes,
            &[material(10, 1.9, 0.0)],
            0.0,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientRawMaterial);

        let plan = plan_order(
            &[(1, 2), (2, 4)],
            &products,
            &recipes,
            &[material(10, 2.0, 0.0)],
            0.0,
        )
        .unwrap();
        assert_eq!(plan.materials[0].stock_after, 0.0);
    }

    #[test]
    fn low_stock_crossing_is_detected_once() {
        let plan = plan_order(
            &[(1, 5)],
            &[product(1, 1.0, 10, 5)],
            &[recipe(1, 10, 1.0)],
            &[material(10, 3.0, 5.0)],
            0.0,
        )
        .unwrap();
        // 10 -> 5 crosses min 5
        assert!(plan.products[0].crosses_min);
        // already below min before the order
        assert!(!plan.materials[0].crosses_min);
    }

    #[test]
    fn restore_inverts_recorded_usage() {
        let (products, materials) =
            restore_quantities(&[(2, 1), (1, 3), (2, 2)], &[(10, -0.06), (11, -0.45), (10, -0.02)]);
        assert_eq!(products, vec![(1, 3), (2, 3)]);
        assert_eq!(materials, vec![(10, 0.08), (11, 0.45)]);
    }
}
