//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Selling price in Rupiah
    pub price: f64,
    /// Cost price in Rupiah
    pub cost: f64,
    pub stock_quantity: i32,
    pub min_stock_level: i32,
    pub unit: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Product row for list views
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    pub cost: f64,
    pub stock_quantity: i32,
    pub min_stock_level: i32,
    pub unit: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub recipe_count: i64,
    pub low_stock: bool,
}

/// One recipe line: raw material consumed per unit of product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct RecipeLine {
    pub id: i64,
    pub product_id: i64,
    pub raw_material_id: i64,
    pub raw_material_name: String,
    pub unit: String,
    pub quantity: f64,
}

/// Recipe line input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    pub raw_material_id: i64,
    pub quantity: f64,
}

/// Product with its recipe (detail view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub recipe: Vec<RecipeLine>,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub store_id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub cost: Option<f64>,
    pub stock_quantity: Option<i32>,
    pub min_stock_level: Option<i32>,
    pub unit: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub recipe: Vec<RecipeInput>,
}

/// Update product payload (stock goes through `ProductStockAdjustment`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub store_id: i64,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub min_stock_level: Option<i32>,
    pub unit: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

/// Replace recipe payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeReplace {
    pub store_id: i64,
    pub lines: Vec<RecipeInput>,
}

/// Manual product stock adjustment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStockAdjustment {
    pub store_id: i64,
    /// Signed delta in units
    pub quantity: i32,
    pub movement_type: super::StockMovementType,
    pub notes: Option<String>,
}
