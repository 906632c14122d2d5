//! Raw Material Model

use serde::{Deserialize, Serialize};

/// Raw material (ingredient) entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct RawMaterial {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub unit: String,
    pub stock: f64,
    pub min_stock_level: f64,
    pub cost_per_unit: f64,
    pub supplier: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Raw material with computed low-stock flag (list view)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialSummary {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub stock: f64,
    pub min_stock_level: f64,
    pub cost_per_unit: f64,
    pub supplier: Option<String>,
    pub low_stock: bool,
    pub updated_at: i64,
}

/// Create raw material payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialCreate {
    pub store_id: i64,
    pub name: String,
    pub unit: String,
    pub stock: Option<f64>,
    pub min_stock_level: Option<f64>,
    pub cost_per_unit: Option<f64>,
    pub supplier: Option<String>,
}

/// Update raw material payload (metadata only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialUpdate {
    pub store_id: i64,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub min_stock_level: Option<f64>,
    pub cost_per_unit: Option<f64>,
    pub supplier: Option<String>,
}

/// Manual stock adjustment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub store_id: i64,
    /// Signed delta
    pub quantity: f64,
    pub movement_type: super::RawMaterialMovementType,
    pub notes: Option<String>,
}
