//! Stock movement ledgers

use serde::{Deserialize, Serialize};

/// Cause of a product stock change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "stock_movement_type", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockMovementType {
    Sale,
    Restock,
    Adjustment,
    Cancel,
}

impl StockMovementType {
    /// Whether a manual product adjustment with this type accepts the given delta
    pub fn accepts_manual_delta(&self, delta: i32) -> bool {
        match self {
            Self::Restock => delta > 0,
            Self::Adjustment => delta != 0,
            Self::Sale | Self::Cancel => false,
        }
    }
}

/// Cause of a raw material stock change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(
        type_name = "raw_material_movement_type",
        rename_all = "SCREAMING_SNAKE_CASE"
    )
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RawMaterialMovementType {
    Usage,
    Restock,
    Waste,
    Adjustment,
    Cancel,
}

impl RawMaterialMovementType {
    /// Whether a manual adjustment with this type accepts the given signed delta
    pub fn accepts_manual_delta(&self, delta: f64) -> bool {
        if !delta.is_finite() || delta == 0.0 {
            return false;
        }
        match self {
            Self::Restock => delta > 0.0,
            Self::Waste => delta < 0.0,
            Self::Adjustment => true,
            // Written by the order flow only
            Self::Usage | Self::Cancel => false,
        }
    }
}

/// Raw material movement row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialMovement {
    pub id: i64,
    pub store_id: i64,
    pub raw_material_id: i64,
    pub raw_material_name: String,
    pub movement_type: RawMaterialMovementType,
    pub quantity: f64,
    pub stock_before: f64,
    pub stock_after: f64,
    pub reference_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_delta_sign_rules() {
        assert!(RawMaterialMovementType::Restock.accepts_manual_delta(5.0));
        assert!(!RawMaterialMovementType::Restock.accepts_manual_delta(-5.0));
        assert!(RawMaterialMovementType::Waste.accepts_manual_delta(-0.5));
        assert!(!RawMaterialMovementType::Waste.accepts_manual_delta(0.5));
        assert!(RawMaterialMovementType::Adjustment.accepts_manual_delta(-2.0));
        assert!(RawMaterialMovementType::Adjustment.accepts_manual_delta(2.0));
        assert!(!RawMaterialMovementType::Adjustment.accepts_manual_delta(0.0));
        assert!(!RawMaterialMovementType::Adjustment.accepts_manual_delta(f64::NAN));
        assert!(!RawMaterialMovementType::Usage.accepts_manual_delta(-1.0));
        assert!(!RawMaterialMovementType::Cancel.accepts_manual_delta(1.0));
    }

    #[test]
    fn product_delta_sign_rules() {
        assert!(StockMovementType::Restock.accepts_manual_delta(10));
        assert!(!StockMovementType::Restock.accepts_manual_delta(-1));
        assert!(StockMovementType::Adjustment.accepts_manual_delta(-3));
        assert!(!StockMovementType::Adjustment.accepts_manual_delta(0));
        assert!(!StockMovementType::Sale.accepts_manual_delta(-1));
        assert!(!StockMovementType::Cancel.accepts_manual_delta(1));
    }

    #[test]
    fn movement_type_serde() {
        let json = serde_json::to_string(&RawMaterialMovementType::Waste).unwrap();
        assert_eq!(json, "\"WASTE\"");
        let t: StockMovementType = serde_json::from_str("\"RESTOCK\"").unwrap();
        assert_eq!(t, StockMovementType::Restock);
    }
}
