//! Dashboard read models

use serde::{Deserialize, Serialize};

/// Headline numbers for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today_revenue: f64,
    pub today_orders: i64,
    pub average_order_value: f64,
    pub total_customers: i64,
    pub active_products: i64,
    pub low_stock_products: i64,
    pub low_stock_materials: i64,
    pub unread_notifications: i64,
}

/// Revenue for one day (UTC+7)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    /// `YYYY-MM-DD`
    pub date: String,
    pub revenue: f64,
    pub orders: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: i64,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue: f64,
}
