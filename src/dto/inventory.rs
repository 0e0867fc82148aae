use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Batches, Inventory, InventoryAlert, MovementType, StockMovement};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInventoryRequest {
    pub product_id: Uuid,
    pub stock_level: Option<i32>,
    pub min_stock_level: i32,
    pub max_stock_level: i32,
    pub reorder_level: Option<i32>,
    pub reorder_quantity: Option<i32>,
    pub location: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub batches: Option<Batches>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddStockRequest {
    pub quantity: i32,
    pub reason: Option<String>,
    /// `in` (default) or `return`.
    pub movement_type: Option<MovementType>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveStockRequest {
    pub quantity: i32,
    pub reason: Option<String>,
    /// `out` (default) or `damage`.
    pub movement_type: Option<MovementType>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustStockRequest {
    pub delta: i32,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryWithMovements {
    pub inventory: Inventory,
    pub movements: Vec<StockMovement>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryList {
    pub items: Vec<Inventory>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AlertList {
    pub items: Vec<InventoryAlert>,
}
