use sea_orm::entity::prelude::*;

use crate::models::Batches;

/// One record per (product, seller) pair; uniqueness enforced by the schema.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inventories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub stock_level: i32,
    pub min_stock_level: i32,
    pub max_stock_level: i32,
    pub reorder_level: i32,
    pub reorder_quantity: i32,
    pub location: Option<String>,
    pub expiry_date: Option<Date>,
    pub batches: Batches,
    pub predicted_daily_demand: Option<f64>,
    pub predicted_weekly_demand: Option<f64>,
    pub predicted_monthly_demand: Option<f64>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id"
    )]
    Products,
    #[sea_orm(has_many = "super::stock_movements::Entity")]
    StockMovements,
    #[sea_orm(has_many = "super::inventory_alerts::Entity")]
    InventoryAlerts,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::stock_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockMovements.def()
    }
}

impl Related<super::inventory_alerts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryAlerts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
