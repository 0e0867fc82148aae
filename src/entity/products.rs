use sea_orm::entity::prelude::*;

use crate::models::{Alternatives, NutritionFacts, ProductCategory};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub seller_id: Uuid,
    #[sea_orm(unique)]
    pub barcode: String,
    pub name: String,
    pub description: Option<String>,
    pub category: ProductCategory,
    pub price: i64,
    pub original_price: Option<i64>,
    pub unit: String,
    pub nutrition: Option<NutritionFacts>,
    pub health_score: i16,
    pub min_stock_level: i32,
    pub max_stock_level: i32,
    pub alternatives: Alternatives,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_items::Entity")]
    CartItems,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::inventories::Entity")]
    Inventories,
}

impl Related<super::cart_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::inventories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
