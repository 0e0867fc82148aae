use sea_orm::entity::prelude::*;

use crate::models::EventType;

/// Append-only fact record; never mutated, hard-deleted by retention cleanup.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "analytics_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub event_type: EventType,
    pub user_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub revenue: i64,
    pub units_sold: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
