use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::EventType;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordEventRequest {
    pub event_type: EventType,
    pub product_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub revenue: Option<i64>,
    pub units_sold: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventTypeSummary {
    pub event_type: EventType,
    pub count: i64,
    pub revenue: i64,
    pub units_sold: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesReport {
    pub total_revenue: i64,
    pub total_units: i64,
    pub by_type: Vec<EventTypeSummary>,
}
