use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::StringLen;
use sea_orm::{DeriveActiveEnum, EnumIter, FromJsonQueryResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    #[sea_orm(string_value = "produce")]
    Produce,
    #[sea_orm(string_value = "dairy")]
    Dairy,
    #[sea_orm(string_value = "bakery")]
    Bakery,
    #[sea_orm(string_value = "meat")]
    Meat,
    #[sea_orm(string_value = "seafood")]
    Seafood,
    #[sea_orm(string_value = "frozen")]
    Frozen,
    #[sea_orm(string_value = "pantry")]
    Pantry,
    #[sea_orm(string_value = "snacks")]
    Snacks,
    #[sea_orm(string_value = "beverages")]
    Beverages,
    #[sea_orm(string_value = "household")]
    Household,
    #[sea_orm(string_value = "personal_care")]
    PersonalCare,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    #[sea_orm(string_value = "in")]
    In,
    #[sea_orm(string_value = "out")]
    Out,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    #[sea_orm(string_value = "return")]
    Return,
    #[sea_orm(string_value = "damage")]
    Damage,
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    #[sea_orm(string_value = "out_of_stock")]
    OutOfStock,
    #[sea_orm(string_value = "low_stock")]
    LowStock,
    #[sea_orm(string_value = "overstock")]
    Overstock,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "expiring_soon")]
    ExpiringSoon,
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    #[sea_orm(string_value = "critical")]
    Critical,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "low")]
    Low,
}

impl AlertSeverity {
    /// Total display ordering over all four severities, most urgent first.
    pub fn rank(&self) -> u8 {
        match self {
            AlertSeverity::Critical => 0,
            AlertSeverity::High => 1,
            AlertSeverity::Medium => 2,
            AlertSeverity::Low => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    #[sea_orm(string_value = "percentage")]
    Percentage,
    #[sea_orm(string_value = "fixed")]
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "view")]
    View,
    #[sea_orm(string_value = "search")]
    Search,
    #[sea_orm(string_value = "cart_add")]
    CartAdd,
    #[sea_orm(string_value = "cart_remove")]
    CartRemove,
}

/// Per-serving nutrition facts, stored as a JSON column on the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct NutritionFacts {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub sodium_mg: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlternativeKind {
    Healthier,
    Cheaper,
    Popular,
}

/// Suggested substitute for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Alternative {
    pub product_id: Uuid,
    pub reason: String,
    pub kind: AlternativeKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(transparent)]
pub struct Alternatives(pub Vec<Alternative>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Batch {
    pub batch_number: String,
    pub quantity: i32,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(transparent)]
pub struct Batches(pub Vec<Batch>);

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub seller_id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Inventory {
    pub id: Uuid,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub stock_level: i32,
    pub min_stock_level: i32,
    pub max_stock_level: i32,
    pub reorder_level: i32,
    pub reorder_quantity: i32,
    pub location: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub batches: Batches,
    pub predicted_daily_demand: Option<f64>,
    pub predicted_weekly_demand: Option<f64>,
    pub predicted_monthly_demand: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StockMovement {
    pub id: Uuid,
    pub inventory_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InventoryAlert {
    pub id: Uuid,
    pub inventory_id: Uuid,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: i64,
    pub total_items: i32,
    pub savings: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Price snapshot taken when the item was added.
    pub price: i64,
    pub original_price: Option<i64>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartCoupon {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub code: String,
    pub kind: CouponKind,
    pub value: i64,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    pub status: String,
    pub payment_status: String,
    pub subtotal: i64,
    pub discount: i64,
    pub tax: i64,
    pub total_amount: i64,
    pub savings: i64,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
    pub original_price: Option<i64>,
    /// Per-unit discount captured at purchase time.
    pub discount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub event_type: EventType,
    pub user_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub revenue: i64,
    pub units_sold: i32,
    pub created_at: DateTime<Utc>,
}

// Entity -> API model conversions, collected here so every service maps rows
// the same way.

use crate::entity;

impl From<entity::users::Model> for User {
    fn from(m: entity::users::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            password_hash: m.password_hash,
            role: m.role,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::products::Model> for Product {
    fn from(m: entity::products::Model) -> Self {
        Self {
            id: m.id,
            seller_id: m.seller_id,
            barcode: m.barcode,
            name: m.name,
            description: m.description,
            category: m.category,
            price: m.price,
            original_price: m.original_price,
            unit: m.unit,
            nutrition: m.nutrition,
            health_score: m.health_score,
            min_stock_level: m.min_stock_level,
            max_stock_level: m.max_stock_level,
            alternatives: m.alternatives,
            is_active: m.is_active,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::inventories::Model> for Inventory {
    fn from(m: entity::inventories::Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            seller_id: m.seller_id,
            stock_level: m.stock_level,
            min_stock_level: m.min_stock_level,
            max_stock_level: m.max_stock_level,
            reorder_level: m.reorder_level,
            reorder_quantity: m.reorder_quantity,
            location: m.location,
            expiry_date: m.expiry_date,
            batches: m.batches,
            predicted_daily_demand: m.predicted_daily_demand,
            predicted_weekly_demand: m.predicted_weekly_demand,
            predicted_monthly_demand: m.predicted_monthly_demand,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::stock_movements::Model> for StockMovement {
    fn from(m: entity::stock_movements::Model) -> Self {
        Self {
            id: m.id,
            inventory_id: m.inventory_id,
            movement_type: m.movement_type,
            quantity: m.quantity,
            reason: m.reason,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::inventory_alerts::Model> for InventoryAlert {
    fn from(m: entity::inventory_alerts::Model) -> Self {
        Self {
            id: m.id,
            inventory_id: m.inventory_id,
            alert_type: m.alert_type,
            severity: m.severity,
            message: m.message,
            resolved: m.resolved,
            resolved_at: m.resolved_at.map(|dt| dt.with_timezone(&Utc)),
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::carts::Model> for Cart {
    fn from(m: entity::carts::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            total_amount: m.total_amount,
            total_items: m.total_items,
            savings: m.savings,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::cart_items::Model> for CartItem {
    fn from(m: entity::cart_items::Model) -> Self {
        Self {
            id: m.id,
            cart_id: m.cart_id,
            product_id: m.product_id,
            quantity: m.quantity,
            price: m.price,
            original_price: m.original_price,
            added_at: m.added_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::cart_coupons::Model> for CartCoupon {
    fn from(m: entity::cart_coupons::Model) -> Self {
        Self {
            id: m.id,
            cart_id: m.cart_id,
            code: m.code,
            kind: m.kind,
            value: m.value,
            position: m.position,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::orders::Model> for Order {
    fn from(m: entity::orders::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            order_number: m.order_number,
            status: m.status,
            payment_status: m.payment_status,
            subtotal: m.subtotal,
            discount: m.discount,
            tax: m.tax,
            total_amount: m.total_amount,
            savings: m.savings,
            paid_at: m.paid_at.map(|dt| dt.with_timezone(&Utc)),
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::order_items::Model> for OrderItem {
    fn from(m: entity::order_items::Model) -> Self {
        Self {
            id: m.id,
            order_id: m.order_id,
            product_id: m.product_id,
            quantity: m.quantity,
            price: m.price,
            original_price: m.original_price,
            discount: m.discount,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::analytics_events::Model> for AnalyticsEvent {
    fn from(m: entity::analytics_events::Model) -> Self {
        Self {
            id: m.id,
            event_type: m.event_type,
            user_id: m.user_id,
            seller_id: m.seller_id,
            product_id: m.product_id,
            revenue: m.revenue,
            units_sold: m.units_sold,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}
