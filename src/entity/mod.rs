pub mod analytics_events;
pub mod audit_logs;
pub mod cart_coupons;
pub mod cart_items;
pub mod carts;
pub mod inventories;
pub mod inventory_alerts;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod stock_movements;
pub mod users;

pub use analytics_events::Entity as AnalyticsEvents;
pub use audit_logs::Entity as AuditLogs;
pub use cart_coupons::Entity as CartCoupons;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use inventories::Entity as Inventories;
pub use inventory_alerts::Entity as InventoryAlerts;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use stock_movements::Entity as StockMovements;
pub use users::Entity as Users;
