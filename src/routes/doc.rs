use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        analytics::{EventTypeSummary, SalesReport},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddItemRequest, ApplyCouponRequest, CartView, UpdateItemRequest},
        inventory::{
            AddStockRequest, AdjustStockRequest, AlertList, CreateInventoryRequest, InventoryList,
            InventoryWithMovements, RemoveStockRequest,
        },
        orders::{CheckoutRequest, OrderList, OrderWithItems, PayOrderRequest, UpdateOrderStatusRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
    },
    models::{
        Cart, CartCoupon, CartItem, Inventory, InventoryAlert, Order, OrderItem, Product,
        StockMovement, User,
    },
    response::{ApiResponse, Meta},
    routes::{admin, analytics, auth, cart, health, inventory, orders, params, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        products::list_products,
        products::create_product,
        products::get_product,
        products::get_product_by_barcode,
        products::update_product,
        products::delete_product,
        cart::get_cart,
        cart::add_item,
        cart::update_item,
        cart::remove_item,
        cart::clear_cart,
        cart::apply_coupon,
        cart::remove_coupon,
        inventory::create_inventory,
        inventory::list_inventories,
        inventory::get_inventory,
        inventory::add_stock,
        inventory::remove_stock,
        inventory::adjust_stock,
        inventory::check_alerts,
        inventory::list_alerts,
        inventory::resolve_alert,
        orders::list_orders,
        orders::checkout,
        orders::pay_order,
        orders::get_order,
        analytics::record_event,
        analytics::sales_report,
        admin::list_all_orders,
        admin::update_order_status
    ),
    components(
        schemas(
            User,
            Product,
            Inventory,
            InventoryAlert,
            StockMovement,
            Cart,
            CartItem,
            CartCoupon,
            Order,
            OrderItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            AddItemRequest,
            UpdateItemRequest,
            ApplyCouponRequest,
            CartView,
            CreateInventoryRequest,
            AddStockRequest,
            RemoveStockRequest,
            AdjustStockRequest,
            InventoryWithMovements,
            InventoryList,
            AlertList,
            CheckoutRequest,
            PayOrderRequest,
            UpdateOrderStatusRequest,
            OrderWithItems,
            OrderList,
            EventTypeSummary,
            SalesReport,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::AlertListQuery,
            params::ReportQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<Inventory>,
            ApiResponse<InventoryWithMovements>,
            ApiResponse<AlertList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<SalesReport>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Inventory", description = "Inventory and alert endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Analytics", description = "Analytics endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
