use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::inventory::{
        AddStockRequest, AdjustStockRequest, AlertList, CreateInventoryRequest, InventoryList,
        InventoryWithMovements, RemoveStockRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Inventory, InventoryAlert},
    response::ApiResponse,
    routes::params::{AlertListQuery, Pagination},
    services::inventory_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventories).post(create_inventory))
        .route("/alerts", get(list_alerts))
        .route("/alerts/{id}/resolve", patch(resolve_alert))
        .route("/{id}", get(get_inventory))
        .route("/{id}/add", post(add_stock))
        .route("/{id}/remove", post(remove_stock))
        .route("/{id}/adjust", post(adjust_stock))
        .route("/{id}/check-alerts", post(check_alerts))
}

#[utoipa::path(
    post,
    path = "/api/inventory",
    request_body = CreateInventoryRequest,
    responses(
        (status = 200, description = "Create an inventory record for an owned product", body = ApiResponse<Inventory>),
        (status = 400, description = "Record already exists"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn create_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateInventoryRequest>,
) -> AppResult<Json<ApiResponse<Inventory>>> {
    let resp = inventory_service::create_inventory(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/inventory",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List inventory records for the current seller", body = ApiResponse<InventoryList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_inventories(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<InventoryList>>> {
    let resp = inventory_service::list_inventories(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    params(
        ("id" = Uuid, Path, description = "Inventory ID")
    ),
    responses(
        (status = 200, description = "Inventory record with recent movements", body = ApiResponse<InventoryWithMovements>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<InventoryWithMovements>>> {
    let resp = inventory_service::get_inventory(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/inventory/{id}/add",
    params(
        ("id" = Uuid, Path, description = "Inventory ID")
    ),
    request_body = AddStockRequest,
    responses(
        (status = 200, description = "Receive stock", body = ApiResponse<Inventory>),
        (status = 400, description = "Invalid quantity or movement type"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn add_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddStockRequest>,
) -> AppResult<Json<ApiResponse<Inventory>>> {
    let resp = inventory_service::add_stock(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/inventory/{id}/remove",
    params(
        ("id" = Uuid, Path, description = "Inventory ID")
    ),
    request_body = RemoveStockRequest,
    responses(
        (status = 200, description = "Deduct stock", body = ApiResponse<Inventory>),
        (status = 400, description = "Invalid quantity or movement type"),
        (status = 409, description = "Insufficient stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn remove_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RemoveStockRequest>,
) -> AppResult<Json<ApiResponse<Inventory>>> {
    let resp = inventory_service::remove_stock(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/inventory/{id}/adjust",
    params(
        ("id" = Uuid, Path, description = "Inventory ID")
    ),
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Correct stock by a signed delta", body = ApiResponse<Inventory>),
        (status = 400, description = "Zero delta or result below zero"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustStockRequest>,
) -> AppResult<Json<ApiResponse<Inventory>>> {
    let resp = inventory_service::adjust_stock(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/inventory/{id}/check-alerts",
    params(
        ("id" = Uuid, Path, description = "Inventory ID")
    ),
    responses(
        (status = 200, description = "Re-evaluate alert conditions for this record", body = ApiResponse<AlertList>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn check_alerts(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AlertList>>> {
    let resp = inventory_service::check_alerts(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/inventory/alerts",
    params(
        ("unresolved_only" = Option<bool>, Query, description = "Default true")
    ),
    responses(
        (status = 200, description = "Alerts across the seller's inventory, most severe first", body = ApiResponse<AlertList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AlertListQuery>,
) -> AppResult<Json<ApiResponse<AlertList>>> {
    let resp = inventory_service::list_alerts(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/inventory/alerts/{id}/resolve",
    params(
        ("id" = Uuid, Path, description = "Alert ID")
    ),
    responses(
        (status = 200, description = "Mark an alert resolved", body = ApiResponse<InventoryAlert>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn resolve_alert(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<InventoryAlert>>> {
    let resp = inventory_service::resolve_alert(&state, &user, id).await?;
    Ok(Json(resp))
}
