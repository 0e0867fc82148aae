use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    domain::alerts::{self, StockSnapshot},
    dto::inventory::{
        AddStockRequest, AdjustStockRequest, AlertList, CreateInventoryRequest, InventoryList,
        InventoryWithMovements, RemoveStockRequest,
    },
    entity::{
        inventories::{
            ActiveModel as InventoryActive, Column as InvCol, Entity as Inventories,
            Model as InventoryModel,
        },
        inventory_alerts::{
            ActiveModel as AlertActive, Column as AlertCol, Entity as InventoryAlerts,
        },
        products::Entity as Products,
        stock_movements::{ActiveModel as MovementActive, Column as MovCol, Entity as StockMovements},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_seller},
    models::{Inventory, InventoryAlert, MovementType},
    response::{ApiResponse, Meta},
    routes::params::{AlertListQuery, Pagination},
    state::AppState,
};

pub async fn create_inventory(
    state: &AppState,
    user: &AuthUser,
    payload: CreateInventoryRequest,
) -> AppResult<ApiResponse<Inventory>> {
    ensure_seller(user)?;

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    if product.seller_id != user.user_id && user.role != "admin" {
        return Err(AppError::Forbidden);
    }

    let stock_level = payload.stock_level.unwrap_or(0);
    if stock_level < 0 {
        return Err(AppError::BadRequest(
            "stock_level must not be negative".to_string(),
        ));
    }

    let result = InventoryActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        seller_id: Set(product.seller_id),
        stock_level: Set(stock_level),
        min_stock_level: Set(payload.min_stock_level),
        max_stock_level: Set(payload.max_stock_level),
        reorder_level: Set(payload.reorder_level.unwrap_or(payload.min_stock_level)),
        reorder_quantity: Set(payload.reorder_quantity.unwrap_or(0)),
        location: Set(payload.location),
        expiry_date: Set(payload.expiry_date),
        batches: Set(payload.batches.unwrap_or_default()),
        predicted_daily_demand: Set(None),
        predicted_weekly_demand: Set(None),
        predicted_monthly_demand: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await;

    let inventory = match result {
        Ok(inv) => inv,
        // One record per (product, seller) pair.
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::BadRequest(
                "inventory already exists for this product".to_string(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    Ok(ApiResponse::success(
        "Inventory created",
        inventory.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_inventories(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<InventoryList>> {
    ensure_seller(user)?;
    let (page, limit, offset) = pagination.normalize();

    let mut finder = Inventories::find();
    if user.role != "admin" {
        finder = finder.filter(InvCol::SellerId.eq(user.user_id));
    }
    finder = finder.order_by_desc(InvCol::UpdatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Inventories",
        InventoryList { items },
        Some(meta),
    ))
}

pub async fn get_inventory(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<InventoryWithMovements>> {
    let inventory = find_owned(&state.orm, user, id).await?;

    let movements = StockMovements::find()
        .filter(MovCol::InventoryId.eq(inventory.id))
        .order_by_desc(MovCol::CreatedAt)
        .limit(100)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(ApiResponse::success(
        "Inventory",
        InventoryWithMovements {
            inventory: inventory.into(),
            movements,
        },
        Some(Meta::empty()),
    ))
}

pub async fn add_stock(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AddStockRequest,
) -> AppResult<ApiResponse<Inventory>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    let movement_type = payload.movement_type.unwrap_or(MovementType::In);
    if !matches!(movement_type, MovementType::In | MovementType::Return) {
        return Err(AppError::BadRequest(
            "movement_type must be in or return".to_string(),
        ));
    }

    let txn = state.orm.begin().await?;
    let inventory = find_owned_locked(&txn, user, id).await?;

    let new_level = inventory.stock_level + payload.quantity;
    let inventory = apply_stock_change(
        &txn,
        inventory,
        new_level,
        movement_type,
        payload.quantity,
        payload.reason,
    )
    .await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "stock_add",
        Some("inventories"),
        Some(serde_json::json!({ "inventory_id": id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Stock added",
        inventory.into(),
        Some(Meta::empty()),
    ))
}

pub async fn remove_stock(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: RemoveStockRequest,
) -> AppResult<ApiResponse<Inventory>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    let movement_type = payload.movement_type.unwrap_or(MovementType::Out);
    if !matches!(movement_type, MovementType::Out | MovementType::Damage) {
        return Err(AppError::BadRequest(
            "movement_type must be out or damage".to_string(),
        ));
    }

    let txn = state.orm.begin().await?;
    let inventory = find_owned_locked(&txn, user, id).await?;

    // The only hard invariant at the mutation boundary: the level never goes
    // negative. The transaction is dropped unchanged on failure.
    if payload.quantity > inventory.stock_level {
        return Err(AppError::InsufficientStock {
            requested: payload.quantity,
            available: inventory.stock_level,
        });
    }

    let new_level = inventory.stock_level - payload.quantity;
    let inventory = apply_stock_change(
        &txn,
        inventory,
        new_level,
        movement_type,
        payload.quantity,
        payload.reason,
    )
    .await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Stock removed",
        inventory.into(),
        Some(Meta::empty()),
    ))
}

pub async fn adjust_stock(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AdjustStockRequest,
) -> AppResult<ApiResponse<Inventory>> {
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be 0".to_string()));
    }

    let txn = state.orm.begin().await?;
    let inventory = find_owned_locked(&txn, user, id).await?;

    let new_level = inventory.stock_level + payload.delta;
    if new_level < 0 {
        return Err(AppError::BadRequest(
            "stock cannot be negative".to_string(),
        ));
    }

    let inventory = apply_stock_change(
        &txn,
        inventory,
        new_level,
        MovementType::Adjustment,
        payload.delta,
        payload.reason,
    )
    .await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Stock adjusted",
        inventory.into(),
        Some(Meta::empty()),
    ))
}

pub async fn check_alerts(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<AlertList>> {
    find_owned(&state.orm, user, id).await?;
    let items = run_alert_check(&state.orm, id).await?;
    Ok(ApiResponse::success(
        "Alerts evaluated",
        AlertList { items },
        Some(Meta::empty()),
    ))
}

/// Evaluate one inventory record and reconcile its alert list: a condition
/// appends a new alert only while no unresolved alert of the same type exists,
/// and unresolved alerts whose condition has cleared are resolved. Returns the
/// unresolved alerts after reconciliation, most urgent first.
pub async fn run_alert_check(
    conn: &DatabaseConnection,
    inventory_id: Uuid,
) -> AppResult<Vec<InventoryAlert>> {
    let txn = conn.begin().await?;

    let inventory = Inventories::find_by_id(inventory_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let inventory = match inventory {
        Some(inv) => inv,
        None => return Err(AppError::NotFound),
    };

    let snapshot = StockSnapshot {
        stock_level: inventory.stock_level,
        min_stock_level: inventory.min_stock_level,
        max_stock_level: inventory.max_stock_level,
        expiry_date: inventory.expiry_date,
    };
    let conditions = alerts::evaluate(&snapshot, Utc::now().date_naive());

    let unresolved = InventoryAlerts::find()
        .filter(AlertCol::InventoryId.eq(inventory.id))
        .filter(AlertCol::Resolved.eq(false))
        .all(&txn)
        .await?;

    for condition in &conditions {
        let already_open = unresolved
            .iter()
            .any(|alert| alert.alert_type == condition.alert_type);
        if already_open {
            continue;
        }
        AlertActive {
            id: Set(Uuid::new_v4()),
            inventory_id: Set(inventory.id),
            alert_type: Set(condition.alert_type.clone()),
            severity: Set(condition.severity.clone()),
            message: Set(condition.message.clone()),
            resolved: Set(false),
            resolved_at: Set(None),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    // Conditions that stopped being true resolve their open alert.
    for alert in unresolved {
        let still_true = conditions
            .iter()
            .any(|condition| condition.alert_type == alert.alert_type);
        if still_true {
            continue;
        }
        let mut active: AlertActive = alert.into();
        active.resolved = Set(true);
        active.resolved_at = Set(Some(Utc::now().into()));
        active.update(&txn).await?;
    }

    let mut items: Vec<InventoryAlert> = InventoryAlerts::find()
        .filter(AlertCol::InventoryId.eq(inventory.id))
        .filter(AlertCol::Resolved.eq(false))
        .all(&txn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    txn.commit().await?;

    items.sort_by_key(|alert| alert.severity.rank());
    Ok(items)
}

/// Scheduler sweep over every inventory record. A failing record is logged and
/// skipped; the sweep finishes the rest.
pub async fn sweep_alerts(conn: &DatabaseConnection) -> AppResult<usize> {
    let ids: Vec<Uuid> = Inventories::find()
        .select_only()
        .column(InvCol::Id)
        .into_tuple()
        .all(conn)
        .await?;

    let mut checked = 0usize;
    for id in ids {
        match run_alert_check(conn, id).await {
            Ok(_) => checked += 1,
            Err(err) => {
                tracing::error!(inventory_id = %id, error = %err, "alert check failed");
            }
        }
    }
    Ok(checked)
}

pub async fn list_alerts(
    state: &AppState,
    user: &AuthUser,
    query: AlertListQuery,
) -> AppResult<ApiResponse<AlertList>> {
    ensure_seller(user)?;
    let unresolved_only = query.unresolved_only.unwrap_or(true);

    let mut inventory_finder = Inventories::find().select_only().column(InvCol::Id);
    if user.role != "admin" {
        inventory_finder = inventory_finder.filter(InvCol::SellerId.eq(user.user_id));
    }
    let inventory_ids: Vec<Uuid> = inventory_finder.into_tuple().all(&state.orm).await?;

    let mut finder = InventoryAlerts::find().filter(AlertCol::InventoryId.is_in(inventory_ids));
    if unresolved_only {
        finder = finder.filter(AlertCol::Resolved.eq(false));
    }

    let mut items: Vec<InventoryAlert> = finder
        .order_by_desc(AlertCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    // Severity is a string column; the display order lives in the enum.
    items.sort_by_key(|alert| alert.severity.rank());

    Ok(ApiResponse::success(
        "Alerts",
        AlertList { items },
        Some(Meta::empty()),
    ))
}

pub async fn resolve_alert(
    state: &AppState,
    user: &AuthUser,
    alert_id: Uuid,
) -> AppResult<ApiResponse<InventoryAlert>> {
    let alert = InventoryAlerts::find_by_id(alert_id).one(&state.orm).await?;
    let alert = match alert {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };
    find_owned(&state.orm, user, alert.inventory_id).await?;

    if alert.resolved {
        return Err(AppError::BadRequest("alert already resolved".to_string()));
    }

    let mut active: AlertActive = alert.into();
    active.resolved = Set(true);
    active.resolved_at = Set(Some(Utc::now().into()));
    let alert = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Alert resolved",
        alert.into(),
        Some(Meta::empty()),
    ))
}

/// Daily scheduler job: project per-product demand from the trailing 90 days
/// of order lines and store it on the matching inventory records.
pub async fn update_demand_predictions(conn: &DatabaseConnection) -> AppResult<usize> {
    use crate::domain::demand;
    use crate::entity::{order_items, orders};
    use sea_orm::{FromQueryResult, JoinType, RelationTrait};
    use std::collections::HashMap;

    #[derive(FromQueryResult)]
    struct UnitsRow {
        product_id: Uuid,
        units: i64,
    }

    let cutoff = Utc::now() - chrono::Duration::days(demand::WINDOW_DAYS);

    let rows = order_items::Entity::find()
        .select_only()
        .column(order_items::Column::ProductId)
        .column_as(order_items::Column::Quantity.sum(), "units")
        .join(JoinType::InnerJoin, order_items::Relation::Orders.def())
        .filter(orders::Column::CreatedAt.gte(cutoff))
        .group_by(order_items::Column::ProductId)
        .into_model::<UnitsRow>()
        .all(conn)
        .await?;

    let units_by_product: HashMap<Uuid, i64> =
        rows.into_iter().map(|r| (r.product_id, r.units)).collect();

    let inventories = Inventories::find().all(conn).await?;
    let mut updated = 0usize;
    for inventory in inventories {
        let units = units_by_product
            .get(&inventory.product_id)
            .copied()
            .unwrap_or(0);
        let projection = demand::project(units);

        let mut active: InventoryActive = inventory.into();
        active.predicted_daily_demand = Set(Some(projection.daily));
        active.predicted_weekly_demand = Set(Some(projection.weekly));
        active.predicted_monthly_demand = Set(Some(projection.monthly));
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await?;
        updated += 1;
    }

    Ok(updated)
}

async fn apply_stock_change<C: ConnectionTrait>(
    conn: &C,
    inventory: InventoryModel,
    new_level: i32,
    movement_type: MovementType,
    quantity: i32,
    reason: Option<String>,
) -> AppResult<InventoryModel> {
    MovementActive {
        id: Set(Uuid::new_v4()),
        inventory_id: Set(inventory.id),
        movement_type: Set(movement_type),
        quantity: Set(quantity),
        reason: Set(reason),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;

    let mut active: InventoryActive = inventory.into();
    active.stock_level = Set(new_level);
    active.updated_at = Set(Utc::now().into());
    let inventory = active.update(conn).await?;
    Ok(inventory)
}

async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<InventoryModel> {
    ensure_seller(user)?;
    let inventory = Inventories::find_by_id(id).one(conn).await?;
    let inventory = match inventory {
        Some(inv) => inv,
        None => return Err(AppError::NotFound),
    };
    if inventory.seller_id != user.user_id && user.role != "admin" {
        return Err(AppError::Forbidden);
    }
    Ok(inventory)
}

async fn find_owned_locked<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<InventoryModel> {
    ensure_seller(user)?;
    let inventory = Inventories::find_by_id(id)
        .lock(LockType::Update)
        .one(conn)
        .await?;
    let inventory = match inventory {
        Some(inv) => inv,
        None => return Err(AppError::NotFound),
    };
    if inventory.seller_id != user.user_id && user.role != "admin" {
        return Err(AppError::Forbidden);
    }
    Ok(inventory)
}
