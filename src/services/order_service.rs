use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    domain::{cart as cart_domain, order_number},
    dto::orders::{CheckoutRequest, OrderList, OrderWithItems, PayOrderRequest, UpdateOrderStatusRequest},
    entity::{
        cart_coupons::{Column as CouponCol, Entity as CartCoupons},
        cart_items::{Column as ItemCol, Entity as CartItems},
        carts::{Column as CartCol, Entity as Carts},
        inventories::{
            ActiveModel as InventoryActive, Column as InvCol, Entity as Inventories,
        },
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::Entity as Products,
        stock_movements::ActiveModel as MovementActive,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{EventType, MovementType, Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{analytics_service, cart_service},
    state::AppState,
};

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    _payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let cart = Carts::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let cart = match cart {
        Some(c) => c,
        None => return Err(AppError::BadRequest("Cart is empty".into())),
    };

    let lines = CartItems::find()
        .filter(ItemCol::CartId.eq(cart.id))
        .order_by_asc(ItemCol::AddedAt)
        .all(&txn)
        .await?;
    if lines.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let coupons = CartCoupons::find()
        .filter(CouponCol::CartId.eq(cart.id))
        .order_by_asc(CouponCol::Position)
        .all(&txn)
        .await?;

    // Same math the cart shows: subtotal before coupons, then the coupon
    // discount is whatever the coupons actually took off.
    let domain_lines: Vec<cart_domain::CartLine> = lines
        .iter()
        .map(|line| cart_domain::CartLine {
            price: line.price,
            original_price: line.original_price,
            quantity: line.quantity,
        })
        .collect();
    let domain_coupons: Vec<cart_domain::AppliedCoupon> = coupons
        .iter()
        .map(|coupon| cart_domain::AppliedCoupon {
            kind: coupon.kind.clone(),
            value: coupon.value,
        })
        .collect();
    let totals = cart_domain::compute_totals(&domain_lines, &domain_coupons);

    let subtotal: i64 = lines
        .iter()
        .map(|line| line.price * i64::from(line.quantity))
        .sum();
    let discount = subtotal - totals.total_amount;
    let tax = (subtotal - discount) * state.config.tax_rate_bps / 10_000;
    let total_amount = (subtotal - discount + tax).max(0);
    let savings = totals.savings;

    // Decrement seller stock where an inventory record tracks the product.
    // The seller of each line feeds the sale events below.
    let mut sellers: HashMap<Uuid, Uuid> = HashMap::new();
    for line in &lines {
        let product = Products::find_by_id(line.product_id).one(&txn).await?;
        let product = match product {
            Some(p) => p,
            None => return Err(AppError::BadRequest("Cart references a missing product".into())),
        };
        sellers.insert(product.id, product.seller_id);

        let inventory = Inventories::find()
            .filter(InvCol::ProductId.eq(product.id))
            .filter(InvCol::SellerId.eq(product.seller_id))
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let Some(inventory) = inventory else {
            continue;
        };

        if line.quantity > inventory.stock_level {
            return Err(AppError::InsufficientStock {
                requested: line.quantity,
                available: inventory.stock_level,
            });
        }

        MovementActive {
            id: Set(Uuid::new_v4()),
            inventory_id: Set(inventory.id),
            movement_type: Set(MovementType::Out),
            quantity: Set(line.quantity),
            reason: Set(Some("sale".to_string())),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        let new_level = inventory.stock_level - line.quantity;
        let mut active: InventoryActive = inventory.into();
        active.stock_level = Set(new_level);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;
    }

    let number = unique_order_number(&txn).await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        order_number: Set(number),
        status: Set("pending".into()),
        payment_status: Set("unpaid".into()),
        subtotal: Set(subtotal),
        discount: Set(discount),
        tax: Set(tax),
        total_amount: Set(total_amount),
        savings: Set(savings),
        paid_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::new();
    for line in &lines {
        let unit_discount = line
            .original_price
            .map(|original| (original - line.price).max(0))
            .unwrap_or(0);
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            price: Set(line.price),
            original_price: Set(line.original_price),
            discount: Set(unit_discount),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        order_items.push(item.into());
    }

    for line in &lines {
        analytics_service::record(
            &txn,
            EventType::Sale,
            Some(user.user_id),
            sellers.get(&line.product_id).copied(),
            Some(line.product_id),
            line.price * i64::from(line.quantity),
            line.quantity,
        )
        .await?;
    }

    CartItems::delete_many()
        .filter(ItemCol::CartId.eq(cart.id))
        .exec(&txn)
        .await?;
    CartCoupons::delete_many()
        .filter(CouponCol::CartId.eq(cart.id))
        .exec(&txn)
        .await?;
    cart_service::recompute_totals(&txn, cart).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "order_number": order.order_number })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Checkout success",
        OrderWithItems {
            order: order.into(),
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order.into(),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn pay_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: PayOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if payload.order_number != order.order_number {
        return Err(AppError::BadRequest("order number mismatch".to_string()));
    }
    if order.payment_status == "paid" {
        return Err(AppError::BadRequest("Order already paid".into()));
    }

    let mut active: OrderActive = order.into();
    active.payment_status = Set("paid".into());
    active.status = Set("paid".into());
    active.paid_at = Set(Some(Utc::now().into()));
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&txn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "order_paid",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment recorded",
        OrderWithItems {
            order: order.into(),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    validate_order_status(&payload.status)?;

    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order.into(),
        Some(Meta::empty()),
    ))
}

/// Generate an order number that no existing order holds. The random suffix
/// can collide within a day, so regenerate on a hit; the unique index is the
/// backstop for the race this check cannot close.
async fn unique_order_number<C: ConnectionTrait>(conn: &C) -> AppResult<String> {
    for _ in 0..order_number::MAX_ATTEMPTS {
        let candidate = order_number::generate(Utc::now());
        let taken = Orders::find()
            .filter(OrderCol::OrderNumber.eq(candidate.clone()))
            .one(conn)
            .await?
            .is_some();
        if !taken {
            return Ok(candidate);
        }
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not generate a unique order number"
    )))
}

fn validate_order_status(status: &str) -> Result<(), AppError> {
    const VALID: [&str; 5] = ["pending", "paid", "shipped", "completed", "cancelled"];
    if VALID.contains(&status) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid order status".into()))
    }
}
