use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    domain,
    dto::cart::{AddItemRequest, ApplyCouponRequest, CartView, UpdateItemRequest},
    entity::{
        cart_coupons::{ActiveModel as CouponActive, Column as CouponCol, Entity as CartCoupons},
        cart_items::{ActiveModel as ItemActive, Column as ItemCol, Entity as CartItems},
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CouponKind, EventType},
    response::{ApiResponse, Meta},
    services::analytics_service,
    state::AppState,
};

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    let cart = load_or_create_cart(&txn, user.user_id).await?;
    let view = cart_view(&txn, cart).await?;
    txn.commit().await?;
    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}

pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    payload: AddItemRequest,
) -> AppResult<ApiResponse<CartView>> {
    let quantity = payload.quantity.unwrap_or(1);
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let txn = state.orm.begin().await?;

    let product = Products::find_by_id(payload.product_id)
        .filter(ProdCol::IsActive.eq(true))
        .one(&txn)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let cart = load_or_create_cart(&txn, user.user_id).await?;

    let existing = CartItems::find()
        .filter(ItemCol::CartId.eq(cart.id))
        .filter(ItemCol::ProductId.eq(product.id))
        .one(&txn)
        .await?;

    match existing {
        Some(line) => {
            let new_quantity = line.quantity + quantity;
            let mut active: ItemActive = line.into();
            active.quantity = Set(new_quantity);
            active.update(&txn).await?;
        }
        None => {
            // Snapshot the current prices; later product edits do not move the line.
            ItemActive {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                product_id: Set(product.id),
                quantity: Set(quantity),
                price: Set(product.price),
                original_price: Set(product.original_price),
                added_at: NotSet,
            }
            .insert(&txn)
            .await?;
        }
    }

    let cart = recompute_totals(&txn, cart).await?;
    let view = cart_view(&txn, cart).await?;
    txn.commit().await?;

    if let Err(err) = analytics_service::record(
        &state.orm,
        EventType::CartAdd,
        Some(user.user_id),
        Some(product.seller_id),
        Some(product.id),
        0,
        quantity,
    )
    .await
    {
        tracing::warn!(error = %err, "analytics event failed");
    }

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "cart_add_item",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": product.id, "quantity": quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Item added", view, Some(Meta::empty())))
}

pub async fn update_item_quantity(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: UpdateItemRequest,
) -> AppResult<ApiResponse<CartView>> {
    // Zero or negative quantity behaves as removal.
    if payload.quantity <= 0 {
        return remove_item(state, user, product_id).await;
    }

    let txn = state.orm.begin().await?;
    let cart = load_cart(&txn, user.user_id).await?;

    let line = CartItems::find()
        .filter(ItemCol::CartId.eq(cart.id))
        .filter(ItemCol::ProductId.eq(product_id))
        .one(&txn)
        .await?;
    let line = match line {
        Some(l) => l,
        None => return Err(AppError::NotFound),
    };

    let mut active: ItemActive = line.into();
    active.quantity = Set(payload.quantity);
    active.update(&txn).await?;

    let cart = recompute_totals(&txn, cart).await?;
    let view = cart_view(&txn, cart).await?;
    txn.commit().await?;

    Ok(ApiResponse::success("Quantity updated", view, Some(Meta::empty())))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    let cart = load_cart(&txn, user.user_id).await?;

    // Attribute the event to the product's seller, if it still exists.
    let seller_id = Products::find_by_id(product_id)
        .one(&txn)
        .await?
        .map(|product| product.seller_id);

    let result = CartItems::delete_many()
        .filter(ItemCol::CartId.eq(cart.id))
        .filter(ItemCol::ProductId.eq(product_id))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    let cart = recompute_totals(&txn, cart).await?;
    let view = cart_view(&txn, cart).await?;
    txn.commit().await?;

    if let Err(err) = analytics_service::record(
        &state.orm,
        EventType::CartRemove,
        Some(user.user_id),
        seller_id,
        Some(product_id),
        0,
        0,
    )
    .await
    {
        tracing::warn!(error = %err, "analytics event failed");
    }

    Ok(ApiResponse::success(
        "Item removed",
        view,
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    let cart = load_cart(&txn, user.user_id).await?;

    CartItems::delete_many()
        .filter(ItemCol::CartId.eq(cart.id))
        .exec(&txn)
        .await?;
    CartCoupons::delete_many()
        .filter(CouponCol::CartId.eq(cart.id))
        .exec(&txn)
        .await?;

    let cart = recompute_totals(&txn, cart).await?;
    let view = cart_view(&txn, cart).await?;
    txn.commit().await?;

    Ok(ApiResponse::success("Cart cleared", view, Some(Meta::empty())))
}

pub async fn apply_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: ApplyCouponRequest,
) -> AppResult<ApiResponse<CartView>> {
    match payload.kind {
        CouponKind::Percentage if !(0..=100).contains(&payload.value) => {
            return Err(AppError::BadRequest(
                "percentage coupon value must be between 0 and 100".to_string(),
            ));
        }
        CouponKind::Fixed if payload.value < 0 => {
            return Err(AppError::BadRequest(
                "fixed coupon value must not be negative".to_string(),
            ));
        }
        _ => {}
    }

    let txn = state.orm.begin().await?;
    let cart = load_cart(&txn, user.user_id).await?;

    let duplicate = CartCoupons::find()
        .filter(CouponCol::CartId.eq(cart.id))
        .filter(CouponCol::Code.eq(payload.code.clone()))
        .one(&txn)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::BadRequest("coupon already applied".to_string()));
    }

    let position = CartCoupons::find()
        .filter(CouponCol::CartId.eq(cart.id))
        .count(&txn)
        .await? as i32;

    CouponActive {
        id: Set(Uuid::new_v4()),
        cart_id: Set(cart.id),
        code: Set(payload.code.clone()),
        kind: Set(payload.kind),
        value: Set(payload.value),
        position: Set(position),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let cart = recompute_totals(&txn, cart).await?;
    let view = cart_view(&txn, cart).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "cart_apply_coupon",
        Some("cart_coupons"),
        Some(serde_json::json!({ "code": payload.code })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Coupon applied",
        view,
        Some(Meta::empty()),
    ))
}

pub async fn remove_coupon(
    state: &AppState,
    user: &AuthUser,
    code: &str,
) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    let cart = load_cart(&txn, user.user_id).await?;

    let result = CartCoupons::delete_many()
        .filter(CouponCol::CartId.eq(cart.id))
        .filter(CouponCol::Code.eq(code))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    let cart = recompute_totals(&txn, cart).await?;
    let view = cart_view(&txn, cart).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Coupon removed",
        view,
        Some(Meta::empty()),
    ))
}

/// Load the user's cart with a row lock, creating it on first use. Concurrent
/// requests for the same user serialize on this lock instead of overwriting
/// each other's totals.
pub(crate) async fn load_or_create_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<CartModel> {
    let existing = Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .lock(LockType::Update)
        .one(conn)
        .await?;
    if let Some(cart) = existing {
        return Ok(cart);
    }

    let cart = CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        total_amount: Set(0),
        total_items: Set(0),
        savings: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(cart)
}

async fn load_cart<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<CartModel> {
    Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

/// Recompute the denormalized totals from the lines and coupons; runs inside
/// the same transaction as the mutation that invalidated them.
pub(crate) async fn recompute_totals<C: ConnectionTrait>(
    conn: &C,
    cart: CartModel,
) -> AppResult<CartModel> {
    let lines: Vec<domain::cart::CartLine> = CartItems::find()
        .filter(ItemCol::CartId.eq(cart.id))
        .all(conn)
        .await?
        .into_iter()
        .map(|item| domain::cart::CartLine {
            price: item.price,
            original_price: item.original_price,
            quantity: item.quantity,
        })
        .collect();

    let coupons: Vec<domain::cart::AppliedCoupon> = CartCoupons::find()
        .filter(CouponCol::CartId.eq(cart.id))
        .order_by_asc(CouponCol::Position)
        .all(conn)
        .await?
        .into_iter()
        .map(|coupon| domain::cart::AppliedCoupon {
            kind: coupon.kind,
            value: coupon.value,
        })
        .collect();

    let totals = domain::cart::compute_totals(&lines, &coupons);

    let mut active: CartActive = cart.into();
    active.total_amount = Set(totals.total_amount);
    active.total_items = Set(totals.total_items);
    active.savings = Set(totals.savings);
    active.updated_at = Set(Utc::now().into());
    let cart = active.update(conn).await?;
    Ok(cart)
}

async fn cart_view<C: ConnectionTrait>(conn: &C, cart: CartModel) -> AppResult<CartView> {
    let items = cart
        .find_related(CartItems)
        .order_by_asc(ItemCol::AddedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let coupons = cart
        .find_related(CartCoupons)
        .order_by_asc(CouponCol::Position)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(CartView {
        cart: cart.into(),
        items,
        coupons,
    })
}
