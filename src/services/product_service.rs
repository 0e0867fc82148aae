use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    domain::health,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_seller},
    models::{EventType, Product, ProductCategory},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::analytics_service,
    state::AppState,
};

/// Categories whose health scores are refreshed by the nightly job.
pub const RESCORED_CATEGORIES: [ProductCategory; 5] = [
    ProductCategory::Produce,
    ProductCategory::Dairy,
    ProductCategory::Bakery,
    ProductCategory::Snacks,
    ProductCategory::Beverages,
];

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(Column::IsActive.eq(true));

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern.clone()))
                .add(Expr::col(Column::Barcode).ilike(pattern)),
        );
    }

    if let Some(category) = query.category {
        condition = condition.add(Column::Category.eq(category));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
        ProductSortBy::HealthScore => Column::HealthScore,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

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
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .filter(Column::IsActive.eq(true))
        .one(&state.orm)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    if let Err(err) = analytics_service::record(
        &state.orm,
        EventType::View,
        None,
        Some(product.seller_id),
        Some(product.id),
        0,
        0,
    )
    .await
    {
        tracing::warn!(error = %err, "analytics event failed");
    }

    Ok(ApiResponse::success("Product", product.into(), None))
}

pub async fn get_product_by_barcode(
    state: &AppState,
    barcode: &str,
) -> AppResult<ApiResponse<Product>> {
    let product = Products::find()
        .filter(Column::Barcode.eq(barcode))
        .filter(Column::IsActive.eq(true))
        .one(&state.orm)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Product", product.into(), None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_seller(user)?;
    if payload.price < 0 {
        return Err(AppError::BadRequest("price must not be negative".to_string()));
    }

    let health_score = health::health_score(payload.nutrition.as_ref());

    let result = ActiveModel {
        id: Set(Uuid::new_v4()),
        seller_id: Set(user.user_id),
        barcode: Set(payload.barcode),
        name: Set(payload.name),
        description: Set(payload.description),
        category: Set(payload.category),
        price: Set(payload.price),
        original_price: Set(payload.original_price),
        unit: Set(payload.unit),
        nutrition: Set(payload.nutrition),
        health_score: Set(health_score),
        min_stock_level: Set(payload.min_stock_level.unwrap_or(0)),
        max_stock_level: Set(payload.max_stock_level.unwrap_or(0)),
        alternatives: Set(payload.alternatives.unwrap_or_default()),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await;

    let product = match result {
        Ok(p) => p,
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::BadRequest("barcode already registered".to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = find_owned(state, user, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::BadRequest("price must not be negative".to_string()));
        }
        active.price = Set(price);
    }
    if let Some(original_price) = payload.original_price {
        active.original_price = Set(Some(original_price));
    }
    if let Some(unit) = payload.unit {
        active.unit = Set(unit);
    }
    if let Some(min_stock_level) = payload.min_stock_level {
        active.min_stock_level = Set(min_stock_level);
    }
    if let Some(max_stock_level) = payload.max_stock_level {
        active.max_stock_level = Set(max_stock_level);
    }
    if let Some(alternatives) = payload.alternatives {
        active.alternatives = Set(alternatives);
    }
    if let Some(nutrition) = payload.nutrition {
        // Nutrition changed, so the derived score is stale.
        active.health_score = Set(health::health_score(Some(&nutrition)));
        active.nutrition = Set(Some(nutrition));
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        product.into(),
        Some(Meta::empty()),
    ))
}

/// Products are soft-deleted so carts and order history keep their references.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = find_owned(state, user, id).await?;

    let mut active: ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Nightly scheduler job: refresh derived health scores for a fixed subset of
/// categories. Only rows whose score actually changed are written.
pub async fn recompute_health_scores(
    conn: &DatabaseConnection,
    categories: &[ProductCategory],
) -> AppResult<usize> {
    let products = Products::find()
        .filter(Column::Category.is_in(categories.iter().cloned()))
        .filter(Column::IsActive.eq(true))
        .all(conn)
        .await?;

    let mut updated = 0usize;
    for product in products {
        let score = health::health_score(product.nutrition.as_ref());
        if score == product.health_score {
            continue;
        }
        let mut active: ActiveModel = product.into();
        active.health_score = Set(score);
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await?;
        updated += 1;
    }
    Ok(updated)
}

async fn find_owned(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ProductModel> {
    ensure_seller(user)?;
    let product = Products::find_by_id(id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    if product.seller_id != user.user_id && user.role != "admin" {
        return Err(AppError::Forbidden);
    }
    Ok(product)
}
