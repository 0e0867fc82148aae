use chrono::{Duration, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::analytics::{EventTypeSummary, RecordEventRequest, SalesReport},
    entity::analytics_events::{ActiveModel, Column, Entity as AnalyticsEvents},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_seller},
    models::EventType,
    response::{ApiResponse, Meta},
    routes::params::ReportQuery,
    state::AppState,
};

/// Append one event row. Callers that treat analytics as best-effort catch
/// the error and log it instead of failing the request.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    event_type: EventType,
    user_id: Option<Uuid>,
    seller_id: Option<Uuid>,
    product_id: Option<Uuid>,
    revenue: i64,
    units_sold: i32,
) -> AppResult<()> {
    ActiveModel {
        id: Set(Uuid::new_v4()),
        event_type: Set(event_type),
        user_id: Set(user_id),
        seller_id: Set(seller_id),
        product_id: Set(product_id),
        revenue: Set(revenue),
        units_sold: Set(units_sold),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(())
}

pub async fn record_event(
    state: &AppState,
    user: &AuthUser,
    payload: RecordEventRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    record(
        &state.orm,
        payload.event_type,
        Some(user.user_id),
        payload.seller_id,
        payload.product_id,
        payload.revenue.unwrap_or(0),
        payload.units_sold.unwrap_or(0),
    )
    .await?;

    Ok(ApiResponse::success(
        "Event recorded",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

#[derive(Debug, FromQueryResult)]
struct SummaryRow {
    event_type: EventType,
    count: i64,
    revenue: i64,
    units_sold: i64,
}

pub async fn sales_report(
    state: &AppState,
    user: &AuthUser,
    query: ReportQuery,
) -> AppResult<ApiResponse<SalesReport>> {
    ensure_seller(user)?;

    // Sellers only ever see their own numbers; admins may pick a seller or
    // aggregate across all of them.
    let seller_scope = if user.role == "admin" {
        query.seller_id
    } else {
        Some(user.user_id)
    };

    let mut condition = Condition::all();
    if let Some(seller_id) = seller_scope {
        condition = condition.add(Column::SellerId.eq(seller_id));
    }
    if let Some(from) = query.from {
        condition = condition.add(Column::CreatedAt.gte(from));
    }
    if let Some(to) = query.to {
        condition = condition.add(Column::CreatedAt.lte(to));
    }

    // sum(bigint) comes back as numeric in Postgres, so cast it down.
    let rows: Vec<SummaryRow> = AnalyticsEvents::find()
        .select_only()
        .column(Column::EventType)
        .column_as(Expr::col(Column::Id).count(), "count")
        .column_as(
            Expr::col(Column::Revenue).sum().cast_as(Alias::new("bigint")),
            "revenue",
        )
        .column_as(Expr::col(Column::UnitsSold).sum(), "units_sold")
        .filter(condition)
        .group_by(Column::EventType)
        .order_by_asc(Column::EventType)
        .into_model()
        .all(&state.orm)
        .await?;

    let by_type: Vec<EventTypeSummary> = rows
        .into_iter()
        .map(|row| EventTypeSummary {
            event_type: row.event_type,
            count: row.count,
            revenue: row.revenue,
            units_sold: row.units_sold,
        })
        .collect();

    let total_revenue = by_type
        .iter()
        .filter(|summary| summary.event_type == EventType::Sale)
        .map(|summary| summary.revenue)
        .sum();
    let total_units = by_type
        .iter()
        .filter(|summary| summary.event_type == EventType::Sale)
        .map(|summary| summary.units_sold)
        .sum();

    Ok(ApiResponse::success(
        "Sales report",
        SalesReport {
            total_revenue,
            total_units,
            by_type,
        },
        Some(Meta::empty()),
    ))
}

/// Retention job: hard-delete events older than the given window.
pub async fn cleanup_older_than(conn: &DatabaseConnection, days: i64) -> AppResult<u64> {
    let cutoff = Utc::now() - Duration::days(days);
    let result = AnalyticsEvents::delete_many()
        .filter(Column::CreatedAt.lt(cutoff))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
