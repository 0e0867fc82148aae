use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    dto::analytics::{RecordEventRequest, SalesReport},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::ReportQuery,
    services::analytics_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", post(record_event))
        .route("/sales-report", get(sales_report))
}

#[utoipa::path(
    post,
    path = "/api/analytics/events",
    request_body = RecordEventRequest,
    responses(
        (status = 200, description = "Record an analytics event", body = ApiResponse<serde_json::Value>),
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn record_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RecordEventRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = analytics_service::record_event(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/analytics/sales-report",
    params(
        ("from" = Option<String>, Query, description = "RFC 3339 lower bound"),
        ("to" = Option<String>, Query, description = "RFC 3339 upper bound"),
        ("seller_id" = Option<Uuid>, Query, description = "Admin only; sellers see their own data")
    ),
    responses(
        (status = 200, description = "Revenue and units by event type", body = ApiResponse<SalesReport>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn sales_report(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ApiResponse<SalesReport>>> {
    let resp = analytics_service::sales_report(&state, &user, query).await?;
    Ok(Json(resp))
}
