use crate::error::Result;
use crate::model::{DaysQuery, LimitQuery};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use linkhop_core::{AnalyticsReport, BucketCounts, ClickEvent};

pub async fn analytics_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsReport>> {
    Ok(Json(state.analytics.report(&short_code).await?))
}

pub async fn daily_stats_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<BucketCounts>> {
    let stats = state
        .analytics
        .daily_stats(&short_code, query.days())
        .await?;
    Ok(Json(stats))
}

/// The window is read from `days` but counted in months.
pub async fn monthly_stats_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<BucketCounts>> {
    let stats = state
        .analytics
        .monthly_stats(&short_code, query.days())
        .await?;
    Ok(Json(stats))
}

pub async fn device_stats_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<BucketCounts>> {
    Ok(Json(state.analytics.device_stats(&short_code).await?))
}

pub async fn recent_clicks_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ClickEvent>>> {
    let clicks = state
        .analytics
        .recent_clicks(&short_code, query.limit())
        .await?;
    Ok(Json(clicks))
}
