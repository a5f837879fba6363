use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse, LimitQuery};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use linkhop_core::UrlRecord;
use linkhop_shortener::ShortenParams;
use tracing::debug;

pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateUrlResponse>)> {
    let Json(request) = payload.map_err(|e| {
        debug!(error = %e, "rejected create request body");
        AppError::BadRequest("Invalid request body".to_string())
    })?;

    let shortened = state
        .shortener
        .shorten(ShortenParams {
            original_url: request.url,
            custom_alias: request.custom_alias,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(shortened.into())))
}

pub async fn list_urls_handler(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<UrlRecord>>> {
    let urls = state.shortener.list_urls(query.limit()).await?;
    Ok(Json(urls))
}

pub async fn popular_urls_handler(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<UrlRecord>>> {
    let urls = state.shortener.popular_urls(query.limit()).await?;
    Ok(Json(urls))
}
