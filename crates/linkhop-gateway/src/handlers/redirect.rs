use crate::state::AppState;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use linkhop_shortener::{spawn_track_click, ClickInfo, ShortenerError};
use std::net::SocketAddr;
use tracing::error;

/// Resolves a short code and answers with `302 Found`.
///
/// The click is recorded on a detached task; the response does not wait
/// for it. Failures are plain text since browsers navigate here directly.
pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let record = match state.shortener.resolve(&short_code).await {
        Ok(record) => record,
        Err(ShortenerError::UrlNotFound(_)) => {
            return (StatusCode::NOT_FOUND, "URL not found").into_response();
        }
        Err(e) => {
            error!(code = %short_code, error = %e, "failed to resolve short code");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };

    let click = ClickInfo {
        short_code: record.short_code.clone(),
        user_agent: header_str(&headers, header::USER_AGENT.as_str()),
        ip: extract_ip(&headers, addr),
        referer: header_str(&headers, header::REFERER.as_str()),
    };
    spawn_track_click(state.shortener.clone(), click, state.click_timeout);

    (
        StatusCode::FOUND,
        [(header::LOCATION, record.original_url)],
    )
        .into_response()
}

fn header_str(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then the peer address.
pub fn extract_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    if let Some(first) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }

    if let Some(real_ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return real_ip.to_string();
    }

    addr.ip().to_string()
}
