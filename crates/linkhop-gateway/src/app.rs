use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    analytics_handler, create_url_handler, daily_stats_handler, device_stats_handler,
    health_handler, list_urls_handler, monthly_stats_handler, popular_urls_handler,
    recent_clicks_handler, redirect_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    /// Serve with `into_make_service_with_connect_info::<SocketAddr>()`;
    /// the redirect route reads the peer address.
    pub fn router(state: AppState) -> Router {
        let request_timeout = state.request_timeout;

        Router::new()
            .route("/health", get(health_handler))
            .route("/s/{short_code}", get(redirect_handler))
            .nest(
                "/api",
                Router::new()
                    .route("/shorten", post(create_url_handler))
                    .route("/urls", get(list_urls_handler))
                    .route("/urls/popular", get(popular_urls_handler))
                    .route("/analytics/{short_code}", get(analytics_handler))
                    .route("/analytics/{short_code}/daily", get(daily_stats_handler))
                    .route("/analytics/{short_code}/monthly", get(monthly_stats_handler))
                    .route("/analytics/{short_code}/devices", get(device_stats_handler))
                    .route("/analytics/{short_code}/recent", get(recent_clicks_handler)),
            )
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                request_timeout,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
