//! Router assembly and listener

use crate::bot::handle_bot;
use crate::data_api;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Json, Router,
};
use finroute_core::Config;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: finroute_core::VERSION.to_string(),
    })
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/company_overview", get(data_api::company_overview))
        .route("/cash_flow", get(data_api::cash_flow))
        .route("/quarterly_earnings", get(data_api::quarterly_earnings))
        .route("/stock_weekly_data", get(data_api::stock_weekly_data))
        .route("/news_sentiment", get(data_api::news_sentiment));

    Router::new()
        .route("/bot", post(handle_bot))
        .route("/health", get(handle_health))
        .nest("/api", api)
        .layer(cors)
        .with_state(state)
}

/// Serve `state` on an already-bound listener until the process exits
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, app(state)).await?;
    Ok(())
}

/// Load everything named in the config and serve on `server.bind`
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("finroute listening on http://{}", listener.local_addr()?);

    serve(listener, state).await
}
