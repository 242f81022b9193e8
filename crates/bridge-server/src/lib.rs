pub mod error;
pub mod poller;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/webhooks/jira", post(routes::webhook::receive))
        .route("/api/webhooks/jira/last", get(routes::snapshot::last_event))
        .route("/api/poll", get(routes::poll::poll))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the bridge HTTP server.
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("bridge listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
