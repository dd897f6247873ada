//! Router composition and server bootstrap shared by the binary and tests.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::config::HubConfig;
use crate::hub::{Hub, JsonEncoder};
use crate::ws::handler::ws_handler;

/// Builds the full HTTP application: REST API, `/ws`, OpenAPI, middleware.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .merge(docs_router())
        .route("/ws", get(ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Creates the hub, spawns its event loop, and returns the state handlers
/// share.
///
/// Must be called from within a Tokio runtime.
#[must_use]
pub fn spawn_hub(config: HubConfig) -> AppState {
    let (hub, handle) = Hub::new(&config, Arc::new(JsonEncoder));
    tokio::spawn(hub.run());
    AppState::new(handle, config)
}

#[cfg(feature = "swagger-ui")]
fn docs_router() -> Router<AppState> {
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(
        SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi::ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_router() -> Router<AppState> {
    use axum::Json;
    use utoipa::OpenApi;

    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(api::openapi::ApiDoc::openapi()) }),
    )
}
