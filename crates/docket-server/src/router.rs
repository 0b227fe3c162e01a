use axum::http::{header, Method};
use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler::{self, AppState};

/// Paths the document resource is mounted at. `/api/todos` is the path the
/// bundled browser client talks to.
pub const RESOURCE_PATHS: [&str; 2] = ["/documents", "/api/todos"];

/// Build the axum router with the resource API and service endpoints.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handler::health_handler))
        .route("/info", get(handler::info_handler));

    for base in RESOURCE_PATHS {
        router = router
            .route(base, get(handler::list_handler).post(handler::create_handler))
            .route(
                &format!("{base}/:id"),
                put(handler::update_handler).delete(handler::delete_handler),
            );
    }

    router.with_state(state)
}

/// Build the full application: API routes plus static assets, CORS, and
/// request tracing as configured.
pub fn build_app(config: &ServerConfig, state: AppState) -> Router {
    let mut app = build_router(state);

    if let Some(dir) = &config.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }
    if config.cors {
        app = app.layer(cors_layer());
    }
    app.layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
