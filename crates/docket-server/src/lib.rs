//! HTTP resource API for Docket.
//!
//! Maps verbs and paths onto [`docket_store::GuardedStore`] operations and is
//! the only place store and validation errors become status codes.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, SharedStore};
pub use server::DocketServer;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use docket_store::InMemoryStore;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn state() -> AppState {
        AppState::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = router::build_router(state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn info_endpoint() {
        let app = router::build_router(state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/info")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn unknown_path_is_404_without_static_dir() {
        let app = router::build_router(state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/index.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }
}
