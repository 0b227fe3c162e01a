use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;
use serde_json::{json, Map, Value};

use docket_store::{Collection, CollectionStore, Document, FieldError, GuardedStore};

use crate::error::{ServerError, ServerResult};

/// Store shared by all handlers.
pub type SharedStore = Arc<GuardedStore<Arc<dyn CollectionStore>>>;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

impl AppState {
    pub fn new(backend: Arc<dyn CollectionStore>) -> Self {
        Self {
            store: Arc::new(GuardedStore::new(backend)),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Run blocking store work off the async executor.
async fn blocking<T, F>(work: F) -> ServerResult<T>
where
    F: FnOnce() -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
}

fn json_object(
    payload: Result<Json<Value>, JsonRejection>,
    not_object: impl FnOnce() -> ServerError,
) -> ServerResult<Map<String, Value>> {
    let Json(value) = payload.map_err(|e| ServerError::Validation(e.body_text()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(not_object()),
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Info handler.
pub async fn info_handler() -> Json<Value> {
    Json(json!({
        "name": "docket-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET` the whole collection in insertion order.
pub async fn list_handler(State(state): State<AppState>) -> ServerResult<Json<Collection>> {
    let store = state.store.clone();
    let docs = blocking(move || Ok(store.list()?)).await?;
    Ok(Json(docs))
}

/// `POST` a new document. Requires a non-blank `text`.
pub async fn create_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Document>)> {
    let fields = json_object(payload, || {
        ServerError::Validation(FieldError::TextRequired.to_string())
    })?;
    let store = state.store.clone();
    let doc = blocking(move || Ok(store.create(fields)?)).await?;
    tracing::info!(id = doc.id().unwrap_or_default(), "document created");
    Ok((StatusCode::CREATED, Json(doc)))
}

/// `PUT` a partial update onto an existing document.
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ServerResult<Json<Document>> {
    let patch = json_object(payload, || {
        ServerError::Validation("Request body must be a JSON object.".into())
    })?;
    let store = state.store.clone();
    let doc = blocking(move || Ok(store.update(&id, patch)?)).await?;
    Ok(Json(doc))
}

/// `DELETE` a document; 204 with an empty body.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    let store = state.store.clone();
    blocking(move || Ok(store.delete(&id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}
