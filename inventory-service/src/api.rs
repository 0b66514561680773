use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::PathRejection, FromRequest, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::Json,
    routing::{get, put},
    Router,
};
use serde_json::{Map, Value};
use shared::{validate_create, validate_update, ValidationError};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use crate::error::ApiError;
use crate::models::InventoryItem;
use crate::query::UpdateStatement;
use crate::store::InventoryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InventoryStore>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/inventory", get(list_items).post(create_item))
        .route("/inventory/:id", put(update_item).patch(update_item))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

pub async fn list_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    state.store.ensure_schema().await?;

    let items = state.store.list().await?;
    Ok(Json(items))
}

pub async fn create_item(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody,
) -> Result<(StatusCode, Json<InventoryItem>), ApiError> {
    state.store.ensure_schema().await?;

    let item = validate_create(&payload)?;
    let id = state.store.insert(item).await?;

    let created = state
        .store
        .find(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Inserted item {} could not be read back", id))?;

    info!(id, "Created inventory item");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_item(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
    JsonBody(payload): JsonBody,
) -> Result<Json<InventoryItem>, ApiError> {
    state.store.ensure_schema().await?;

    let Path(raw_id) = raw_id.map_err(|_| ApiError::InvalidId)?;
    let id = parse_id(&raw_id)?;
    let patch = validate_update(&payload)?;
    let statement = UpdateStatement::build(id, patch)?;

    if state.store.update(&statement).await? == 0 {
        return Err(ApiError::NotFound);
    }

    let updated = state.store.find(id).await?.ok_or(ApiError::NotFound)?;

    info!(id, "Updated inventory item");
    Ok(Json(updated))
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// JSON request body. A request without a body reads as `{}`, so an empty
/// update is reported as having no fields rather than as a malformed payload.
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json_content_type = has_json_content_type(req.headers());
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ValidationError::invalid(rejection.body_text()))?;

        if bytes.is_empty() {
            return Ok(JsonBody(Value::Object(Map::new())));
        }
        if !json_content_type {
            return Err(ValidationError::invalid(
                "Expected request with `Content-Type: application/json`",
            )
            .into());
        }

        let Json(value) = Json::<Value>::from_bytes(&bytes)
            .map_err(|rejection| ValidationError::invalid(rejection.body_text()))?;
        Ok(JsonBody(value))
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
        })
        .unwrap_or(false)
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ApiError::InvalidId)
}
