use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, error, info, warn};

use crate::db::{NewItem, StoreError};
use crate::models::{ErrorResponse, Item, ItemPayload, MessageResponse};
use crate::state::AppState;

type ErrorReply = (StatusCode, Json<ErrorResponse>);

const NOT_FOUND: &str = "Item not found";

fn not_found(id: impl std::fmt::Display) -> ErrorReply {
    info!("Item '{}' not found", id);
    ErrorResponse::reply(StatusCode::NOT_FOUND, NOT_FOUND)
}

fn store_failure(op: &str, e: StoreError) -> ErrorReply {
    error!("Failed to {}: {}", op, e);
    ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to {}", op))
}

/// A path segment that is not an integer can never name a row.
fn item_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ErrorReply> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            debug!("Unparsable item id: {}", rejection.body_text());
            Err(ErrorResponse::reply(StatusCode::NOT_FOUND, NOT_FOUND))
        }
    }
}

/// Decode and validate a request body. Every failure is a 400.
///
/// The body is read as JSON whatever the `Content-Type` header says.
fn item_body(body: &[u8]) -> Result<NewItem, ErrorReply> {
    let payload = serde_json::from_slice::<ItemPayload>(body).map_err(|e| {
        warn!("Rejected item body: {}", e);
        ErrorResponse::reply(StatusCode::BAD_REQUEST, e.to_string())
    })?;
    payload.validate().map_err(|message| {
        warn!("Invalid item body: {}", message);
        ErrorResponse::reply(StatusCode::BAD_REQUEST, message)
    })
}

/// List every item
pub async fn list_items(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<Item>>), ErrorReply> {
    let items = state.store.list().await.map_err(|e| store_failure("list items", e))?;
    debug!("Listing {} items", items.len());
    Ok((StatusCode::OK, Json(items)))
}

/// Fetch one item by id
pub async fn get_item(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<(StatusCode, Json<Item>), ErrorReply> {
    let id = item_id(path)?;
    match state.store.get(id).await {
        Ok(Some(item)) => Ok((StatusCode::OK, Json(item))),
        Ok(None) => Err(not_found(id)),
        Err(e) => Err(store_failure("load item", e)),
    }
}

/// Create a new item
pub async fn create_item(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Item>), ErrorReply> {
    let new_item = item_body(&body)?;
    let item = state.store.create(new_item).await.map_err(|e| store_failure("create item", e))?;
    info!("Created item {}", item.id);
    Ok((StatusCode::CREATED, Json(item)))
}

/// Overwrite the name and price of an item
pub async fn update_item(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<(StatusCode, Json<Item>), ErrorReply> {
    let id = item_id(path)?;
    let fields = match item_body(&body) {
        Ok(fields) => fields,
        // A missing row outranks a bad body
        Err(bad_request) => {
            return match state.store.get(id).await {
                Ok(Some(_)) => Err(bad_request),
                Ok(None) => Err(not_found(id)),
                Err(e) => Err(store_failure("load item", e)),
            };
        }
    };
    match state.store.update(id, fields).await {
        Ok(Some(item)) => {
            info!("Updated item {}", item.id);
            Ok((StatusCode::OK, Json(item)))
        }
        Ok(None) => Err(not_found(id)),
        Err(e) => Err(store_failure("update item", e)),
    }
}

/// Delete an item
pub async fn delete_item(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ErrorReply> {
    let id = item_id(path)?;
    match state.store.delete(id).await {
        Ok(true) => {
            info!("Deleted item {}", id);
            Ok((StatusCode::OK, Json(MessageResponse::new("Item deleted"))))
        }
        Ok(false) => Err(not_found(id)),
        Err(e) => Err(store_failure("delete item", e)),
    }
}
