use utoipa::OpenApi;
use crate::models::*;

/// Welcome message
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome message", body = MessageResponse)
    )
)]
#[allow(dead_code)]
pub async fn welcome_doc() {}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Store is reachable", body = HealthResponse),
        (status = 503, description = "Store is unreachable", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// List all items
#[utoipa::path(
    get,
    path = "/items",
    responses(
        (status = 200, description = "Every stored item, ascending by id", body = [Item]),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn list_items_doc() {}

/// Get an item by id
#[utoipa::path(
    get,
    path = "/items/{id}",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "The item", body = Item),
        (status = 404, description = "Item not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_item_doc() {}

/// Create a new item
#[utoipa::path(
    post,
    path = "/items",
    request_body = ItemPayload,
    responses(
        (status = 201, description = "Item created successfully", body = Item),
        (status = 400, description = "Malformed or invalid body", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_item_doc() {}

/// Update the name and price of an item
#[utoipa::path(
    put,
    path = "/items/{id}",
    params(("id" = i64, Path, description = "Item id")),
    request_body = ItemPayload,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 400, description = "Malformed or invalid body", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn update_item_doc() {}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/items/{id}",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn delete_item_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        welcome_doc,
        health_check_doc,
        ready_check_doc,
        list_items_doc,
        get_item_doc,
        create_item_doc,
        update_item_doc,
        delete_item_doc,
    ),
    components(
        schemas(Item, ItemPayload, MessageResponse, HealthResponse, ErrorResponse)
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
