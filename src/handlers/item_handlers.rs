use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument};

use crate::errors::ApiError;
use crate::extract::Params;
use crate::models::{Item, User};
use crate::AppState;

/// Handler for creating a new item
///
/// This function handles POST requests to `/items/`.
/// The validated item is echoed back with status 201.
#[instrument(skip_all)]
pub async fn create_item_handler(params: Params, _state: AppState) -> Result<Value, ApiError> {
    let item: Item = params.get("item")?;
    info!(name = ?item.name, "Creating new item");
    Ok(serde_json::to_value(item)?)
}

/// Handler for reading the caller's user agent
///
/// This function handles GET requests to `/items/head`.
#[instrument(skip_all)]
pub async fn read_items_head_handler(params: Params, _state: AppState) -> Result<Value, ApiError> {
    let user_agent: Option<String> = params.get("user_agent")?;
    debug!(?user_agent, "Echoing user agent");
    Ok(json!({ "User-Agent": user_agent }))
}

/// Handler for listing query terms
///
/// This function handles GET requests to `/items/`.
/// `q` falls back to `["foo", "bar"]` when no terms are given.
#[instrument(skip_all)]
pub async fn read_items_handler(params: Params, _state: AppState) -> Result<Value, ApiError> {
    let q: Vec<String> = params.get("q")?;
    debug!(terms = q.len(), "Listing query terms");
    Ok(json!({ "q": q }))
}

/// Handler for reading an item by its numeric ID
///
/// This function handles GET requests to `/items/{item_id}`.
#[instrument(skip_all)]
pub async fn read_item_handler(params: Params, _state: AppState) -> Result<Value, ApiError> {
    let item_id: i64 = params.get("item_id")?;
    debug!(item_id, "Reading item");
    Ok(json!({ "item_id": item_id }))
}

/// Handler for updating an item
///
/// This function handles PUT requests to `/items/{item_id}`.
///
/// ### Returns
///
/// The ID merged with the item's fields, plus `q` when it was given
#[instrument(skip_all)]
pub async fn update_item_handler(params: Params, _state: AppState) -> Result<Value, ApiError> {
    let item_id: i64 = params.get("item_id")?;
    let item: Option<Item> = params.get("item")?;
    let q: Option<String> = params.get("q")?;
    info!(item_id, has_item = item.is_some(), "Updating item");

    let mut result = Map::new();
    result.insert("item_id".to_string(), json!(item_id));
    if let Some(item) = item {
        if let Value::Object(fields) = serde_json::to_value(item)? {
            result.extend(fields);
        }
    }
    if let Some(q) = q {
        result.insert("q".to_string(), json!(q));
    }

    Ok(Value::Object(result))
}

/// Handler for updating an item from several body parameters
///
/// This function handles PUT requests to `/bodyitems/{bodyitem_id}`.
/// The body carries `bodyitem`, `user` and `importance` as top-level keys.
#[instrument(skip_all)]
pub async fn update_body_item_handler(params: Params, _state: AppState) -> Result<Value, ApiError> {
    let bodyitem_id: i64 = params.get("bodyitem_id")?;
    let bodyitem: Item = params.get("bodyitem")?;
    let user: User = params.get("user")?;
    let importance: i64 = params.get("importance")?;
    info!(bodyitem_id, importance, username = %user.username, "Updating item from body");

    Ok(json!({
        "bodyitem_id": bodyitem_id,
        "bodyitem": bodyitem,
        "user": user,
        "importance": importance,
    }))
}

/// Handler for reading a catalog item by key
///
/// This function serves both `/items/{item_id}/name` and
/// `/items/{item_id}/public`; the routes differ only in their views.
#[instrument(skip_all)]
pub async fn read_catalog_item_handler(params: Params, state: AppState) -> Result<Value, ApiError> {
    let item_id: String = params.get("item_id")?;
    debug!(%item_id, "Reading catalog item");

    let item = state.catalog.get(&item_id)?.ok_or(ApiError::NotFound("Item"))?;

    Ok(serde_json::to_value(item)?)
}
