use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::dto::ModelInfo;
use crate::errors::ApiError;
use crate::extract::Params;
use crate::models::{Item, ModelName};
use crate::AppState;

/// Handler for the root path
#[instrument(skip_all)]
pub async fn root_handler(_params: Params, _state: AppState) -> Result<Value, ApiError> {
    Ok(json!({ "Hello": "World" }))
}

/// Handler for describing a model
///
/// This function handles GET requests to `/models/{model_name}`.
#[instrument(skip_all)]
pub async fn read_model_handler(params: Params, _state: AppState) -> Result<Value, ApiError> {
    let model_name: ModelName = params.get("model_name")?;
    debug!(%model_name, "Describing model");
    Ok(serde_json::to_value(ModelInfo::from(model_name))?)
}

/// Handler for echoing a file path
///
/// This function handles GET requests to `/files/{file_path:path}`.
#[instrument(skip_all)]
pub async fn read_file_handler(params: Params, _state: AppState) -> Result<Value, ApiError> {
    let file_path: String = params.get("file_path")?;
    debug!(%file_path, "Reading file path");
    Ok(json!({ "file_path": file_path }))
}

/// Handler for the keyword weight table
///
/// This function handles GET requests to `/keyword-weights/`.
#[instrument(skip_all)]
pub async fn read_keyword_weights_handler(_params: Params, _state: AppState) -> Result<Value, ApiError> {
    Ok(json!({ "foo": 2.3, "bar": 3.4 }))
}

/// Handler for reading a car or plane by key
///
/// This function handles GET requests to `/item/{item_type}`.
#[instrument(skip_all)]
pub async fn read_item_variant_handler(params: Params, state: AppState) -> Result<Value, ApiError> {
    let item_type: String = params.get("item_type")?;
    debug!(%item_type, "Reading item variant");

    let variant = state.variants.get(&item_type)?.ok_or(ApiError::NotFound("Item"))?;

    Ok(serde_json::to_value(variant)?)
}

/// Handler for the goods list
///
/// This function handles GET requests to `/goods/{good_id}`.
/// The same two goods are returned whatever the ID.
#[instrument(skip_all)]
pub async fn read_goods_handler(params: Params, _state: AppState) -> Result<Value, ApiError> {
    let good_id: String = params.get("good_id")?;
    debug!(%good_id, "Listing goods");

    let goods = vec![
        Item::default().named("Foo").with_description("There comes my hero"),
        Item::default().named("Red").with_description("It's my aeroplane"),
    ];

    Ok(serde_json::to_value(goods)?)
}
