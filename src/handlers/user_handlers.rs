use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::dto::{UserIn, UserOut};
use crate::errors::ApiError;
use crate::extract::Params;
use crate::AppState;

const LONG_DESCRIPTION: &str = "This is an amazing item that has a long description";

/// Handler for reading an item that belongs to a user
///
/// This function handles GET requests to `/users/{user_id}/items/{item_id}`.
/// A long description is added unless `short` is set.
#[instrument(skip_all)]
pub async fn read_user_item_handler(params: Params, _state: AppState) -> Result<Value, ApiError> {
    let user_id: i64 = params.get("user_id")?;
    let item_id: String = params.get("item_id")?;
    let q: Option<String> = params.get("q")?;
    let short: bool = params.get("short")?;
    debug!(user_id, %item_id, short, "Reading user item");

    let mut item = json!({ "item_id": item_id, "owner_id": user_id });
    if let Some(q) = q {
        item["q"] = json!(q);
    }
    if !short {
        item["description"] = json!(LONG_DESCRIPTION);
    }

    Ok(item)
}

/// Handler for registering a user
///
/// This function handles POST requests to `/user/`.
/// The password is dropped before the user is stored or returned.
#[instrument(skip_all)]
pub async fn create_user_handler(params: Params, state: AppState) -> Result<Value, ApiError> {
    let user_in: UserIn = params.get("user")?;
    let user = UserOut::from(user_in);
    info!(username = %user.username, "Registering user");

    state.users.put(&user.username, user.clone())?;

    Ok(serde_json::to_value(user)?)
}

/// Handler for form login
///
/// This function handles POST requests to `/login/`.
/// Credentials are not checked; the username is echoed back.
#[instrument(skip_all)]
pub async fn login_handler(params: Params, _state: AppState) -> Result<Value, ApiError> {
    let username: String = params.get("username")?;
    let _password: String = params.get("password")?;
    info!(%username, "Login");
    Ok(json!({ "username": username }))
}
