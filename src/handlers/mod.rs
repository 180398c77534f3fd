/// Web API Handlers
///
/// This module contains the handlers for the service's endpoints and the
/// declarations that bind them to routes. Each handler receives parameters
/// that have already been validated against its route's declaration and
/// returns JSON that is then checked against the route's response shape.

mod catalog_handlers;
mod item_handlers;
mod user_handlers;

pub use catalog_handlers::*;
pub use item_handlers::*;
pub use user_handlers::*;

use axum::http::StatusCode;
use serde_json::json;

use crate::dispatch::{handler, Handler};
use crate::dto::{UserIn, UserOut};
use crate::models::{CarItem, Item, ItemVariant, ModelName, PlaneItem, User};
use crate::routing::RouteSpec;
use crate::schema::{ClosedEnum, FieldSpec, FieldType, Schema};
use crate::shaping::{ResponseShape, ResponseView};

fn item_id_in_range() -> FieldSpec {
    FieldSpec::required("item_id", FieldType::Int).ge(0.0).le(1000.0)
}

fn text(name: &str) -> FieldSpec {
    FieldSpec::required(name, FieldType::Str)
}

/// Every route the service serves, in registration order
pub fn routes() -> Vec<(RouteSpec, Handler)> {
    let item = || FieldType::Record(Item::shape());
    let item_response = || ResponseShape::Record(Item::shape());

    vec![
        (
            RouteSpec::get("/").named("read_root"),
            handler(root_handler),
        ),
        (
            RouteSpec::post("/items/")
                .named("create_item")
                .body(FieldSpec::required("item", item()))
                .status(StatusCode::CREATED)
                .response(item_response()),
            handler(create_item_handler),
        ),
        (
            RouteSpec::get("/items/head")
                .named("read_items_head")
                .header(FieldSpec::optional("user_agent", FieldType::Str)),
            handler(read_items_head_handler),
        ),
        (
            RouteSpec::get("/items/")
                .named("read_items")
                .query(FieldSpec::optional("q", FieldType::list(FieldType::Str)).with_default(json!(["foo", "bar"]))),
            handler(read_items_handler),
        ),
        (
            RouteSpec::get("/items/{item_id}")
                .named("read_item")
                .path_param(item_id_in_range()),
            handler(read_item_handler),
        ),
        (
            RouteSpec::put("/items/{item_id}")
                .named("update_item")
                .path_param(item_id_in_range())
                .body(FieldSpec::optional("item", item()))
                .query(FieldSpec::optional("q", FieldType::Str)),
            handler(update_item_handler),
        ),
        (
            RouteSpec::put("/bodyitems/{bodyitem_id}")
                .named("update_body_item")
                .path_param(FieldSpec::required("bodyitem_id", FieldType::Int))
                .body(FieldSpec::required("bodyitem", item()))
                .body(FieldSpec::required("user", FieldType::Record(User::shape())))
                .body(FieldSpec::required("importance", FieldType::Int)),
            handler(update_body_item_handler),
        ),
        (
            RouteSpec::get("/users/{user_id}/items/{item_id}")
                .named("read_user_item")
                .path_param(FieldSpec::required("user_id", FieldType::Int))
                .path_param(text("item_id"))
                .query(FieldSpec::optional("q", FieldType::Str))
                .query(FieldSpec::optional("short", FieldType::Bool).with_default(json!(false))),
            handler(read_user_item_handler),
        ),
        (
            RouteSpec::get("/models/{model_name}")
                .named("read_model")
                .path_param(FieldSpec::required("model_name", FieldType::Choice(ModelName::choices()))),
            handler(read_model_handler),
        ),
        (
            RouteSpec::get("/files/{file_path:path}")
                .named("read_file")
                .path_param(text("file_path")),
            handler(read_file_handler),
        ),
        (
            RouteSpec::get("/keyword-weights/")
                .named("read_keyword_weights")
                .response(ResponseShape::Map(FieldType::Float)),
            handler(read_keyword_weights_handler),
        ),
        (
            RouteSpec::post("/login/")
                .named("login")
                .form(text("username"))
                .form(text("password")),
            handler(login_handler),
        ),
        (
            RouteSpec::post("/user/")
                .named("create_user")
                .body(FieldSpec::required("user", FieldType::Record(UserIn::shape())))
                .response(ResponseShape::Record(UserOut::shape()))
                .view(ResponseView::full().exclude_unset()),
            handler(create_user_handler),
        ),
        (
            RouteSpec::get("/item/{item_type}")
                .named("read_item_variant")
                .path_param(text("item_type"))
                .response(ItemVariant::response_shape()),
            handler(read_item_variant_handler),
        ),
        (
            RouteSpec::get("/items/{item_id}/name")
                .named("read_item_name")
                .path_param(text("item_id"))
                .response(item_response())
                .view(ResponseView::include(&["name", "description"])),
            handler(read_catalog_item_handler),
        ),
        (
            RouteSpec::get("/items/{item_id}/public")
                .named("read_item_public_data")
                .path_param(text("item_id"))
                .response(item_response())
                .view(ResponseView::exclude(&["tax"])),
            handler(read_catalog_item_handler),
        ),
        (
            RouteSpec::get("/goods/{good_id}")
                .named("read_goods")
                .path_param(text("good_id"))
                .response(ResponseShape::list_of(item_response())),
            handler(read_goods_handler),
        ),
    ]
}

/// The catalog the service starts with
pub fn seed_catalog() -> Vec<(&'static str, Item)> {
    vec![
        ("foo", Item::priced("Foo", 50.2)),
        (
            "bar",
            Item::priced("Bar", 62.0)
                .with_description("The bartenders")
                .with_tax(20.2),
        ),
        ("baz", Item::priced("Baz", 50.2).with_tax(10.5)),
    ]
}

/// The cars and planes the service starts with
pub fn seed_variants() -> Vec<(&'static str, ItemVariant)> {
    vec![
        (
            "item1",
            ItemVariant::Car(CarItem {
                description: "All my friends drive a low rider".to_string(),
            }),
        ),
        (
            "item2",
            ItemVariant::Plane(PlaneItem {
                description: "Music is my aeroplane, it's my aeroplane".to_string(),
                size: 5,
            }),
        ),
    ]
}
