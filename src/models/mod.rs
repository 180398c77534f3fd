/// Data models module
///
/// This module defines the records that travel through the API, each paired
/// with the declared shape the validator checks it against.

mod image;
pub use image::Image;

mod item;
pub use item::Item;

mod user;
pub use user::User;

mod model_name;
pub use model_name::ModelName;

mod item_variant;
pub use item_variant::{CarItem, ItemVariant, PlaneItem};
