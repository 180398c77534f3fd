use proptest::prelude::*;
use serde_json::{Map, Value};

/// Generates a finite float that survives a JSON round trip
pub fn arb_price() -> impl Strategy<Value = f64> {
    // Integer-then-divide keeps values finite and short
    (0i64..1_000_000).prop_map(|cents| cents as f64 / 100.0)
}

/// Generates a string without control characters
pub fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,.'!-]{0,24}"
}

/// Generates an Image object with an http(s) URL
pub fn arb_image_json() -> impl Strategy<Value = Value> {
    (
        prop_oneof![Just("http"), Just("https")],
        "[a-z]{1,10}",
        "[a-z]{1,8}",
        arb_text(),
    )
        .prop_map(|(scheme, host, file, name)| {
            serde_json::json!({
                "url": format!("{}://{}.example.com/{}.jpg", scheme, host, file),
                "name": name,
            })
        })
}

/// Generates a JSON object that the Item shape accepts
///
/// Each field is independently present or absent; optional fields are
/// sometimes explicitly `null`.
pub fn arb_item_json() -> impl Strategy<Value = Value> {
    let optional_text = || prop::option::of(prop::option::of(arb_text()));
    let optional_price = || prop::option::of(prop::option::of(arb_price()));
    (
        optional_text(),
        optional_text(),
        optional_price(),
        optional_price(),
        prop::option::of(prop::collection::vec(arb_text(), 0..4)),
        prop::option::of(prop::collection::vec(arb_image_json(), 0..3)),
    )
        .prop_map(|(name, description, price, tax, tags, images)| {
            let mut object = Map::new();
            let mut set = |key: &str, value: Option<Value>| {
                if let Some(value) = value {
                    object.insert(key.to_string(), value);
                }
            };
            set("name", name.map(|n| n.map_or(Value::Null, Value::from)));
            set("description", description.map(|d| d.map_or(Value::Null, Value::from)));
            set("price", price.map(|p| p.map_or(Value::Null, Value::from)));
            set("tax", tax.map(|t| t.map_or(Value::Null, Value::from)));
            set("tags", tags.map(Value::from));
            set("images", images.map(Value::Array));
            Value::Object(object)
        })
}

/// Generates a key no declared record field uses
pub fn arb_extra_key() -> impl Strategy<Value = String> {
    "x_[a-z]{1,10}"
}

/// Generates an integer outside [0, 1000]
pub fn arb_out_of_range_id() -> impl Strategy<Value = i64> {
    prop_oneof![i64::MIN / 2..0i64, 1001i64..i64::MAX / 2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;
    use crate::schema::Schema;
    use crate::validation::{validate_record, Location, ValidationErrors};

    proptest! {
        /// Generated items always pass the Item shape
        #[test]
        fn prop_generated_items_are_valid(body in arb_item_json()) {
            let mut errors = ValidationErrors::new();
            let checked = validate_record(&body, &Item::shape(), &Location::root("body"), &mut errors);
            prop_assert!(checked.is_some(), "{}", errors);
        }

        /// Generated items deserialize into Item
        #[test]
        fn prop_generated_items_deserialize(body in arb_item_json()) {
            prop_assert!(serde_json::from_value::<Item>(body).is_ok());
        }
    }
}
