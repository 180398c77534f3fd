use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Image;
use crate::schema::{FieldSpec, FieldType, RecordShape, Schema};

/// Represents an item in the catalog
///
/// Every field is optional on the wire. `tags` defaults to an empty list and
/// absent optional fields are left out of the serialized form rather than
/// written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Images embedded in the item, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Image>>,
}

impl Item {
    /// Creates an item with a name and price and nothing else set
    pub fn priced(name: &str, price: f64) -> Self {
        Self {
            name: Some(name.to_string()),
            price: Some(price),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_tax(mut self, tax: f64) -> Self {
        self.tax = Some(tax);
        self
    }
}

impl Schema for Item {
    fn shape() -> RecordShape {
        RecordShape::new("Item")
            .field(FieldSpec::optional("name", FieldType::Str))
            .field(FieldSpec::optional("description", FieldType::Str))
            .field(FieldSpec::optional("price", FieldType::Float))
            .field(FieldSpec::optional("tax", FieldType::Float))
            .field(FieldSpec::optional("tags", FieldType::list(FieldType::Str)).with_default(json!([])))
            .field(FieldSpec::optional(
                "images",
                FieldType::list(FieldType::Record(Image::shape())),
            ))
    }
}
