use serde::{Deserialize, Serialize};

use crate::schema::{FieldSpec, FieldType, RecordShape, Schema};

/// An image attached to an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Absolute http(s) URL of the image
    pub url: String,
    pub name: String,
}

impl Schema for Image {
    fn shape() -> RecordShape {
        RecordShape::new("Image")
            .field(FieldSpec::required("url", FieldType::Url))
            .field(FieldSpec::required("name", FieldType::Str))
    }
}
