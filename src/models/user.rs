use serde::{Deserialize, Serialize};

use crate::schema::{FieldSpec, FieldType, RecordShape, Schema};

/// The owner attached to a multi-body item update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl Schema for User {
    fn shape() -> RecordShape {
        RecordShape::new("User")
            .field(FieldSpec::required("username", FieldType::Str))
            .field(FieldSpec::optional("full_name", FieldType::Str))
    }
}
