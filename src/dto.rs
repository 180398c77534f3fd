use serde::{Deserialize, Serialize};

use crate::schema::{FieldSpec, FieldType, RecordShape, Schema};
use crate::models::ModelName;

/// Data transfer object for registering a user
///
/// This struct is used to deserialize the JSON body of `POST /user/`.
/// The password never leaves the request: responses use [`UserOut`].
#[derive(Deserialize, Debug, Clone)]
pub struct UserIn {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl Schema for UserIn {
    fn shape() -> RecordShape {
        RecordShape::new("UserIn")
            .field(FieldSpec::required("username", FieldType::Str))
            .field(FieldSpec::required("password", FieldType::Str))
            .field(FieldSpec::required("email", FieldType::Email))
            .field(FieldSpec::optional("full_name", FieldType::Str))
    }
}

/// The public view of a registered user
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserOut {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
}

impl From<UserIn> for UserOut {
    fn from(user: UserIn) -> Self {
        Self {
            username: user.username,
            email: user.email,
            full_name: user.full_name,
        }
    }
}

impl Schema for UserOut {
    fn shape() -> RecordShape {
        RecordShape::new("UserOut")
            .field(FieldSpec::required("username", FieldType::Str))
            .field(FieldSpec::required("email", FieldType::Email))
            .field(FieldSpec::optional("full_name", FieldType::Str))
    }
}

/// Response for `GET /models/{model_name}`
#[derive(Serialize, Debug)]
pub struct ModelInfo {
    pub model_name: ModelName,
    pub message: &'static str,
}

impl From<ModelName> for ModelInfo {
    fn from(model_name: ModelName) -> Self {
        Self {
            model_name,
            message: model_name.message(),
        }
    }
}
