use axum::{
    http::{header::ALLOW, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::shaping::ContractViolation;
use crate::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not Found")]
    RouteNotFound,
    /// Carries the methods the path does accept
    #[error("Method not allowed")]
    MethodNotAllowed(Vec<Method>),
    #[error("Request validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Response contract violated: {0}")]
    ContractViolation(#[from] ContractViolation),
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// The groups failures are intercepted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    Validation,
    NotFound,
    MethodNotAllowed,
    Internal,
}

impl ApiError {
    pub fn category(&self) -> FailureCategory {
        match self {
            ApiError::Validation(_) => FailureCategory::Validation,
            ApiError::RouteNotFound | ApiError::NotFound(_) => FailureCategory::NotFound,
            ApiError::MethodNotAllowed(_) => FailureCategory::MethodNotAllowed,
            ApiError::ContractViolation(_) | ApiError::Internal(_) => FailureCategory::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RouteNotFound | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ContractViolation(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The client-facing message; server-side failures never leak detail
    fn public_message(&self) -> String {
        match self {
            ApiError::ContractViolation(_) | ApiError::Internal(_) => "Internal server error".to_string(),
            ApiError::Validation(_) => "Request validation failed".to_string(),
            other => other.to_string(),
        }
    }

    /// The `Allow` header value for a 405
    pub fn allow_header(&self) -> Option<HeaderValue> {
        let ApiError::MethodNotAllowed(allowed) = self else {
            return None;
        };
        let joined = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
        HeaderValue::from_str(&joined).ok()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.public_message();
        let allow = self.allow_header();

        let body = match self {
            ApiError::Validation(errors) => Json(serde_json::json!({
                "error": message,
                "detail": errors.to_detail(),
            })),
            // Server-side failures are logged by the dispatcher before rendering
            _ => Json(serde_json::json!({ "error": message })),
        };

        let mut response = (status, body).into_response();
        if let Some(allow) = allow {
            response.headers_mut().insert(ALLOW, allow);
        }
        response
    }
}

/// Problems found while building the route table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("path template `{0}` must start with `/`")]
    MissingLeadingSlash(String),
    #[error("invalid placeholder `{segment}` in `{template}`")]
    InvalidPlaceholder { template: String, segment: String },
    #[error("unknown converter `{converter}` in `{template}`")]
    UnknownConverter { template: String, converter: String },
    #[error("catch-all placeholder must be the final segment of `{0}`")]
    CatchAllNotLast(String),
    #[error("placeholder `{name}` appears more than once in `{template}`")]
    DuplicatePlaceholder { template: String, name: String },
    #[error("placeholder `{name}` in `{template}` has no declared path parameter")]
    UnboundPlaceholder { template: String, name: String },
    #[error("path parameter `{name}` is declared more than once for `{template}`")]
    DuplicatePathParam { template: String, name: String },
    #[error("path parameter `{name}` does not appear in `{template}`")]
    UnusedPathParam { template: String, name: String },
    #[error("catch-all `{name}` in `{template}` must be declared as a string")]
    CatchAllNotText { template: String, name: String },
    #[error("view on {method} {template} names unknown field `{field}`")]
    UnknownViewField { method: Method, template: String, field: String },
    #[error("view on {method} {template} needs a record response shape")]
    ViewWithoutRecord { method: Method, template: String },
    #[error("{method} {template} duplicates already registered {method} {existing}")]
    DuplicateRoute { method: Method, template: String, existing: String },
    #[error("an error override for {0:?} is already registered")]
    DuplicateOverride(FailureCategory),
}

/// Renders a failure in place of the default [`IntoResponse`] output
pub type ErrorOverride = Arc<dyn Fn(&ApiError) -> Response + Send + Sync>;

/// Per-category error overrides, at most one per category
#[derive(Clone, Default)]
pub struct ErrorHandlers {
    overrides: HashMap<FailureCategory, ErrorOverride>,
}

impl ErrorHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, category: FailureCategory, render: F) -> Result<(), RegistrationError>
    where
        F: Fn(&ApiError) -> Response + Send + Sync + 'static,
    {
        if self.overrides.contains_key(&category) {
            return Err(RegistrationError::DuplicateOverride(category));
        }
        self.overrides.insert(category, Arc::new(render));
        Ok(())
    }

    pub fn has_override(&self, category: FailureCategory) -> bool {
        self.overrides.contains_key(&category)
    }

    /// Turns a failure into a response, through its category's override if one is registered
    pub fn render(&self, error: ApiError) -> Response {
        match self.overrides.get(&error.category()) {
            Some(render) => render(&error),
            None => error.into_response(),
        }
    }
}

impl fmt::Debug for ErrorHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandlers")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Renders validation failures as plain text with status 400, one line per field
pub fn plain_text_validation(error: &ApiError) -> Response {
    match error {
        ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, errors.to_plain_text()).into_response(),
        other => (other.status(), other.public_message()).into_response(),
    }
}
