/// Signpost: declarative request routing and validation
///
/// This library provides a small HTTP service whose routes are declared as
/// data. Each route states where its parameters come from, which types and
/// bounds they carry and what shape its response takes; the dispatcher
/// enforces all of it before and after the handler runs.
///
/// ### Modules
///
/// - `schema`: Field types, bounds and record shapes
/// - `routing`: Path templates and the route table
/// - `validation`: Coercion and aggregated field errors
/// - `shaping`: Response shapes and per-route views
/// - `extract`: Reading parameters out of a request
/// - `dispatch`: The per-request pipeline and the axum bridge
/// - `repo`: Injectable key/value storage
/// - `handlers`: The service's routes
///
/// ### Web API
///
/// Every request goes through a single axum fallback into the
/// [`dispatch::Dispatcher`]. See [`handlers::routes`] for the route list.

/// Configuration module
pub mod config;

/// Request dispatch module
pub mod dispatch;

/// Data transfer objects module
pub mod dto;

/// Error types module
pub mod errors;

/// Parameter extraction module
pub mod extract;

/// Web API handlers module
pub mod handlers;

/// Logging setup module
pub mod logging;

/// Data models module
pub mod models;

/// Repository module for data access
pub mod repo;

/// Route declaration module
pub mod routing;

/// Declared shapes module
pub mod schema;

/// Response shaping module
pub mod shaping;

/// Input validation module
pub mod validation;

#[cfg(test)]
pub mod test_utils;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use config::{Config, ValidationErrorFormat};
use dispatch::{serve_request, Dispatcher, ServiceState};
use dto::UserOut;
use errors::{plain_text_validation, ErrorHandlers, FailureCategory, RegistrationError};
use models::{Item, ItemVariant};
use repo::{InMemoryStore, KeyValueStore};
use routing::RouteTable;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn KeyValueStore<Item>>,
    pub variants: Arc<dyn KeyValueStore<ItemVariant>>,
    pub users: Arc<dyn KeyValueStore<UserOut>>,
}

impl AppState {
    /// State with the demo catalog, variants and an empty user store
    pub fn seeded() -> Self {
        Self {
            catalog: Arc::new(InMemoryStore::with_entries(handlers::seed_catalog())),
            variants: Arc::new(InMemoryStore::with_entries(handlers::seed_variants())),
            users: Arc::new(InMemoryStore::new()),
        }
    }
}

/// Registers every route and the configured error overrides
pub fn build_dispatcher(validation_errors: ValidationErrorFormat) -> Result<Dispatcher, RegistrationError> {
    let mut table = RouteTable::new();
    for (spec, handler) in handlers::routes() {
        table.register(spec, handler)?;
    }

    let mut errors = ErrorHandlers::new();
    if validation_errors == ValidationErrorFormat::PlainText {
        errors.register(FailureCategory::Validation, plain_text_validation)?;
    }

    info!(routes = table.len(), ?validation_errors, "Route table built");
    Ok(Dispatcher::new(table, errors))
}

/// Creates the application router
///
/// ### Arguments
///
/// * `state` - The stores handlers read and write
/// * `config` - Decides the validation error format and CORS
///
/// ### Returns
///
/// An axum router, or the first route registration problem
pub fn create_app(state: AppState, config: &Config) -> Result<Router, RegistrationError> {
    let dispatcher = build_dispatcher(config.validation_errors)?;
    let service = Arc::new(ServiceState { dispatcher, state });

    let router = Router::new().fallback(serve_request).with_state(service);

    if config.allow_cors {
        Ok(router.layer(CorsLayer::permissive()))
    } else {
        Ok(router)
    }
}
