/// Request dispatch
///
/// Runs one request through `Matching → Coercing → Invoking → Shaping →
/// Responding`. A failure in any phase skips straight to rendering through
/// the registered [`ErrorHandlers`].
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::{ApiError, ErrorHandlers};
use crate::extract::{extract, Params, RawInput};
use crate::routing::{Lookup, RouteTable};
use crate::shaping::shape_response;
use crate::AppState;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, ApiError>> + Send>>;

/// A route handler: validated parameters and the shared state in, JSON out
pub type Handler = Arc<dyn Fn(Params, AppState) -> HandlerFuture + Send + Sync>;

/// Boxes an async function into a [`Handler`]
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Params, AppState) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ApiError>> + Send + 'static,
{
    Arc::new(move |params, state| Box::pin(f(params, state)))
}

/// Stage a request is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Matching,
    Coercing,
    Invoking,
    Shaping,
    Responding,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Matching => "matching",
            Phase::Coercing => "coercing",
            Phase::Invoking => "invoking",
            Phase::Shaping => "shaping",
            Phase::Responding => "responding",
        };
        f.write_str(name)
    }
}

/// A request as the dispatcher sees it
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// The phase a request failed in, and why
#[derive(Debug)]
pub struct Failure {
    pub phase: Phase,
    pub error: ApiError,
}

impl Failure {
    fn new(phase: Phase, error: impl Into<ApiError>) -> Self {
        Self {
            phase,
            error: error.into(),
        }
    }
}

pub struct Dispatcher {
    table: RouteTable<Handler>,
    errors: ErrorHandlers,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.table.len())
            .field("errors", &self.errors)
            .finish()
    }
}

impl Dispatcher {
    pub fn new(table: RouteTable<Handler>, errors: ErrorHandlers) -> Self {
        Self { table, errors }
    }

    pub fn table(&self) -> &RouteTable<Handler> {
        &self.table
    }

    /// Handles one request end to end
    pub async fn dispatch(&self, request: InboundRequest, state: AppState) -> Response {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "request",
            %request_id,
            method = %request.method,
            path = %request.path,
        );

        async move {
            match self.run(&request, state).await {
                Ok(response) => {
                    debug!(phase = %Phase::Responding, status = %response.status(), "Request complete");
                    response
                }
                Err(Failure { phase, error }) => {
                    if error.status().is_server_error() {
                        error!(failed_in = %phase, error = %error, "Request failed");
                    } else {
                        warn!(failed_in = %phase, error = %error, "Request rejected");
                    }
                    debug!(phase = %Phase::Responding, category = ?error.category(), "Rendering failure");
                    self.errors.render(error)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: &InboundRequest, state: AppState) -> Result<Response, Failure> {
        debug!(phase = %Phase::Matching, "Looking up route");
        let matched = match self.table.lookup(&request.method, &request.path) {
            Lookup::Found(matched) | Lookup::Mistyped(matched) => matched,
            Lookup::MethodNotAllowed(allowed) => {
                debug!(?allowed, "Path exists for other methods");
                return Err(Failure::new(Phase::Matching, ApiError::MethodNotAllowed(allowed)));
            }
            Lookup::NotFound => return Err(Failure::new(Phase::Matching, ApiError::RouteNotFound)),
        };
        let spec = &matched.route.spec;

        debug!(phase = %Phase::Coercing, route = %spec.label(), "Extracting parameters");
        let input = RawInput {
            captures: &matched.captures,
            query: request.query.as_deref(),
            headers: &request.headers,
            body: &request.body,
        };
        let params = extract(&spec.params, input).map_err(|e| Failure::new(Phase::Coercing, e))?;
        let fields_set = params.body_fields_set().cloned();

        debug!(phase = %Phase::Invoking, "Calling handler");
        let value = (matched.route.handler)(params, state)
            .await
            .map_err(|e| Failure::new(Phase::Invoking, e))?;

        debug!(phase = %Phase::Shaping, "Shaping response");
        let shaped = shape_response(value, &spec.response, &spec.view, fields_set.as_ref())
            .map_err(|e| Failure::new(Phase::Shaping, e))?;

        Ok((spec.status, Json(shaped)).into_response())
    }
}

/// What the axum fallback needs to serve a request
pub struct ServiceState {
    pub dispatcher: Dispatcher,
    pub state: AppState,
}

/// Axum fallback handler that hands every request to the [`Dispatcher`]
pub async fn serve_request(
    State(service): State<Arc<ServiceState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = InboundRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    };
    service
        .dispatcher
        .dispatch(request, service.state.clone())
        .await
}
