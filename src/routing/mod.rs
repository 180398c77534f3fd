/// Routing
///
/// Routes are declared as data: a [`RouteSpec`] names the method, the path
/// template, every parameter with its source and type, the success status
/// and the response shape and view. The [`RouteTable`] checks each spec
/// against its template when it is registered and picks the most specific
/// route for an incoming request.

mod table;
mod template;

pub use table::{CaptureKind, Lookup, Route, RouteMatch, RouteTable};
pub use template::{decode_segment, split_path, PathTemplate, Segment};

use axum::http::{Method, StatusCode};

use crate::schema::{FieldSpec, ParamSpec, Source};
use crate::shaping::{ResponseShape, ResponseView};

/// Everything declared about one route
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub method: Method,
    pub path: String,
    pub name: Option<&'static str>,
    pub params: Vec<ParamSpec>,
    /// Status of a successful response
    pub status: StatusCode,
    pub response: ResponseShape,
    pub view: ResponseView,
}

impl RouteSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            name: None,
            params: Vec::new(),
            status: StatusCode::OK,
            response: ResponseShape::Any,
            view: ResponseView::full(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn path_param(self, field: FieldSpec) -> Self {
        self.param(ParamSpec::new(Source::Path, field))
    }

    pub fn query(self, field: FieldSpec) -> Self {
        self.param(ParamSpec::new(Source::Query, field))
    }

    pub fn header(self, field: FieldSpec) -> Self {
        self.param(ParamSpec::new(Source::Header, field))
    }

    pub fn form(self, field: FieldSpec) -> Self {
        self.param(ParamSpec::new(Source::Form, field))
    }

    pub fn body(self, field: FieldSpec) -> Self {
        self.param(ParamSpec::new(Source::Body, field))
    }

    /// A body parameter read from `body[name]` even when it is the only one
    pub fn embedded_body(self, field: FieldSpec) -> Self {
        self.param(ParamSpec {
            embed: true,
            ..ParamSpec::new(Source::Body, field)
        })
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn response(mut self, shape: ResponseShape) -> Self {
        self.response = shape;
        self
    }

    pub fn view(mut self, view: ResponseView) -> Self {
        self.view = view;
        self
    }

    /// Name used in logs
    pub fn label(&self) -> String {
        match self.name {
            Some(name) => name.to_string(),
            None => format!("{} {}", self.method, self.path),
        }
    }
}
