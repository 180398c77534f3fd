use axum::http::Method;
use std::collections::HashMap;
use tracing::debug;

use super::template::{decode_segment, split_path, PathTemplate};
use super::RouteSpec;
use crate::errors::RegistrationError;
use crate::schema::{FieldType, Source};

/// How a single-segment capture must parse for a route to match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    Int,
    Float,
    Text,
}

impl CaptureKind {
    fn for_type(ty: &FieldType) -> Self {
        match ty {
            FieldType::Int => CaptureKind::Int,
            FieldType::Float => CaptureKind::Float,
            _ => CaptureKind::Text,
        }
    }

    fn accepts(&self, raw: &str) -> bool {
        match self {
            CaptureKind::Int => raw.parse::<i64>().is_ok(),
            CaptureKind::Float => raw.parse::<f64>().is_ok(),
            CaptureKind::Text => true,
        }
    }
}

/// A registered route
#[derive(Debug)]
pub struct Route<H> {
    pub spec: RouteSpec,
    pub template: PathTemplate,
    pub handler: H,
    kinds: HashMap<String, CaptureKind>,
}

impl<H> Route<H> {
    fn captures_parse(&self, captures: &[(String, String)]) -> bool {
        captures.iter().all(|(name, raw)| {
            self.kinds
                .get(name)
                .is_none_or(|kind| kind.accepts(raw))
        })
    }

    /// Higher sorts first: more literals, then no catch-all
    fn specificity(&self) -> (usize, bool) {
        (self.template.literal_count(), !self.template.has_catch_all())
    }
}

/// A route selected for a request, with its captured path text
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub route: &'a Route<H>,
    pub captures: HashMap<String, String>,
}

/// Outcome of looking a request up in the table
#[derive(Debug)]
pub enum Lookup<'a, H> {
    /// Every typed capture parses
    Found(RouteMatch<'a, H>),
    /// The path fits structurally but a capture does not parse as its declared type
    Mistyped(RouteMatch<'a, H>),
    /// Only routes with these other methods fit the path
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// Routes in registration order
#[derive(Debug)]
pub struct RouteTable<H> {
    routes: Vec<Route<H>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> &[Route<H>] {
        &self.routes
    }

    /// Adds a route after checking it against its own declarations and the routes already present
    pub fn register(&mut self, spec: RouteSpec, handler: H) -> Result<(), RegistrationError> {
        let template = PathTemplate::parse(&spec.path)?;
        let kinds = Self::bind_path_params(&spec, &template)?;
        Self::check_view(&spec)?;

        if let Some(existing) = self
            .routes
            .iter()
            .find(|r| r.spec.method == spec.method && r.template.same_structure(&template))
        {
            return Err(RegistrationError::DuplicateRoute {
                method: spec.method.clone(),
                template: spec.path.clone(),
                existing: existing.spec.path.clone(),
            });
        }

        debug!(method = %spec.method, path = %spec.path, "Registered route");
        self.routes.push(Route {
            spec,
            template,
            handler,
            kinds,
        });
        Ok(())
    }

    fn bind_path_params(
        spec: &RouteSpec,
        template: &PathTemplate,
    ) -> Result<HashMap<String, CaptureKind>, RegistrationError> {
        let mut kinds = HashMap::new();

        for param in spec.params.iter().filter(|p| p.source == Source::Path) {
            let name = param.name();
            if kinds.contains_key(name) {
                return Err(RegistrationError::DuplicatePathParam {
                    template: spec.path.clone(),
                    name: name.to_string(),
                });
            }
            if !template.placeholders().any(|p| p == name) {
                return Err(RegistrationError::UnusedPathParam {
                    template: spec.path.clone(),
                    name: name.to_string(),
                });
            }
            if template.is_catch_all(name) && param.field.ty != FieldType::Str {
                return Err(RegistrationError::CatchAllNotText {
                    template: spec.path.clone(),
                    name: name.to_string(),
                });
            }
            kinds.insert(name.to_string(), CaptureKind::for_type(&param.field.ty));
        }

        if let Some(unbound) = template.placeholders().find(|p| !kinds.contains_key(*p)) {
            return Err(RegistrationError::UnboundPlaceholder {
                template: spec.path.clone(),
                name: unbound.to_string(),
            });
        }

        Ok(kinds)
    }

    fn check_view(spec: &RouteSpec) -> Result<(), RegistrationError> {
        let named = spec.view.named_fields();
        if named.is_empty() {
            return Ok(());
        }

        let Some(record) = spec.response.record() else {
            return Err(RegistrationError::ViewWithoutRecord {
                method: spec.method.clone(),
                template: spec.path.clone(),
            });
        };

        match named.into_iter().find(|field| !record.has_field(field)) {
            Some(field) => Err(RegistrationError::UnknownViewField {
                method: spec.method.clone(),
                template: spec.path.clone(),
                field: field.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Selects the most specific route for a request
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, H> {
        let request: Vec<_> = split_path(path).into_iter().map(decode_segment).collect();

        let mut typed: Option<(&Route<H>, Vec<(String, String)>)> = None;
        let mut structural: Option<(&Route<H>, Vec<(String, String)>)> = None;
        let mut other_methods: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(captures) = route.template.match_segments(&request) else {
                continue;
            };

            if route.spec.method != *method {
                if !other_methods.contains(&route.spec.method) {
                    other_methods.push(route.spec.method.clone());
                }
                continue;
            }

            let slot = if route.captures_parse(&captures) {
                &mut typed
            } else {
                &mut structural
            };
            // Earlier registrations keep ties
            if slot
                .as_ref()
                .is_none_or(|(best, _)| route.specificity() > best.specificity())
            {
                *slot = Some((route, captures));
            }
        }

        fn into_match<'r, H>((route, captures): (&'r Route<H>, Vec<(String, String)>)) -> RouteMatch<'r, H> {
            RouteMatch {
                route,
                captures: captures.into_iter().collect(),
            }
        }

        if let Some(found) = typed {
            Lookup::Found(into_match(found))
        } else if let Some(mistyped) = structural {
            Lookup::Mistyped(into_match(mistyped))
        } else if !other_methods.is_empty() {
            Lookup::MethodNotAllowed(other_methods)
        } else {
            Lookup::NotFound
        }
    }
}
