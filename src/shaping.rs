/// Response shaping
///
/// After a handler returns, its value is projected onto the route's declared
/// response shape and then filtered through the route's view. Projection
/// keeps declared fields, drops undeclared ones and omits absent optional
/// fields. An absent required field means the handler broke its own
/// contract, which is a server bug rather than a client error.
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::schema::{FieldType, RecordShape};
use crate::validation::{validate_value, Location, ValidationErrors};

/// The declared shape of a route's response body
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseShape {
    /// Passed through untouched
    #[default]
    Any,
    Record(RecordShape),
    List(Box<ResponseShape>),
    /// An object of string keys to values of one type
    Map(FieldType),
    /// The first record shape the value projects onto cleanly
    OneOf(Vec<RecordShape>),
}

impl ResponseShape {
    pub fn list_of(inner: ResponseShape) -> Self {
        ResponseShape::List(Box::new(inner))
    }

    /// The record the view's field names are checked against
    pub fn record(&self) -> Option<&RecordShape> {
        match self {
            ResponseShape::Record(shape) => Some(shape),
            ResponseShape::List(inner) => inner.record(),
            _ => None,
        }
    }
}

/// Which declared fields of a record reach the wire
///
/// An allow-list and a deny-list cannot be combined on one route.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldFilter {
    #[default]
    All,
    Include(BTreeSet<String>),
    Exclude(BTreeSet<String>),
}

/// A route's serialization view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseView {
    pub filter: FieldFilter,
    /// Keep only the fields the client supplied in the request body
    pub exclude_unset: bool,
}

impl ResponseView {
    pub fn full() -> Self {
        Self::default()
    }

    pub fn include(fields: &[&str]) -> Self {
        Self {
            filter: FieldFilter::Include(fields.iter().map(|f| f.to_string()).collect()),
            exclude_unset: false,
        }
    }

    pub fn exclude(fields: &[&str]) -> Self {
        Self {
            filter: FieldFilter::Exclude(fields.iter().map(|f| f.to_string()).collect()),
            exclude_unset: false,
        }
    }

    pub fn exclude_unset(mut self) -> Self {
        self.exclude_unset = true;
        self
    }

    /// Field names the filter refers to
    pub fn named_fields(&self) -> Vec<&str> {
        match &self.filter {
            FieldFilter::All => Vec::new(),
            FieldFilter::Include(fields) | FieldFilter::Exclude(fields) => {
                fields.iter().map(String::as_str).collect()
            }
        }
    }

    fn apply(&self, mut record: Map<String, Value>, fields_set: Option<&BTreeSet<String>>) -> Map<String, Value> {
        match &self.filter {
            FieldFilter::All => {}
            FieldFilter::Include(fields) => record.retain(|key, _| fields.contains(key)),
            FieldFilter::Exclude(fields) => record.retain(|key, _| !fields.contains(key)),
        }
        if self.exclude_unset {
            if let Some(set) = fields_set {
                record.retain(|key, _| set.contains(key));
            }
        }
        record
    }
}

/// A handler returned a value that does not satisfy its declared response shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("response field `{field}` {problem}")]
pub struct ContractViolation {
    pub field: String,
    pub problem: String,
}

impl ContractViolation {
    fn new(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem: problem.into(),
        }
    }
}

fn project_record(value: &Value, shape: &RecordShape, path: &str) -> Result<Map<String, Value>, ContractViolation> {
    let Some(object) = value.as_object() else {
        return Err(ContractViolation::new(path, format!("should be a {} object", shape.name())));
    };

    let mut projected = Map::new();
    for spec in shape.fields() {
        let field_path = format!("{}.{}", path, spec.name);
        match object.get(&spec.name) {
            Some(Value::Null) if !spec.required => {
                projected.insert(spec.name.clone(), Value::Null);
            }
            Some(present) => {
                let mut errors = ValidationErrors::new();
                let loc = Location::root(path).key(&spec.name);
                match validate_value(present, &spec.ty, &spec.bounds, &loc, &mut errors) {
                    Some(checked) if errors.is_empty() => {
                        projected.insert(spec.name.clone(), checked);
                    }
                    _ => return Err(ContractViolation::new(field_path, errors.to_string())),
                }
            }
            None if spec.required => {
                return Err(ContractViolation::new(field_path, "is required but missing"));
            }
            None => {}
        }
    }
    Ok(projected)
}

fn project(value: Value, shape: &ResponseShape, view: &ResponseView, fields_set: Option<&BTreeSet<String>>, path: &str) -> Result<Value, ContractViolation> {
    match shape {
        ResponseShape::Any => Ok(value),
        ResponseShape::Record(record) => {
            let projected = project_record(&value, record, path)?;
            Ok(Value::Object(view.apply(projected, fields_set)))
        }
        ResponseShape::List(inner) => {
            let Value::Array(items) = value else {
                return Err(ContractViolation::new(path, "should be a list"));
            };
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| project(item, inner, view, None, &format!("{}.{}", path, i)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        ResponseShape::Map(ty) => {
            let mut errors = ValidationErrors::new();
            validate_value(&value, &FieldType::map(ty.clone()), &Default::default(), &Location::root(path), &mut errors)
                .filter(|_| errors.is_empty())
                .ok_or_else(|| ContractViolation::new(path, errors.to_string()))
        }
        ResponseShape::OneOf(variants) => variants
            .iter()
            .find_map(|variant| project_record(&value, variant, path).ok())
            .map(|projected| Value::Object(view.apply(projected, fields_set)))
            .ok_or_else(|| {
                let names: Vec<&str> = variants.iter().map(RecordShape::name).collect();
                ContractViolation::new(path, format!("matches none of {}", names.join(", ")))
            }),
    }
}

/// Projects a handler's value onto the declared shape, then applies the view
///
/// `fields_set` holds the body fields the client supplied; it is only
/// consulted when the view excludes unset fields.
pub fn shape_response(
    value: Value,
    shape: &ResponseShape,
    view: &ResponseView,
    fields_set: Option<&BTreeSet<String>>,
) -> Result<Value, ContractViolation> {
    project(value, shape, view, fields_set, "response")
}
