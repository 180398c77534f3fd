/// Request parameter extraction
///
/// Reads every declared parameter of a route from its source, coerces it
/// through [`crate::validation`] and collects the results into a
/// [`Params`] set the handler reads typed values from.
use axum::http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};

use crate::errors::ApiError;
use crate::schema::{FieldSpec, FieldType, ParamSpec, Source};
use crate::validation::{coerce_many, coerce_text, validate_value, Location, Reason, ValidationErrors};

/// Validated parameters of one request, keyed by parameter name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: Map<String, Value>,
    body_fields: Option<BTreeSet<String>>,
}

impl Params {
    pub fn new(values: Map<String, Value>) -> Self {
        Self {
            values,
            body_fields: None,
        }
    }

    /// Deserializes one parameter into the handler's type
    ///
    /// An absent optional parameter reads as `null`, so `Option<T>` targets
    /// come back as `None`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ApiError> {
        let value = self.values.get(name).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| {
            ApiError::Internal(anyhow::anyhow!(
                "parameter `{}` does not fit the handler's type: {}",
                name,
                e
            ))
        })
    }

    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Body fields the client actually sent, when the route reads a body
    pub fn body_fields_set(&self) -> Option<&BTreeSet<String>> {
        self.body_fields.as_ref()
    }
}

/// The undecoded parts of a request that parameters are read from
#[derive(Debug, Clone, Copy)]
pub struct RawInput<'a> {
    pub captures: &'a HashMap<String, String>,
    pub query: Option<&'a str>,
    pub headers: &'a HeaderMap,
    pub body: &'a [u8],
}

fn parse_pairs(
    raw: Option<&[u8]>,
    root: &str,
    errors: &mut ValidationErrors,
) -> Vec<(String, String)> {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return Vec::new();
    };
    match serde_html_form::from_bytes::<Vec<(String, String)>>(raw) {
        Ok(pairs) => pairs,
        Err(e) => {
            errors.reject(Location::root(root), Reason::FormInvalid(e.to_string()));
            Vec::new()
        }
    }
}

fn values_for<'p>(pairs: &'p [(String, String)], key: &str) -> Vec<&'p str> {
    pairs
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

fn header_name(field: &FieldSpec) -> String {
    match &field.alias {
        Some(alias) => alias.to_ascii_lowercase(),
        None => field.name.replace('_', "-").to_ascii_lowercase(),
    }
}

/// Fills in a declared default, or reports a required parameter as missing
fn absent(field: &FieldSpec, loc: Location, values: &mut Map<String, Value>, errors: &mut ValidationErrors) {
    if let Some(default) = &field.default {
        values.insert(field.name.clone(), default.clone());
    } else if field.required {
        errors.reject(loc, Reason::Missing);
    }
}

/// Field names of a record-typed body the client supplied
fn supplied_fields(body: &Value, ty: &FieldType) -> BTreeSet<String> {
    let (Some(object), FieldType::Record(shape)) = (body.as_object(), ty) else {
        return BTreeSet::new();
    };
    shape
        .fields()
        .iter()
        .filter(|spec| object.contains_key(spec.wire_name()))
        .map(|spec| spec.name.clone())
        .collect()
}

/// Extracts and validates every declared parameter
///
/// All failures are collected before returning, so one response reports
/// every bad field.
pub fn extract(params: &[ParamSpec], input: RawInput<'_>) -> Result<Params, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut values = Map::new();

    let query = parse_pairs(input.query.map(str::as_bytes), "query", &mut errors);
    let form = if params.iter().any(|p| p.source == Source::Form) {
        parse_pairs(Some(input.body), "body", &mut errors)
    } else {
        Vec::new()
    };

    for param in params {
        let field = &param.field;
        let loc = Location::root(param.source.location_root()).key(field.wire_name());

        let raw: Vec<&str> = match param.source {
            Source::Path => input
                .captures
                .get(&field.name)
                .map(|c| vec![c.as_str()])
                .unwrap_or_default(),
            Source::Query => values_for(&query, field.wire_name()),
            Source::Form => values_for(&form, field.wire_name()),
            Source::Header => {
                let mut found = Vec::new();
                for value in input.headers.get_all(header_name(field)) {
                    match value.to_str() {
                        Ok(text) => found.push(text),
                        Err(_) => errors.reject(loc.clone(), Reason::StringType),
                    }
                }
                found
            }
            Source::Body => continue,
        };

        if raw.is_empty() {
            absent(field, loc, &mut values, &mut errors);
            continue;
        }

        let coerced = match param.source {
            Source::Path => coerce_text(raw[0], &field.ty, &field.bounds, &loc, &mut errors),
            _ => coerce_many(&raw, &field.ty, &field.bounds, &loc, &mut errors),
        };
        if let Some(value) = coerced {
            values.insert(field.name.clone(), value);
        }
    }

    let body_fields = extract_body(params, input.body, &mut values, &mut errors);

    if errors.is_empty() {
        Ok(Params { values, body_fields })
    } else {
        Err(errors)
    }
}

fn extract_body(
    params: &[ParamSpec],
    body: &[u8],
    values: &mut Map<String, Value>,
    errors: &mut ValidationErrors,
) -> Option<BTreeSet<String>> {
    let body_params: Vec<&ParamSpec> = params.iter().filter(|p| p.source == Source::Body).collect();
    if body_params.is_empty() {
        return None;
    }

    let root = Location::root("body");
    let parsed = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Some(value),
            Err(e) => {
                errors.reject(root, Reason::JsonInvalid(e.to_string()));
                return None;
            }
        }
    };

    // A lone body parameter is the whole body unless it asks to be embedded
    if let [param] = body_params.as_slice() {
        if !param.embed {
            let field = &param.field;
            match parsed.filter(|v| !(v.is_null() && !field.required)) {
                Some(value) => {
                    let supplied = supplied_fields(&value, &field.ty);
                    if let Some(checked) = validate_value(&value, &field.ty, &field.bounds, &root, errors) {
                        values.insert(field.name.clone(), checked);
                    }
                    return Some(supplied);
                }
                None => {
                    absent(field, root, values, errors);
                    return None;
                }
            }
        }
    }

    let object = match parsed {
        Some(Value::Object(object)) => object,
        Some(_) => {
            errors.reject(root, Reason::DictType);
            return None;
        }
        None => Map::new(),
    };

    let mut supplied = BTreeSet::new();
    for param in body_params {
        let field = &param.field;
        let loc = root.key(field.wire_name());
        match object.get(field.wire_name()) {
            Some(Value::Null) if !field.required => {}
            Some(value) => {
                supplied.insert(field.name.clone());
                if let Some(checked) = validate_value(value, &field.ty, &field.bounds, &loc, errors) {
                    values.insert(field.name.clone(), checked);
                }
            }
            None => absent(field, loc, values, errors),
        }
    }
    Some(supplied)
}

#[cfg(test)]
mod tests;
