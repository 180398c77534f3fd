/// Input validation
///
/// Coerces raw request text and JSON values into their declared types.
/// Every function here appends to a [`ValidationErrors`] collector instead
/// of returning on the first problem, so a single request reports all of
/// its failing fields at once.
use serde::Serialize;
use serde_json::{json, Map, Number, Value};
use std::fmt;
use thiserror::Error;

use crate::schema::{Bounds, Choices, FieldSpec, FieldType, RecordShape};

/// One step of an error location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LocSegment {
    Key(String),
    Index(usize),
}

/// Where in the request a failing value was found, e.g. `body.images.0.url`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Location(Vec<LocSegment>);

impl Location {
    pub fn root(source: &str) -> Self {
        Self(vec![LocSegment::Key(source.to_string())])
    }

    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(LocSegment::Key(key.to_string()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(LocSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[LocSegment] {
        &self.0
    }

    fn root_is(&self, source: &str) -> bool {
        matches!(self.0.first(), Some(LocSegment::Key(k)) if k == source)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|segment| match segment {
                LocSegment::Key(key) => key.clone(),
                LocSegment::Index(index) => index.to_string(),
            })
            .collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Why a value was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum Reason {
    Missing,
    IntParsing,
    FloatParsing,
    BoolParsing,
    StringType,
    ListType,
    DictType,
    InvalidEmail,
    InvalidUrl(String),
    GreaterThanEqual(f64),
    LessThanEqual(f64),
    GreaterThan(f64),
    LessThan(f64),
    JsonInvalid(String),
    FormInvalid(String),
}

impl Reason {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Reason::Missing => "missing",
            Reason::IntParsing => "int_parsing",
            Reason::FloatParsing => "float_parsing",
            Reason::BoolParsing => "bool_parsing",
            Reason::StringType => "string_type",
            Reason::ListType => "list_type",
            Reason::DictType => "dict_type",
            Reason::InvalidEmail => "value_error",
            Reason::InvalidUrl(_) => "url_parsing",
            Reason::GreaterThanEqual(_) => "greater_than_equal",
            Reason::LessThanEqual(_) => "less_than_equal",
            Reason::GreaterThan(_) => "greater_than",
            Reason::LessThan(_) => "less_than",
            Reason::JsonInvalid(_) => "json_invalid",
            Reason::FormInvalid(_) => "form_invalid",
        }
    }

    fn context(&self) -> Option<Value> {
        match self {
            Reason::GreaterThanEqual(limit)
            | Reason::LessThanEqual(limit)
            | Reason::GreaterThan(limit)
            | Reason::LessThan(limit) => Some(json!({ "limit": limit })),
            Reason::InvalidUrl(error) | Reason::JsonInvalid(error) | Reason::FormInvalid(error) => {
                Some(json!({ "error": error }))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Missing => write!(f, "Field required"),
            Reason::IntParsing => write!(f, "Input should be a valid integer"),
            Reason::FloatParsing => write!(f, "Input should be a valid number"),
            Reason::BoolParsing => write!(f, "Input should be a valid boolean"),
            Reason::StringType => write!(f, "Input should be a valid string"),
            Reason::ListType => write!(f, "Input should be a valid list"),
            Reason::DictType => write!(f, "Input should be a valid dictionary or object"),
            Reason::InvalidEmail => write!(f, "value is not a valid email address"),
            Reason::InvalidUrl(error) => write!(f, "Input should be a valid URL, {}", error),
            Reason::GreaterThanEqual(limit) => write!(f, "Input should be greater than or equal to {}", limit),
            Reason::LessThanEqual(limit) => write!(f, "Input should be less than or equal to {}", limit),
            Reason::GreaterThan(limit) => write!(f, "Input should be greater than {}", limit),
            Reason::LessThan(limit) => write!(f, "Input should be less than {}", limit),
            Reason::JsonInvalid(error) => write!(f, "JSON decode error: {}", error),
            Reason::FormInvalid(error) => write!(f, "Form decode error: {}", error),
        }
    }
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// A path, query or header parameter failed coercion
    #[error("{loc}: {reason}")]
    ParameterCoercion { loc: Location, reason: Reason },
    /// A body or form field failed validation
    #[error("{loc}: {reason}")]
    BodyValidation { loc: Location, reason: Reason },
    /// A value outside a closed enumeration
    #[error("{loc}: Input should be {}", quote_choices(.allowed))]
    EnumMismatch { loc: Location, allowed: Vec<String> },
}

fn quote_choices(allowed: &[String]) -> String {
    let quoted: Vec<String> = allowed.iter().map(|v| format!("'{}'", v)).collect();
    match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

impl FieldError {
    /// Builds the error category that matches where the value came from
    pub fn at(loc: Location, reason: Reason) -> Self {
        if loc.root_is("body") {
            FieldError::BodyValidation { loc, reason }
        } else {
            FieldError::ParameterCoercion { loc, reason }
        }
    }

    pub fn loc(&self) -> &Location {
        match self {
            FieldError::ParameterCoercion { loc, .. }
            | FieldError::BodyValidation { loc, .. }
            | FieldError::EnumMismatch { loc, .. } => loc,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FieldError::ParameterCoercion { reason, .. } | FieldError::BodyValidation { reason, .. } => {
                reason.code()
            }
            FieldError::EnumMismatch { .. } => "enum",
        }
    }

    /// The message without its location
    pub fn message(&self) -> String {
        match self {
            FieldError::ParameterCoercion { reason, .. } | FieldError::BodyValidation { reason, .. } => {
                reason.to_string()
            }
            FieldError::EnumMismatch { allowed, .. } => format!("Input should be {}", quote_choices(allowed)),
        }
    }

    /// The structured form used in default error responses
    pub fn to_detail(&self) -> Value {
        let mut detail = json!({
            "type": self.code(),
            "loc": self.loc(),
            "msg": self.message(),
        });
        let context = match self {
            FieldError::ParameterCoercion { reason, .. } | FieldError::BodyValidation { reason, .. } => {
                reason.context()
            }
            FieldError::EnumMismatch { allowed, .. } => Some(json!({ "expected": allowed })),
        };
        if let (Some(context), Some(object)) = (context, detail.as_object_mut()) {
            object.insert("ctx".to_string(), context);
        }
        detail
    }
}

/// Every field rejected while handling one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn reject(&mut self, loc: Location, reason: Reason) {
        self.push(FieldError::at(loc, reason));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    pub fn to_detail(&self) -> Value {
        Value::Array(self.0.iter().map(FieldError::to_detail).collect())
    }

    /// One `loc: msg` line per error
    pub fn to_plain_text(&self) -> String {
        let lines: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        lines.join("\n")
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
        _ => None,
    }
}

fn is_email(raw: &str) -> bool {
    if raw.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

fn check_url(raw: &str) -> Result<(), String> {
    let parsed = url::Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err("URL scheme should be 'http' or 'https'".to_string());
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err("empty host".to_string());
    }
    Ok(())
}

fn check_bounds(number: f64, bounds: &Bounds, loc: &Location, errors: &mut ValidationErrors) -> bool {
    let before = errors.len();
    if let Some(limit) = bounds.ge {
        if number < limit {
            errors.reject(loc.clone(), Reason::GreaterThanEqual(limit));
        }
    }
    if let Some(limit) = bounds.gt {
        if number <= limit {
            errors.reject(loc.clone(), Reason::GreaterThan(limit));
        }
    }
    if let Some(limit) = bounds.le {
        if number > limit {
            errors.reject(loc.clone(), Reason::LessThanEqual(limit));
        }
    }
    if let Some(limit) = bounds.lt {
        if number >= limit {
            errors.reject(loc.clone(), Reason::LessThan(limit));
        }
    }
    errors.len() == before
}

fn bounded(value: Value, bounds: &Bounds, loc: &Location, errors: &mut ValidationErrors) -> Option<Value> {
    if bounds.is_unbounded() {
        return Some(value);
    }
    match value.as_f64() {
        Some(number) if !check_bounds(number, bounds, loc, errors) => None,
        _ => Some(value),
    }
}

fn choice(raw: &str, choices: &Choices, loc: &Location, errors: &mut ValidationErrors) -> Option<Value> {
    if choices.contains(raw) {
        Some(Value::String(raw.to_string()))
    } else {
        errors.push(FieldError::EnumMismatch {
            loc: loc.clone(),
            allowed: choices.variants.iter().map(|v| v.to_string()).collect(),
        });
        None
    }
}

fn type_reason(ty: &FieldType) -> Reason {
    match ty {
        FieldType::Int => Reason::IntParsing,
        FieldType::Float => Reason::FloatParsing,
        FieldType::Bool => Reason::BoolParsing,
        FieldType::List(_) => Reason::ListType,
        FieldType::Map(_) | FieldType::Record(_) => Reason::DictType,
        _ => Reason::StringType,
    }
}

/// Coerces one textual value (a path segment, query value, header or form field)
pub fn coerce_text(
    raw: &str,
    ty: &FieldType,
    bounds: &Bounds,
    loc: &Location,
    errors: &mut ValidationErrors,
) -> Option<Value> {
    let value = match ty {
        FieldType::Int => match raw.trim().parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => {
                errors.reject(loc.clone(), Reason::IntParsing);
                return None;
            }
        },
        FieldType::Float => match raw.trim().parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Value::Number(n),
            None => {
                errors.reject(loc.clone(), Reason::FloatParsing);
                return None;
            }
        },
        FieldType::Bool => match parse_bool(raw) {
            Some(b) => Value::Bool(b),
            None => {
                errors.reject(loc.clone(), Reason::BoolParsing);
                return None;
            }
        },
        FieldType::Str | FieldType::Any => Value::String(raw.to_string()),
        FieldType::Email => {
            if !is_email(raw) {
                errors.reject(loc.clone(), Reason::InvalidEmail);
                return None;
            }
            Value::String(raw.to_string())
        }
        FieldType::Url => {
            if let Err(error) = check_url(raw) {
                errors.reject(loc.clone(), Reason::InvalidUrl(error));
                return None;
            }
            Value::String(raw.to_string())
        }
        FieldType::Choice(choices) => return choice(raw, choices, loc, errors),
        FieldType::List(inner) => {
            let item = coerce_text(raw, inner, bounds, &loc.index(0), errors)?;
            return Some(Value::Array(vec![item]));
        }
        FieldType::Map(_) | FieldType::Record(_) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => return validate_value(&parsed, ty, bounds, loc, errors),
            Err(_) => {
                errors.reject(loc.clone(), Reason::DictType);
                return None;
            }
        },
    };
    bounded(value, bounds, loc, errors)
}

/// Coerces every value given for one query or form key
///
/// List-typed parameters take all values in order; anything else takes the
/// last one.
pub fn coerce_many(
    raw: &[&str],
    ty: &FieldType,
    bounds: &Bounds,
    loc: &Location,
    errors: &mut ValidationErrors,
) -> Option<Value> {
    match ty {
        FieldType::List(inner) => {
            let before = errors.len();
            let items: Vec<Value> = raw
                .iter()
                .enumerate()
                .filter_map(|(i, value)| coerce_text(value, inner, bounds, &loc.index(i), errors))
                .collect();
            (errors.len() == before).then_some(Value::Array(items))
        }
        _ => {
            let last = raw.last()?;
            coerce_text(last, ty, bounds, loc, errors)
        }
    }
}

/// Validates a JSON value against a declared type
///
/// Integers given as integral floats or numeric strings are converted; floats
/// keep the number they were given so accepted values pass through unchanged.
pub fn validate_value(
    value: &Value,
    ty: &FieldType,
    bounds: &Bounds,
    loc: &Location,
    errors: &mut ValidationErrors,
) -> Option<Value> {
    let checked = match (ty, value) {
        (FieldType::Any, v) => v.clone(),
        (FieldType::Int, Value::Number(n)) if n.is_i64() => value.clone(),
        (FieldType::Int, Value::Number(n)) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.is_finite() && f.abs() < i64::MAX as f64 => Value::from(f as i64),
            _ => {
                errors.reject(loc.clone(), Reason::IntParsing);
                return None;
            }
        },
        (FieldType::Float, Value::Number(_)) => value.clone(),
        (FieldType::Bool, Value::Bool(_)) => value.clone(),
        (FieldType::Bool, Value::Number(n)) => match n.as_i64() {
            Some(0) => Value::Bool(false),
            Some(1) => Value::Bool(true),
            _ => {
                errors.reject(loc.clone(), Reason::BoolParsing);
                return None;
            }
        },
        (
            FieldType::Int
            | FieldType::Float
            | FieldType::Bool
            | FieldType::Str
            | FieldType::Email
            | FieldType::Url
            | FieldType::Choice(_),
            Value::String(raw),
        ) => return coerce_text(raw, ty, bounds, loc, errors),
        (FieldType::List(inner), Value::Array(items)) => {
            let before = errors.len();
            let checked: Vec<Value> = items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| validate_value(item, inner, bounds, &loc.index(i), errors))
                .collect();
            if errors.len() != before {
                return None;
            }
            Value::Array(checked)
        }
        (FieldType::Map(inner), Value::Object(entries)) => {
            let before = errors.len();
            let mut checked = Map::new();
            for (key, entry) in entries {
                if let Some(v) = validate_value(entry, inner, bounds, &loc.key(key), errors) {
                    checked.insert(key.clone(), v);
                }
            }
            if errors.len() != before {
                return None;
            }
            return Some(Value::Object(checked));
        }
        (FieldType::Record(shape), _) => {
            return validate_record(value, shape, loc, errors).map(Value::Object);
        }
        (ty, _) => {
            errors.reject(loc.clone(), type_reason(ty));
            return None;
        }
    };
    bounded(checked, bounds, loc, errors)
}

/// Validates one declared field of a record, returning its checked value
fn validate_field(
    spec: &FieldSpec,
    present: Option<&Value>,
    loc: &Location,
    errors: &mut ValidationErrors,
) -> Option<Value> {
    match present {
        // Null stands in for absent only where absent means null
        Some(Value::Null) if !spec.required && spec.default.as_ref().is_none_or(Value::is_null) => Some(Value::Null),
        Some(value) => validate_value(value, &spec.ty, &spec.bounds, loc, errors),
        None => {
            if let Some(default) = &spec.default {
                Some(default.clone())
            } else {
                if spec.required {
                    errors.reject(loc.clone(), Reason::Missing);
                }
                None
            }
        }
    }
}

/// Validates a JSON object against a record shape
///
/// Unknown keys are dropped. Absent fields take their default when one is
/// declared, fail when required, and otherwise stay absent.
pub fn validate_record(
    value: &Value,
    shape: &RecordShape,
    loc: &Location,
    errors: &mut ValidationErrors,
) -> Option<Map<String, Value>> {
    let Some(object) = value.as_object() else {
        errors.reject(loc.clone(), Reason::DictType);
        return None;
    };

    let before = errors.len();
    let mut checked = Map::new();
    for spec in shape.fields() {
        let field_loc = loc.key(spec.wire_name());
        if let Some(v) = validate_field(spec, object.get(spec.wire_name()), &field_loc, errors) {
            checked.insert(spec.name.clone(), v);
        }
    }

    (errors.len() == before).then_some(checked)
}

#[cfg(test)]
mod tests;
