/// Declared shapes
///
/// This module holds the vocabulary routes use to describe their inputs and
/// outputs: field types, numeric bounds, defaults, record shapes and the
/// source each request parameter is read from. Nothing here inspects Rust
/// types at runtime; every shape is written down next to the type it
/// describes via the [`Schema`] trait.
use serde_json::Value;

/// The wire type a field or parameter is declared with
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Int,
    Float,
    Str,
    Bool,
    /// A string holding an e-mail address
    Email,
    /// A string holding an absolute http(s) URL
    Url,
    /// One of a closed set of case-sensitive strings
    Choice(Choices),
    List(Box<FieldType>),
    /// An object with arbitrary string keys and uniformly typed values
    Map(Box<FieldType>),
    Record(RecordShape),
    /// Accepted as-is
    Any,
}

impl FieldType {
    pub fn list(inner: FieldType) -> Self {
        FieldType::List(Box::new(inner))
    }

    pub fn map(inner: FieldType) -> Self {
        FieldType::Map(Box::new(inner))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FieldType::List(_))
    }
}

/// A closed set of case-sensitive string variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choices {
    pub name: &'static str,
    pub variants: &'static [&'static str],
}

impl Choices {
    pub fn contains(&self, candidate: &str) -> bool {
        self.variants.contains(&candidate)
    }
}

/// Rust enums that travel on the wire as one of a fixed set of strings
pub trait ClosedEnum: Sized {
    const NAME: &'static str;
    const VARIANTS: &'static [&'static str];

    fn choices() -> Choices {
        Choices {
            name: Self::NAME,
            variants: Self::VARIANTS,
        }
    }
}

/// Inclusive and exclusive numeric limits
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub ge: Option<f64>,
    pub le: Option<f64>,
    pub gt: Option<f64>,
    pub lt: Option<f64>,
}

impl Bounds {
    pub fn is_unbounded(&self) -> bool {
        self.ge.is_none() && self.le.is_none() && self.gt.is_none() && self.lt.is_none()
    }
}

/// A single named field of a record or a single request parameter
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    pub required: bool,
    /// Value used when the field is absent
    pub default: Option<Value>,
    pub bounds: Bounds,
    /// Name used on the wire when it differs from `name`
    pub alias: Option<String>,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            default: None,
            bounds: Bounds::default(),
            alias: None,
        }
    }

    pub fn optional(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, ty)
        }
    }

    /// Makes the field optional and fills `default` in when it is absent
    pub fn with_default(mut self, default: Value) -> Self {
        self.required = false;
        self.default = Some(default);
        self
    }

    pub fn ge(mut self, limit: f64) -> Self {
        self.bounds.ge = Some(limit);
        self
    }

    pub fn le(mut self, limit: f64) -> Self {
        self.bounds.le = Some(limit);
        self
    }

    pub fn gt(mut self, limit: f64) -> Self {
        self.bounds.gt = Some(limit);
        self
    }

    pub fn lt(mut self, limit: f64) -> Self {
        self.bounds.lt = Some(limit);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn wire_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// The declared fields of a named record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordShape {
    name: &'static str,
    fields: Vec<FieldSpec>,
}

impl RecordShape {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Types whose wire form is described by a [`RecordShape`]
pub trait Schema {
    fn shape() -> RecordShape;
}

/// Where a request parameter is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Path,
    Query,
    Header,
    /// A field of an `application/x-www-form-urlencoded` body
    Form,
    /// The JSON body, or one top-level key of it
    Body,
}

impl Source {
    /// First segment of an error location for parameters of this source
    pub fn location_root(&self) -> &'static str {
        match self {
            Source::Path => "path",
            Source::Query => "query",
            Source::Header => "header",
            Source::Form | Source::Body => "body",
        }
    }
}

/// A declared request parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub source: Source,
    pub field: FieldSpec,
    /// Read a body parameter from `body[name]` even when it is the only one
    pub embed: bool,
}

impl ParamSpec {
    pub fn new(source: Source, field: FieldSpec) -> Self {
        Self {
            source,
            field,
            embed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }
}
