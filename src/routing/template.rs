use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use crate::errors::RegistrationError;

/// One segment of a path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// `{name}`, consumes exactly one non-empty segment
    Capture(String),
    /// `{name:path}`, consumes every remaining segment
    CatchAll(String),
}

impl Segment {
    fn placeholder(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Capture(name) | Segment::CatchAll(name) => Some(name),
        }
    }
}

/// Splits a request or template path into segments, ignoring a trailing slash
pub fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

/// Percent-decodes one request path segment
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn decode_segment(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment).decode_utf8_lossy()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A parsed route path such as `/users/{user_id}/items/{item_id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self, RegistrationError> {
        if !template.starts_with('/') {
            return Err(RegistrationError::MissingLeadingSlash(template.to_string()));
        }

        let parts = split_path(template);
        let mut segments = Vec::with_capacity(parts.len());
        for (position, part) in parts.iter().enumerate() {
            let segment = Self::parse_segment(template, part)?;
            if matches!(segment, Segment::CatchAll(_)) && position + 1 != parts.len() {
                return Err(RegistrationError::CatchAllNotLast(template.to_string()));
            }
            if let Some(name) = segment.placeholder() {
                if segments.iter().any(|s: &Segment| s.placeholder() == Some(name)) {
                    return Err(RegistrationError::DuplicatePlaceholder {
                        template: template.to_string(),
                        name: name.to_string(),
                    });
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    fn parse_segment(template: &str, part: &str) -> Result<Segment, RegistrationError> {
        let invalid = || RegistrationError::InvalidPlaceholder {
            template: template.to_string(),
            segment: part.to_string(),
        };

        let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) else {
            if part.contains('{') || part.contains('}') {
                return Err(invalid());
            }
            return Ok(Segment::Literal(part.to_string()));
        };

        let (name, converter) = match inner.split_once(':') {
            Some((name, converter)) => (name, Some(converter)),
            None => (inner, None),
        };
        if !is_identifier(name) {
            return Err(invalid());
        }

        match converter {
            None => Ok(Segment::Capture(name.to_string())),
            Some("path") => Ok(Segment::CatchAll(name.to_string())),
            Some(other) => Err(RegistrationError::UnknownConverter {
                template: template.to_string(),
                converter: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::placeholder)
    }

    pub fn is_catch_all(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::CatchAll(n) if n == name))
    }

    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    pub fn has_catch_all(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::CatchAll(_)))
    }

    /// Whether two templates match exactly the same request paths, capture names aside
    pub fn same_structure(&self, other: &PathTemplate) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    (Segment::Capture(_), Segment::Capture(_)) => true,
                    (Segment::CatchAll(_), Segment::CatchAll(_)) => true,
                    _ => false,
                })
    }

    /// Matches request segments structurally, returning the captured text by name
    pub fn match_segments<S: AsRef<str>>(&self, request: &[S]) -> Option<Vec<(String, String)>> {
        let mut captures = Vec::new();
        let mut remaining = request;

        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => {
                    let (first, rest) = remaining.split_first()?;
                    if first.as_ref() != literal {
                        return None;
                    }
                    remaining = rest;
                }
                Segment::Capture(name) => {
                    let (first, rest) = remaining.split_first()?;
                    let first = first.as_ref();
                    if first.is_empty() {
                        return None;
                    }
                    captures.push((name.clone(), first.to_string()));
                    remaining = rest;
                }
                Segment::CatchAll(name) => {
                    if remaining.is_empty() {
                        return None;
                    }
                    let joined: Vec<&str> = remaining.iter().map(AsRef::as_ref).collect();
                    captures.push((name.clone(), joined.join("/")));
                    remaining = &[];
                }
            }
        }

        remaining.is_empty().then_some(captures)
    }
}
