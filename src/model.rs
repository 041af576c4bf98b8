use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// HTTP methods a route may declare.
const METHODS: [&str; 9] = [
    "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
];

/// Errors raised while building the route model
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unsupported HTTP method '{method}' on {path}")]
    UnsupportedMethod { method: String, path: String },
    #[error("invalid status code {status} on {method} {path}")]
    InvalidStatus {
        status: u16,
        method: String,
        path: String,
    },
    #[error("{method} {path} declares no responses")]
    NoResponses { method: String, path: String },
    #[error("duplicate route {method} {path}")]
    DuplicateRoute { method: String, path: String },
}

/// One piece of a path template
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// A path pattern such as `/pets/{id}`, split into segments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template string.
    ///
    /// A segment wholly enclosed in braces becomes a parameter; anything else
    /// is compared literally. The root template `/` is a single empty literal.
    pub fn parse(template: &str) -> Self {
        let segments = split_segments(template)
            .map(|segment| {
                match segment
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                {
                    Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                    _ => Segment::Literal(segment.to_string()),
                }
            })
            .collect();

        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of literal segments, used to rank overlapping matches
    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => write!(f, "/{}", lit)?,
                Segment::Param(name) => write!(f, "/{{{}}}", name)?,
            }
        }
        Ok(())
    }
}

/// Split a path on `/` after dropping one leading slash.
///
/// Both `/` and the empty path yield a single empty segment.
pub fn split_segments(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

/// Example payloads attached to one response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Examples {
    pub default: Option<JsonValue>,
    pub named: IndexMap<String, JsonValue>,
}

impl Examples {
    pub fn single(value: JsonValue) -> Self {
        Self {
            default: Some(value),
            named: IndexMap::new(),
        }
    }

    /// Pick the named example for `key`, falling back to the default.
    ///
    /// When no default is declared the first named example stands in for it.
    pub fn select(&self, key: Option<&str>) -> Option<&JsonValue> {
        if let Some(value) = key.and_then(|k| self.named.get(k)) {
            return Some(value);
        }

        self.default
            .as_ref()
            .or_else(|| self.named.values().next())
    }
}

/// One modeled response of a route
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status_code: u16,
    pub required_fields: BTreeSet<String>,
    pub examples: Examples,
}

impl Response {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            required_fields: BTreeSet::new(),
            examples: Examples::default(),
        }
    }

    pub fn with_required<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_examples(mut self, examples: Examples) -> Self {
        self.examples = examples;
        self
    }

    /// The example provider: `None` means the response has no body.
    pub fn example(&self, key: Option<&str>) -> Option<&JsonValue> {
        self.examples.select(key)
    }
}

/// A (path template, method) pair with its ordered responses
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub template: PathTemplate,
    pub method: String,
    pub responses: Vec<Response>,
}

impl Route {
    pub fn new(path: &str, method: &str, responses: Vec<Response>) -> Self {
        Self {
            template: PathTemplate::parse(path),
            method: method.to_ascii_uppercase(),
            responses,
        }
    }
}

/// Immutable route model, built once at startup
#[derive(Debug, Clone, Default)]
pub struct Api {
    routes: Vec<Route>,
}

impl Api {
    /// Build the model, rejecting routes that break its invariants
    pub fn new(routes: Vec<Route>) -> Result<Self, ModelError> {
        let mut seen = HashSet::new();

        for route in &routes {
            let path = route.template.to_string();

            if !METHODS.contains(&route.method.as_str()) {
                return Err(ModelError::UnsupportedMethod {
                    method: route.method.clone(),
                    path,
                });
            }

            if route.responses.is_empty() {
                return Err(ModelError::NoResponses {
                    method: route.method.clone(),
                    path,
                });
            }

            if let Some(response) = route
                .responses
                .iter()
                .find(|r| !(100..=599).contains(&r.status_code))
            {
                return Err(ModelError::InvalidStatus {
                    status: response.status_code,
                    method: route.method.clone(),
                    path,
                });
            }

            if !seen.insert((&route.template, route.method.as_str())) {
                return Err(ModelError::DuplicateRoute {
                    method: route.method.clone(),
                    path,
                });
            }
        }

        Ok(Self { routes })
    }

    /// Read-only view of every route in declaration order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
