//! Endpoint records produced by the annotation parser.
//!
//! An [`Endpoint`] describes one HTTP operation documented by one Go declaration. It is
//! created fresh for every comment block that carries an `@Router` tag and is handed to the
//! [`OpenApiBuilder`](crate::openapi_builder::OpenApiBuilder) exactly once.

use crate::schema_generator::Schema;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Complete information about a single documented API endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Endpoint {
    /// HTTP method as written in the `@Router` tag, uppercased (e.g. "GET")
    pub method: String,
    /// URL path template, may contain `{param}` placeholders
    pub path: String,
    /// Short summary; the last `@Summary` in the block wins
    pub summary: Option<String>,
    /// Long description; the last `@Description` in the block wins
    pub description: Option<String>,
    /// Category names in the order they appeared, duplicates allowed
    pub tags: Vec<String>,
    /// Parameters in declaration order
    pub parameters: Vec<Parameter>,
    /// Responses keyed by status code; a later tag with the same code replaces the earlier one
    pub responses: BTreeMap<String, Response>,
    /// Set when `@Deprecated` appears anywhere in the block
    pub deprecated: bool,
    /// File the declaration was found in
    pub source_file: PathBuf,
    /// 1-based line of the declaration
    pub source_line: usize,
}

impl Endpoint {
    /// Create a new Endpoint with only the routing information set
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Attach provenance information
    pub fn with_source(mut self, file: impl Into<PathBuf>, line: usize) -> Self {
        self.source_file = file.into();
        self.source_line = line;
        self
    }
}

/// Information about a single `@Param` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// The parameter name
    pub name: String,
    /// Where the parameter is carried in the request
    pub location: ParameterLocation,
    /// Raw type name as written in the annotation (e.g. "int", "CreateUserRequest")
    pub type_name: String,
    /// Whether the parameter is required
    pub required: bool,
    /// Free-text description from the quoted part of the tag
    pub description: String,
}

impl Parameter {
    /// Create a new Parameter
    pub fn new(
        name: impl Into<String>,
        location: ParameterLocation,
        type_name: impl Into<String>,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            type_name: type_name.into(),
            required,
            description: description.into(),
        }
    }
}

/// The location where a parameter value is carried in an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    /// Query string parameter (e.g. `?page=1`)
    Query,
    /// Path parameter embedded in the URL (e.g. `/users/{id}`)
    Path,
    /// HTTP header parameter
    Header,
    /// Request body
    Body,
}

impl ParameterLocation {
    /// Parse a location keyword from an annotation, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "query" => Some(Self::Query),
            "path" => Some(Self::Path),
            "header" => Some(Self::Header),
            "body" => Some(Self::Body),
            _ => None,
        }
    }

    /// The lowercase keyword used in OpenAPI documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Path => "path",
            Self::Header => "header",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `@Success` or `@Failure` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code as written (e.g. "200")
    pub status_code: String,
    /// Response description
    pub description: String,
    /// Schema built from the `{kind} TypeName` part of the tag
    pub schema: Option<Schema>,
}

/// HTTP methods accepted by the document builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    /// Every supported method, in the order path items list them
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Trace,
    ];

    /// Look up a method by its exact uppercase name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            "TRACE" => Some(Self::Trace),
            _ => None,
        }
    }

    /// Get the HTTP method as an uppercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_lookup() {
        for method in HttpMethod::ALL {
            assert_eq!(HttpMethod::from_name(method.as_str()), Some(method));
        }
        assert_eq!(HttpMethod::from_name("PATCHX"), None);
        assert_eq!(HttpMethod::from_name("get"), None);
    }

    #[test]
    fn test_parameter_location_lookup() {
        assert_eq!(ParameterLocation::from_name("query"), Some(ParameterLocation::Query));
        assert_eq!(ParameterLocation::from_name("Body"), Some(ParameterLocation::Body));
        assert_eq!(ParameterLocation::from_name("cookie"), None);
        assert_eq!(ParameterLocation::Header.to_string(), "header");
    }

    #[test]
    fn test_endpoint_builder_helpers() {
        let endpoint = Endpoint::new("GET", "/users").with_source("api/user.go", 12);
        assert_eq!(endpoint.method, "GET");
        assert_eq!(endpoint.path, "/users");
        assert_eq!(endpoint.source_file, PathBuf::from("api/user.go"));
        assert_eq!(endpoint.source_line, 12);
        assert!(endpoint.tags.is_empty());
        assert!(!endpoint.deprecated);
    }
}
