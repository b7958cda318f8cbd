//! Parsing of swag-style annotation tags in Go doc comments.
//!
//! Every recognised tag has its own recognizer function returning an optional match, and
//! [`AnnotationParser::parse_endpoint`] folds the matches of one comment block into an
//! [`Endpoint`]. Blocks without a `@Router` tag are not endpoints and yield `None`.

use crate::endpoint::{Endpoint, Parameter, ParameterLocation, Response};
use crate::error::{Error, Result};
use crate::schema_generator::{Schema, SchemaGenerator};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

static ROUTER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@Router\s+(\S+)\s+\[(\w+)\]").expect("valid router regex"));

static PARAM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^@Param\s+(\S+)\s+(\w+)\s+(\S+)\s+(true|false)\s+"([^"]*)""#)
        .expect("valid param regex")
});

static RESPONSE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^@(Success|Failure)\s+(\d+)\s+\{(\w+)\}\s+(\S+)(?:\s+"([^"]*)")?"#)
        .expect("valid response regex")
});

const DEPRECATED_MARKER: &str = "@Deprecated";

/// Every annotation tag the parser understands.
pub const SUPPORTED_TAGS: [&str; 8] = [
    "@Router",
    "@Summary",
    "@Description",
    "@Tags",
    "@Param",
    "@Success",
    "@Failure",
    "@Deprecated",
];

/// A matched `@Router <path> [<METHOD>]` line.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTag {
    pub path: String,
    /// Uppercased method token
    pub method: String,
}

/// Which response tag matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Success,
    Failure,
}

impl ResponseKind {
    fn default_description(self) -> &'static str {
        match self {
            Self::Success => "Success response",
            Self::Failure => "Failure response",
        }
    }
}

/// A matched `@Success`/`@Failure` line.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseTag {
    pub kind: ResponseKind,
    pub status_code: String,
    /// The word between braces, e.g. `object` or `array`
    pub wrapper: String,
    pub type_name: String,
    pub description: Option<String>,
}

/// Strip a leading `//` (if still present) and surrounding whitespace.
fn normalize(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix("//").unwrap_or(line).trim()
}

/// Recognize a `@Router` line.
///
/// Lines that start with `@Router` but do not carry both a path and a bracketed method are
/// logged and ignored.
pub fn parse_router(line: &str) -> Option<RouteTag> {
    let text = normalize(line);
    if !text.starts_with("@Router") {
        return None;
    }

    match ROUTER_REGEX.captures(text) {
        Some(caps) => Some(RouteTag {
            path: caps[1].to_string(),
            method: caps[2].to_uppercase(),
        }),
        None => {
            warn!("Ignoring malformed @Router tag: {}", text);
            None
        }
    }
}

/// Recognize a single-value tag such as `@Summary` and return its trimmed content.
///
/// Returns `None` when the line is a different tag or the content is empty.
pub fn parse_simple_tag(line: &str, tag: &str) -> Option<String> {
    let rest = normalize(line).strip_prefix(tag)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let value = rest.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Recognize a `@Param <name> <in> <type> <required> "<description>"` line.
pub fn parse_param(line: &str) -> Option<Parameter> {
    let text = normalize(line);
    if !text.starts_with("@Param") {
        return None;
    }

    let Some(caps) = PARAM_REGEX.captures(text) else {
        debug!("Ignoring malformed @Param tag: {}", text);
        return None;
    };

    let Some(location) = ParameterLocation::from_name(&caps[2]) else {
        debug!("Ignoring @Param with unknown location '{}': {}", &caps[2], text);
        return None;
    };

    Some(Parameter::new(
        &caps[1],
        location,
        &caps[3],
        &caps[4] == "true",
        &caps[5],
    ))
}

/// Recognize a `@Success` or `@Failure` line.
pub fn parse_response(line: &str) -> Option<ResponseTag> {
    let caps = RESPONSE_REGEX.captures(normalize(line))?;

    let kind = if &caps[1] == "Success" {
        ResponseKind::Success
    } else {
        ResponseKind::Failure
    };

    Some(ResponseTag {
        kind,
        status_code: caps[2].to_string(),
        wrapper: caps[3].to_string(),
        type_name: caps[4].to_string(),
        description: caps.get(5).map(|m| m.as_str().to_string()),
    })
}

/// True if the line carries the deprecation marker
pub fn is_deprecated(line: &str) -> bool {
    line.contains(DEPRECATED_MARKER)
}

/// Check that `text` looks like an annotation tag
pub fn validate_tag(text: &str) -> Result<()> {
    if !text.trim().starts_with('@') {
        return Err(Error::InvalidArgument(format!(
            "tag must start with '@': {}",
            text.trim()
        )));
    }
    Ok(())
}

/// The tags recognised by [`AnnotationParser::parse_endpoint`]
pub fn supported_tags() -> &'static [&'static str] {
    &SUPPORTED_TAGS
}

/// Group every `@Tag value` line by tag name (including the `@`).
///
/// Tags without a value map to an empty string.
pub fn extract_all_tags<S: AsRef<str>>(lines: &[S]) -> BTreeMap<String, Vec<String>> {
    let mut tags: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for line in lines {
        let text = normalize(line.as_ref());
        if !text.starts_with('@') {
            continue;
        }

        let (name, value) = match text.split_once(char::is_whitespace) {
            Some((name, value)) => (name, value.trim()),
            None => (text, ""),
        };
        tags.entry(name.to_string())
            .or_default()
            .push(value.to_string());
    }

    tags
}

/// Every non-empty value of `tag` across the block, in order.
pub fn parse_multiline_tag<S: AsRef<str>>(lines: &[S], tag: &str) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| parse_simple_tag(line.as_ref(), tag))
        .collect()
}

/// Turns comment blocks into endpoint records.
#[derive(Debug, Default)]
pub struct AnnotationParser {
    schemas: SchemaGenerator,
}

impl AnnotationParser {
    /// Create a new AnnotationParser
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one comment block into an endpoint.
    ///
    /// # Arguments
    ///
    /// * `lines` - Comment lines in source order, markers already stripped
    /// * `file` - File the block was found in
    /// * `line` - 1-based line of the declaration the block documents
    ///
    /// # Returns
    ///
    /// `Some(Endpoint)` if the block carries a valid `@Router` tag, `None` otherwise. Lines that
    /// match no recognised tag are ignored.
    pub fn parse_endpoint<S: AsRef<str>>(
        &self,
        lines: &[S],
        file: &Path,
        line: usize,
    ) -> Option<Endpoint> {
        let mut endpoint = Endpoint::default().with_source(file, line);
        let mut has_route = false;

        for raw in lines {
            let text = normalize(raw.as_ref());
            if text.is_empty() {
                continue;
            }

            if let Some(route) = parse_router(text) {
                endpoint.path = route.path;
                endpoint.method = route.method;
                has_route = true;
            } else if let Some(summary) = parse_simple_tag(text, "@Summary") {
                endpoint.summary = Some(summary);
            } else if let Some(description) = parse_simple_tag(text, "@Description") {
                endpoint.description = Some(description);
            } else if let Some(tag) = parse_simple_tag(text, "@Tags") {
                endpoint.tags.push(tag);
            } else if let Some(param) = parse_param(text) {
                endpoint.parameters.push(param);
            } else if let Some(response) = parse_response(text) {
                let response = self.to_response(response);
                endpoint
                    .responses
                    .insert(response.status_code.clone(), response);
            }

            if is_deprecated(text) {
                endpoint.deprecated = true;
            }
        }

        if !has_route {
            return None;
        }

        debug!(
            "Parsed endpoint {} {} from {}:{}",
            endpoint.method,
            endpoint.path,
            file.display(),
            line
        );
        Some(endpoint)
    }

    fn to_response(&self, tag: ResponseTag) -> Response {
        let inner = self.schemas.build_schema(&tag.type_name);
        let schema = if tag.wrapper.eq_ignore_ascii_case("array") {
            Schema::array(inner)
        } else {
            inner
        };

        Response {
            description: tag
                .description
                .unwrap_or_else(|| tag.kind.default_description().to_string()),
            status_code: tag.status_code,
            schema: Some(schema),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(lines: &[&str]) -> Option<Endpoint> {
        AnnotationParser::new().parse_endpoint(lines, Path::new("api/user.go"), 10)
    }

    #[test]
    fn test_router_valid() {
        let route = parse_router("@Router /api/users/{id} [get]").unwrap();
        assert_eq!(route.path, "/api/users/{id}");
        assert_eq!(route.method, "GET");
    }

    #[test]
    fn test_router_malformed() {
        assert_eq!(parse_router("@Router /api/users GET"), None);
        assert_eq!(parse_router("@Router [GET]"), None);
        assert_eq!(parse_router("@Router"), None);
        assert_eq!(parse_router("@Summary /api/users [GET]"), None);
    }

    #[test]
    fn test_simple_tag() {
        assert_eq!(
            parse_simple_tag("@Summary   Get a user  ", "@Summary").as_deref(),
            Some("Get a user")
        );
        assert_eq!(parse_simple_tag("@Summary", "@Summary"), None);
        assert_eq!(parse_simple_tag("@SummaryText here", "@Summary"), None);
        assert_eq!(parse_simple_tag("// @Tags users", "@Tags").as_deref(), Some("users"));
    }

    #[test]
    fn test_param_valid() {
        let param = parse_param(r#"@Param id path int true "User ID""#).unwrap();
        assert_eq!(param, Parameter::new("id", ParameterLocation::Path, "int", true, "User ID"));

        let body = parse_param(r#"@Param user body models.CreateUser false """#).unwrap();
        assert_eq!(body.location, ParameterLocation::Body);
        assert_eq!(body.type_name, "models.CreateUser");
        assert!(!body.required);
    }

    #[test]
    fn test_param_malformed() {
        assert_eq!(parse_param(r#"@Param id path int "User ID""#), None);
        assert_eq!(parse_param(r#"@Param id path int yes "User ID""#), None);
        assert_eq!(parse_param(r#"@Param id cookie int true "User ID""#), None);
        assert_eq!(parse_param("@Param id path int true User ID"), None);
    }

    #[test]
    fn test_response_tags() {
        let ok = parse_response("@Success 200 {object} User").unwrap();
        assert_eq!(ok.kind, ResponseKind::Success);
        assert_eq!(ok.status_code, "200");
        assert_eq!(ok.wrapper, "object");
        assert_eq!(ok.type_name, "User");
        assert_eq!(ok.description, None);

        let err = parse_response(r#"@Failure 404 {object} ErrorResponse "not found""#).unwrap();
        assert_eq!(err.kind, ResponseKind::Failure);
        assert_eq!(err.description.as_deref(), Some("not found"));

        assert_eq!(parse_response("@Success ok {object} User"), None);
        assert_eq!(parse_response("@Success 200 object User"), None);
    }

    #[test]
    fn test_parse_endpoint_full_block() {
        let endpoint = parse(&[
            "GetUser returns a single user.",
            "@Summary Get user",
            "@Description Fetch a user by ID",
            "@Tags users",
            "@Tags admin",
            r#"@Param id path int true "User ID""#,
            "@Success 200 {object} User",
            "@Success 200 {array} User",
            r#"@Failure 404 {object} ErrorResponse "not found""#,
            "@Router /api/users/{id} [GET]",
        ])
        .unwrap();

        assert_eq!(endpoint.method, "GET");
        assert_eq!(endpoint.path, "/api/users/{id}");
        assert_eq!(endpoint.summary.as_deref(), Some("Get user"));
        assert_eq!(endpoint.description.as_deref(), Some("Fetch a user by ID"));
        assert_eq!(endpoint.tags, vec!["users", "admin"]);
        assert_eq!(endpoint.parameters.len(), 1);
        assert_eq!(endpoint.responses.len(), 2);
        assert_eq!(endpoint.source_file, Path::new("api/user.go"));
        assert_eq!(endpoint.source_line, 10);
        assert!(!endpoint.deprecated);

        let ok = &endpoint.responses["200"];
        assert_eq!(ok.description, "Success response");
        assert_eq!(ok.schema, Some(Schema::array(Schema::reference("User"))));

        let missing = &endpoint.responses["404"];
        assert_eq!(missing.description, "not found");
        assert_eq!(missing.schema, Some(Schema::reference("ErrorResponse")));
    }

    #[test]
    fn test_last_summary_wins_and_duplicate_tags_kept() {
        let endpoint = parse(&[
            "@Router /users [post]",
            "@Summary first",
            "@Summary second",
            "@Tags User",
            "@Tags User",
        ])
        .unwrap();

        assert_eq!(endpoint.method, "POST");
        assert_eq!(endpoint.summary.as_deref(), Some("second"));
        assert_eq!(endpoint.tags, vec!["User", "User"]);
    }

    #[test]
    fn test_no_router_yields_none() {
        assert_eq!(parse(&["@Summary Lonely", "@Description nothing", "@Tags x"]), None);
        assert_eq!(parse(&["@Router /users GET", "@Summary broken route"]), None);
        assert_eq!(parse(&[]), None);
    }

    #[test]
    fn test_malformed_tags_do_not_stop_parsing() {
        let endpoint = parse(&[
            "@Param broken",
            "@Router missing brackets",
            "@Router /ok [DELETE]",
            "@Success abc {object} X",
            "@Deprecated",
        ])
        .unwrap();

        assert_eq!(endpoint.method, "DELETE");
        assert!(endpoint.parameters.is_empty());
        assert!(endpoint.responses.is_empty());
        assert!(endpoint.deprecated);
    }

    #[test]
    fn test_extract_all_tags() {
        let tags = extract_all_tags(&[
            "// @Tags users",
            "@Tags admin",
            "@Deprecated",
            "plain prose",
        ]);

        assert_eq!(tags.len(), 2);
        assert_eq!(tags["@Tags"], vec!["users", "admin"]);
        assert_eq!(tags["@Deprecated"], vec![""]);
    }

    #[test]
    fn test_parse_multiline_tag() {
        let values = parse_multiline_tag(
            &["@Description line one", "@Description", "@Description line two"],
            "@Description",
        );
        assert_eq!(values, vec!["line one", "line two"]);
    }

    #[test]
    fn test_validate_and_supported_tags() {
        assert!(validate_tag("@Router /x [GET]").is_ok());
        assert!(validate_tag("Router /x [GET]").is_err());
        assert_eq!(supported_tags().len(), 8);
        assert!(supported_tags().contains(&"@Deprecated"));
    }
}
