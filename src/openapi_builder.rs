use crate::endpoint::{Endpoint, HttpMethod};
use crate::error::{Error, Result};
use crate::schema_generator::Schema;
use crate::serializer;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OpenAPI version written into every generated document
pub const OPENAPI_VERSION: &str = "3.0.0";

/// OpenAPI document builder
///
/// Endpoints are merged into the document one at a time. The builder is not synchronized;
/// feed it from a single thread once scanning has finished.
#[derive(Debug, Clone)]
pub struct OpenApiBuilder {
    document: OpenApiDocument,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    /// The operation slot for `method`
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }

    fn slot_mut(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Trace => &mut self.trace,
        }
    }

    /// Methods with an operation set, in canonical order
    pub fn methods(&self) -> Vec<HttpMethod> {
        HttpMethod::ALL
            .into_iter()
            .filter(|m| self.operation(*m).is_some())
            .collect()
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Responses keyed by status code
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header, body)
    #[serde(rename = "in")]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter is required
    #[serde(default)]
    pub required: bool,
    /// Parameter schema; `type` carries the annotation's raw type name
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Schema definitions
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Schema>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Tag object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    /// API paths
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// Tags used by any endpoint, first-seen order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl OpenApiBuilder {
    /// Create a builder holding an empty document
    pub fn new(
        title: impl Into<String>,
        version: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            document: OpenApiDocument {
                openapi: OPENAPI_VERSION.to_string(),
                info: Info {
                    title: title.into(),
                    version: version.into(),
                    description,
                },
                paths: BTreeMap::new(),
                components: Components::default(),
                servers: Vec::new(),
                tags: Vec::new(),
            },
        }
    }

    /// Replace the info section
    pub fn set_info(
        &mut self,
        title: impl Into<String>,
        version: impl Into<String>,
        description: Option<String>,
    ) {
        self.document.info = Info {
            title: title.into(),
            version: version.into(),
            description,
        };
    }

    /// Append a server entry
    pub fn add_server(&mut self, url: impl Into<String>, description: Option<String>) {
        self.document.servers.push(Server {
            url: url.into(),
            description,
        });
    }

    /// Merge an endpoint into the document.
    ///
    /// The endpoint's operation goes into the verb slot of the path item for its path; other
    /// verbs already registered on the same path are kept. A second endpoint for the same
    /// path and method replaces the first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] for a missing endpoint or an empty path or method,
    /// and [`Error::UnsupportedMethod`] for a method outside the supported verb set. The
    /// document is left untouched on error.
    pub fn add_endpoint<'a>(&mut self, endpoint: impl Into<Option<&'a Endpoint>>) -> Result<()> {
        let endpoint = endpoint
            .into()
            .ok_or_else(|| Error::InvalidEndpoint("endpoint cannot be nil".to_string()))?;

        if endpoint.path.is_empty() {
            return Err(Error::InvalidEndpoint(
                "endpoint path cannot be empty".to_string(),
            ));
        }
        if endpoint.method.is_empty() {
            return Err(Error::InvalidEndpoint(
                "endpoint method cannot be empty".to_string(),
            ));
        }
        let method = HttpMethod::from_name(&endpoint.method)
            .ok_or_else(|| Error::UnsupportedMethod(endpoint.method.clone()))?;

        debug!("Adding endpoint: {} {}", method, endpoint.path);

        let operation = Operation {
            summary: endpoint.summary.clone(),
            description: endpoint.description.clone(),
            tags: endpoint.tags.clone(),
            parameters: endpoint
                .parameters
                .iter()
                .map(|p| Parameter {
                    name: p.name.clone(),
                    location: p.location.as_str().to_string(),
                    description: (!p.description.is_empty()).then(|| p.description.clone()),
                    required: p.required,
                    schema: Schema::typed(&p.type_name),
                })
                .collect(),
            responses: endpoint
                .responses
                .iter()
                .map(|(code, r)| {
                    (
                        code.clone(),
                        Response {
                            description: r.description.clone(),
                        },
                    )
                })
                .collect(),
            deprecated: endpoint.deprecated,
        };

        let path_item = self.document.paths.entry(endpoint.path.clone()).or_default();
        let slot = path_item.slot_mut(method);
        if slot.is_some() {
            warn!(
                "Duplicate endpoint {} {} ({}:{}) replaces an earlier definition",
                method,
                endpoint.path,
                endpoint.source_file.display(),
                endpoint.source_line
            );
        }
        *slot = Some(operation);

        for tag in &endpoint.tags {
            if !self.document.tags.iter().any(|t| &t.name == tag) {
                self.document.tags.push(Tag {
                    name: tag.clone(),
                    description: None,
                });
            }
        }

        Ok(())
    }

    /// Register a reusable schema under `components.schemas`, replacing any previous one
    pub fn add_schema(&mut self, name: &str, schema: impl Into<Option<Schema>>) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSchema("schema name cannot be empty".to_string()));
        }
        let schema = schema
            .into()
            .ok_or_else(|| Error::InvalidSchema("schema cannot be nil".to_string()))?;

        debug!("Adding schema: {}", name);
        self.document
            .components
            .schemas
            .insert(name.to_string(), schema);
        Ok(())
    }

    /// The document built so far
    pub fn build(&self) -> &OpenApiDocument {
        &self.document
    }

    /// Consume the builder, returning the document
    pub fn into_document(self) -> OpenApiDocument {
        self.document
    }

    /// Serialize the document built so far as JSON
    pub fn to_json(&self) -> Result<String> {
        serializer::serialize_json(&self.document)
    }

    /// Serialize the document built so far as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serializer::serialize_yaml(&self.document)
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new("Generated API", "1.0.0", None)
    }
}
