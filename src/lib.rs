//! swag-gen - OpenAPI documents from annotated Go source code.
//!
//! This library scans Go projects for swag-style annotations in the doc comments of handler
//! functions and assembles them into an OpenAPI 3.0 document that can be written as JSON or
//! YAML.
//!
//! # Annotations
//!
//! ```text
//! @Router <path> [<METHOD>]              e.g. @Router /api/users/{id} [GET]
//! @Summary <free text>
//! @Description <free text>
//! @Tags <name>                            (repeatable)
//! @Param <name> <in> <type> <true|false> "<description>"
//! @Success <code> {<kind>} <typeRef> ["<description>"]
//! @Failure <code> {<kind>} <typeRef> ["<description>"]
//! @Deprecated
//! ```
//!
//! A comment block without `@Router` is not an endpoint and is ignored.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Finds Go files and processes them on a bounded pool of worker threads
//! 2. [`parser`] - Parses a Go file and yields declarations with their doc comments
//! 3. [`annotation`] - Turns a comment block into an [`endpoint::Endpoint`]
//! 4. [`openapi_builder`] - Merges endpoints into the OpenAPI document
//! 5. [`schema_generator`] - Maps Go type names and struct declarations to schemas
//! 6. [`serializer`] - Writes the document as JSON or YAML
//! 7. [`config`] - YAML configuration for the generator
//!
//! # Example Usage
//!
//! ```no_run
//! use swag_gen::{
//!     openapi_builder::OpenApiBuilder,
//!     scanner::ProjectScanner,
//!     serializer::serialize_yaml,
//! };
//! use std::path::PathBuf;
//!
//! let report = ProjectScanner::new(PathBuf::from("./api"))
//!     .with_max_concurrent(8)
//!     .scan_project()
//!     .unwrap();
//!
//! let mut builder = OpenApiBuilder::new("User Service", "1.0.0", None);
//! for endpoint in &report.endpoints {
//!     builder.add_endpoint(endpoint).unwrap();
//! }
//!
//! println!("{}", serialize_yaml(builder.build()).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod annotation;
pub mod cli;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod openapi_builder;
pub mod parser;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
