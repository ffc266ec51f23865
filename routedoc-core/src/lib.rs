//! Route declaration with a derived OpenAPI document
//!
//! Routes are declared once, with a backend-agnostic description of their
//! parameters, bodies and responses. Each declaration registers the handler
//! on a concrete HTTP router and adds an operation to a shared OpenAPI 3.0
//! document, which can then be validated and served as JSON and YAML.
//!
//! ## Features
//!
//! - **Backend agnostic** - any router implementing [`Backend`]
//! - **Typed schemas** - request and response schemas reflected from Rust
//!   types through `schemars`
//! - **Deterministic output** - parameters and maps are sorted, so documents
//!   are byte-stable across runs
//! - **Sub-routers** - prefixed routers over other backends sharing one
//!   document
//!
//! ## Building an operation
//!
//! ```
//! use routedoc_core::{ContentValue, Definitions, OperationBuilder, Parameter, SchemaValue};
//!
//! let definitions = Definitions::new()
//!     .summary("Find pets")
//!     .query("limit", Parameter::schema(SchemaValue::of::<u32>()))
//!     .response(200, ContentValue::json(SchemaValue::of::<Vec<String>>()));
//!
//! let built = OperationBuilder::new("/pets/{kind}").build(definitions).unwrap();
//! let names: Vec<_> = built.operation.parameters.iter().map(|p| p.name.as_str()).collect();
//! assert_eq!(names, ["kind", "limit"]);
//! assert_eq!(built.operation.responses["200"].description, "");
//! ```
//!
//! ## Path templates
//!
//! ```
//! use routedoc_core::path::{join_paths, transform_path_params_with_colon};
//!
//! assert_eq!(transform_path_params_with_colon("/users/:id/"), "/users/{id}/");
//! assert_eq!(join_paths("/api/", "/users"), "/api/users");
//! ```

pub mod backend;
pub mod definitions;
pub mod error;
pub mod logging;
pub mod operation;
pub mod path;
pub mod publish;
pub mod reflect;
pub mod router;
pub mod schema;
pub mod spec;
pub mod validate;

pub use backend::Backend;
pub use definitions::{Content, ContentValue, Definitions, Parameter, ParameterValue};
pub use error::{BoxError, ConfigError, Error, GenerateError, Result, SchemaError, ValidationError};
pub use operation::{BuiltOperation, OperationBuilder};
pub use publish::{json_to_yaml, JSON_CONTENT_TYPE, YAML_CONTENT_TYPE};
pub use reflect::{SchemaSource, SchemaValue};
pub use router::{
    Options, Router, SubRouterOptions, DEFAULT_JSON_DOCUMENTATION_PATH,
    DEFAULT_YAML_DOCUMENTATION_PATH,
};
pub use schema::SchemaResolver;
pub use spec::{
    Components, Document, Info, Operation, ParameterLocation, PathItem, Schema,
    SecurityRequirement, SecurityScheme, DEFAULT_OPENAPI_VERSION,
};
pub use validate::ValidationContext;

// Re-exported for backends and for implementing `schemars::JsonSchema`.
pub use bytes;
pub use http;
pub use schemars;
