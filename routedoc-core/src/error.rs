//! Error types for routedoc
//!
//! Errors fall into four kinds: configuration errors raised while building a
//! router, resolution errors raised while turning [`Definitions`] into an
//! operation, validation errors from the structural OpenAPI checks, and
//! generation errors raised while serializing the published document.
//!
//! [`Definitions`]: crate::Definitions

use thiserror::Error;

/// Result type alias for routedoc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed source error from a backend adapter
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by routers, builders and publishers
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid construction options
    #[error("fails to validate openapi: {0}")]
    Config(#[from] ConfigError),

    #[error("errors generating request body schema: {0}")]
    RequestBody(#[source] SchemaError),

    #[error("errors generating responses schema: {0}")]
    Responses(#[source] SchemaError),

    #[error("errors generating path parameters schema: {0}")]
    PathParams(#[source] SchemaError),

    #[error("errors generating querystring schema: {0}")]
    Querystring(#[source] SchemaError),

    #[error("errors generating headers schema: {0}")]
    Headers(#[source] SchemaError),

    #[error("errors generating cookies schema: {0}")]
    Cookies(#[source] SchemaError),

    /// Unknown parameter category tag
    #[error("invalid parameter location: {0}")]
    InvalidParameterLocation(String),

    /// Operation or document failed structural validation
    #[error("fails to validate openapi: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization of the published document failed
    #[error("fail to generate openapi: {0}")]
    Generate(#[from] GenerateError),

    /// The method has no slot in an OpenAPI path item
    #[error("unsupported http method: {0}")]
    UnsupportedMethod(String),

    /// The routing backend refused the route
    #[error("backend failed to register route: {0}")]
    Backend(#[source] BoxError),
}

/// Construction-time configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("openapi is required")]
    MissingOpenapi,

    #[error("openapi info is required")]
    MissingInfo,

    #[error("openapi info title is required")]
    MissingTitle,

    #[error("openapi info version is required")]
    MissingVersion,

    #[error("invalid path {0}. Path should start with '/'")]
    InvalidDocumentationPath(String),

    #[error("failed to parse openapi skeleton: {0}")]
    Parse(String),

    #[error("failed to read openapi skeleton: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// Failure turning a schema description into an OpenAPI schema
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid definition {name}: {source}")]
    Definition {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Structural validation failure, with the location it was found at
#[derive(Debug, Error)]
#[error("{location}: {message}")]
pub struct ValidationError {
    pub location: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Publishing failures
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("json marshal: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml marshal: {0}")]
    Yaml(String),
}
