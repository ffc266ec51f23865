//! Declarative description of a route
//!
//! [`Definitions`] is what callers hand to [`Router::add_route`]; it is
//! consumed once and compiled into an [`Operation`].
//!
//! [`Router::add_route`]: crate::Router::add_route
//! [`Operation`]: crate::spec::Operation

use crate::reflect::SchemaValue;
use crate::spec::SecurityRequirement;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Content type to schema description
pub type Content = BTreeMap<String, SchemaValue>;

/// Parameter name to parameter description
pub type ParameterValue = HashMap<String, Parameter>;

/// A single parameter: either a content map or a schema. When both are set
/// the content map is used and the schema is ignored.
#[derive(Debug, Clone, Default)]
pub struct Parameter {
    pub content: Option<Content>,
    pub schema: Option<SchemaValue>,
    pub description: Option<String>,
}

impl Parameter {
    pub fn schema(schema: SchemaValue) -> Self {
        Self {
            schema: Some(schema),
            ..Default::default()
        }
    }

    pub fn content(content: Content) -> Self {
        Self {
            content: Some(content),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A body or response: content map plus description
#[derive(Debug, Clone, Default)]
pub struct ContentValue {
    pub content: Content,
    pub description: Option<String>,
}

impl ContentValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single `application/json` entry.
    pub fn json(schema: SchemaValue) -> Self {
        Self::new().with_content("application/json", schema)
    }

    pub fn with_content(mut self, content_type: impl Into<String>, schema: SchemaValue) -> Self {
        self.content.insert(content_type.into(), schema);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Everything a route declares about itself
///
/// # Examples
///
/// ```
/// use routedoc_core::{ContentValue, Definitions, Parameter, SchemaValue};
///
/// let definitions = Definitions::new()
///     .summary("Fetch a user")
///     .tag("users")
///     .path_param("id", Parameter::schema(SchemaValue::of::<u64>()))
///     .query("verbose", Parameter::schema(SchemaValue::of::<bool>()))
///     .response(200, ContentValue::json(SchemaValue::of::<String>()).with_description("ok"));
///
/// assert_eq!(definitions.path_params.len(), 1);
/// assert_eq!(definitions.responses.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    pub path_params: ParameterValue,
    pub querystring: ParameterValue,
    pub headers: ParameterValue,
    pub cookies: ParameterValue,
    pub request_body: Option<ContentValue>,
    pub responses: HashMap<u16, ContentValue>,
    pub security: Vec<SecurityRequirement>,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    pub deprecated: bool,
    pub extensions: BTreeMap<String, Value>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path_param(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        self.path_params.insert(name.into(), parameter);
        self
    }

    pub fn query(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        self.querystring.insert(name.into(), parameter);
        self
    }

    pub fn header(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        self.headers.insert(name.into(), parameter);
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        self.cookies.insert(name.into(), parameter);
        self
    }

    pub fn request_body(mut self, body: ContentValue) -> Self {
        self.request_body = Some(body);
        self
    }

    pub fn response(mut self, status: u16, response: ContentValue) -> Self {
        self.responses.insert(status, response);
        self
    }

    pub fn security(mut self, requirement: SecurityRequirement) -> Self {
        self.security.push(requirement);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    /// Add a specification extension; the key should start with `x-`.
    pub fn extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }
}
