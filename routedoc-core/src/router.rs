//! Router facade
//!
//! A [`Router`] pairs a [`Backend`] with a shared OpenAPI [`Document`].
//! Every route registered through it lands on the backend and is described
//! in the document; sub-routers write into the same document.

use crate::backend::Backend;
use crate::definitions::Definitions;
use crate::error::{ConfigError, Error, Result};
use crate::operation::{BuiltOperation, OperationBuilder};
use crate::path::join_paths;
use crate::spec::{Document, Operation, PathItem, Schema, DEFAULT_OPENAPI_VERSION};
use crate::validate::ValidationContext;
use http::Method;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Path of the JSON documentation route unless configured otherwise
pub const DEFAULT_JSON_DOCUMENTATION_PATH: &str = "/documentation/json";

/// Path of the YAML documentation route unless configured otherwise
pub const DEFAULT_YAML_DOCUMENTATION_PATH: &str = "/documentation/yaml";

/// Router construction options
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Validation settings; all checks enabled when unset
    pub context: Option<ValidationContext>,
    /// Document skeleton; `info.title` and `info.version` are required
    pub openapi: Option<Document>,
    /// Defaults to [`DEFAULT_JSON_DOCUMENTATION_PATH`]
    pub json_documentation_path: Option<String>,
    /// Defaults to [`DEFAULT_YAML_DOCUMENTATION_PATH`]
    pub yaml_documentation_path: Option<String>,
    /// Prepended to every registered path
    pub path_prefix: Option<String>,
}

impl Options {
    pub fn new(openapi: Document) -> Self {
        Self {
            openapi: Some(openapi),
            ..Default::default()
        }
    }

    pub fn context(mut self, context: ValidationContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn json_documentation_path(mut self, path: impl Into<String>) -> Self {
        self.json_documentation_path = Some(path.into());
        self
    }

    pub fn yaml_documentation_path(mut self, path: impl Into<String>) -> Self {
        self.yaml_documentation_path = Some(path.into());
        self
    }

    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }
}

/// Options for [`Router::sub_router`]
#[derive(Debug, Clone, Default)]
pub struct SubRouterOptions {
    pub path_prefix: String,
}

impl SubRouterOptions {
    pub fn new(path_prefix: impl Into<String>) -> Self {
        Self {
            path_prefix: path_prefix.into(),
        }
    }
}

/// Registers routes on a backend and describes them in a shared document.
///
/// # Examples
///
/// ```ignore
/// use http::Method;
/// use routedoc_core::{Definitions, Document, Options, Router};
///
/// let router = Router::new(backend, Options::new(Document::new("pets", "1.0.0")))?;
/// router.add_route(Method::GET, "/pets/{id}", handler, Definitions::new())?;
/// router.generate_and_expose_openapi()?;
/// ```
#[derive(Debug, Clone)]
pub struct Router<B> {
    pub(crate) backend: B,
    pub(crate) document: Arc<RwLock<Document>>,
    pub(crate) context: ValidationContext,
    pub(crate) json_documentation_path: String,
    pub(crate) yaml_documentation_path: String,
    pub(crate) path_prefix: String,
}

impl<B: Backend> Router<B> {
    /// Create a router over `backend`.
    ///
    /// Fails when the document skeleton is missing or incomplete, or when a
    /// documentation path does not start with `/`.
    pub fn new(backend: B, options: Options) -> Result<Self> {
        let mut openapi = options.openapi.ok_or(ConfigError::MissingOpenapi)?;
        if openapi.info.title.is_empty() {
            return Err(ConfigError::MissingTitle.into());
        }
        if openapi.info.version.is_empty() {
            return Err(ConfigError::MissingVersion.into());
        }
        if openapi.openapi.is_empty() {
            openapi.openapi = DEFAULT_OPENAPI_VERSION.to_string();
        }

        let json_documentation_path = documentation_path(
            options.json_documentation_path,
            DEFAULT_JSON_DOCUMENTATION_PATH,
        )?;
        let yaml_documentation_path = documentation_path(
            options.yaml_documentation_path,
            DEFAULT_YAML_DOCUMENTATION_PATH,
        )?;

        Ok(Self {
            backend,
            document: Arc::new(RwLock::new(openapi)),
            context: options.context.unwrap_or_default(),
            json_documentation_path,
            yaml_documentation_path,
            path_prefix: options.path_prefix.unwrap_or_default(),
        })
    }

    /// Build an operation from `definitions` and register the route.
    ///
    /// Nothing is registered when any part of the definitions fails to
    /// resolve.
    pub fn add_route(
        &self,
        method: Method,
        path: &str,
        handler: B::Handler,
        definitions: Definitions,
    ) -> Result<B::Route> {
        let (_, canonical) = self.resolve_path(path);
        let BuiltOperation {
            operation,
            components,
        } = OperationBuilder::new(&canonical).build(definitions)?;

        self.context.validate_operation(&operation)?;
        self.register(method, path, handler, operation, components)
    }

    /// Register a route with a ready-made operation, or with an operation
    /// holding only the default response when `operation` is `None`.
    pub fn add_raw_route(
        &self,
        method: Method,
        path: &str,
        handler: B::Handler,
        operation: Option<Operation>,
    ) -> Result<B::Route> {
        let operation = match operation {
            Some(operation) => {
                self.context.validate_operation(&operation)?;
                operation
            }
            None => Operation::with_default_response(),
        };
        self.register(method, path, handler, operation, BTreeMap::new())
    }

    /// A router over `backend` sharing this router's document, validation
    /// settings and documentation paths, with its own path prefix.
    pub fn sub_router<B2: Backend>(&self, backend: B2, options: SubRouterOptions) -> Router<B2> {
        Router {
            backend,
            document: Arc::clone(&self.document),
            context: self.context,
            json_documentation_path: self.json_documentation_path.clone(),
            yaml_documentation_path: self.yaml_documentation_path.clone(),
            path_prefix: options.path_prefix,
        }
    }

    /// Joined native path and its canonical form.
    fn resolve_path(&self, path: &str) -> (String, String) {
        let joined = join_paths(&self.path_prefix, path);
        let canonical = self.backend.transform_path_to_oas_path(&joined);
        (joined, canonical)
    }

    /// The backend goes first so a rejected route never reaches the
    /// document.
    fn register(
        &self,
        method: Method,
        path: &str,
        handler: B::Handler,
        operation: Operation,
        components: BTreeMap<String, Schema>,
    ) -> Result<B::Route> {
        if !PathItem::supports(&method) {
            return Err(Error::UnsupportedMethod(method.to_string()));
        }
        let (joined, canonical) = self.resolve_path(path);

        let route = self
            .backend
            .add_route(&method, &joined, handler)
            .map_err(|err| Error::Backend(Box::new(err)))?;

        {
            let mut document = self.document.write();
            let replaced = document
                .paths
                .entry(canonical.clone())
                .or_default()
                .set_operation(&method, operation)?;
            if replaced.is_some() {
                tracing::warn!(
                    method = %method,
                    path = %canonical,
                    "operation already registered, replacing it"
                );
            }
            if !components.is_empty() {
                document.components_mut().schemas.extend(components);
            }
        }

        tracing::debug!(method = %method, path = %joined, canonical = %canonical, "route registered");
        Ok(route)
    }
}

impl<B> Router<B> {
    /// Snapshot of the shared document.
    pub fn document(&self) -> Document {
        self.document.read().clone()
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    pub fn json_documentation_path(&self) -> &str {
        &self.json_documentation_path
    }

    pub fn yaml_documentation_path(&self) -> &str {
        &self.yaml_documentation_path
    }

    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

fn documentation_path(custom: Option<String>, default: &str) -> std::result::Result<String, ConfigError> {
    match custom {
        None => Ok(default.to_string()),
        Some(path) if path.is_empty() => Ok(default.to_string()),
        Some(path) if path.starts_with('/') => Ok(path),
        Some(path) => Err(ConfigError::InvalidDocumentationPath(path)),
    }
}
