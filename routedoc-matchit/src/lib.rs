//! Brace-style router backend for routedoc
//!
//! Routes are matched with [`matchit`], whose templates (`/users/{id}`)
//! already use the OpenAPI syntax, so path translation is the identity.
//! Requests and responses are plain [`http`] types with [`Bytes`] bodies.
//!
//! ```
//! use bytes::Bytes;
//! use http::{Method, Request, Response};
//! use routedoc_core::{Definitions, Document, Options, Router};
//! use routedoc_matchit::{handler, MatchitRouter, PathParams};
//!
//! # tokio_test::block_on(async {
//! let backend = MatchitRouter::new();
//! let router = Router::new(backend.clone(), Options::new(Document::new("pets", "1.0.0"))).unwrap();
//!
//! router
//!     .add_route(
//!         Method::GET,
//!         "/pets/{id}",
//!         handler(|req: Request<Bytes>| async move {
//!             let id = req
//!                 .extensions()
//!                 .get::<PathParams>()
//!                 .and_then(|params| params.get("id"))
//!                 .unwrap_or_default()
//!                 .to_string();
//!             Response::new(Bytes::from(id))
//!         }),
//!         Definitions::new(),
//!     )
//!     .unwrap();
//!
//! let request = Request::get("/pets/7").body(Bytes::new()).unwrap();
//! let response = backend.call(request).await;
//! assert_eq!(response.body(), &Bytes::from_static(b"7"));
//! # });
//! ```

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderValue, Method, Request, Response, StatusCode};
use parking_lot::RwLock;
use routedoc_core::Backend;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Registration errors
#[derive(Debug, Error)]
pub enum MatchitError {
    /// The template is malformed or conflicts with a registered one
    #[error("invalid route: {0}")]
    Insert(#[from] matchit::InsertError),
}

/// Boxed response future
pub type ResponseFuture = Pin<Box<dyn Future<Output = Response<Bytes>> + Send>>;

/// A request handler
pub type Handler = Arc<dyn Fn(Request<Bytes>) -> ResponseFuture + Send + Sync>;

/// Wrap an async function as a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Request<Bytes>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response<Bytes>> + Send + 'static,
{
    Arc::new(move |request| Box::pin(f(request)))
}

/// Path parameters of the matched route, stored as a request extension
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(pub Vec<(String, String)>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Handle returned for a registered route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteHandle {
    pub method: Method,
    pub path: String,
}

struct Table {
    matcher: matchit::Router<usize>,
    slots: Vec<HashMap<Method, Handler>>,
    index: HashMap<String, usize>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            matcher: matchit::Router::new(),
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl Table {
    fn insert(&mut self, method: &Method, path: &str, handler: Handler) -> Result<bool, MatchitError> {
        let slot = match self.index.get(path) {
            Some(slot) => *slot,
            None => {
                let slot = self.slots.len();
                self.matcher.insert(path, slot)?;
                self.slots.push(HashMap::new());
                self.index.insert(path.to_string(), slot);
                slot
            }
        };
        let handlers = &mut self.slots[slot];
        Ok(handlers.insert(method.clone(), handler).is_some())
    }

    fn lookup(&self, method: &Method, path: &str) -> Result<(Handler, PathParams), Response<Bytes>> {
        let Ok(matched) = self.matcher.at(path) else {
            return Err(status(StatusCode::NOT_FOUND));
        };
        let Some(handlers) = self.slots.get(*matched.value) else {
            return Err(status(StatusCode::NOT_FOUND));
        };
        let Some(handler) = handlers.get(method) else {
            let mut allowed: Vec<&str> = handlers.keys().map(Method::as_str).collect();
            allowed.sort_unstable();
            let mut response = status(StatusCode::METHOD_NOT_ALLOWED);
            if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
                response.headers_mut().insert(ALLOW, value);
            }
            return Err(response);
        };
        let params = matched
            .params
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Ok((handler.clone(), PathParams(params)))
    }
}

fn status(code: StatusCode) -> Response<Bytes> {
    let mut response = Response::new(Bytes::new());
    *response.status_mut() = code;
    response
}

/// Shared handle over a matchit route table
#[derive(Clone, Default)]
pub struct MatchitRouter {
    table: Arc<RwLock<Table>>,
}

impl fmt::Debug for MatchitRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchitRouter")
            .field("paths", &self.table.read().index.len())
            .finish()
    }
}

impl MatchitRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch a request. Unknown paths answer 404, known paths without a
    /// handler for the method answer 405 with an `Allow` header.
    pub async fn call(&self, mut request: Request<Bytes>) -> Response<Bytes> {
        let found = self.table.read().lookup(request.method(), request.uri().path());
        match found {
            Ok((handler, params)) => {
                request.extensions_mut().insert(params);
                handler(request).await
            }
            Err(response) => response,
        }
    }
}

impl Backend for MatchitRouter {
    type Handler = Handler;
    type Route = RouteHandle;
    type Error = MatchitError;

    fn add_route(
        &self,
        method: &Method,
        path: &str,
        handler: Handler,
    ) -> Result<RouteHandle, MatchitError> {
        if self.table.write().insert(method, path, handler)? {
            tracing::debug!(method = %method, path, "handler replaced");
        }
        Ok(RouteHandle {
            method: method.clone(),
            path: path.to_string(),
        })
    }

    fn swagger_handler(&self, content_type: &'static str, blob: Bytes) -> Handler {
        handler(move |_request| {
            let mut response = Response::new(blob.clone());
            if let Ok(value) = HeaderValue::from_str(content_type) {
                response.headers_mut().insert(CONTENT_TYPE, value);
            }
            async move { response }
        })
    }

    fn transform_path_to_oas_path(&self, path: &str) -> String {
        path.to_string()
    }
}
