// Routing system for colon-style path templates

use crate::{ColonError, HttpMethod, HttpRequest, HttpResponse};
use parking_lot::RwLock;
use routedoc_core::bytes::Bytes;
use routedoc_core::http::Method;
use routedoc_core::path::transform_path_params_with_colon;
use routedoc_core::Backend;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A route handler function type
pub type HandlerFn = Arc<
    dyn Fn(HttpRequest) -> Pin<Box<dyn Future<Output = Result<HttpResponse, ColonError>> + Send>>
        + Send
        + Sync,
>;

/// Wrap an async function as a [`HandlerFn`].
pub fn handler<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, ColonError>> + Send + 'static,
{
    Arc::new(move |request| Box::pin(f(request)))
}

/// Route definition with handler
#[derive(Clone)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    pub handler: HandlerFn,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Routes in registration order
#[derive(Debug, Default)]
pub struct RouteTable {
    pub routes: Vec<Route>,
}

impl RouteTable {
    /// Add a route, replacing the handler of an identical (method, path).
    pub fn insert(&mut self, route: Route) -> bool {
        if let Some(existing) = self
            .routes
            .iter_mut()
            .find(|r| r.method == route.method && r.path == route.path)
        {
            existing.handler = route.handler;
            return true;
        }
        self.routes.push(route);
        false
    }

    /// The handler for a request, or the error describing why there is none.
    fn lookup(
        &self,
        method: &str,
        path: &str,
    ) -> Result<(HandlerFn, HashMap<String, String>), ColonError> {
        let mut path_matched = false;
        for route in &self.routes {
            let Some(params) = match_path(&route.path, path) else {
                continue;
            };
            if route.method.as_str() == method {
                return Ok((route.handler.clone(), params));
            }
            path_matched = true;
        }
        if path_matched {
            Err(ColonError::MethodNotAllowed(format!("{method} {path}")))
        } else {
            Err(ColonError::RouteNotFound(format!("{method} {path}")))
        }
    }
}

/// Shared handle over a colon-style route table
///
/// Clones share the same table, so a handle given to a documentation router
/// and the one serving requests see the same routes.
#[derive(Debug, Clone, Default)]
pub struct ColonRouter {
    table: Arc<RwLock<RouteTable>>,
}

impl ColonRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.read().routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the matching route and run its handler
    pub async fn route(&self, mut request: HttpRequest) -> Result<HttpResponse, ColonError> {
        let (path, query_string) = match request.path.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (request.path.clone(), None),
        };
        if let Some(query) = query_string {
            request.query_params = parse_query_string(&query);
        }

        let (handler, params) = self
            .table
            .read()
            .lookup(&request.method.to_uppercase(), &path)?;
        request.path_params = params;
        handler(request).await
    }

    /// Like [`ColonRouter::route`], with failures turned into responses.
    pub async fn handle(&self, request: HttpRequest) -> HttpResponse {
        match self.route(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, "request failed");
                HttpResponse::from_error(&err)
            }
        }
    }
}

impl Backend for ColonRouter {
    type Handler = HandlerFn;
    type Route = Route;
    type Error = ColonError;

    fn add_route(&self, method: &Method, path: &str, handler: HandlerFn) -> Result<Route, ColonError> {
        let method = HttpMethod::from_http(method)
            .ok_or_else(|| ColonError::UnsupportedMethod(method.to_string()))?;
        let route = Route {
            method,
            path: path.to_string(),
            handler,
        };
        if self.table.write().insert(route.clone()) {
            tracing::debug!(method = method.as_str(), path, "handler replaced");
        }
        Ok(route)
    }

    fn swagger_handler(&self, content_type: &'static str, blob: Bytes) -> HandlerFn {
        handler(move |_request| {
            let body = blob.clone();
            async move {
                Ok(HttpResponse::ok()
                    .with_header("Content-Type", content_type)
                    .with_body(body.to_vec()))
            }
        })
    }

    fn transform_path_to_oas_path(&self, path: &str) -> String {
        transform_path_params_with_colon(path)
    }
}

/// Match a route path pattern against a request path
/// Returns Some(params) if matched, None otherwise
fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(param_name) = pattern_part.strip_prefix(':') {
            params.insert(param_name.to_string(), decode(path_part));
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}

/// Parse a query string into a map of parameters
fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(raw)
}
