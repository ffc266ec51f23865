//! The contract between the router facade and a concrete HTTP router

use bytes::Bytes;
use http::Method;

/// A concrete router the facade can register routes on.
///
/// Implementations wrap a shared handle to the underlying router, so
/// registering through `&self` is visible to every clone of the handle.
pub trait Backend {
    /// Request handler accepted by the underlying router
    type Handler;
    /// Whatever the underlying router returns for a registered route
    type Route;
    /// Registration failure
    type Error: std::error::Error + Send + Sync + 'static;

    /// Register `handler` for `method` on `path`. The path is already in the
    /// router's native syntax.
    fn add_route(
        &self,
        method: &Method,
        path: &str,
        handler: Self::Handler,
    ) -> Result<Self::Route, Self::Error>;

    /// A handler that answers every request with `blob` and the given
    /// `Content-Type`.
    fn swagger_handler(&self, content_type: &'static str, blob: Bytes) -> Self::Handler;

    /// Rewrite a native path template into the brace style used by OpenAPI.
    fn transform_path_to_oas_path(&self, path: &str) -> String;
}
