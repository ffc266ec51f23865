//! Colon-style router backend for routedoc
//!
//! An in-process async router whose path templates use `:name` segments
//! (`/users/:id`). Paths are translated to the brace style (`/users/{id}`)
//! when they are written into the OpenAPI document.
//!
//! ```
//! use routedoc_colon::{handler, ColonRouter, HttpRequest, HttpResponse};
//! use routedoc_core::http::Method;
//! use routedoc_core::{Definitions, Document, Options, Router};
//!
//! # tokio_test::block_on(async {
//! let backend = ColonRouter::new();
//! let router = Router::new(backend.clone(), Options::new(Document::new("pets", "1.0.0"))).unwrap();
//!
//! router
//!     .add_route(
//!         Method::GET,
//!         "/pets/:id",
//!         handler(|req: HttpRequest| async move {
//!             let id = req.param("id").cloned().unwrap_or_default();
//!             Ok(HttpResponse::ok().with_body(id.into_bytes()))
//!         }),
//!         Definitions::new(),
//!     )
//!     .unwrap();
//!
//! assert!(router.document().paths.contains_key("/pets/{id}"));
//! let response = backend.handle(HttpRequest::get("/pets/7")).await;
//! assert_eq!(response.body, b"7".to_vec());
//! # });
//! ```

pub mod error;
pub mod http;
pub mod routing;

pub use error::ColonError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use routing::{handler, ColonRouter, HandlerFn, Route, RouteTable};
