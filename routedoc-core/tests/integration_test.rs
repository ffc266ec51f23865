//! Integration tests for routedoc-core

use bytes::Bytes;
use http::Method;
use parking_lot::Mutex;
use routedoc_core::spec::{ApiKeyLocation, RequestBody, Response};
use routedoc_core::*;
use schemars::JsonSchema;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;

// =============================================================================
// Test backend
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Handler {
    Named(&'static str),
    Static(&'static str, Bytes),
}

#[derive(Debug, thiserror::Error)]
#[error("duplicate route {0}")]
struct Duplicate(String);

/// Brace-style backend that refuses duplicate registrations.
#[derive(Debug, Clone, Default)]
struct StrictBackend {
    routes: Arc<Mutex<Vec<(Method, String, Handler)>>>,
}

impl StrictBackend {
    fn handler(&self, method: &Method, path: &str) -> Option<Handler> {
        self.routes
            .lock()
            .iter()
            .find(|(m, p, _)| m == method && p == path)
            .map(|(_, _, h)| h.clone())
    }
}

impl Backend for StrictBackend {
    type Handler = Handler;
    type Route = ();
    type Error = Duplicate;

    fn add_route(
        &self,
        method: &Method,
        path: &str,
        handler: Handler,
    ) -> std::result::Result<(), Duplicate> {
        let mut routes = self.routes.lock();
        if routes.iter().any(|(m, p, _)| m == method && p == path) {
            return Err(Duplicate(format!("{method} {path}")));
        }
        routes.push((method.clone(), path.to_string(), handler));
        Ok(())
    }

    fn swagger_handler(&self, content_type: &'static str, blob: Bytes) -> Handler {
        Handler::Static(content_type, blob)
    }

    fn transform_path_to_oas_path(&self, path: &str) -> String {
        path.to_string()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

#[allow(dead_code)]
#[derive(JsonSchema)]
struct User {
    id: u64,
    name: String,
    email: Option<String>,
}

#[allow(dead_code)]
#[derive(JsonSchema)]
struct CreateUser {
    name: String,
}

#[allow(dead_code)]
#[derive(JsonSchema)]
struct ApiError {
    message: String,
}

fn new_router(backend: StrictBackend) -> Router<StrictBackend> {
    Router::new(backend, Options::new(Document::new("users", "1.0.0"))).unwrap()
}

fn published(backend: &StrictBackend) -> serde_json::Value {
    match backend.handler(&Method::GET, DEFAULT_JSON_DOCUMENTATION_PATH) {
        Some(Handler::Static(_, body)) => serde_json::from_slice(&body).unwrap(),
        other => panic!("documentation not published: {other:?}"),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_crud_document() {
    let backend = StrictBackend::default();
    let router = new_router(backend.clone());

    router
        .add_route(
            Method::GET,
            "/users/{id}",
            Handler::Named("get_user"),
            Definitions::new()
                .tag("users")
                .operation_id("getUser")
                .response(200, ContentValue::json(SchemaValue::of::<User>()).with_description("found"))
                .response(404, ContentValue::json(SchemaValue::of::<ApiError>())),
        )
        .unwrap();
    router
        .add_route(
            Method::POST,
            "/users",
            Handler::Named("create_user"),
            Definitions::new()
                .request_body(ContentValue::json(SchemaValue::of::<CreateUser>()))
                .response(201, ContentValue::json(SchemaValue::of::<User>())),
        )
        .unwrap();

    router.generate_and_expose_openapi().unwrap();
    let doc = published(&backend);

    let get = &doc["paths"]["/users/{id}"]["get"];
    assert_eq!(get["operationId"], "getUser");
    assert_eq!(get["tags"], json!(["users"]));
    assert_eq!(get["parameters"][0], json!({
        "in": "path",
        "name": "id",
        "required": true,
        "schema": {"type": "string"}
    }));
    assert_eq!(get["responses"]["200"]["description"], "found");
    assert_eq!(get["responses"]["404"]["description"], "");

    let user = &get["responses"]["200"]["content"]["application/json"]["schema"];
    assert_eq!(user["type"], "object");
    assert_eq!(user["additionalProperties"], false);
    assert_eq!(user["required"], json!(["id", "name"]));
    assert_eq!(user["properties"]["email"]["nullable"], true);

    let post = &doc["paths"]["/users"]["post"];
    assert!(post.get("parameters").is_none());
    assert_eq!(
        post["requestBody"]["content"]["application/json"]["schema"]["properties"]["name"]["type"],
        "string"
    );
}

#[test]
fn test_skeleton_from_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "info:\n  title: from file\n  version: 2.0.0\nservers:\n  - url: https://api.example.com\n"
    )
    .unwrap();

    let skeleton = Document::from_file(file.path()).unwrap();
    assert!(skeleton.openapi.is_empty());

    let backend = StrictBackend::default();
    let router = Router::new(backend.clone(), Options::new(skeleton)).unwrap();
    router.generate_and_expose_openapi().unwrap();

    let doc = published(&backend);
    assert_eq!(doc["openapi"], "3.0.0");
    assert_eq!(doc["info"]["title"], "from file");
    assert_eq!(doc["servers"][0]["url"], "https://api.example.com");
}

#[test]
fn test_skeleton_without_info() {
    let err = Document::from_json(br#"{"openapi": "3.0.0", "paths": {}}"#).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::MissingInfo)));
}

#[test]
fn test_security_in_skeleton_and_operation() {
    let mut skeleton = Document::new("secure", "1.0.0");
    skeleton.components_mut().security_schemes.insert(
        "api_key".to_string(),
        SecurityScheme::ApiKey {
            name: "X-API-Key".to_string(),
            location: ApiKeyLocation::Header,
        },
    );

    let backend = StrictBackend::default();
    let router = Router::new(backend.clone(), Options::new(skeleton)).unwrap();

    let mut requirement = SecurityRequirement::new();
    requirement.insert("api_key".to_string(), vec![]);
    router
        .add_route(
            Method::DELETE,
            "/users/{id}",
            Handler::Named("delete_user"),
            Definitions::new().security(requirement),
        )
        .unwrap();
    router.generate_and_expose_openapi().unwrap();

    let doc = published(&backend);
    assert_eq!(doc["paths"]["/users/{id}"]["delete"]["security"], json!([{"api_key": []}]));
    assert_eq!(doc["components"]["securitySchemes"]["api_key"]["in"], "header");
}

#[test]
fn test_backend_rejection_keeps_first_operation() {
    let backend = StrictBackend::default();
    let router = new_router(backend.clone());

    router
        .add_route(Method::GET, "/a", Handler::Named("first"), Definitions::new().summary("first"))
        .unwrap();
    let err = router
        .add_route(Method::GET, "/a", Handler::Named("second"), Definitions::new().summary("second"))
        .unwrap_err();

    assert!(matches!(err, Error::Backend(_)));
    assert_eq!(
        router.document().operation("/a", &Method::GET).unwrap().summary.as_deref(),
        Some("first")
    );
    assert_eq!(backend.handler(&Method::GET, "/a"), Some(Handler::Named("first")));
}

#[test]
fn test_raw_route_with_hand_built_operation() {
    let backend = StrictBackend::default();
    let router = new_router(backend);

    let mut operation = Operation::default();
    operation.summary = Some("upload".to_string());
    let mut content = spec::Content::new();
    content.insert(
        "application/octet-stream".to_string(),
        spec::MediaType {
            schema: Some(Schema::of_type("string")),
        },
    );
    operation.add_request_body(RequestBody {
        description: None,
        content,
        required: true,
    });
    operation.add_response(204, Response::new("stored"));

    router
        .add_raw_route(Method::PUT, "/files", Handler::Named("upload"), Some(operation.clone()))
        .unwrap();
    assert_eq!(router.document().operation("/files", &Method::PUT), Some(&operation));
}

#[test]
fn test_custom_documentation_paths_and_prefix() {
    let backend = StrictBackend::default();
    let options = Options::new(Document::new("t", "v"))
        .json_documentation_path("/openapi.json")
        .yaml_documentation_path("/openapi.yaml")
        .path_prefix("/api");
    let router = Router::new(backend.clone(), options).unwrap();
    router.generate_and_expose_openapi().unwrap();

    assert!(matches!(
        backend.handler(&Method::GET, "/api/openapi.json"),
        Some(Handler::Static("application/json", _))
    ));
    assert!(matches!(
        backend.handler(&Method::GET, "/api/openapi.yaml"),
        Some(Handler::Static("text/plain", _))
    ));
}

#[test]
fn test_relaxed_validation_context() {
    let backend = StrictBackend::default();
    let options = Options::new(Document::new("t", "v"))
        .context(ValidationContext::default().without_path_params());
    let router = Router::new(backend, options).unwrap();

    router
        .add_route(
            Method::GET,
            "/things/{id}",
            Handler::Named("thing"),
            Definitions::new().path_param("thingId", Parameter::default()),
        )
        .unwrap();
    router.generate_and_expose_openapi().unwrap();
}

#[test]
fn test_publish_is_deterministic() {
    let build = || {
        let backend = StrictBackend::default();
        let router = new_router(backend.clone());
        let definitions = Definitions::new()
            .query("z", Parameter::default())
            .query("a", Parameter::default())
            .query("m", Parameter::default())
            .header("X-B", Parameter::default())
            .header("X-A", Parameter::default());
        router
            .add_route(Method::GET, "/search", Handler::Named("search"), definitions)
            .unwrap();
        router.generate_and_expose_openapi().unwrap();
        match backend.handler(&Method::GET, DEFAULT_JSON_DOCUMENTATION_PATH) {
            Some(Handler::Static(_, body)) => body,
            _ => unreachable!(),
        }
    };

    let first = build();
    for _ in 0..5 {
        assert_eq!(build(), first);
    }
}
