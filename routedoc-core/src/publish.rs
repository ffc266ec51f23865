//! Document publishing
//!
//! Validates the shared document and exposes it as two read-only routes,
//! one serving JSON and one serving YAML.

use crate::backend::Backend;
use crate::error::{GenerateError, Result};
use crate::router::Router;
use bytes::Bytes;
use http::Method;

/// Content type of the JSON documentation route
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Content type of the YAML documentation route
pub const YAML_CONTENT_TYPE: &str = "text/plain";

impl<B: Backend> Router<B> {
    /// Validate the document and register the JSON and YAML documentation
    /// routes.
    ///
    /// Both routes serve a snapshot taken now; routes registered afterwards
    /// are only published by calling this again. The documentation routes
    /// are registered like any other raw route, so they are prefixed and
    /// appear in later snapshots.
    pub fn generate_and_expose_openapi(&self) -> Result<()> {
        let json = {
            let document = self.document.read();
            self.context.validate_document(&document)?;
            document.to_json().map_err(GenerateError::Json)?
        };

        let json = Bytes::from(json);
        let handler = self.backend.swagger_handler(JSON_CONTENT_TYPE, json.clone());
        self.add_raw_route(Method::GET, &self.json_documentation_path, handler, None)?;

        let yaml = json_to_yaml(&json)?;
        let handler = self.backend.swagger_handler(YAML_CONTENT_TYPE, Bytes::from(yaml));
        self.add_raw_route(Method::GET, &self.yaml_documentation_path, handler, None)?;

        tracing::info!(
            json = %self.json_documentation_path,
            yaml = %self.yaml_documentation_path,
            prefix = %self.path_prefix,
            "openapi documentation exposed"
        );
        Ok(())
    }
}

/// Convert a JSON document to YAML, keeping key order.
pub fn json_to_yaml(json: &[u8]) -> std::result::Result<String, GenerateError> {
    let value: serde_yaml::Value =
        serde_json::from_slice(json).map_err(|err| GenerateError::Yaml(err.to_string()))?;
    serde_yaml::to_string(&value).map_err(|err| GenerateError::Yaml(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{RecordedHandler, RecordingBackend};
    use crate::error::Error;
    use crate::router::Options;
    use crate::spec::{Document, Operation};
    use crate::Definitions;

    fn blob(backend: &RecordingBackend, path: &str) -> (&'static str, Bytes) {
        match backend.find(&Method::GET, path).map(|r| r.handler) {
            Some(RecordedHandler::Blob { content_type, body }) => (content_type, body),
            other => panic!("no documentation route at {path}: {other:?}"),
        }
    }

    #[test]
    fn test_json_to_yaml() {
        let yaml = json_to_yaml(br#"{"openapi":"3.0.0","info":{"title":"t","version":"v"},"paths":{}}"#)
            .unwrap();
        assert_eq!(yaml, "openapi: 3.0.0\ninfo:\n  title: t\n  version: v\npaths: {}\n");
    }

    #[test]
    fn test_json_to_yaml_rejects_garbage() {
        assert!(matches!(json_to_yaml(b"{"), Err(GenerateError::Yaml(_))));
    }

    #[test]
    fn test_generate_and_expose() {
        let backend = RecordingBackend::default();
        let router = Router::new(backend.clone(), Options::new(Document::new("t", "v"))).unwrap();
        router
            .add_route(Method::GET, "/items/{id}", RecordedHandler::Named("item"), Definitions::new())
            .unwrap();
        router.generate_and_expose_openapi().unwrap();

        let (content_type, body) = blob(&backend, "/documentation/json");
        assert_eq!(content_type, "application/json");
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            r#"{"openapi":"3.0.0","info":{"title":"t","version":"v"},"paths":{"/items/{id}":{"get":{"parameters":[{"in":"path","name":"id","required":true,"schema":{"type":"string"}}],"responses":{"default":{"description":""}}}}}}"#
        );

        let (content_type, body) = blob(&backend, "/documentation/yaml");
        assert_eq!(content_type, "text/plain");
        assert!(std::str::from_utf8(&body).unwrap().starts_with("openapi: 3.0.0\n"));
    }

    #[test]
    fn test_documentation_routes_are_documented_afterwards() {
        let backend = RecordingBackend::default();
        let router = Router::new(backend, Options::new(Document::new("t", "v"))).unwrap();
        router.generate_and_expose_openapi().unwrap();

        let document = router.document();
        assert!(document.operation("/documentation/json", &Method::GET).is_some());
        assert!(document.operation("/documentation/yaml", &Method::GET).is_some());

        // republishing replaces the routes rather than failing
        router.generate_and_expose_openapi().unwrap();
    }

    #[test]
    fn test_recursive_type_is_published_with_its_component() {
        #[allow(dead_code)]
        #[derive(schemars::JsonSchema)]
        struct Node {
            children: Vec<Node>,
        }

        let backend = RecordingBackend::default();
        let router = Router::new(backend.clone(), Options::new(Document::new("t", "v"))).unwrap();
        router
            .add_route(
                Method::GET,
                "/nodes",
                RecordedHandler::Named("nodes"),
                Definitions::new().response(200, crate::ContentValue::json(crate::SchemaValue::of::<Node>())),
            )
            .unwrap();
        router.generate_and_expose_openapi().unwrap();

        let (_, body) = blob(&backend, "/documentation/json");
        let served: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            served["paths"]["/nodes"]["get"]["responses"]["200"]["content"]["application/json"]["schema"],
            serde_json::json!({"$ref": "#/components/schemas/Node"})
        );
        assert_eq!(
            served["components"]["schemas"]["Node"]["properties"]["children"]["items"],
            serde_json::json!({"$ref": "#/components/schemas/Node"})
        );
        assert!(!std::str::from_utf8(&body).unwrap().contains(r##""$ref":"#""##));
    }

    #[test]
    fn test_dangling_reference_is_not_published() {
        let backend = RecordingBackend::default();
        let router = Router::new(backend.clone(), Options::new(Document::new("t", "v"))).unwrap();
        let mut operation = Operation::with_default_response();
        operation.responses.get_mut("default").unwrap().content.insert(
            "application/json".into(),
            crate::spec::MediaType {
                schema: Some(crate::spec::Schema::reference("Missing")),
            },
        );
        router
            .add_raw_route(Method::GET, "/ghost", RecordedHandler::Named("ghost"), Some(operation))
            .unwrap();

        assert!(matches!(router.generate_and_expose_openapi(), Err(Error::Validation(_))));
        assert!(backend.find(&Method::GET, "/documentation/json").is_none());
    }

    #[test]
    fn test_invalid_document_is_not_published() {
        let backend = RecordingBackend::default();
        let router = Router::new(
            backend.clone(),
            Options::new(Document::new("t", "v")).path_prefix("/api"),
        )
        .unwrap();
        // explicit path params that do not match the template fail the path check
        router
            .add_route(
                Method::GET,
                "/users/{id}",
                RecordedHandler::Named("user"),
                Definitions::new().path_param("other", Default::default()),
            )
            .unwrap();

        let err = router.generate_and_expose_openapi().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(backend.find(&Method::GET, "/api/documentation/json").is_none());
    }

    #[test]
    fn test_sub_router_publishes_under_prefix() {
        let backend = RecordingBackend::default();
        let root = Router::new(backend.clone(), Options::new(Document::new("t", "v"))).unwrap();
        let sub = root.sub_router(backend.clone(), crate::SubRouterOptions::new("/v1"));
        sub.add_raw_route(Method::GET, "/ping", RecordedHandler::Named("ping"), Some(Operation::with_default_response()))
            .unwrap();
        sub.generate_and_expose_openapi().unwrap();

        let (_, body) = blob(&backend, "/v1/documentation/json");
        let published = Document::from_json(&body).unwrap();
        assert!(published.operation("/v1/ping", &Method::GET).is_some());
    }
}
