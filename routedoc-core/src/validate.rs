//! Structural validation of documents and operations
//!
//! These are the checks a document must pass before it is published. They
//! are structural: references must point into `#/components/schemas`, and a
//! whole document must hold every schema it references. Formats are not
//! checked.

use crate::error::ValidationError;
use crate::path::path_placeholders;
use crate::spec::{
    Content, Document, Operation, Parameter, ParameterLocation, Schema,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashSet};

static COMPONENT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._-]+$").unwrap());

static RESPONSE_RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[1-5]XX$").unwrap());

const SCHEMA_TYPES: [&str; 6] = ["array", "boolean", "integer", "number", "object", "string"];

const COMPONENT_SCHEMAS: &str = "#/components/schemas/";

type Outcome = Result<(), ValidationError>;

/// Component schemas references must resolve against; `None` checks only
/// the reference form.
type Known<'a> = Option<&'a BTreeMap<String, Schema>>;

/// Which optional checks run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    /// Each operation must declare exactly the parameters of its path template
    pub path_params: bool,
    /// Schema `type` must be one of the JSON Schema primitive types
    pub schema_types: bool,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            path_params: true,
            schema_types: true,
        }
    }
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the check tying declared path parameters to the path template.
    pub fn without_path_params(mut self) -> Self {
        self.path_params = false;
        self
    }

    pub fn without_schema_types(mut self) -> Self {
        self.schema_types = false;
        self
    }

    pub fn validate_document(&self, document: &Document) -> Outcome {
        let no_schemas = BTreeMap::new();
        let known = Some(
            document
                .components
                .as_ref()
                .map_or(&no_schemas, |components| &components.schemas),
        );

        if document.openapi.is_empty() {
            return Err(ValidationError::new("openapi", "value is required"));
        }
        if document.info.title.is_empty() {
            return Err(ValidationError::new("info.title", "value is required"));
        }
        if document.info.version.is_empty() {
            return Err(ValidationError::new("info.version", "value is required"));
        }

        for (path, item) in &document.paths {
            if !path.starts_with('/') {
                return Err(ValidationError::new(
                    format!("paths.{path}"),
                    "path must begin with /",
                ));
            }
            let placeholders = path_placeholders(path);
            for (method, operation) in item.operations() {
                let location = format!("paths.{path}.{}", method.as_str().to_lowercase());
                self.check_operation(operation, known)
                    .map_err(|err| err.within(&location))?;
                if self.path_params {
                    check_path_params(operation, &placeholders)
                        .map_err(|err| err.within(&location))?;
                }
            }
        }

        if let Some(components) = &document.components {
            for (name, schema) in &components.schemas {
                let location = format!("components.schemas.{name}");
                if !COMPONENT_NAME.is_match(name) {
                    return Err(ValidationError::new(location, "invalid component name"));
                }
                self.check_schema(schema, known)
                    .map_err(|err| err.within(&location))?;
            }
            for name in components.security_schemes.keys() {
                if !COMPONENT_NAME.is_match(name) {
                    return Err(ValidationError::new(
                        format!("components.securitySchemes.{name}"),
                        "invalid component name",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Check one operation on its own. Component references are checked for
    /// form only, since the schemas they name may not be registered yet.
    pub fn validate_operation(&self, operation: &Operation) -> Outcome {
        self.check_operation(operation, None)
    }

    pub fn validate_schema(&self, schema: &Schema) -> Outcome {
        self.check_schema(schema, None)
    }

    fn check_operation(&self, operation: &Operation, known: Known<'_>) -> Outcome {
        if operation.responses.is_empty() {
            return Err(ValidationError::new(
                "responses",
                "an operation needs at least one response",
            ));
        }
        for (code, response) in &operation.responses {
            let location = format!("responses.{code}");
            if !is_response_key(code) {
                return Err(ValidationError::new(location, "invalid response key"));
            }
            self.validate_content(&response.content, known)
                .map_err(|err| err.within(&location))?;
        }

        let mut seen = HashSet::new();
        for parameter in &operation.parameters {
            let location = format!("parameters.{}", parameter.name);
            if !seen.insert((parameter.name.as_str(), parameter.location)) {
                return Err(ValidationError::new(location, "duplicate parameter"));
            }
            self.validate_parameter(parameter, known)
                .map_err(|err| err.within(&location))?;
        }

        if let Some(body) = &operation.request_body {
            if body.content.is_empty() {
                return Err(ValidationError::new(
                    "requestBody.content",
                    "request body needs content",
                ));
            }
            self.validate_content(&body.content, known)
                .map_err(|err| err.within("requestBody"))?;
        }

        for key in operation.extensions.keys() {
            if !key.starts_with("x-") {
                return Err(ValidationError::new(key.clone(), "extension keys must start with x-"));
            }
        }
        Ok(())
    }

    fn check_schema(&self, schema: &Schema, known: Known<'_>) -> Outcome {
        if let Some(reference) = &schema.reference {
            let Some(name) = reference.strip_prefix(COMPONENT_SCHEMAS) else {
                return Err(ValidationError::new(
                    "$ref",
                    format!("reference {reference:?} is not a component schema"),
                ));
            };
            if known.is_some_and(|schemas| !schemas.contains_key(name)) {
                return Err(ValidationError::new(
                    "$ref",
                    format!("component schema {name:?} is not defined"),
                ));
            }
        }
        if let Some(schema_type) = &schema.schema_type {
            if self.schema_types && !SCHEMA_TYPES.contains(&schema_type.as_str()) {
                return Err(ValidationError::new(
                    "type",
                    format!("unsupported schema type {schema_type:?}"),
                ));
            }
            if schema_type == "array" && schema.items.is_none() {
                return Err(ValidationError::new("items", "array schema needs items"));
            }
        }
        for child in schema.children() {
            self.check_schema(child, known)?;
        }
        Ok(())
    }

    fn validate_parameter(&self, parameter: &Parameter, known: Known<'_>) -> Outcome {
        if parameter.name.is_empty() {
            return Err(ValidationError::new("name", "parameter name is required"));
        }
        if parameter.location == ParameterLocation::Path && !parameter.required {
            return Err(ValidationError::new(
                "required",
                "path parameters must be required",
            ));
        }
        match (&parameter.schema, &parameter.content) {
            (Some(schema), None) => self.check_schema(schema, known),
            (None, Some(content)) if content.len() == 1 => self.validate_content(content, known),
            (None, Some(_)) => Err(ValidationError::new(
                "content",
                "parameter content must have exactly one entry",
            )),
            _ => Err(ValidationError::new(
                "schema",
                "parameter needs exactly one of schema or content",
            )),
        }
    }

    fn validate_content(&self, content: &Content, known: Known<'_>) -> Outcome {
        for (content_type, media) in content {
            if let Some(schema) = &media.schema {
                self.check_schema(schema, known)
                    .map_err(|err| err.within(&format!("content.{content_type}.schema")))?;
            }
        }
        Ok(())
    }
}

fn is_response_key(key: &str) -> bool {
    if key == "default" || RESPONSE_RANGE.is_match(key) {
        return true;
    }
    key.parse::<u16>().is_ok_and(|code| (100..=599).contains(&code))
}

fn check_path_params(operation: &Operation, placeholders: &[String]) -> Outcome {
    let declared: BTreeSet<&str> = operation
        .parameters
        .iter()
        .filter(|p| p.location == ParameterLocation::Path)
        .map(|p| p.name.as_str())
        .collect();
    let expected: BTreeSet<&str> = placeholders.iter().map(String::as_str).collect();

    if let Some(missing) = expected.difference(&declared).next() {
        return Err(ValidationError::new(
            "parameters",
            format!("path parameter {missing:?} is not declared"),
        ));
    }
    if let Some(extra) = declared.difference(&expected).next() {
        return Err(ValidationError::new(
            "parameters",
            format!("path parameter {extra:?} is not in the path"),
        ));
    }
    Ok(())
}

impl ValidationError {
    /// Prefix the error location with `parent`.
    fn within(mut self, parent: &str) -> Self {
        self.location = format!("{parent}.{}", self.location);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{MediaType, PathItem, RequestBody, Response};

    fn document_with(path: &str, operation: Operation) -> Document {
        let mut document = Document::new("title", "1.0.0");
        document.paths.insert(
            path.to_string(),
            PathItem {
                get: Some(operation),
                ..Default::default()
            },
        );
        document
    }

    fn path_param(name: &str) -> Parameter {
        Parameter::new(ParameterLocation::Path, name).with_schema(Schema::string())
    }

    #[test]
    fn test_minimal_document_is_valid() {
        let ctx = ValidationContext::default();
        assert!(ctx.validate_document(&Document::new("t", "v")).is_ok());
    }

    #[test]
    fn test_required_fields() {
        let ctx = ValidationContext::default();

        let mut doc = Document::new("t", "v");
        doc.openapi.clear();
        assert_eq!(ctx.validate_document(&doc).unwrap_err().location, "openapi");

        let doc = Document::new("", "v");
        assert_eq!(ctx.validate_document(&doc).unwrap_err().location, "info.title");

        let doc = Document::new("t", "");
        assert_eq!(ctx.validate_document(&doc).unwrap_err().location, "info.version");
    }

    #[test]
    fn test_path_must_be_rooted() {
        let doc = document_with("items", Operation::with_default_response());
        let err = ValidationContext::default().validate_document(&doc).unwrap_err();
        assert_eq!(err.location, "paths.items");
    }

    #[test]
    fn test_operation_needs_responses() {
        let err = ValidationContext::default()
            .validate_operation(&Operation::default())
            .unwrap_err();
        assert_eq!(err.location, "responses");
    }

    #[test]
    fn test_response_keys() {
        for key in ["default", "200", "404", "2XX", "5XX", "100", "599"] {
            assert!(is_response_key(key), "{key}");
        }
        for key in ["600", "99", "6XX", "2xx", "ok", ""] {
            assert!(!is_response_key(key), "{key}");
        }
    }

    #[test]
    fn test_path_params_must_match_template() {
        let ctx = ValidationContext::default();

        let mut op = Operation::with_default_response();
        let doc = document_with("/items/{id}", op.clone());
        let err = ctx.validate_document(&doc).unwrap_err();
        assert_eq!(err.location, "paths./items/{id}.get.parameters");

        op.add_parameter(path_param("id"));
        assert!(ctx.validate_document(&document_with("/items/{id}", op.clone())).is_ok());

        op.add_parameter(path_param("other"));
        assert!(ctx.validate_document(&document_with("/items/{id}", op.clone())).is_err());

        let relaxed = ValidationContext::default().without_path_params();
        assert!(relaxed.validate_document(&document_with("/items/{id}", op)).is_ok());
    }

    #[test]
    fn test_duplicate_parameters() {
        let mut op = Operation::with_default_response();
        op.add_parameter(Parameter::new(ParameterLocation::Query, "q").with_schema(Schema::string()));
        op.add_parameter(Parameter::new(ParameterLocation::Header, "q").with_schema(Schema::string()));
        assert!(ValidationContext::default().validate_operation(&op).is_ok());

        op.add_parameter(Parameter::new(ParameterLocation::Query, "q").with_schema(Schema::string()));
        let err = ValidationContext::default().validate_operation(&op).unwrap_err();
        assert_eq!(err.location, "parameters.q");
    }

    #[test]
    fn test_parameter_schema_or_content() {
        let ctx = ValidationContext::default();

        let mut op = Operation::with_default_response();
        op.add_parameter(Parameter::new(ParameterLocation::Query, "q"));
        assert_eq!(
            ctx.validate_operation(&op).unwrap_err().location,
            "parameters.q.schema"
        );

        let mut op = Operation::with_default_response();
        let mut param = Parameter::new(ParameterLocation::Query, "q");
        let mut content = Content::new();
        content.insert("application/json".into(), MediaType::default());
        content.insert("text/plain".into(), MediaType::default());
        param.content = Some(content);
        op.add_parameter(param);
        assert_eq!(
            ctx.validate_operation(&op).unwrap_err().location,
            "parameters.q.content"
        );
    }

    #[test]
    fn test_path_parameter_must_be_required() {
        let mut param = path_param("id");
        param.required = false;
        let mut op = Operation::with_default_response();
        op.add_parameter(param);
        let err = ValidationContext::default().validate_operation(&op).unwrap_err();
        assert_eq!(err.location, "parameters.id.required");
    }

    #[test]
    fn test_request_body_needs_content() {
        let mut op = Operation::with_default_response();
        op.add_request_body(RequestBody::default());
        let err = ValidationContext::default().validate_operation(&op).unwrap_err();
        assert_eq!(err.location, "requestBody.content");
    }

    #[test]
    fn test_extension_prefix() {
        let mut op = Operation::with_default_response();
        op.extensions.insert("owner".into(), serde_json::json!("me"));
        assert!(ValidationContext::default().validate_operation(&op).is_err());
    }

    #[test]
    fn test_schema_checks() {
        let ctx = ValidationContext::default();
        assert!(ctx.validate_schema(&Schema::of_type("text")).is_err());
        assert!(ctx.without_schema_types().validate_schema(&Schema::of_type("text")).is_ok());

        let mut array = Schema::of_type("array");
        assert_eq!(ctx.validate_schema(&array).unwrap_err().location, "items");
        array.items = Some(Box::new(Schema::of_type("bogus")));
        assert!(ctx.validate_schema(&array).is_err());
        array.items = Some(Box::new(Schema::string()));
        assert!(ctx.validate_schema(&array).is_ok());
    }

    fn returning(schema: Schema) -> Operation {
        let mut content = Content::new();
        content.insert(
            "application/json".into(),
            MediaType {
                schema: Some(schema),
            },
        );
        let mut op = Operation::default();
        op.add_response(200, Response {
            description: String::new(),
            content,
        });
        op
    }

    #[test]
    fn test_dangling_reference_fails_document() {
        let ctx = ValidationContext::default();
        let mut doc = document_with("/nodes", returning(Schema::reference("Node")));

        // Form is fine on its own; the document lacks the target.
        assert!(ctx.validate_operation(&doc.paths["/nodes"].get.clone().unwrap()).is_ok());
        let err = ctx.validate_document(&doc).unwrap_err();
        assert_eq!(err.location, "paths./nodes.get.responses.200.content.application/json.schema.$ref");

        doc.components_mut()
            .schemas
            .insert("Node".into(), Schema::of_type("object"));
        assert!(ctx.validate_document(&doc).is_ok());
    }

    #[test]
    fn test_reference_must_target_component_schemas() {
        let ctx = ValidationContext::default();
        let root = Schema {
            reference: Some("#".into()),
            ..Default::default()
        };
        let mut array = Schema::of_type("array");
        array.items = Some(Box::new(root));
        assert_eq!(ctx.validate_schema(&array).unwrap_err().location, "$ref");

        let mut doc = Document::new("t", "v");
        let mut node = Schema::of_type("array");
        node.items = Some(Box::new(Schema::reference("Missing")));
        doc.components_mut().schemas.insert("Node".into(), node);
        let err = ctx.validate_document(&doc).unwrap_err();
        assert_eq!(err.location, "components.schemas.Node.$ref");
    }

    #[test]
    fn test_component_names() {
        let mut doc = Document::new("t", "v");
        doc.components_mut()
            .schemas
            .insert("Valid.Name_1-x".into(), Schema::string());
        assert!(ValidationContext::default().validate_document(&doc).is_ok());

        doc.components_mut()
            .schemas
            .insert("not valid".into(), Schema::string());
        let err = ValidationContext::default().validate_document(&doc).unwrap_err();
        assert_eq!(err.location, "components.schemas.not valid");
    }
}
