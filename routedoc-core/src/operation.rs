//! Compiling [`Definitions`] into an [`Operation`]
//!
//! The builder works on a local value only; nothing reaches the shared
//! document until the router registers the finished operation.

use crate::definitions::{self, ContentValue, Definitions, ParameterValue};
use crate::error::{Error, Result, SchemaError};
use crate::path::path_placeholders;
use crate::schema::SchemaResolver;
use crate::spec::{
    Operation, Parameter, ParameterLocation, RequestBody, Response, Schema, SecurityRequirement,
};
use std::collections::{BTreeMap, HashMap};

const DEFAULT_RESPONSE: &str = "default";

impl Operation {
    /// An operation answering only with an undescribed default response.
    pub fn with_default_response() -> Self {
        let mut operation = Operation::default();
        operation
            .responses
            .insert(DEFAULT_RESPONSE.to_string(), Response::new(""));
        operation
    }

    pub fn add_request_body(&mut self, request_body: RequestBody) {
        self.request_body = Some(request_body);
    }

    /// Add the response for `status`. Responses always carry a description,
    /// so pass an empty string when there is nothing to say.
    pub fn add_response(&mut self, status: u16, response: Response) {
        self.responses.insert(status.to_string(), response);
    }

    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    /// Append security requirements. The list is only created once there is
    /// a requirement to put in it.
    pub fn add_security_requirements(&mut self, requirements: &[SecurityRequirement]) {
        if requirements.is_empty() {
            return;
        }
        self.security
            .get_or_insert_with(Vec::new)
            .extend(requirements.iter().cloned());
    }
}

/// An operation together with the component schemas it references
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltOperation {
    pub operation: Operation,
    pub components: BTreeMap<String, Schema>,
}

/// Builds one [`Operation`] for a canonical (brace-style) path.
///
/// # Examples
///
/// ```
/// use routedoc_core::{Definitions, OperationBuilder};
///
/// let built = OperationBuilder::new("/items/{id}")
///     .build(Definitions::default())
///     .unwrap();
///
/// let params = &built.operation.parameters;
/// assert_eq!(params.len(), 1);
/// assert_eq!(params[0].name, "id");
/// assert!(params[0].required);
/// assert!(built.operation.responses.contains_key("default"));
/// ```
#[derive(Debug)]
pub struct OperationBuilder<'a> {
    canonical_path: &'a str,
    resolver: SchemaResolver,
}

impl<'a> OperationBuilder<'a> {
    pub fn new(canonical_path: &'a str) -> Self {
        Self {
            canonical_path,
            resolver: SchemaResolver::new(),
        }
    }

    pub fn build(mut self, definitions: Definitions) -> Result<BuiltOperation> {
        let mut operation = Operation {
            tags: definitions.tags,
            summary: definitions.summary,
            description: definitions.description,
            operation_id: definitions.operation_id,
            deprecated: definitions.deprecated,
            extensions: definitions.extensions,
            ..Default::default()
        };
        operation.add_security_requirements(&definitions.security);

        if let Some(body) = &definitions.request_body {
            let request_body = self.request_body(body).map_err(Error::RequestBody)?;
            operation.add_request_body(request_body);
        }

        self.responses(&definitions.responses, &mut operation)
            .map_err(Error::Responses)?;

        self.path_parameters(&definitions.path_params, &mut operation)
            .map_err(Error::PathParams)?;
        self.parameters(ParameterLocation::Query, &definitions.querystring, &mut operation)
            .map_err(Error::Querystring)?;
        self.parameters(ParameterLocation::Header, &definitions.headers, &mut operation)
            .map_err(Error::Headers)?;
        self.parameters(ParameterLocation::Cookie, &definitions.cookies, &mut operation)
            .map_err(Error::Cookies)?;

        Ok(BuiltOperation {
            operation,
            components: self.resolver.into_definitions(),
        })
    }

    fn request_body(&mut self, body: &ContentValue) -> std::result::Result<RequestBody, SchemaError> {
        Ok(RequestBody {
            description: body.description.clone(),
            content: self.resolver.content(&body.content)?,
            required: false,
        })
    }

    fn responses(
        &mut self,
        responses: &HashMap<u16, ContentValue>,
        operation: &mut Operation,
    ) -> std::result::Result<(), SchemaError> {
        if responses.is_empty() {
            operation
                .responses
                .insert(DEFAULT_RESPONSE.to_string(), Response::new(""));
            return Ok(());
        }

        let mut codes: Vec<&u16> = responses.keys().collect();
        codes.sort();
        for code in codes {
            let value = &responses[code];
            let response = Response {
                description: value.description.clone().unwrap_or_default(),
                content: self.resolver.content(&value.content)?,
            };
            operation.add_response(*code, response);
        }
        Ok(())
    }

    /// Explicit path parameters win outright; only when none are given are
    /// they derived from the `{name}` placeholders of the path.
    fn path_parameters(
        &mut self,
        explicit: &ParameterValue,
        operation: &mut Operation,
    ) -> std::result::Result<(), SchemaError> {
        if !explicit.is_empty() {
            return self.parameters(ParameterLocation::Path, explicit, operation);
        }
        for name in path_placeholders(self.canonical_path) {
            operation.add_parameter(
                Parameter::new(ParameterLocation::Path, name).with_schema(Schema::string()),
            );
        }
        Ok(())
    }

    fn parameters(
        &mut self,
        location: ParameterLocation,
        values: &ParameterValue,
        operation: &mut Operation,
    ) -> std::result::Result<(), SchemaError> {
        let mut names: Vec<&String> = values.keys().collect();
        names.sort();

        for name in names {
            let parameter = self.parameter(location, name, &values[name])?;
            operation.add_parameter(parameter);
        }
        Ok(())
    }

    fn parameter(
        &mut self,
        location: ParameterLocation,
        name: &str,
        value: &definitions::Parameter,
    ) -> std::result::Result<Parameter, SchemaError> {
        let mut parameter = Parameter::new(location, name);
        parameter.description = value.description.clone();

        if let Some(content) = &value.content {
            if value.schema.is_some() {
                tracing::warn!(
                    parameter = %name,
                    location = %location,
                    "parameter declares both content and schema, schema is ignored"
                );
            }
            parameter.content = Some(self.resolver.content(content)?);
        } else {
            let schema = match &value.schema {
                Some(schema) => self.resolver.schema(schema)?,
                None => Schema::default(),
            };
            parameter.schema = Some(schema);
        }
        Ok(parameter)
    }
}
