//! Type-to-schema reflection
//!
//! Rust types describe their schema through [`schemars::JsonSchema`]; raw
//! JSON Schema documents are accepted as well. Either way the result is
//! decoded into a [`Schema`].

use crate::error::SchemaError;
use crate::spec::Schema;
use schemars::generate::{SchemaGenerator, SchemaSettings};
use schemars::JsonSchema;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

const COMPONENT_SCHEMAS: &str = "#/components/schemas/";

/// Where a schema comes from
#[derive(Clone)]
pub enum SchemaSource {
    /// A Rust type, reflected on demand
    Reflected {
        type_name: &'static str,
        /// Component name used when the type refers to itself
        schema_name: fn() -> Cow<'static, str>,
        generate: fn(SchemaGenerator) -> schemars::Schema,
    },
    /// A hand-written JSON Schema
    Json(Value),
}

impl fmt::Debug for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::Reflected { type_name, .. } => {
                f.debug_tuple("Reflected").field(type_name).finish()
            }
            SchemaSource::Json(value) => f.debug_tuple("Json").field(value).finish(),
        }
    }
}

fn generate_root<T: JsonSchema>(generator: SchemaGenerator) -> schemars::Schema {
    generator.into_root_schema_for::<T>()
}

/// A schema description plus whether objects accept undeclared properties.
///
/// # Examples
///
/// ```
/// use routedoc_core::SchemaValue;
///
/// let id = SchemaValue::of::<u64>();
/// let raw = SchemaValue::json(serde_json::json!({"type": "string", "format": "uuid"}));
/// let nothing = SchemaValue::empty();
/// assert!(nothing.is_empty());
/// assert!(!id.is_empty() && !raw.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaValue {
    pub source: Option<SchemaSource>,
    pub allow_additional_properties: bool,
}

impl SchemaValue {
    /// Reflect the schema of `T`.
    pub fn of<T: JsonSchema>() -> Self {
        Self {
            source: Some(SchemaSource::Reflected {
                type_name: std::any::type_name::<T>(),
                schema_name: T::schema_name,
                generate: generate_root::<T>,
            }),
            allow_additional_properties: false,
        }
    }

    /// Use a JSON Schema document verbatim.
    pub fn json(value: Value) -> Self {
        Self {
            source: Some(SchemaSource::Json(value)),
            allow_additional_properties: false,
        }
    }

    /// No value: resolves to an empty schema.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn allow_additional_properties(mut self, allow: bool) -> Self {
        self.allow_additional_properties = allow;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none()
    }
}

/// Output of a reflection: the root schema and the named subschemas that
/// could not be inlined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reflected {
    pub schema: Schema,
    pub definitions: BTreeMap<String, Schema>,
}

/// Produce a schema for `source`.
///
/// Reflected types use the OpenAPI 3.0 dialect with inlined subschemas.
/// Recursive types keep `$ref`s into `#/components/schemas`, and their
/// targets are returned in [`Reflected::definitions`]. A type that refers
/// to itself is registered under its schema name and the root becomes a
/// reference to that component. Unless additional
/// properties are allowed, reflected object schemas are closed with
/// `additionalProperties: false`.
pub fn reflect(
    source: &SchemaSource,
    allow_additional_properties: bool,
) -> Result<Reflected, SchemaError> {
    match source {
        SchemaSource::Json(value) => Ok(Reflected {
            schema: serde_json::from_value(value.clone())?,
            definitions: BTreeMap::new(),
        }),
        SchemaSource::Reflected {
            schema_name,
            generate,
            ..
        } => {
            let settings = SchemaSettings::openapi3().with(|s| s.inline_subschemas = true);
            let mut value = generate(settings.into_generator()).to_value();
            let mut definitions = take_definitions(&mut value);
            if let Value::Object(root) = &mut value {
                root.remove("$schema");
                root.remove("title");
            }

            let name = schema_name();
            let target = format!("{COMPONENT_SCHEMAS}{name}");
            let nested = definitions
                .values_mut()
                .fold(false, |found, definition| rewrite_root_refs(definition, &target) || found);
            if rewrite_root_refs(&mut value, &target) || nested {
                let root = std::mem::replace(&mut value, Value::Null);
                definitions.insert(name.into_owned(), root);
                value = serde_json::json!({ "$ref": target });
            } else if !allow_additional_properties {
                close_objects(&mut value);
            }

            let mut decoded = BTreeMap::new();
            for (name, mut definition) in definitions {
                if !allow_additional_properties {
                    close_objects(&mut definition);
                }
                let schema = serde_json::from_value(definition)
                    .map_err(|source| SchemaError::Definition {
                        name: name.clone(),
                        source,
                    })?;
                decoded.insert(name, schema);
            }

            Ok(Reflected {
                schema: serde_json::from_value(value)?,
                definitions: decoded,
            })
        }
    }
}

/// Remove definition containers from the root, wherever the dialect put them.
fn take_definitions(value: &mut Value) -> Map<String, Value> {
    let mut definitions = Map::new();
    let Value::Object(root) = value else {
        return definitions;
    };
    if let Some(Value::Object(mut components)) = root.remove("components") {
        if let Some(Value::Object(schemas)) = components.remove("schemas") {
            definitions.extend(schemas);
        }
    }
    for key in ["$defs", "definitions"] {
        if let Some(Value::Object(defs)) = root.remove(key) {
            definitions.extend(defs);
        }
    }
    definitions
}

/// Point every `$ref: "#"` at `target`; true when one was found.
fn rewrite_root_refs(value: &mut Value, target: &str) -> bool {
    match value {
        Value::Object(map) => {
            let mut found = false;
            if map.get("$ref").and_then(Value::as_str) == Some("#") {
                map.insert("$ref".to_string(), Value::String(target.to_string()));
                found = true;
            }
            for child in map.values_mut() {
                found |= rewrite_root_refs(child, target);
            }
            found
        }
        Value::Array(items) => items
            .iter_mut()
            .fold(false, |found, item| rewrite_root_refs(item, target) || found),
        _ => false,
    }
}

fn is_object_schema(map: &Map<String, Value>) -> bool {
    map.get("type").and_then(Value::as_str) == Some("object") || map.contains_key("properties")
}

fn close_objects(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };
    if is_object_schema(map) && !map.contains_key("additionalProperties") {
        map.insert("additionalProperties".to_string(), Value::Bool(false));
    }
    if let Some(Value::Object(properties)) = map.get_mut("properties") {
        properties.values_mut().for_each(close_objects);
    }
    for key in ["items", "additionalProperties", "not"] {
        if let Some(child) = map.get_mut(key) {
            close_objects(child);
        }
    }
    for key in ["allOf", "anyOf", "oneOf"] {
        if let Some(Value::Array(children)) = map.get_mut(key) {
            children.iter_mut().for_each(close_objects);
        }
    }
}
