//! Schema and content resolution
//!
//! Failures from reflection are returned unchanged; callers wrap them with
//! the section of the definitions that was being resolved.

use crate::definitions;
use crate::error::SchemaError;
use crate::reflect::{reflect, SchemaValue};
use crate::spec::{Content, MediaType, Schema};
use std::collections::BTreeMap;

/// Resolves schema descriptions for one operation, collecting the named
/// definitions reflection could not inline.
#[derive(Debug, Default)]
pub struct SchemaResolver {
    definitions: BTreeMap<String, Schema>,
}

impl SchemaResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty value yields an empty schema.
    pub fn schema(&mut self, value: &SchemaValue) -> Result<Schema, SchemaError> {
        let Some(source) = &value.source else {
            return Ok(Schema::default());
        };
        let reflected = reflect(source, value.allow_additional_properties)?;
        self.definitions.extend(reflected.definitions);
        Ok(reflected.schema)
    }

    /// Resolve every entry of a content map independently.
    pub fn content(&mut self, content: &definitions::Content) -> Result<Content, SchemaError> {
        content
            .iter()
            .map(|(content_type, value)| {
                let schema = self.schema(value)?;
                Ok((
                    content_type.clone(),
                    MediaType {
                        schema: Some(schema),
                    },
                ))
            })
            .collect()
    }

    pub fn definitions(&self) -> &BTreeMap<String, Schema> {
        &self.definitions
    }

    pub fn into_definitions(self) -> BTreeMap<String, Schema> {
        self.definitions
    }
}
