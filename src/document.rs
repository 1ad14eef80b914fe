//! The resolved hyper-schema document.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::ResolveError;
use crate::link::Link;
use crate::types::Diagnostic;
use crate::visitor::Visitor;

/// A resource after reference resolution.
#[derive(Debug, Clone)]
pub struct ResolvedResource {
    name: String,
    schema: Arc<Value>,
    links: Vec<Link>,
}

impl ResolvedResource {
    /// Pair a resolved resource schema with its wrapped links.
    pub fn new(name: String, schema: Arc<Value>, links: Vec<Link>) -> Self {
        Self {
            name,
            schema,
            links,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved resource schema, shared with its links.
    pub fn schema(&self) -> &Arc<Value> {
        &self.schema
    }

    /// Reference-resolved `properties` of the resource.
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.schema.get("properties").and_then(Value::as_object)
    }

    /// Links in document order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }
}

/// Resource name to resolved resource, in document order.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    resources: IndexMap<String, ResolvedResource>,
    diagnostics: Vec<Diagnostic>,
}

impl SchemaDocument {
    /// Resolve a raw hyper-schema document.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if the document is malformed or a `$ref`
    /// cannot be resolved.
    pub fn load(raw: &Value) -> Result<Self, ResolveError> {
        let mut visitor = Visitor::new(raw);
        let resources = visitor.run()?;
        Ok(Self {
            resources,
            diagnostics: visitor.into_diagnostics(),
        })
    }

    pub fn resources(&self) -> &IndexMap<String, ResolvedResource> {
        &self.resources
    }

    pub fn resource(&self, name: &str) -> Option<&ResolvedResource> {
        self.resources.get(name)
    }

    /// Warnings recorded while resolving.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// JSON view of the resolved document.
    ///
    /// Each resource maps to its resolved `properties` and its links with
    /// their resolved `targetSchema`.
    pub fn to_value(&self) -> Value {
        let mut result = Map::new();
        for (name, resource) in &self.resources {
            let mut entry = Map::new();
            entry.insert(
                "properties".to_string(),
                Value::Object(resource.properties().cloned().unwrap_or_default()),
            );
            entry.insert(
                "links".to_string(),
                Value::Array(resource.links().iter().map(|l| l.raw().clone()).collect()),
            );
            result.insert(name.clone(), Value::Object(entry));
        }
        Value::Object(result)
    }
}
