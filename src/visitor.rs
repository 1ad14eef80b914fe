//! Reference resolution over a raw hyper-schema document.
//!
//! The visitor reads the document, never mutates it, and builds resolved
//! copies of each resource. Resolved nodes are cached per pointer, so a
//! pointer is looked up once and every later use shares the same node.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::document::ResolvedResource;
use crate::error::ResolveError;
use crate::link::Link;
use crate::types::{json_type_name, Diagnostic, INVALID_TARGET_SCHEMA};

/// Walks a hyper-schema document and resolves its resources.
pub struct Visitor<'a> {
    root: &'a Value,
    resolved: HashMap<String, Arc<Value>>,
    materialized: HashMap<String, Arc<Value>>,
    resource_pointers: HashSet<&'a str>,
    in_progress: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Visitor<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self {
            root,
            resolved: HashMap::new(),
            materialized: HashMap::new(),
            resource_pointers: HashSet::new(),
            in_progress: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Resolve every resource under the top-level `properties`.
    ///
    /// All resources are materialized (their `properties` dereferenced)
    /// before any link is visited. A property or `targetSchema` pointing at
    /// a resource sees its concrete properties whatever the resource order.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` for a malformed document or a `$ref` that
    /// cannot be resolved.
    pub fn run(&mut self) -> Result<IndexMap<String, ResolvedResource>, ResolveError> {
        let root = self.root;
        let resources = match root.get("properties") {
            Some(Value::Object(resources)) => resources,
            Some(other) => {
                return Err(ResolveError::InvalidDocument {
                    message: format!(
                        "top-level \"properties\" must be an object, got {}",
                        json_type_name(other)
                    ),
                })
            }
            None => {
                return Err(ResolveError::InvalidDocument {
                    message: "missing top-level \"properties\"".to_string(),
                })
            }
        };

        for entry in resources.values() {
            if Self::should_resolve_reference(entry) {
                self.resource_pointers.insert(reference_of(entry)?);
            }
        }

        let mut schemas = Vec::with_capacity(resources.len());
        for (name, entry) in resources {
            let schema = self.visit_resource(name, entry)?;
            schemas.push((name, schema));
        }

        let mut result = IndexMap::with_capacity(schemas.len());
        for (name, schema) in schemas {
            let links = self.visit_links(&schema, &format!("#/properties/{}/links", name))?;
            result.insert(
                name.clone(),
                ResolvedResource::new(name.clone(), schema, links),
            );
        }

        Ok(result)
    }

    /// Look up a `#/`-prefixed pointer against the document root.
    ///
    /// A node that is itself a `$ref` is followed until a concrete node is
    /// reached. The result is cached: resolving the same pointer again
    /// returns the same `Arc`.
    pub fn resolve_reference(&mut self, pointer: &str) -> Result<Arc<Value>, ResolveError> {
        if let Some(node) = self.resolved.get(pointer) {
            return Ok(Arc::clone(node));
        }

        let root = self.root;
        let mut chain = vec![pointer];
        let mut node = navigate_pointer(root, pointer)?;

        while Self::should_resolve_reference(node) {
            let next = reference_of(node)?;
            if let Some(cached) = self.resolved.get(next) {
                let cached = Arc::clone(cached);
                self.resolved.insert(pointer.to_string(), Arc::clone(&cached));
                return Ok(cached);
            }
            if chain.contains(&next) {
                return Err(ResolveError::CircularReference {
                    pointer: pointer.to_string(),
                });
            }
            chain.push(next);
            node = navigate_pointer(root, next)?;
        }

        let node = Arc::new(node.clone());
        self.resolved.insert(pointer.to_string(), Arc::clone(&node));
        Ok(node)
    }

    /// True iff the node carries a `$ref` key.
    pub fn should_resolve_reference(node: &Value) -> bool {
        node.get("$ref").is_some()
    }

    /// True iff the link declares a `targetSchema`.
    pub fn has_target_schema(link: &Value) -> bool {
        link.get("targetSchema").is_some()
    }

    /// Dereference the direct members of a `properties` map.
    ///
    /// Members' own nested properties are left as they are, except for a
    /// member pointing at a resource, which gets the materialized resource.
    pub fn visit_properties(
        &mut self,
        properties: &Map<String, Value>,
    ) -> Result<Map<String, Value>, ResolveError> {
        let mut result = Map::new();
        for (name, property) in properties {
            let resolved = if Self::should_resolve_reference(property) {
                let pointer = reference_of(property)?;
                let node = if self.resource_pointers.contains(pointer)
                    && !self.in_progress.contains(pointer)
                {
                    self.materialize_pointer(pointer, pointer)?
                } else {
                    self.resolve_reference(pointer)?
                };
                node.as_ref().clone()
            } else {
                property.clone()
            };
            result.insert(name.clone(), resolved);
        }
        Ok(result)
    }

    /// Wrap each link of a resource, resolving its `targetSchema` first.
    pub fn visit_links(
        &mut self,
        resource: &Arc<Value>,
        path: &str,
    ) -> Result<Vec<Link>, ResolveError> {
        let links = match resource.get("links") {
            None => return Ok(Vec::new()),
            Some(Value::Array(links)) => links,
            Some(other) => {
                return Err(ResolveError::InvalidDocument {
                    message: format!("{} must be an array, got {}", path, json_type_name(other)),
                })
            }
        };

        let mut result = Vec::with_capacity(links.len());
        for (index, link) in links.iter().enumerate() {
            let mut raw = link.clone();
            if let (Some(target), Value::Object(fields)) = (link.get("targetSchema"), &mut raw) {
                let target_path = format!("{}[{}]/targetSchema", path, index);
                let resolved = self.visit_target_schema(target, &target_path)?;
                fields.insert("targetSchema".to_string(), resolved);
            }
            result.push(Link::new(raw, Some(Arc::clone(resource))));
        }
        Ok(result)
    }

    /// Resolve a target schema subtree.
    ///
    /// Object schemas are visited property by property, array schemas
    /// through `items`, and `$ref` nodes are replaced by their target. Any
    /// other node is assumed to be concrete: it is kept unchanged and a
    /// warning is recorded for `path`.
    pub fn visit_target_schema(&mut self, schema: &Value, path: &str) -> Result<Value, ResolveError> {
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            let mut visited = Map::new();
            for (key, property) in properties {
                let property_path = format!("{}/properties/{}", path, key);
                visited.insert(key.clone(), self.visit_target_schema(property, &property_path)?);
            }
            let mut node = schema.clone();
            node["properties"] = Value::Object(visited);
            return Ok(node);
        }

        if let Some(items) = schema.get("items") {
            let items = self.visit_target_schema(items, &format!("{}/items", path))?;
            let mut node = schema.clone();
            node["items"] = items;
            return Ok(node);
        }

        if Self::should_resolve_reference(schema) {
            let node = self.resolve_reference(reference_of(schema)?)?;
            return Ok(node.as_ref().clone());
        }

        tracing::warn!(path = %path, "invalid target schema, passing it through unchanged");
        self.diagnostics.push(Diagnostic::new(
            INVALID_TARGET_SCHEMA,
            path,
            "target schema has no properties, items or $ref; assuming it is concrete",
        ));
        Ok(schema.clone())
    }

    /// Warnings recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the visitor, keeping its warnings.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn visit_resource(&mut self, name: &str, entry: &Value) -> Result<Arc<Value>, ResolveError> {
        if !Self::should_resolve_reference(entry) {
            return Ok(Arc::new(self.materialize(name, entry)?));
        }

        self.materialize_pointer(name, reference_of(entry)?)
    }

    /// Materialize the resource behind `pointer` once.
    ///
    /// A resource reaching itself through its own properties gets the
    /// unmaterialized node at that point.
    fn materialize_pointer(&mut self, name: &str, pointer: &str) -> Result<Arc<Value>, ResolveError> {
        if let Some(resource) = self.materialized.get(pointer) {
            return Ok(Arc::clone(resource));
        }

        let node = self.resolve_reference(pointer)?;
        self.in_progress.insert(pointer.to_string());
        let materialized = self.materialize(name, &node);
        self.in_progress.remove(pointer);
        let resource = Arc::new(materialized?);

        // Later lookups of this pointer see the resource with its properties resolved.
        self.resolved.insert(pointer.to_string(), Arc::clone(&resource));
        self.materialized.insert(pointer.to_string(), Arc::clone(&resource));
        Ok(resource)
    }

    fn materialize(&mut self, name: &str, node: &Value) -> Result<Value, ResolveError> {
        let Value::Object(fields) = node else {
            return Err(ResolveError::InvalidDocument {
                message: format!(
                    "resource \"{}\" must be an object, got {}",
                    name,
                    json_type_name(node)
                ),
            });
        };

        let properties = match fields.get("properties") {
            Some(Value::Object(properties)) => self.visit_properties(properties)?,
            _ => Map::new(),
        };

        let mut resource = fields.clone();
        resource.insert("properties".to_string(), Value::Object(properties));
        Ok(Value::Object(resource))
    }
}

/// The pointer carried by a `$ref` node.
fn reference_of(node: &Value) -> Result<&str, ResolveError> {
    match node.get("$ref") {
        Some(Value::String(pointer)) => Ok(pointer),
        Some(other) => Err(ResolveError::InvalidReference {
            pointer: other.to_string(),
            message: format!("expected string, got {}", json_type_name(other)),
        }),
        None => Err(ResolveError::InvalidReference {
            pointer: String::new(),
            message: "node has no $ref".to_string(),
        }),
    }
}

/// Walk `#/a/b/c` as mapping lookups from `root`.
///
/// Segments are taken literally; array indices are not supported.
fn navigate_pointer<'v>(root: &'v Value, pointer: &str) -> Result<&'v Value, ResolveError> {
    let path = pointer
        .strip_prefix("#/")
        .ok_or_else(|| ResolveError::InvalidReference {
            pointer: pointer.to_string(),
            message: "expected a local pointer starting with \"#/\"".to_string(),
        })?;

    path.split('/').try_fold(root, |current, segment| {
        current
            .as_object()
            .and_then(|fields| fields.get(segment))
            .ok_or_else(|| ResolveError::UnresolvableReference {
                pointer: pointer.to_string(),
                segment: segment.to_string(),
            })
    })
}
