//! Hyper-schema links and example response synthesis.
//!
//! A [`Link`] wraps one resolved link descriptor together with a handle to
//! the resource schema it belongs to. Everything the HTTP layer needs
//! (path, method, content type, status and body) is derived from it.
//!
//! # Example
//!
//! ```
//! use hyperschema_mock::Link;
//! use serde_json::json;
//!
//! let link = Link::new(
//!     json!({
//!         "href": "/users",
//!         "method": "GET",
//!         "targetSchema": {
//!             "properties": {
//!                 "names": { "items": { "example": "alice" }, "type": "array" }
//!             }
//!         }
//!     }),
//!     None,
//! );
//!
//! assert_eq!(link.response_status(), 200);
//! assert_eq!(link.response_body().unwrap(), r#"{"names":["alice"]}"#);
//! ```

use std::sync::Arc;

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::error::SynthesisError;
use crate::types::{DEFAULT_CONTENT_TYPE, INSTANCES_REL, NULL_MEDIA_TYPE, ROOT_PATH};

/// URI template placeholder, e.g. `{(%23%2Fdefinitions%2Fuser%2Fdefinitions%2Fid)}`.
static HREF_TEMPLATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(.+?)\}").unwrap());

/// One operation on a resource.
#[derive(Debug, Clone)]
pub struct Link {
    raw: Value,
    parent: Option<Arc<Value>>,
}

impl Link {
    /// Wrap a link descriptor whose `targetSchema` is already resolved.
    ///
    /// `parent` is the owning resource schema, used as the response schema
    /// when the link has no `targetSchema`.
    pub fn new(raw: Value, parent: Option<Arc<Value>>) -> Self {
        Self { raw, parent }
    }

    /// The link descriptor as resolved.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The owning resource schema, if any.
    pub fn parent(&self) -> Option<&Value> {
        self.parent.as_deref()
    }

    /// The route path for this link.
    ///
    /// The first `{...}` template is rewritten into a `:name` path parameter,
    /// where `name` is the last segment of the percent-decoded pointer:
    /// `/users/{(%23%2Fdefinitions%2Fuser%2Fdefinitions%2Fid)}` becomes
    /// `/users/:id`. Later templates are left as they are.
    pub fn href(&self) -> String {
        let href = self.str_field("href").unwrap_or_default();
        HREF_TEMPLATE
            .replace(href, |caps: &Captures| {
                let decoded = percent_decode_str(&caps[1]).decode_utf8_lossy();
                let pointer: String = decoded
                    .chars()
                    .filter(|c| !matches!(c, '(' | ')') && !c.is_whitespace())
                    .collect();
                let name = pointer.rsplit('/').next().unwrap_or_default();
                format!(":{}", name)
            })
            .into_owned()
    }

    /// The declared HTTP method, verbatim.
    pub fn method(&self) -> &str {
        self.str_field("method").unwrap_or_default()
    }

    /// `encType`, defaulting to `application/json`.
    pub fn content_type(&self) -> &str {
        self.str_field("encType").unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// The resolved `targetSchema`, if declared.
    pub fn target_schema(&self) -> Option<&Value> {
        self.raw.get("targetSchema")
    }

    /// False only when `mediaType` is the literal string `"null"`.
    pub fn has_response_body(&self) -> bool {
        self.str_field("mediaType") != Some(NULL_MEDIA_TYPE)
    }

    /// `201` for POST regardless of body, otherwise `200` or `204`.
    pub fn response_status(&self) -> u16 {
        if self.method() == "POST" {
            201
        } else if self.has_response_body() {
            200
        } else {
            204
        }
    }

    /// The target schema if declared, otherwise the parent resource.
    pub fn response_schema(&self) -> Option<&Value> {
        self.target_schema().or_else(|| self.parent())
    }

    /// True when the link returns a list of instances.
    pub fn has_list_data(&self) -> bool {
        self.str_field("rel") == Some(INSTANCES_REL)
    }

    /// Synthesize the example object for this link.
    ///
    /// A response schema without `properties` synthesizes `{}`.
    pub fn response_hash(&self) -> Result<Value, SynthesisError> {
        let empty = Map::new();
        let properties = self
            .response_schema()
            .and_then(|schema| schema.get("properties"))
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        Self::generate_response(properties)
    }

    /// The serialized response body.
    pub fn response_body(&self) -> Result<String, SynthesisError> {
        let hash = self.response_hash()?;
        let body = if self.has_list_data() {
            Value::Array(vec![hash])
        } else {
            hash
        };
        Ok(body.to_string())
    }

    /// Build an example object from a `properties` map.
    ///
    /// # Errors
    ///
    /// Returns `SynthesisError::MissingExample` for a property with no
    /// example, no `"null"` type and no array type.
    pub fn generate_response(properties: &Map<String, Value>) -> Result<Value, SynthesisError> {
        Self::generate_response_at(properties, ROOT_PATH)
    }

    /// Like [`Link::generate_response`], reporting errors relative to `path`.
    pub fn generate_response_at(
        properties: &Map<String, Value>,
        path: &str,
    ) -> Result<Value, SynthesisError> {
        let mut result = Map::new();

        for (key, property) in properties {
            let value = if let Some(nested) = property.get("properties").and_then(Value::as_object)
            {
                Self::generate_response_at(nested, &format!("{}/{}/properties", path, key))?
            } else if let Some(example) = property.get("example") {
                example.clone()
            } else if declares_type(property, "null") {
                Value::Null
            } else if declares_type(property, "array") {
                generate_items(property, key, path)?
            } else {
                return Err(SynthesisError::MissingExample {
                    key: key.clone(),
                    path: path.to_string(),
                });
            };
            result.insert(key.clone(), value);
        }

        Ok(Value::Object(result))
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }
}

/// Single-element example array for an array property.
fn generate_items(property: &Value, key: &str, path: &str) -> Result<Value, SynthesisError> {
    let Some(items) = property.get("items") else {
        return Err(SynthesisError::MissingItems {
            key: key.to_string(),
            path: path.to_string(),
        });
    };

    if let Some(example) = items.get("example") {
        return Ok(Value::Array(vec![example.clone()]));
    }

    match items.get("properties").and_then(Value::as_object) {
        Some(nested) => {
            let item_path = format!("{}/{}/items/properties", path, key);
            let item = Link::generate_response_at(nested, &item_path)?;
            Ok(Value::Array(vec![item]))
        }
        None => Err(SynthesisError::MissingExample {
            key: key.to_string(),
            path: format!("{}/{}/items", path, key),
        }),
    }
}

/// Whether `type` (a string or a list of strings) includes `name`.
fn declares_type(property: &Value, name: &str) -> bool {
    match property.get("type") {
        Some(Value::String(t)) => t == name,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(name)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource() -> Arc<Value> {
        Arc::new(json!({
            "type": "object",
            "properties": {
                "id": { "example": 10001, "type": "number" },
                "name": { "example": "alice", "type": "string" }
            }
        }))
    }

    fn names_link() -> Link {
        let parent = resource();
        let target_schema = json!({
            "properties": {
                "names": { "items": parent["properties"]["name"].clone(), "type": "array" }
            },
            "type": "object"
        });
        Link::new(
            json!({ "href": "/users", "method": "GET", "targetSchema": target_schema }),
            Some(parent),
        )
    }

    fn link(raw: Value) -> Link {
        Link::new(raw, Some(resource()))
    }

    // === Route metadata ===

    #[test]
    fn href_plain() {
        assert_eq!(names_link().href(), "/users");
    }

    #[test]
    fn href_rewrites_template() {
        let link = link(json!({
            "href": "/users/{(%23%2Fdefinitions%2Fuser%2Fdefinitions%2Fid)}",
            "method": "GET"
        }));
        assert_eq!(link.href(), "/users/:id");
        assert_eq!(link.href(), link.href());
    }

    #[test]
    fn href_rewrites_only_first_template() {
        let link = link(json!({
            "href": "/teams/{(%23%2Fdefinitions%2Fteam%2Fdefinitions%2Fid)}/users/{(%23%2Fdefinitions%2Fuser%2Fdefinitions%2Fid)}",
            "method": "GET"
        }));
        assert_eq!(
            link.href(),
            "/teams/:id/users/{(%23%2Fdefinitions%2Fuser%2Fdefinitions%2Fid)}"
        );
    }

    #[test]
    fn href_rewrites_plain_template() {
        let link = link(json!({ "href": "/users/{user_id}/posts", "method": "GET" }));
        assert_eq!(link.href(), "/users/:user_id/posts");
    }

    #[test]
    fn href_strips_whitespace_in_template() {
        let link = link(json!({ "href": "/users/{( #/definitions/user/name )}/x" }));
        assert_eq!(link.href(), "/users/:name/x");
    }

    #[test]
    fn method_verbatim() {
        assert_eq!(names_link().method(), "GET");
        assert_eq!(link(json!({ "href": "/a" })).method(), "");
    }

    #[test]
    fn content_type_default_and_declared() {
        assert_eq!(names_link().content_type(), "application/json");
        let link = link(json!({ "href": "/users", "method": "GET", "encType": "text/plain" }));
        assert_eq!(link.content_type(), "text/plain");
    }

    #[test]
    fn has_response_body_depends_on_media_type() {
        assert!(names_link().has_response_body());
        let link = link(json!({ "href": "/users/:id", "method": "DELETE", "mediaType": "null" }));
        assert!(!link.has_response_body());
    }

    #[test]
    fn response_status_rules() {
        let post = link(json!({ "href": "/users", "method": "POST" }));
        assert_eq!(post.response_status(), 201);

        let post_no_body = link(json!({ "href": "/users", "method": "POST", "mediaType": "null" }));
        assert_eq!(post_no_body.response_status(), 201);

        assert_eq!(names_link().response_status(), 200);

        let delete = link(json!({ "href": "/users/:id", "method": "DELETE", "mediaType": "null" }));
        assert_eq!(delete.response_status(), 204);
    }

    #[test]
    fn response_schema_prefers_target_schema() {
        let link = names_link();
        assert_eq!(link.response_schema(), link.target_schema());

        let parent_only = self::link(json!({ "href": "/users", "method": "GET" }));
        assert_eq!(parent_only.response_schema(), Some(&*resource()));
    }

    #[test]
    fn has_list_data_for_instances() {
        let list = link(json!({ "href": "/users", "method": "GET", "rel": "instances" }));
        assert!(list.has_list_data());
        assert!(!names_link().has_list_data());
    }

    // === Bodies ===

    #[test]
    fn response_hash_from_target_schema() {
        let hash = names_link().response_hash().unwrap();
        assert_eq!(hash["names"][0], "alice");
    }

    #[test]
    fn response_body_serialized() {
        assert_eq!(names_link().response_body().unwrap(), r#"{"names":["alice"]}"#);
    }

    #[test]
    fn response_body_wraps_list_data() {
        let list = link(json!({ "href": "/users", "method": "GET", "rel": "instances" }));
        assert_eq!(
            list.response_body().unwrap(),
            r#"[{"id":10001,"name":"alice"}]"#
        );
    }

    #[test]
    fn response_body_round_trips_to_hash() {
        let link = link(json!({ "href": "/users", "method": "GET" }));
        let parsed: Value = serde_json::from_str(&link.response_body().unwrap()).unwrap();
        assert_eq!(parsed, link.response_hash().unwrap());
    }

    #[test]
    fn response_hash_without_properties_is_empty() {
        let link = Link::new(json!({ "href": "/ping", "method": "GET" }), None);
        assert_eq!(link.response_hash().unwrap(), json!({}));
    }

    // === Synthesis ===

    #[test]
    fn generate_response_uses_examples() {
        let result = Link::generate_response(resource()["properties"].as_object().unwrap()).unwrap();
        assert_eq!(result, json!({ "id": 10001, "name": "alice" }));
    }

    #[test]
    fn generate_response_items_with_properties() {
        let user = resource().as_ref().clone();
        let properties = json!({ "users": { "items": user, "type": "array" } });
        let result = Link::generate_response(properties.as_object().unwrap()).unwrap();
        assert_eq!(result, json!({ "users": [{ "id": 10001, "name": "alice" }] }));
    }

    #[test]
    fn generate_response_nested_properties() {
        let properties = json!({
            "user": {
                "properties": { "name": { "example": "hoge", "type": "string" } },
                "type": "object"
            }
        });
        let result = Link::generate_response(properties.as_object().unwrap()).unwrap();
        assert_eq!(result["user"]["name"], "hoge");
    }

    #[test]
    fn generate_response_null_type() {
        let properties = json!({ "group": { "type": ["string", "null"] } });
        let result = Link::generate_response(properties.as_object().unwrap()).unwrap();
        assert_eq!(result, json!({ "group": null }));
    }

    #[test]
    fn generate_response_keeps_falsy_examples() {
        let properties = json!({
            "count": { "example": 0, "type": "integer" },
            "active": { "example": false, "type": "boolean" },
            "note": { "example": null, "type": "string" }
        });
        let result = Link::generate_response(properties.as_object().unwrap()).unwrap();
        assert_eq!(result, json!({ "count": 0, "active": false, "note": null }));
    }

    #[test]
    fn generate_response_nested_items() {
        let properties = json!({
            "user": {
                "properties": {
                    "names": { "items": { "example": "hoge", "type": "string" }, "type": "array" }
                },
                "type": "object"
            }
        });
        let result = Link::generate_response(properties.as_object().unwrap()).unwrap();
        assert_eq!(result["user"]["names"][0], "hoge");
    }

    #[test]
    fn generate_response_missing_example_at_root() {
        let properties = json!({ "name": { "type": "string" } });
        let err = Link::generate_response(properties.as_object().unwrap()).unwrap_err();
        assert_eq!(err.to_string(), r#"No example found for "name" at [.]"#);
    }

    #[test]
    fn generate_response_missing_example_nested_path() {
        let properties = json!({
            "user": { "properties": { "name": { "type": "string" } }, "type": "object" }
        });
        let err = Link::generate_response(properties.as_object().unwrap()).unwrap_err();
        assert_eq!(
            err,
            SynthesisError::MissingExample {
                key: "name".into(),
                path: "./user/properties".into(),
            }
        );
    }

    #[test]
    fn generate_response_array_without_items() {
        let properties = json!({ "tags": { "type": "array" } });
        let err = Link::generate_response(properties.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, SynthesisError::MissingItems { key, .. } if key == "tags"));
    }

    #[test]
    fn generate_response_items_without_example_or_properties() {
        let properties = json!({ "tags": { "type": "array", "items": { "type": "string" } } });
        let err = Link::generate_response(properties.as_object().unwrap()).unwrap_err();
        assert_eq!(err.to_string(), r#"No example found for "tags" at [./tags/items]"#);
    }
}
