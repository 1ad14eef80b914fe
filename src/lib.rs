//! Hyper-Schema Mock
//!
//! Compiles a JSON Hyper-Schema document into a set of mock HTTP responses.
//!
//! Each resource under the document's top-level `properties` declares
//! `links`. For every link this library resolves internal `$ref` pointers,
//! works out the route (path, method, content type, status) and synthesizes
//! an example body from the `example` values in the response schema.
//!
//! # Example
//!
//! ```
//! use hyperschema_mock::{compile_routes, HttpMethod, SchemaDocument};
//! use serde_json::json;
//!
//! let raw = json!({
//!     "definitions": {
//!         "user": {
//!             "definitions": {
//!                 "id": { "example": 10001, "type": ["number"] },
//!                 "name": { "example": "alice", "type": ["string"] }
//!             },
//!             "properties": {
//!                 "id": { "$ref": "#/definitions/user/definitions/id" },
//!                 "name": { "$ref": "#/definitions/user/definitions/name" }
//!             },
//!             "links": [
//!                 { "href": "/users", "method": "GET", "rel": "instances" },
//!                 {
//!                     "href": "/users/{(%23%2Fdefinitions%2Fuser%2Fdefinitions%2Fid)}",
//!                     "method": "DELETE",
//!                     "mediaType": "null"
//!                 }
//!             ]
//!         }
//!     },
//!     "properties": { "user": { "$ref": "#/definitions/user" } }
//! });
//!
//! let document = SchemaDocument::load(&raw).unwrap();
//! let routes = compile_routes(&document).unwrap();
//!
//! let list = routes.find(HttpMethod::Get, "/users").unwrap();
//! assert_eq!(list.status, 200);
//! assert_eq!(list.body, r#"[{"id":10001,"name":"alice"}]"#);
//!
//! let delete = routes.find(HttpMethod::Delete, "/users/:id").unwrap();
//! assert_eq!(delete.status, 204);
//! ```
//!
//! # Example Synthesis
//!
//! | Property schema | Synthesized value |
//! |-----------------|-------------------|
//! | has `properties` | object built from the nested properties |
//! | has `example` | the example, verbatim (even `null`, `0`, `false`) |
//! | `type` includes `"null"` | `null` |
//! | `type` includes `"array"` | `[items.example]` or `[object from items.properties]` |
//! | anything else | error: `No example found for "<key>" at [<path>]` |

mod document;
mod error;
mod link;
mod loader;
mod routes;
#[cfg(feature = "server")]
mod server;
mod types;
mod visitor;

pub use document::{ResolvedResource, SchemaDocument};
pub use error::{ResolveError, RouteError, SynthesisError};
pub use link::Link;
pub use loader::{is_url, load_document, load_document_auto, load_document_str};
pub use routes::{compile_route, compile_routes, Route, RouteTable};
pub use types::{
    json_type_name, Diagnostic, HttpMethod, DEFAULT_CONTENT_TYPE, INSTANCES_REL,
    INVALID_TARGET_SCHEMA, NULL_MEDIA_TYPE, ROOT_PATH, SHADOWED_ROUTE,
};
pub use visitor::Visitor;

#[cfg(feature = "remote")]
pub use loader::load_document_url;

#[cfg(feature = "server")]
pub use server::{build_router, method_filter, serve};
