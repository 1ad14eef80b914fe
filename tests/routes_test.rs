//! Integration tests for route compilation.

use hyperschema_mock::{compile_routes, HttpMethod, RouteError, SchemaDocument, SHADOWED_ROUTE};
use serde_json::{json, Value};

fn document(raw: Value) -> SchemaDocument {
    SchemaDocument::load(&raw).unwrap()
}

fn app_schema() -> Value {
    json!({
        "definitions": {
            "app": {
                "definitions": {
                    "id": { "example": "01234567-89ab-cdef-0123-456789abcdef", "type": ["string"] },
                    "name": { "example": "example", "type": ["string"] }
                },
                "properties": {
                    "id": { "$ref": "#/definitions/app/definitions/id" },
                    "name": { "$ref": "#/definitions/app/definitions/name" }
                },
                "links": [
                    { "href": "/apps", "method": "POST", "rel": "create" },
                    { "href": "/apps", "method": "GET", "rel": "instances" },
                    {
                        "href": "/apps/{(%23%2Fdefinitions%2Fapp%2Fdefinitions%2Fid)}",
                        "method": "PATCH",
                        "encType": "application/merge-patch+json",
                        "rel": "update"
                    },
                    {
                        "href": "/apps/{(%23%2Fdefinitions%2Fapp%2Fdefinitions%2Fid)}",
                        "method": "DELETE",
                        "mediaType": "null",
                        "rel": "destroy"
                    }
                ]
            },
            "status": {
                "properties": { "ok": { "example": true } },
                "links": [{ "href": "/status", "method": "get" }]
            }
        },
        "properties": {
            "app": { "$ref": "#/definitions/app" },
            "status": { "$ref": "#/definitions/status" }
        }
    })
}

mod compile {
    use super::*;

    #[test]
    fn routes_follow_document_order() {
        let table = compile_routes(&document(app_schema())).unwrap();
        let order: Vec<(HttpMethod, &str)> = table
            .routes()
            .iter()
            .map(|r| (r.method, r.path.as_str()))
            .collect();
        assert_eq!(
            order,
            [
                (HttpMethod::Post, "/apps"),
                (HttpMethod::Get, "/apps"),
                (HttpMethod::Patch, "/apps/:id"),
                (HttpMethod::Delete, "/apps/:id"),
                (HttpMethod::Get, "/status"),
            ]
        );
        assert!(table.diagnostics().is_empty());
    }

    #[test]
    fn route_attributes() {
        let table = compile_routes(&document(app_schema())).unwrap();

        let create = table.find(HttpMethod::Post, "/apps").unwrap();
        assert_eq!(create.status, 201);
        assert_eq!(create.content_type, "application/json");
        assert_eq!(
            create.body,
            r#"{"id":"01234567-89ab-cdef-0123-456789abcdef","name":"example"}"#
        );

        let list = table.find(HttpMethod::Get, "/apps").unwrap();
        assert_eq!(list.status, 200);
        assert!(list.body.starts_with('['));

        let update = table.find(HttpMethod::Patch, "/apps/:id").unwrap();
        assert_eq!(update.content_type, "application/merge-patch+json");

        let delete = table.find(HttpMethod::Delete, "/apps/:id").unwrap();
        assert_eq!(delete.status, 204);
        assert_eq!((delete.resource.as_str(), delete.index), ("app", 3));
    }

    #[test]
    fn lower_case_method_is_accepted() {
        let table = compile_routes(&document(app_schema())).unwrap();
        let status = table.find(HttpMethod::Get, "/status").unwrap();
        assert_eq!(status.body, r#"{"ok":true}"#);
    }

    #[test]
    fn route_serializes_lower_case_method() {
        let table = compile_routes(&document(app_schema())).unwrap();
        let value = serde_json::to_value(&table.routes()[0]).unwrap();
        assert_eq!(value["method"], "post");
        assert_eq!(value["path"], "/apps");
        assert_eq!(value["status"], 201);
    }

    #[test]
    fn empty_document_has_no_routes() {
        let table = compile_routes(&document(json!({ "properties": {} }))).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }
}

mod shadowing {
    use super::*;

    #[test]
    fn first_registration_wins() {
        let raw = json!({
            "properties": {
                "user": {
                    "properties": { "name": { "example": "first" } },
                    "links": [{ "href": "/me", "method": "GET" }]
                },
                "account": {
                    "properties": { "name": { "example": "second" } },
                    "links": [{ "href": "/me", "method": "GET" }]
                }
            }
        });
        let table = compile_routes(&document(raw)).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.routes()[0].body, r#"{"name":"first"}"#);

        let diagnostics = table.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, SHADOWED_ROUTE);
        assert_eq!(diagnostics[0].path, "definitions.account.links[0]");
        assert!(diagnostics[0].message.contains("definitions.user.links[0]"));
    }

    #[test]
    fn shadowed_link_is_still_synthesized() {
        let raw = json!({
            "properties": {
                "user": {
                    "properties": { "name": { "example": "first" } },
                    "links": [
                        { "href": "/me", "method": "GET" },
                        {
                            "href": "/me",
                            "method": "GET",
                            "targetSchema": { "properties": { "nick": { "type": "string" } } }
                        }
                    ]
                }
            }
        });
        let err = compile_routes(&document(raw)).unwrap_err();
        assert!(matches!(err, RouteError::Synthesis { index: 1, .. }));
    }
}

mod errors {
    use super::*;

    #[test]
    fn unsupported_method() {
        let raw = json!({
            "properties": {
                "user": { "links": [{ "href": "/users", "method": "PURGE" }] }
            }
        });
        let err = compile_routes(&document(raw)).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"unsupported HTTP method "PURGE" at definitions.user.links[0]"#
        );
    }

    #[test]
    fn missing_example_names_link() {
        let raw = json!({
            "properties": {
                "user": {
                    "properties": { "name": { "type": "string" } },
                    "links": [
                        { "href": "/users", "method": "GET", "mediaType": "null" },
                        { "href": "/users", "method": "POST" }
                    ]
                }
            }
        });
        let err = compile_routes(&document(raw)).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"No example found for "name" at [.] at definitions.user.links[0]"#
        );
    }

    #[test]
    fn unregistrable_paths_are_errors() {
        for href in ["/files/*", "/users/{()}"] {
            let raw = json!({
                "properties": {
                    "user": { "links": [{ "href": href, "method": "GET" }] }
                }
            });
            let err = compile_routes(&document(raw)).unwrap_err();
            assert!(matches!(err, RouteError::InvalidPath { index: 0, .. }), "{}", href);
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn conflicting_parameter_names() {
        let raw = json!({
            "properties": {
                "user": {
                    "links": [
                        { "href": "/users/:id", "method": "GET" },
                        { "href": "/users/:user_id", "method": "DELETE" }
                    ]
                }
            }
        });
        let err = compile_routes(&document(raw)).unwrap_err();
        assert!(matches!(
            err,
            RouteError::ConflictingPath { path, existing, .. }
                if path == "/users/:user_id" && existing == "/users/:id"
        ));
    }
}
