//! Route compilation - turns resolved links into precomputed HTTP routes.
//!
//! Every link body is synthesized here, before anything is served, so a
//! schema that cannot produce an example fails at startup rather than on
//! the first request.

use std::collections::HashMap;

use serde::Serialize;

use crate::document::SchemaDocument;
use crate::error::RouteError;
use crate::link::Link;
use crate::types::{Diagnostic, HttpMethod, SHADOWED_ROUTE};

/// A fully precomputed response for one (method, path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Owning resource name.
    pub resource: String,
    /// Index of the link within the resource.
    pub index: usize,
    pub method: HttpMethod,
    pub path: String,
    pub content_type: String,
    pub status: u16,
    pub body: String,
}

/// Routes in registration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteTable {
    routes: Vec<Route>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<Diagnostic>,
}

impl RouteTable {
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Shadowed routes found while compiling.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn find(&self, method: HttpMethod, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|route| route.method == method && route.path == path)
    }
}

/// Compile every link of every resource, in document order.
///
/// A later link with the same method and path as an earlier one is
/// shadowed: it is still synthesized (so its errors surface) but dropped
/// from the table with a warning.
///
/// # Errors
///
/// Returns `RouteError` for a link whose body cannot be synthesized, whose
/// method is unsupported, or whose path cannot be registered.
pub fn compile_routes(document: &SchemaDocument) -> Result<RouteTable, RouteError> {
    let mut table = RouteTable::default();
    let mut shapes: HashMap<String, String> = HashMap::new();

    for (name, resource) in document.resources() {
        for (index, link) in resource.links().iter().enumerate() {
            let route = compile_route(name, index, link)?;

            if let Some(existing) = table.find(route.method, &route.path) {
                let message = format!(
                    "{} {} is already served by definitions.{}.links[{}]",
                    route.method, route.path, existing.resource, existing.index
                );
                tracing::warn!(resource = %name, index, "{}", message);
                table.diagnostics.push(Diagnostic::new(
                    SHADOWED_ROUTE,
                    format!("definitions.{}.links[{}]", name, index),
                    message,
                ));
                continue;
            }

            let existing = shapes
                .entry(path_shape(&route.path))
                .or_insert_with(|| route.path.clone());
            if *existing != route.path {
                return Err(RouteError::ConflictingPath {
                    path: route.path,
                    existing: existing.clone(),
                    resource: name.clone(),
                    index,
                });
            }

            tracing::debug!(
                method = %route.method,
                path = %route.path,
                status = route.status,
                "compiled route"
            );
            table.routes.push(route);
        }
    }

    Ok(table)
}

/// Compile a single link.
pub fn compile_route(resource: &str, index: usize, link: &Link) -> Result<Route, RouteError> {
    let body = link
        .response_body()
        .map_err(|source| RouteError::Synthesis {
            resource: resource.to_string(),
            index,
            source,
        })?;

    let method = HttpMethod::parse(link.method()).ok_or_else(|| RouteError::UnsupportedMethod {
        method: link.method().to_string(),
        resource: resource.to_string(),
        index,
    })?;

    let path = link.href();
    if let Err(reason) = check_path(&path) {
        return Err(RouteError::InvalidPath {
            path,
            reason,
            resource: resource.to_string(),
            index,
        });
    }

    Ok(Route {
        resource: resource.to_string(),
        index,
        method,
        path,
        content_type: link.content_type().to_string(),
        status: link.response_status(),
        body,
    })
}

/// Reject paths the router cannot register.
///
/// A parameter must fill a whole segment and carry a name. Wildcards are
/// not served.
fn check_path(path: &str) -> Result<(), String> {
    if !path.starts_with('/') {
        return Err("must start with '/'".to_string());
    }
    for segment in path.split('/') {
        if segment.contains('*') {
            return Err(format!("wildcard segment \"{}\" is not supported", segment));
        }
        match segment.strip_prefix(':') {
            Some("") => return Err("path parameter has no name".to_string()),
            Some(name) if name.contains(':') => {
                return Err(format!("segment \"{}\" holds more than one parameter", segment))
            }
            Some(_) => {}
            None if segment.contains(':') => {
                return Err(format!("parameter must start segment \"{}\"", segment))
            }
            None => {}
        }
    }
    Ok(())
}

/// Path with parameter names erased: `/users/:id` -> `/users/:`.
fn path_shape(path: &str) -> String {
    path.split('/')
        .map(|segment| if segment.starts_with(':') { ":" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}
