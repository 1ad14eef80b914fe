//! HTTP mock server serving a compiled route table.
//!
//! Requires the `server` feature (enabled by default).

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::error::RouteError;
use crate::routes::{Route, RouteTable};
use crate::types::HttpMethod;

/// The axum method filter registering a route under `method`.
pub fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Delete => MethodFilter::DELETE,
        HttpMethod::Head => MethodFilter::HEAD,
        HttpMethod::Options => MethodFilter::OPTIONS,
        HttpMethod::Trace => MethodFilter::TRACE,
    }
}

/// Build a router answering every route with its precomputed response.
///
/// Routes sharing a path are merged into one method router. Requests are
/// traced through `tower_http::trace::TraceLayer`.
///
/// # Errors
///
/// Returns `RouteError` when a route's content type or status cannot be
/// sent over HTTP.
pub fn build_router(table: &RouteTable) -> Result<Router, RouteError> {
    let mut router = Router::new();
    for route in table.routes() {
        router = router.route(&route.path, method_router(route)?);
    }
    Ok(router.layer(TraceLayer::new_for_http()))
}

fn method_router(route: &Route) -> Result<MethodRouter, RouteError> {
    let status = StatusCode::from_u16(route.status).map_err(|_| RouteError::InvalidStatus {
        status: route.status,
        resource: route.resource.clone(),
        index: route.index,
    })?;
    let content_type =
        HeaderValue::from_str(&route.content_type).map_err(|_| RouteError::InvalidContentType {
            content_type: route.content_type.clone(),
            resource: route.resource.clone(),
            index: route.index,
        })?;
    let body = Bytes::from(route.body.clone());

    Ok(on(method_filter(route.method), move || {
        let content_type = content_type.clone();
        let body = body.clone();
        async move { (status, [(CONTENT_TYPE, content_type)], body) }
    }))
}

/// Serve `router` on `addr` until the process is stopped.
pub async fn serve(router: Router, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("mock server started http://{}", listener.local_addr()?);
    axum::serve(listener, router).await
}
