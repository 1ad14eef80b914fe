//! Error types for hyper-schema resolution, example synthesis and route compilation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a document or resolving its `$ref` pointers.
#[derive(Debug, Error)]
pub enum ResolveError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    // Schema errors (exit code 2)
    #[error("invalid hyper-schema document: {message}")]
    InvalidDocument { message: String },

    #[error("invalid $ref \"{pointer}\": {message}")]
    InvalidReference { pointer: String, message: String },

    #[error("cannot resolve $ref \"{pointer}\": no \"{segment}\" along the path")]
    UnresolvableReference { pointer: String, segment: String },

    #[error("circular $ref chain starting at \"{pointer}\"")]
    CircularReference { pointer: String },
}

impl ResolveError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ResolveError::FileNotFound { .. } | ResolveError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            ResolveError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors while synthesizing an example response from a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("No example found for \"{key}\" at [{path}]")]
    MissingExample { key: String, path: String },

    #[error("Array property \"{key}\" has no items at [{path}]")]
    MissingItems { key: String, path: String },
}

/// Errors while compiling links into routes.
///
/// Every variant that stems from a single link carries the owning resource
/// and the link index so the schema location can be found.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("{source} at definitions.{resource}.links[{index}]")]
    Synthesis {
        resource: String,
        index: usize,
        #[source]
        source: SynthesisError,
    },

    #[error("unsupported HTTP method \"{method}\" at definitions.{resource}.links[{index}]")]
    UnsupportedMethod {
        method: String,
        resource: String,
        index: usize,
    },

    #[error("invalid route path \"{path}\" at definitions.{resource}.links[{index}]: {reason}")]
    InvalidPath {
        path: String,
        reason: String,
        resource: String,
        index: usize,
    },

    #[error("route path \"{path}\" conflicts with \"{existing}\" at definitions.{resource}.links[{index}]")]
    ConflictingPath {
        path: String,
        existing: String,
        resource: String,
        index: usize,
    },

    #[error("invalid content type \"{content_type}\" at definitions.{resource}.links[{index}]")]
    InvalidContentType {
        content_type: String,
        resource: String,
        index: usize,
    },

    #[error("invalid response status {status} at definitions.{resource}.links[{index}]")]
    InvalidStatus {
        status: u16,
        resource: String,
        index: usize,
    },
}

impl RouteError {
    /// Returns the exit code for this error type.
    ///
    /// All route errors are schema authoring errors.
    pub fn exit_code(&self) -> i32 {
        2
    }
}
