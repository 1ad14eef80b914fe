//! Core types shared by the resolver, links and route compilation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content type used when a link declares no `encType`.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// `mediaType` value marking a link without a response body.
pub const NULL_MEDIA_TYPE: &str = "null";

/// `rel` value marking a link that returns a collection.
pub const INSTANCES_REL: &str = "instances";

/// Diagnostic path used for top-level example synthesis.
pub const ROOT_PATH: &str = ".";

/// Diagnostic code for a target-schema node passed through unresolved.
pub const INVALID_TARGET_SCHEMA: &str = "W001";

/// Diagnostic code for a route hidden by an earlier one.
pub const SHADOWED_ROUTE: &str = "W002";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// HTTP methods a link can be registered under.
///
/// Anything outside this set is rejected at route compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    /// Parse a method token, case-insensitively.
    ///
    /// Returns `None` for unknown methods (caller should error).
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "patch" => Some(HttpMethod::Patch),
            "delete" => Some(HttpMethod::Delete),
            "head" => Some(HttpMethod::Head),
            "options" => Some(HttpMethod::Options),
            "trace" => Some(HttpMethod::Trace),
            _ => None,
        }
    }

    /// Lower-case method token.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
            HttpMethod::Trace => "trace",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// A non-fatal finding recorded while resolving or compiling a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: String,
    /// Location of the finding (e.g., "#/properties/user/links[0]/targetSchema").
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)
    }
}
