//! Hyper-schema document loading.
//!
//! A document comes from a file, a string, or (with the `remote` feature) an
//! HTTP/HTTPS URL. `$ref`s inside the document are never fetched.

use std::path::Path;

use serde_json::Value;

use crate::error::ResolveError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for fetching a document (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a document from a file path.
///
/// # Errors
///
/// Returns `ResolveError::FileNotFound` if the file doesn't exist,
/// or `ResolveError::InvalidJson` if the file isn't valid JSON.
pub fn load_document(path: &Path) -> Result<Value, ResolveError> {
    if !path.is_file() {
        return Err(ResolveError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ResolveError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_document_str(&content)
}

/// Parse a document from a JSON string.
pub fn load_document_str(content: &str) -> Result<Value, ResolveError> {
    serde_json::from_str(content).map_err(|source| ResolveError::InvalidJson { source })
}

/// Fetch a document from an HTTP/HTTPS URL.
///
/// Non-2xx responses are reported as `ResolveError::NetworkError`.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, ResolveError> {
    let network_error = |source| ResolveError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    let body = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(network_error)?;

    load_document_str(&body)
}

/// Check if a source names a URL rather than a file.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Load a document from a file path or URL.
///
/// Without the `remote` feature a URL source is reported as a missing file.
pub fn load_document_auto(source: &str) -> Result<Value, ResolveError> {
    if !is_url(source) {
        return load_document(Path::new(source));
    }

    #[cfg(feature = "remote")]
    {
        load_document_url(source)
    }
    #[cfg(not(feature = "remote"))]
    {
        Err(ResolveError::FileNotFound {
            path: std::path::PathBuf::from(source),
        })
    }
}
