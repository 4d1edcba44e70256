//! Explicit request context passed into every bundle.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a 22-character URL-safe request identifier.
///
/// The identifier is the unpadded URL-safe base64 encoding of a random v4
/// UUID.
pub fn generate_request_id() -> String {
    URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
}

/// Tracing context for one composition call.
///
/// Each plugin receives a copy in its bundle; the container never reads it
/// from process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    request_id: String,
}

impl TraceContext {
    /// Creates a context with a freshly generated request id.
    pub fn generate() -> Self {
        Self {
            request_id: generate_request_id(),
        }
    }

    /// Creates a context with the given request id.
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    /// Returns the request id.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::generate()
    }
}
