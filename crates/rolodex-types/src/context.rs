use std::fmt;

use uuid::Uuid;

/// Context value threaded through every repository and service call.
///
/// Carries only a request identifier used to correlate log lines. It has no
/// cancellation semantics: a started write always runs to completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
    request_id: String,
}

impl RequestContext {
    /// Create a context with a freshly generated (UUID v7) request id.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::now_v7().to_string(),
        }
    }

    /// Adopt an externally supplied request id, e.g. from `x-request-id`.
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req:{}", self.request_id)
    }
}
