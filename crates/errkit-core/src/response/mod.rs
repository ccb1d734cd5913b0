//! Canonical error responses.
//!
//! Any error that reaches a caller is turned into an [`ErrorResponse`]: a
//! short machine-readable code, a status class, the trace id, a
//! human-readable message and optional details. The original error is kept as
//! the response's cause for logging but is never serialized.

mod class;
mod classify;
mod report;

pub use class::{
    bad_request_error, invalid_json_error, missing_body_error, not_found_error,
    request_validation_error, service_unavailable_error, unexpected_error, ErrorClass,
};
pub use classify::{from_rpc_status, to_response};
pub use report::{is_client_side_network_error, report, report_write_failure};

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::{BoxError, SharedError};

/// Machine-readable error category, e.g. `request_validation_error`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(String);

impl ErrorCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized, client-facing representation of an error.
///
/// Serializes as `{"code", "trace_id", "message", "details"?}`; the status
/// and cause stay server-side.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    code: ErrorCode,
    trace_id: String,
    #[serde(skip)]
    status: StatusCode,
    message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    details: BTreeMap<String, Value>,
    #[serde(skip)]
    cause: Option<SharedError>,
}

impl ErrorResponse {
    pub fn new(
        trace_id: impl Into<String>,
        status: StatusCode,
        code: impl Into<ErrorCode>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            trace_id: trace_id.into(),
            status,
            message: message.into(),
            details: BTreeMap::new(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(Arc::from(cause.into()));
        self
    }

    pub fn with_shared_cause(mut self, cause: SharedError) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &BTreeMap<String, Value> {
        &self.details
    }

    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// JSON body handed to the transport layer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl PartialEq for ErrorResponse {
    fn eq(&self, other: &Self) -> bool {
        let same_cause = match (&self.cause, &other.cause) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_cause
            && self.code == other.code
            && self.trace_id == other.trace_id
            && self.status == other.status
            && self.message == other.message
            && self.details == other.details
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code,
            self.status.as_u16(),
            self.message
        )?;
        if let Some(cause) = &self.cause {
            write!(f, " ({})", cause)?;
        }
        if !self.details.is_empty() {
            let details: Vec<String> = self
                .details
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            write!(f, " {{{}}}", details.join(", "))?;
        }
        Ok(())
    }
}

impl Error for ErrorResponse {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}
