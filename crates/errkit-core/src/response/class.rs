//! HTTP status classes and the named responses built on them.

use std::collections::BTreeMap;

use http::StatusCode;
use serde_json::{Map, Value};

use super::{ErrorCode, ErrorResponse};
use crate::chain::BoxError;
use crate::context::TraceContext;

/// A family of responses sharing one HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorClass(StatusCode);

impl ErrorClass {
    // 4xx
    pub const BAD_REQUEST: ErrorClass = ErrorClass(StatusCode::BAD_REQUEST);
    pub const UNAUTHORIZED: ErrorClass = ErrorClass(StatusCode::UNAUTHORIZED);
    pub const FORBIDDEN: ErrorClass = ErrorClass(StatusCode::FORBIDDEN);
    pub const NOT_FOUND: ErrorClass = ErrorClass(StatusCode::NOT_FOUND);
    pub const CONFLICT: ErrorClass = ErrorClass(StatusCode::CONFLICT);
    pub const UNPROCESSABLE_ENTITY: ErrorClass = ErrorClass(StatusCode::UNPROCESSABLE_ENTITY);
    pub const TOO_MANY_REQUESTS: ErrorClass = ErrorClass(StatusCode::TOO_MANY_REQUESTS);

    // 5xx
    pub const INTERNAL_SERVER_ERROR: ErrorClass = ErrorClass(StatusCode::INTERNAL_SERVER_ERROR);
    pub const NOT_IMPLEMENTED: ErrorClass = ErrorClass(StatusCode::NOT_IMPLEMENTED);
    pub const BAD_GATEWAY: ErrorClass = ErrorClass(StatusCode::BAD_GATEWAY);
    pub const SERVICE_UNAVAILABLE: ErrorClass = ErrorClass(StatusCode::SERVICE_UNAVAILABLE);
    pub const GATEWAY_TIMEOUT: ErrorClass = ErrorClass(StatusCode::GATEWAY_TIMEOUT);

    const NAMED: [ErrorClass; 12] = [
        ErrorClass::BAD_REQUEST,
        ErrorClass::UNAUTHORIZED,
        ErrorClass::FORBIDDEN,
        ErrorClass::NOT_FOUND,
        ErrorClass::CONFLICT,
        ErrorClass::UNPROCESSABLE_ENTITY,
        ErrorClass::TOO_MANY_REQUESTS,
        ErrorClass::INTERNAL_SERVER_ERROR,
        ErrorClass::NOT_IMPLEMENTED,
        ErrorClass::BAD_GATEWAY,
        ErrorClass::SERVICE_UNAVAILABLE,
        ErrorClass::GATEWAY_TIMEOUT,
    ];

    /// Routes a numeric status to one of the named classes above. Any other
    /// status, including unlisted 4xx/5xx codes, is logged and treated as an
    /// internal server error.
    pub fn from_status(status: u16) -> ErrorClass {
        match Self::NAMED
            .iter()
            .copied()
            .find(|class| class.0.as_u16() == status)
        {
            Some(class) => class,
            None => {
                tracing::error!(
                    status,
                    "unable to retrieve error class from status, falling back to internal server error"
                );
                ErrorClass::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.0
    }

    /// Builds a response of this class, stamping the context's trace id.
    pub fn build(
        self,
        ctx: &TraceContext,
        code: impl Into<ErrorCode>,
        message: impl Into<String>,
    ) -> ErrorResponse {
        ErrorResponse::new(ctx.trace_id(), self.0, code, message)
    }
}

// Client errors

pub fn invalid_json_error(ctx: &TraceContext, err: impl Into<BoxError>) -> ErrorResponse {
    let err: BoxError = err.into();
    let mut source = Map::new();
    source.insert("source".to_string(), Value::from(err.to_string()));
    ErrorClass::BAD_REQUEST
        .build(ctx, "invalid_json_error", "The request is not a valid json.")
        .with_detail("errors", source)
        .with_cause(err)
}

pub fn missing_body_error(ctx: &TraceContext) -> ErrorResponse {
    ErrorClass::BAD_REQUEST.build(ctx, "missing_body_error", "The request body is missing.")
}

pub fn bad_request_error(ctx: &TraceContext, message: impl Into<String>) -> ErrorResponse {
    ErrorClass::BAD_REQUEST.build(ctx, "bad_request_error", message)
}

pub fn not_found_error(ctx: &TraceContext, message: impl Into<String>) -> ErrorResponse {
    ErrorClass::NOT_FOUND.build(ctx, "not_found_error", message)
}

/// `errors` maps each offending field to its validation messages.
pub fn request_validation_error(
    ctx: &TraceContext,
    errors: BTreeMap<String, Vec<String>>,
) -> ErrorResponse {
    let errors: Map<String, Value> = errors
        .into_iter()
        .map(|(field, messages)| (field, Value::from(messages)))
        .collect();
    ErrorClass::BAD_REQUEST
        .build(ctx, "request_validation_error", "The request is invalid.")
        .with_detail("errors", errors)
}

// Server errors

/// A downstream service could not be reached. The service name is only
/// logged; it never reaches the client.
pub fn service_unavailable_error(
    ctx: &TraceContext,
    cause: impl Into<BoxError>,
    service_name: &str,
) -> ErrorResponse {
    tracing::debug!(service = service_name, "downstream service unavailable");
    ErrorClass::BAD_GATEWAY
        .build(
            ctx,
            "service_unavailable",
            "The service you are requesting is not currently available.",
        )
        .with_cause(cause)
}

pub fn unexpected_error(ctx: &TraceContext, cause: impl Into<BoxError>) -> ErrorResponse {
    ErrorClass::INTERNAL_SERVER_ERROR
        .build(ctx, "unexpected_error", "An unexpected error occurred.")
        .with_cause(cause)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> TraceContext {
        TraceContext::new().with_trace_id(7)
    }

    #[test]
    fn from_status_known_classes() {
        assert_eq!(ErrorClass::from_status(404), ErrorClass::NOT_FOUND);
        assert_eq!(ErrorClass::from_status(429), ErrorClass::TOO_MANY_REQUESTS);
        assert_eq!(ErrorClass::from_status(503), ErrorClass::SERVICE_UNAVAILABLE);
        assert_eq!(ErrorClass::from_status(504), ErrorClass::GATEWAY_TIMEOUT);
    }

    #[test]
    fn from_status_falls_back_to_500() {
        assert_eq!(ErrorClass::from_status(200), ErrorClass::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorClass::from_status(302), ErrorClass::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorClass::from_status(42), ErrorClass::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unlisted_error_statuses_fall_back_to_500() {
        assert_eq!(ErrorClass::from_status(418), ErrorClass::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorClass::from_status(499), ErrorClass::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorClass::from_status(599), ErrorClass::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_json_carries_source_detail() {
        let resp = invalid_json_error(&ctx(), "expected value at line 1");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.code().as_str(), "invalid_json_error");
        assert_eq!(
            resp.details()["errors"],
            json!({"source": "expected value at line 1"})
        );
        assert!(resp.cause().is_some());
    }

    #[test]
    fn request_validation_lists_fields() {
        let mut errors = BTreeMap::new();
        errors.insert("name".to_string(), vec!["is required".to_string()]);
        let resp = request_validation_error(&ctx(), errors);
        assert_eq!(resp.details()["errors"], json!({"name": ["is required"]}));
        assert_eq!(resp.trace_id(), format!("{:032x}", 7));
    }

    #[test]
    fn unexpected_error_is_500_without_leaking_cause() {
        let resp = unexpected_error(&ctx(), "db password rejected");
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.message(), "An unexpected error occurred.");
        assert!(!resp.to_json().unwrap().contains("password"));
    }

    #[test]
    fn simple_client_errors() {
        let resp = not_found_error(&ctx(), "no such block");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.message(), "no such block");
        assert!(resp.details().is_empty());

        let resp = bad_request_error(&ctx(), "limit too large");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.code().as_str(), "bad_request_error");
    }

    #[test]
    fn service_unavailable_is_bad_gateway() {
        let resp = service_unavailable_error(&ctx(), "connection refused", "blocks");
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(resp.code().as_str(), "service_unavailable");
    }
}
