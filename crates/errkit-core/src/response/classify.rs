//! Turn an arbitrary error into its canonical response.

use tonic::Code;

use super::class::{not_found_error, unexpected_error, ErrorClass};
use super::ErrorResponse;
use crate::chain::{find_as, BoxError};
use crate::context::TraceContext;

/// Classifies `err` into an [`ErrorResponse`].
///
/// 1. The response closest to the root of the chain wins and is returned as
///    is; application code shaped it on purpose.
/// 2. Otherwise the first RPC status in the chain is mapped by its code.
/// 3. Otherwise the error becomes an `unexpected_error` with `err` as cause.
pub fn to_response(ctx: &TraceContext, err: impl Into<BoxError>) -> ErrorResponse {
    let err: BoxError = err.into();
    let err = match err.downcast::<ErrorResponse>() {
        Ok(response) => return *response,
        Err(err) => err,
    };

    if let Some(response) = find_as::<ErrorResponse>(Some(&*err)) {
        return response.clone();
    }

    if let Some(status) = find_as::<tonic::Status>(Some(&*err)) {
        return from_rpc_status(ctx, status);
    }

    unexpected_error(ctx, err)
}

/// Maps an RPC status to its canonical response.
pub fn from_rpc_status(ctx: &TraceContext, status: &tonic::Status) -> ErrorResponse {
    match status.code() {
        Code::InvalidArgument => {
            ErrorClass::BAD_REQUEST.build(ctx, "request_validation_error", status.message())
        }
        Code::Unavailable => ErrorClass::SERVICE_UNAVAILABLE.build(
            ctx,
            "service_unavailable_error",
            "Service Unavailable",
        ),
        Code::NotFound => not_found_error(ctx, status.message()),
        code => unexpected_error(ctx, tonic::Status::new(code, status.message())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{status, wrap};
    use crate::response::invalid_json_error;
    use http::StatusCode;

    fn ctx() -> TraceContext {
        TraceContext::new().with_trace_id(1)
    }

    #[test]
    fn response_is_returned_unchanged() {
        let original = invalid_json_error(&ctx(), "eof");
        let resp = to_response(&TraceContext::new(), original.clone());
        assert_eq!(resp, original);
    }

    #[test]
    fn nested_response_wins_over_status() {
        let original = invalid_json_error(&ctx(), "eof");
        let err = wrap(original.clone(), "decoding body");
        assert_eq!(to_response(&ctx(), err), original);
    }

    #[test]
    fn outermost_response_wins() {
        let inner = invalid_json_error(&ctx(), "eof");
        let outer = unexpected_error(&ctx(), wrap(inner, "nested"));
        let resp = to_response(&ctx(), wrap(outer.clone(), "deep"));
        assert_eq!(resp, outer);
        assert_eq!(resp.code().as_str(), "unexpected_error");
    }

    #[test]
    fn invalid_argument_maps_to_validation_error() {
        let resp = to_response(&ctx(), status(Code::InvalidArgument, "block number missing"));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.code().as_str(), "request_validation_error");
        assert_eq!(resp.message(), "block number missing");
    }

    #[test]
    fn unavailable_maps_to_503() {
        let resp = to_response(&ctx(), status(Code::Unavailable, "backend down"));
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.code().as_str(), "service_unavailable_error");
        assert_eq!(resp.message(), "Service Unavailable");
    }

    #[test]
    fn not_found_keeps_message() {
        let resp = to_response(&ctx(), wrap(status(Code::NotFound, "no such block"), "lookup"));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.code().as_str(), "not_found_error");
        assert_eq!(resp.message(), "lookup: no such block");
    }

    #[test]
    fn other_codes_are_unexpected() {
        let resp = to_response(&ctx(), status(Code::PermissionDenied, "nope"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.code().as_str(), "unexpected_error");
        let cause = resp.cause().unwrap().downcast_ref::<tonic::Status>().unwrap();
        assert_eq!(cause.code(), Code::PermissionDenied);
    }

    #[test]
    fn status_below_a_plain_wrapper_is_found() {
        let err = wrap(
            std::io::Error::new(std::io::ErrorKind::Other, "x"),
            "io",
        );
        let resp = to_response(&ctx(), crate::chain::Wrapped::new("ctx", err));
        assert_eq!(resp.code().as_str(), "unexpected_error");

        let nested = crate::chain::Wrapped::new("ctx", status(Code::NotFound, "gone"));
        let resp = to_response(&ctx(), nested);
        assert_eq!(resp.code().as_str(), "not_found_error");
    }

    #[test]
    fn plain_error_is_unexpected_with_cause() {
        let resp = to_response(&ctx(), "connection reset by peer");
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.message(), "An unexpected error occurred.");
        assert_eq!(resp.cause().unwrap().to_string(), "connection reset by peer");
    }
}
