//! The seam where an error leaves the service: classify it, then log it at a
//! level that matches who is at fault. Writing the response is left to the
//! transport.

use std::io;

use crate::chain::{find, BoxError, DynError};
use crate::context::TraceContext;

use super::{to_response, ErrorResponse};

/// Classifies `err` and logs it. Server-side failures (status >= 500) are
/// logged as errors unless the request was already cancelled; everything else
/// is logged at debug level.
pub fn report(ctx: &TraceContext, message: &str, err: impl Into<BoxError>) -> ErrorResponse {
    let err: BoxError = err.into();
    let rendered = err.to_string();
    let response = to_response(ctx, err);
    let status = response.status().as_u16();

    if !ctx.is_cancelled() && status >= 500 {
        tracing::error!(
            trace_id = response.trace_id(),
            status,
            error = %rendered,
            "{}",
            message
        );
    } else {
        tracing::debug!(
            trace_id = response.trace_id(),
            status,
            error = %rendered,
            "{}",
            message
        );
    }

    response
}

/// Logs a failure to write a response body. Client hang-ups are expected
/// noise and only logged at debug level.
pub fn report_write_failure(err: &DynError) {
    if is_client_side_network_error(Some(err)) {
        tracing::debug!(error = %err, "unable to write error response");
    } else {
        tracing::error!(error = %err, "unable to write error response");
    }
}

/// True when the chain holds an I/O error caused by the peer going away
/// (connection reset or broken pipe).
pub fn is_client_side_network_error(err: Option<&DynError>) -> bool {
    find(err, |node| {
        node.downcast_ref::<io::Error>().is_some_and(|io_err| {
            matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset | io::ErrorKind::BrokenPipe
            )
        })
    })
    .is_some()
}
