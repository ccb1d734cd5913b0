//! `errkit classify` – show the client response an RPC status maps to.

use anyhow::{anyhow, Result};
use errkit_core::chain::{debug_chain, status, wrap};
use errkit_core::context::TraceContext;
use errkit_core::response::to_response;
use tonic::Code;

const CODES: [Code; 17] = [
    Code::Ok,
    Code::Cancelled,
    Code::Unknown,
    Code::InvalidArgument,
    Code::DeadlineExceeded,
    Code::NotFound,
    Code::AlreadyExists,
    Code::PermissionDenied,
    Code::ResourceExhausted,
    Code::FailedPrecondition,
    Code::Aborted,
    Code::OutOfRange,
    Code::Unimplemented,
    Code::Internal,
    Code::Unavailable,
    Code::DataLoss,
    Code::Unauthenticated,
];

/// Accepts `NotFound`, `not_found`, `NOT_FOUND` or the numeric value.
pub fn parse_code(name: &str) -> Result<Code> {
    let name = name.trim();
    if let Ok(n) = name.parse::<i32>() {
        return CODES
            .iter()
            .copied()
            .find(|code| *code as i32 == n)
            .ok_or_else(|| anyhow!("unknown gRPC code {}", n));
    }

    let wanted: String = name
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .collect::<String>()
        .to_lowercase();
    CODES
        .iter()
        .copied()
        .find(|code| format!("{:?}", code).to_lowercase() == wanted)
        .ok_or_else(|| anyhow!("unknown gRPC code `{}`", name))
}

pub fn run_classify(code: &str, message: &str, context: Option<&str>) -> Result<()> {
    let mut err = status(parse_code(code)?, message);
    if let Some(context) = context {
        err = wrap(err, context);
    }

    let chain = debug_chain(Some(&*err));
    let response = to_response(&TraceContext::new(), err);

    println!("status: {}", response.status().as_u16());
    println!("{}", response.to_json()?);
    println!("chain:");
    for line in chain.lines() {
        println!("  {}", line);
    }
    if let Some(cause) = response.cause() {
        tracing::debug!("classified with cause: {}", cause);
    }
    Ok(())
}
