//! Request-scoped context: trace id and cancellation.
//!
//! Responses capture a trace id when they are built. When the request carries
//! no trace, a short random id is generated instead so the field is never
//! empty.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const SHORT_ID_LEN: usize = 12;

#[derive(Debug, Clone)]
pub struct TraceContext {
    trace_id: Option<u128>,
    cancel: CancellationToken,
}

impl Default for TraceContext {
    fn default() -> Self {
        Self {
            trace_id: None,
            cancel: CancellationToken::new(),
        }
    }
}

impl TraceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace_id(mut self, trace_id: u128) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Builds a context from a W3C `traceparent` header
    /// (`version-traceid-parentid-flags`). Returns `None` when the header is
    /// malformed or the trace id is all zeros.
    pub fn from_traceparent(header: &str) -> Option<Self> {
        let mut parts = header.trim().split('-');
        let _version = parts.next()?;
        let trace = parts.next()?;
        let parent = parts.next()?;
        let _flags = parts.next()?;
        if trace.len() != 32 || parent.len() != 16 {
            return None;
        }
        let trace_id = u128::from_str_radix(trace, 16).ok()?;
        if trace_id == 0 {
            return None;
        }
        Some(Self::new().with_trace_id(trace_id))
    }

    /// Trace id for a response: 32 lowercase hex chars when a trace is
    /// attached, otherwise a fresh short id.
    pub fn trace_id(&self) -> String {
        match self.trace_id {
            Some(id) => format!("{id:032x}"),
            None => short_id(),
        }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHORT_ID_LEN);
    id
}
