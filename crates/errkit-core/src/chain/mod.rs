//! Error-chain traversal.
//!
//! A chain is an error followed by every error reachable by repeatedly calling
//! [`Error::source`]. Whether a node has a cause is a trait query on that node,
//! so any error type that reports its source takes part in the walk.
//!
//! [`walk`] is the only traversal primitive; [`find`], [`find_as`], [`is`] and
//! [`debug_chain`] are built on it. None of these functions fail: a missing
//! root (`None`) is a valid input everywhere.

mod wrap;

pub use wrap::{status, wrap, Wrapped};

use std::error::Error;
use std::fmt::Write as _;
use std::ops::ControlFlow;
use std::sync::Arc;

/// Owned, thread-safe error used at API seams.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Shared error, used where a cause must outlive the chain it was found in.
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// Borrowed chain node.
pub type DynError = dyn Error + 'static;

/// Walks `err` from the root to the innermost cause.
///
/// `visit` is called with the root first, even when the root is `None` (in
/// which case it is the only call). Returning `ControlFlow::Break(value)`
/// stops the walk and makes `value` the result; running off the end of the
/// chain yields `None`.
pub fn walk<'a, T, F>(err: Option<&'a DynError>, mut visit: F) -> Option<T>
where
    F: FnMut(Option<&'a DynError>) -> ControlFlow<Option<T>>,
{
    if let ControlFlow::Break(out) = visit(err) {
        return out;
    }

    let mut current = err?;
    while let Some(next) = current.source() {
        if let ControlFlow::Break(out) = visit(Some(next)) {
            return out;
        }
        current = next;
    }

    None
}

/// Returns the first node of the chain (root included) matching `predicate`.
pub fn find<'a, P>(err: Option<&'a DynError>, mut predicate: P) -> Option<&'a DynError>
where
    P: FnMut(&DynError) -> bool,
{
    walk(err, |node| match node {
        Some(candidate) if predicate(candidate) => ControlFlow::Break(Some(candidate)),
        Some(_) => ControlFlow::Continue(()),
        None => ControlFlow::Break(None),
    })
}

/// Returns the first node of the chain whose concrete type is `E`.
pub fn find_as<'a, E>(err: Option<&'a DynError>) -> Option<&'a E>
where
    E: Error + 'static,
{
    find(err, |node| node.is::<E>()).and_then(|node| node.downcast_ref::<E>())
}

/// Reports whether `target` is part of the chain.
///
/// A node matches when it is the very same value as `target`, or when it has
/// the same concrete type and compares equal to it.
pub fn is<E>(err: Option<&DynError>, target: &E) -> bool
where
    E: Error + PartialEq + 'static,
{
    let target_addr = target as *const E as *const ();
    find(err, |node| {
        std::ptr::eq(node as *const DynError as *const (), target_addr)
            || node
                .downcast_ref::<E>()
                .is_some_and(|candidate| candidate == target)
    })
    .is_some()
}

/// Renders the chain for diagnostics, one `kind | message` line per node,
/// root first. Returns `<nil>` for a missing error.
pub fn debug_chain(err: Option<&DynError>) -> String {
    if err.is_none() {
        return "<nil>".to_string();
    }

    let mut out = String::new();
    walk::<(), _>(err, |node| {
        if let Some(node) = node {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = write!(out, "{} | {}", kind_name(node), node);
        }
        ControlFlow::Continue(())
    });
    out
}

fn named<E: Error + 'static>(node: &DynError) -> Option<&'static str> {
    node.is::<E>().then(std::any::type_name::<E>)
}

/// Best-effort concrete kind of a node. Trait objects carry no type name, so
/// known types are resolved by downcast and anything else falls back to the
/// leading identifier of its `Debug` output (the type or variant name for
/// derived impls).
fn kind_name(node: &DynError) -> String {
    named::<Wrapped>(node)
        .or_else(|| named::<crate::response::ErrorResponse>(node))
        .or_else(|| named::<crate::retry::FatalError>(node))
        .or_else(|| named::<crate::retry::RetryableError>(node))
        .or_else(|| named::<crate::retry::RetryError>(node))
        .or_else(|| named::<tonic::Status>(node))
        .or_else(|| named::<std::io::Error>(node))
        .or_else(|| named::<serde_json::Error>(node))
        .map(str::to_string)
        .unwrap_or_else(|| debug_head(node))
}

fn debug_head(node: &DynError) -> String {
    let rendered = format!("{node:?}");
    // Errors boxed from `&str`/`String` debug-print as a quoted string.
    if rendered.starts_with('"') {
        return "String".to_string();
    }
    let head: String = rendered
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if head.is_empty() {
        "dyn Error".to_string()
    } else {
        head
    }
}
