//! Call value model for instrumented methods
//!
//! Arguments and results cross the instrumentation boundary in a uniform
//! shape: plain data rides in `serde_json::Value`, callable arguments ride in
//! a cloneable [`Callback`] handle, and deferred results ride in a boxed
//! future. Hooks observe every call through this model without knowing which
//! concrete method produced it, which is what lets one wrapper closure serve
//! all three completion modes.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::error::CallError;

/// Boxed future handed back by a method that completes later.
///
/// The instrumentation layer never polls or intercepts it; the caller awaits
/// it exactly as they would the unwrapped original, and a failing future
/// propagates its error through normal channels.
pub type RetFuture = Pin<Box<dyn Future<Output = Result<Value, CallError>> + Send>>;

/// A cloneable handle to a completion callback.
///
/// Clones share the same underlying callable, so substituting the final
/// argument in callback-completion mode forwards the exact callable the call
/// site supplied.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn(Vec<Value>) + Send + Sync>);

impl Callback {
    /// Wrap a callable as a callback handle.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) + Send + Sync + 'static,
    {
        Callback(Arc::new(f))
    }

    /// Invoke the callback with its completion arguments.
    pub fn invoke(&self, args: Vec<Value>) {
        (self.0)(args)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// One positional argument of an instrumented call.
#[derive(Clone, Debug)]
pub enum CallArg {
    /// Plain data argument.
    Value(Value),
    /// Callable argument; in callback-completion mode a trailing one is
    /// treated as the completion callback.
    Callback(Callback),
}

impl CallArg {
    /// The data payload, if this argument is plain data.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            CallArg::Value(v) => Some(v),
            CallArg::Callback(_) => None,
        }
    }

    /// True when this argument is a callback handle.
    pub fn is_callback(&self) -> bool {
        matches!(self, CallArg::Callback(_))
    }
}

impl From<Value> for CallArg {
    fn from(v: Value) -> Self {
        CallArg::Value(v)
    }
}

impl From<Callback> for CallArg {
    fn from(cb: Callback) -> Self {
        CallArg::Callback(cb)
    }
}

/// What a method hands back to its caller.
pub enum Ret {
    /// Immediately available return value.
    Value(Value),
    /// Deferred result; settles whenever the underlying operation completes.
    Future(RetFuture),
}

impl Ret {
    /// Build an immediate return value.
    pub fn value(v: impl Into<Value>) -> Self {
        Ret::Value(v.into())
    }

    /// Build a deferred return value from a future.
    pub fn future<F>(f: F) -> Self
    where
        F: Future<Output = Result<Value, CallError>> + Send + 'static,
    {
        Ret::Future(Box::pin(f))
    }

    /// The immediate value, if there is one. A deferred return yields `None`.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Ret::Value(v) => Some(v),
            Ret::Future(_) => None,
        }
    }

    /// The deferred future, if there is one.
    pub fn into_future(self) -> Option<RetFuture> {
        match self {
            Ret::Value(_) => None,
            Ret::Future(f) => Some(f),
        }
    }
}

impl fmt::Debug for Ret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ret::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Ret::Future(_) => f.write_str("Future(..)"),
        }
    }
}
