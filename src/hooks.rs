//! Hook types invoked around instrumented calls
//!
//! A hook is any callable of the right shape; `Arc` trait objects keep the
//! set cheap to share across every wrapper of one target and across threads.
//! The set is fixed at bind time and never mutated afterward.

use std::sync::Arc;

use serde_json::Value;

use crate::call::CallArg;

/// What the `after` hook learns about one call's outcome.
///
/// Exactly one variant applies per call, decided by the completion mode the
/// target was bound with.
#[derive(Debug)]
pub enum Completion<'a> {
    /// Synchronous return value of the original.
    Return(&'a Value),
    /// Arguments the completion callback was invoked with.
    Callback(&'a [Value]),
    /// A future was handed back to the caller and has not settled yet.
    /// `after` sees the pending result, never its eventual resolution.
    Pending,
}

/// Fired before the original runs: `(instance name, method key, args)`.
pub type BeforeHook = Arc<dyn Fn(&str, &str, &[CallArg]) + Send + Sync>;

/// Fired at the completion point of the call's mode:
/// `(instance name, method key, args, completion)`.
pub type AfterHook = Arc<dyn Fn(&str, &str, &[CallArg], Completion<'_>) + Send + Sync>;

/// Side output fired with the measured elapsed milliseconds at the same
/// point `after` fires: `(instance name, method key, elapsed ms)`.
pub type LoggerHook = Arc<dyn Fn(&str, &str, f64) + Send + Sync>;

/// The hook pair shared by all wrappers of one bound target.
///
/// A missing half is a no-op. When the caller supplies neither, the built-in
/// stopwatch pair takes over: time on before, report on after.
#[derive(Clone, Default)]
pub struct HookSet {
    /// Fired before the original runs.
    pub before: Option<BeforeHook>,
    /// Fired at the completion point.
    pub after: Option<AfterHook>,
}

impl HookSet {
    /// True when no caller hook was supplied and the stopwatch pair applies.
    pub fn is_default(&self) -> bool {
        self.before.is_none() && self.after.is_none()
    }
}
