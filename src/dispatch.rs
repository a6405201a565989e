//! Per-call dispatch across the three completion modes
//!
//! Each wrapper closure captures one shared [`Dispatcher`] and the original
//! method it replaced. On invocation the dispatcher fires the before hook,
//! runs the original, and fires the after point wherever the bound mode says
//! the call completes: on return, when the completion callback runs, or the
//! moment a pending future is handed back. The mode is a tagged enum chosen
//! once at bind time, so every call takes exactly one exhaustively-matched
//! path.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::call::{CallArg, Callback, Ret};
use crate::error::CallError;
use crate::hooks::{Completion, HookSet, LoggerHook};
use crate::stopwatch::Stopwatch;
use crate::table::Method;

/// When a wrapped call fires its `after` point. Chosen once at bind time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// `after` fires synchronously with the original's return value, before
    /// the wrapper returns.
    #[default]
    Sync,
    /// The trailing argument is a completion callback; `after` fires when
    /// the original eventually invokes it, possibly much later. A call whose
    /// trailing argument is not a callback degrades to `Sync` semantics.
    Callback,
    /// The original returns a future; `after` fires immediately with the
    /// pending result and the future goes back to the caller untouched.
    Future,
}

/// Shared per-target state captured by every wrapper closure of one bind.
pub(crate) struct Dispatcher {
    pub(crate) name: Arc<str>,
    pub(crate) hooks: HookSet,
    pub(crate) mode: CompletionMode,
    pub(crate) logger: Option<LoggerHook>,
    pub(crate) stopwatch: Stopwatch,
    /// Start/stop the stopwatch around each call. On when the default hook
    /// pair is in effect or a logger wants elapsed times.
    pub(crate) timing: bool,
}

impl Dispatcher {
    /// Build the wrapper that replaces `original` under `key`.
    pub(crate) fn wrap(this: &Arc<Self>, key: Arc<str>, mut original: Method) -> Method {
        let this = Arc::clone(this);
        Box::new(move |args| Dispatcher::dispatch(&this, &key, &mut original, args))
    }

    fn dispatch(
        this: &Arc<Self>,
        key: &Arc<str>,
        original: &mut Method,
        args: Vec<CallArg>,
    ) -> Result<Ret, CallError> {
        this.fire_before(key, &args);
        match this.mode {
            CompletionMode::Sync => this.run_sync(key, original, args),
            CompletionMode::Callback => {
                if matches!(args.last(), Some(CallArg::Callback(_))) {
                    Self::run_callback(this, key, original, args)
                } else {
                    // Trailing argument is not callable; documented fallback.
                    this.run_sync(key, original, args)
                }
            }
            CompletionMode::Future => this.run_future(key, original, args),
        }
    }

    fn fire_before(&self, key: &str, args: &[CallArg]) {
        tracing::trace!(
            instance = %self.name,
            method = %key,
            mode = ?self.mode,
            argc = args.len(),
            "call intercepted"
        );
        if self.timing {
            self.stopwatch.start(&self.name, key);
        }
        if let Some(before) = &self.hooks.before {
            before(&self.name, key, args);
        }
    }

    /// The after point: consume the timer, then fire the default report or
    /// the caller's `after` hook, then the logger side output.
    fn complete(&self, key: &str, args: &[CallArg], completion: Completion<'_>) {
        let elapsed = if self.timing {
            self.stopwatch.stop(&self.name, key)
        } else {
            None
        };
        tracing::trace!(
            instance = %self.name,
            method = %key,
            elapsed_ms = ?elapsed,
            "call completed"
        );

        if self.hooks.is_default() {
            if let Some(ms) = elapsed {
                match &self.logger {
                    Some(logger) => logger(&self.name, key, ms),
                    None => Stopwatch::report(&self.name, key, ms),
                }
            }
            return;
        }

        if let Some(after) = &self.hooks.after {
            after(&self.name, key, args, completion);
        }
        if let (Some(logger), Some(ms)) = (&self.logger, elapsed) {
            logger(&self.name, key, ms);
        }
    }

    fn run_sync(
        &self,
        key: &str,
        original: &mut Method,
        args: Vec<CallArg>,
    ) -> Result<Ret, CallError> {
        // An Err from the original propagates here and the after point is
        // never reached for this invocation.
        match original(args.clone())? {
            Ret::Value(value) => {
                self.complete(key, &args, Completion::Return(&value));
                Ok(Ret::Value(value))
            }
            Ret::Future(fut) => {
                // The original deferred anyway; after sees the pending
                // result and the future goes back untouched.
                self.complete(key, &args, Completion::Pending);
                Ok(Ret::Future(fut))
            }
        }
    }

    fn run_callback(
        this: &Arc<Self>,
        key: &Arc<str>,
        original: &mut Method,
        mut args: Vec<CallArg>,
    ) -> Result<Ret, CallError> {
        // Snapshot before substitution so after sees the incoming argument
        // list, original callback included.
        let full_args = args.clone();
        let last = args.len() - 1;
        let inner = match &args[last] {
            CallArg::Callback(cb) => cb.clone(),
            CallArg::Value(_) => unreachable!("dispatch checked the trailing argument"),
        };

        let hook_ctx = Arc::clone(this);
        let hook_key = Arc::clone(key);
        args[last] = CallArg::Callback(Callback::new(move |cb_args| {
            hook_ctx.complete(&hook_key, &full_args, Completion::Callback(&cb_args[..]));
            inner.invoke(cb_args);
        }));

        // The wrapper's own return value is whatever the original returns
        // synchronously, typically a handle the hooks never see.
        original(args)
    }

    fn run_future(
        &self,
        key: &str,
        original: &mut Method,
        args: Vec<CallArg>,
    ) -> Result<Ret, CallError> {
        match original(args.clone())? {
            Ret::Future(fut) => {
                self.complete(key, &args, Completion::Pending);
                Ok(Ret::Future(fut))
            }
            Ret::Value(value) => {
                // The original completed immediately; documented fallback to
                // sync semantics.
                self.complete(key, &args, Completion::Return(&value));
                Ok(Ret::Value(value))
            }
        }
    }
}
