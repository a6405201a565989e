//! Binding: wrapping a target's callable surface in place
//!
//! `bind` enumerates the target's methods (own plus one prototype level),
//! skips the ignore list, and replaces each remaining entry with a wrapper
//! closure sharing one dispatcher: instance name, hook set, completion mode,
//! and stopwatch. A target with no eligible methods binds as a silent no-op.
//! All replacements happen before any wrapper can run, and the wrapping
//! order among keys is unspecified.
//!
//! Re-binding an already-bound target wraps the wrappers: the second bind's
//! hooks fire outside the first's. Composition is deliberate, not rejected.

use std::collections::HashSet;
use std::sync::Arc;

use crate::call::CallArg;
use crate::clock::ClockSource;
use crate::dispatch::{CompletionMode, Dispatcher};
use crate::hooks::{AfterHook, BeforeHook, Completion, HookSet, LoggerHook};
use crate::naming::{self, NameAllocator};
use crate::stopwatch::Stopwatch;
use crate::table::Instrumentable;

/// Always excluded from wrapping, on top of the caller's ignore list.
const IMPLICIT_IGNORE: &str = "constructor";

/// Configuration for one bind call.
///
/// Built fluently; every option has a default: auto-generated name, sync
/// completion mode, empty ignore list, the stopwatch hook pair, no logger.
#[derive(Default)]
pub struct BindConfig {
    name: Option<String>,
    unique: bool,
    mode: CompletionMode,
    ignore: Vec<String>,
    before: Option<BeforeHook>,
    after: Option<AfterHook>,
    logger: Option<LoggerHook>,
}

impl BindConfig {
    /// Start from defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit instance label. Repeated names collide on purpose unless
    /// [`with_unique`](Self::with_unique) is also set.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Suffix the name with the allocator counter even when it repeats.
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Completion mode for every wrapper of this bind.
    pub fn with_mode(mut self, mode: CompletionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Method keys to exclude from wrapping. `"constructor"` is always
    /// excluded implicitly.
    pub fn with_ignore<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Hook fired before each original runs.
    pub fn with_before<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str, &[CallArg]) + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(f));
        self
    }

    /// Hook fired at each call's completion point.
    pub fn with_after<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str, &[CallArg], Completion<'_>) + Send + Sync + 'static,
    {
        self.after = Some(Arc::new(f));
        self
    }

    /// Side output fired with elapsed milliseconds at the completion point.
    pub fn with_logger<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str, f64) + Send + Sync + 'static,
    {
        self.logger = Some(Arc::new(f));
        self
    }
}

/// Wrap every eligible callable member of `target` in place.
///
/// Instance names come from the process-wide allocator; use
/// [`bind_with_allocator`] when a test needs a deterministic counter.
pub fn bind<T: Instrumentable + ?Sized>(target: &mut T, config: BindConfig) {
    bind_with_allocator(target, config, naming::process_allocator());
}

/// [`bind`] with an explicit name allocator.
pub fn bind_with_allocator<T: Instrumentable + ?Sized>(
    target: &mut T,
    config: BindConfig,
    allocator: &NameAllocator,
) {
    let table = target.method_table();
    let name: Arc<str> = Arc::from(allocator.allocate(config.name.as_deref(), config.unique));

    let mut ignore: HashSet<String> = config.ignore.into_iter().collect();
    ignore.insert(IMPLICIT_IGNORE.to_string());

    let hooks = HookSet {
        before: config.before,
        after: config.after,
    };
    let timing = hooks.is_default() || config.logger.is_some();
    let dispatcher = Arc::new(Dispatcher {
        name: Arc::clone(&name),
        hooks,
        mode: config.mode,
        logger: config.logger,
        stopwatch: Stopwatch::new(ClockSource::detect()),
        timing,
    });

    let mut wrapped = 0usize;
    for key in table.keys() {
        if ignore.contains(&key) {
            continue;
        }
        if let Some(original) = table.take(&key) {
            let key_arc: Arc<str> = Arc::from(key.as_str());
            table.insert(key, Dispatcher::wrap(&dispatcher, key_arc, original));
            wrapped += 1;
        }
    }

    tracing::debug!(instance = %name, wrapped, mode = ?config.mode, "target bound");
}
