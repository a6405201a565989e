//! Envolver - generic method-interception instrumentation
//!
//! This library wraps every callable member of a target (own and inherited)
//! so that each invocation fires a *before* hook, runs the original, and
//! fires an *after* hook, with support for synchronous, callback-completion,
//! and future-completion calls. Call sites invoke the target exactly as they
//! did before binding; return values, arguments, and failures pass through
//! unchanged.
//!
//! When no hooks are supplied, the built-in stopwatch pair times each call
//! and reports `<name>.<method>: <ms>ms` on stderr.
//!
//! # Example
//!
//! ```
//! use envolver::binder::{bind, BindConfig};
//! use envolver::table::MethodTable;
//! use serde_json::{json, Value};
//!
//! let mut table = MethodTable::new();
//! table.insert_fn("jump", |args| {
//!     let height = args[0].as_value().and_then(Value::as_i64).unwrap_or(0);
//!     json!(height * 2)
//! });
//!
//! bind(&mut table, BindConfig::new().with_name("object1"));
//!
//! // Same call shape as before binding; the stopwatch pair reports timing.
//! let ret = table.call("jump", vec![json!(5).into()]).unwrap();
//! assert_eq!(ret.into_value(), Some(json!(10)));
//! ```

pub mod binder;
pub mod call;
pub mod clock;
pub mod dispatch;
pub mod error;
pub mod hooks;
pub mod naming;
pub mod stopwatch;
pub mod table;
