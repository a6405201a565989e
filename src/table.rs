//! The instrumentable target: an explicit method table
//!
//! Rust has no reflected object properties to walk, so the callable surface
//! of a target is an explicit capability set: named entries in a
//! [`MethodTable`], with a single optional prototype table supplying
//! inherited members. Binding mutates the table in place, replacing entries
//! with wrapper closures, so call sites invoke methods the same way before
//! and after instrumentation.

use std::collections::HashMap;
use std::future::Future;

use serde_json::Value;

use crate::call::{CallArg, Ret};
use crate::error::CallError;

/// A callable member of a [`MethodTable`].
pub type Method = Box<dyn FnMut(Vec<CallArg>) -> Result<Ret, CallError> + Send>;

/// Exposes a type's callable surface for binding.
///
/// Wrapper structs that embed a table implement this so
/// [`bind`](crate::binder::bind) can instrument them directly.
pub trait Instrumentable {
    /// The method table backing this target.
    fn method_table(&mut self) -> &mut MethodTable;
}

/// The callable surface of an instrumented target.
#[derive(Default)]
pub struct MethodTable {
    own: HashMap<String, Method>,
    proto: Option<Box<MethodTable>>,
}

impl MethodTable {
    /// An empty table with no prototype.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a prototype table supplying inherited methods. Own entries
    /// shadow prototype entries under the same key.
    pub fn with_prototype(mut self, proto: MethodTable) -> Self {
        self.proto = Some(Box::new(proto));
        self
    }

    /// Register a method under `key`, replacing any previous own entry.
    pub fn insert(&mut self, key: impl Into<String>, method: Method) {
        self.own.insert(key.into(), method);
    }

    /// Register an infallible value-returning method.
    pub fn insert_fn<F>(&mut self, key: impl Into<String>, mut f: F)
    where
        F: FnMut(Vec<CallArg>) -> Value + Send + 'static,
    {
        self.insert(key, Box::new(move |args| Ok(Ret::Value(f(args)))));
    }

    /// Register a fallible value-returning method. An `Err` propagates to
    /// the caller as [`CallError::Method`].
    pub fn insert_fallible<F>(&mut self, key: impl Into<String>, mut f: F)
    where
        F: FnMut(Vec<CallArg>) -> anyhow::Result<Value> + Send + 'static,
    {
        self.insert(
            key,
            Box::new(move |args| f(args).map(Ret::Value).map_err(CallError::from)),
        );
    }

    /// Register a method that completes through a future.
    pub fn insert_future<F, Fut>(&mut self, key: impl Into<String>, mut f: F)
    where
        F: FnMut(Vec<CallArg>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value, CallError>> + Send + 'static,
    {
        self.insert(key, Box::new(move |args| Ok(Ret::future(f(args)))));
    }

    /// True when `key` resolves to a method, own or inherited.
    pub fn contains(&self, key: &str) -> bool {
        self.own.contains_key(key)
            || self
                .proto
                .as_ref()
                .is_some_and(|p| p.contains(key))
    }

    /// Number of own methods.
    pub fn len(&self) -> usize {
        self.own.len()
    }

    /// True when the table holds no own methods.
    pub fn is_empty(&self) -> bool {
        self.own.is_empty()
    }

    /// Enumerate the callable surface: the union of prototype keys and own
    /// keys, one prototype level deep, deduplicated. Iteration order is
    /// unspecified.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .proto
            .as_ref()
            .map(|p| p.own.keys().cloned().collect())
            .unwrap_or_default();
        for key in self.own.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys
    }

    /// Remove and return the most-derived method under `key`: the own entry
    /// when present, else the prototype's, one level deep.
    pub(crate) fn take(&mut self, key: &str) -> Option<Method> {
        if let Some(method) = self.own.remove(key) {
            return Some(method);
        }
        self.proto.as_mut().and_then(|p| p.own.remove(key))
    }

    /// Invoke the method under `key`, own entries shadowing inherited ones.
    pub fn call(&mut self, key: &str, args: Vec<CallArg>) -> Result<Ret, CallError> {
        if let Some(method) = self.own.get_mut(key) {
            return method(args);
        }
        if let Some(proto) = self.proto.as_mut() {
            return proto.call(key, args);
        }
        Err(CallError::NoSuchMethod(key.to_string()))
    }
}

impl Instrumentable for MethodTable {
    fn method_table(&mut self) -> &mut MethodTable {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doubling_table() -> MethodTable {
        let mut table = MethodTable::new();
        table.insert_fn("jump", |args| {
            let height = args[0].as_value().and_then(Value::as_i64).unwrap_or(0);
            json!(height * 2)
        });
        table
    }

    #[test]
    fn test_insert_and_call() {
        let mut table = doubling_table();
        let ret = table.call("jump", vec![json!(5).into()]).unwrap();
        assert_eq!(ret.into_value(), Some(json!(10)));
    }

    #[test]
    fn test_no_such_method() {
        let mut table = MethodTable::new();
        let err = table.call("missing", vec![]).unwrap_err();
        assert!(matches!(err, CallError::NoSuchMethod(key) if key == "missing"));
    }

    #[test]
    fn test_fallible_method_propagates_err() {
        let mut table = MethodTable::new();
        table.insert_fallible("explode", |_| Err(anyhow::anyhow!("boom")));
        let err = table.call("explode", vec![]).unwrap_err();
        assert!(matches!(err, CallError::Method(_)));
    }

    #[test]
    fn test_prototype_lookup() {
        let mut table = MethodTable::new().with_prototype(doubling_table());
        assert!(table.contains("jump"));
        let ret = table.call("jump", vec![json!(3).into()]).unwrap();
        assert_eq!(ret.into_value(), Some(json!(6)));
    }

    #[test]
    fn test_own_shadows_prototype() {
        let mut table = MethodTable::new().with_prototype(doubling_table());
        table.insert_fn("jump", |_| json!("shadowed"));
        let ret = table.call("jump", vec![json!(3).into()]).unwrap();
        assert_eq!(ret.into_value(), Some(json!("shadowed")));
    }

    #[test]
    fn test_keys_union_deduplicates() {
        let mut table = MethodTable::new().with_prototype(doubling_table());
        table.insert_fn("jump", |_| json!(0));
        table.insert_fn("walk", |_| json!(0));

        let mut keys = table.keys();
        keys.sort();
        assert_eq!(keys, vec!["jump".to_string(), "walk".to_string()]);
    }

    #[test]
    fn test_take_prefers_own() {
        let mut table = MethodTable::new().with_prototype(doubling_table());
        table.insert_fn("jump", |_| json!("own"));

        let mut taken = table.take("jump").unwrap();
        let ret = taken(vec![]).unwrap();
        assert_eq!(ret.into_value(), Some(json!("own")));
        // The inherited entry is still reachable afterwards.
        assert!(table.contains("jump"));
    }

    #[test]
    fn test_take_falls_back_to_prototype() {
        let mut table = MethodTable::new().with_prototype(doubling_table());
        assert!(table.take("jump").is_some());
        assert!(!table.contains("jump"));
    }

    #[test]
    fn test_empty_table() {
        let table = MethodTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert!(table.keys().is_empty());
    }

    #[test]
    fn test_insert_future_defers() {
        let mut table = MethodTable::new();
        table.insert_future("later", |_| async { Ok(json!("bar")) });
        let ret = table.call("later", vec![]).unwrap();
        assert!(ret.into_future().is_some());
    }
}
