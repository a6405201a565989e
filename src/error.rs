//! Error taxonomy for instrumented calls
//!
//! The binder itself never fails on normal inputs: a target with no eligible
//! methods binds as a silent no-op. The errors that do surface belong to the
//! call path, and all propagation-worthy failures are the original callable's,
//! passed through unchanged with hooks skipped for that invocation.

use thiserror::Error;

/// Errors surfaced by [`MethodTable::call`](crate::table::MethodTable::call).
#[derive(Debug, Error)]
pub enum CallError {
    /// The table has no method under the requested key, own or inherited.
    #[error("no such method: {0}")]
    NoSuchMethod(String),

    /// The original callable failed. Propagated unmodified to the caller;
    /// the `after` hook and logger are skipped for that invocation.
    #[error(transparent)]
    Method(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_such_method_display() {
        let err = CallError::NoSuchMethod("jump".to_string());
        assert_eq!(err.to_string(), "no such method: jump");
    }

    #[test]
    fn test_method_error_is_transparent() {
        let err = CallError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn test_method_error_preserves_source_chain() {
        let inner = anyhow::anyhow!("root cause").context("while reading");
        let err = CallError::from(inner);
        assert!(err.to_string().contains("while reading"));
    }
}
