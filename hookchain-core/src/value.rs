//! Values passed through callbacks.
//!
//! Callback results, call arguments, and core-action results are
//! `serde_json::Value`. Truthiness follows the usual dynamic-language rule:
//! only `null` and `false` are falsy.

pub use serde_json::Value;

/// Whether a value counts as true for guards.
pub fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}
