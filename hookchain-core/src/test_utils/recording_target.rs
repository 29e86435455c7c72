//! RecordingTarget: a scriptable target that logs every call it receives.

use crate::error::CallbackError;
use crate::id::Identity;
use crate::target::{Next, Target};
use crate::value::Value;
use std::collections::{HashMap, HashSet};

/// A target whose methods are declared at construction and which records
/// every method call, around wrapper, and halt in [`RecordingTarget::log`].
///
/// - `with_method(name, value)`: `call(name)` logs `name` and returns `value`.
/// - `with_around(name)`: `call_around(name)` logs `name:pre`, runs the
///   continuation, then logs `name:post`.
/// - `with_expression(expr, value)`: `evaluate(expr)` logs `expr` and
///   returns `value`.
#[derive(Debug, Clone)]
pub struct RecordingTarget {
    type_name: String,
    methods: HashMap<String, Value>,
    around: HashSet<String>,
    expressions: HashMap<String, Value>,
    log: Vec<String>,
    halted: Vec<Identity>,
}

impl RecordingTarget {
    /// Create a target reporting `type_name`.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            methods: HashMap::new(),
            around: HashSet::new(),
            expressions: HashMap::new(),
            log: Vec::new(),
            halted: Vec::new(),
        }
    }

    /// Declare a method returning `value`.
    #[must_use]
    pub fn with_method(mut self, name: impl Into<String>, value: Value) -> Self {
        self.methods.insert(name.into(), value);
        self
    }

    /// Declare an around method.
    #[must_use]
    pub fn with_around(mut self, name: impl Into<String>) -> Self {
        self.around.insert(name.into());
        self
    }

    /// Declare a legacy expression result.
    #[must_use]
    pub fn with_expression(mut self, expr: impl Into<String>, value: Value) -> Self {
        self.expressions.insert(expr.into(), value);
        self
    }

    /// Change what a declared method returns.
    pub fn set_method(&mut self, name: impl Into<String>, value: Value) {
        self.methods.insert(name.into(), value);
    }

    /// Append an entry to the log. Closures use this to record themselves.
    pub fn record(&mut self, entry: impl Into<String>) {
        self.log.push(entry.into());
    }

    /// Everything recorded so far, in order.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Identities reported through `halted_callback_hook`.
    pub fn halted(&self) -> &[Identity] {
        &self.halted
    }

    /// Clear the log and halt records.
    pub fn clear(&mut self) {
        self.log.clear();
        self.halted.clear();
    }
}

impl Target for RecordingTarget {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn call(&mut self, method: &str, _args: &[Value]) -> Result<Value, CallbackError> {
        let value = self
            .methods
            .get(method)
            .cloned()
            .ok_or_else(|| CallbackError::NoMethod(method.to_owned()))?;
        self.log.push(method.to_owned());
        Ok(value)
    }

    fn call_around(
        &mut self,
        method: &str,
        _args: &[Value],
        next: Next<'_, Self>,
    ) -> Result<Value, CallbackError> {
        if !self.around.contains(method) {
            return Err(CallbackError::NoMethod(method.to_owned()));
        }
        self.log.push(format!("{method}:pre"));
        let result = next.run(self)?;
        self.log.push(format!("{method}:post"));
        Ok(result)
    }

    fn evaluate(&mut self, expr: &str) -> Result<Value, CallbackError> {
        let value = self
            .expressions
            .get(expr)
            .cloned()
            .ok_or_else(|| CallbackError::LegacyUnsupported(expr.to_owned()))?;
        self.log.push(expr.to_owned());
        Ok(value)
    }

    fn halted_callback_hook(&mut self, identity: &Identity) {
        self.halted.push(identity.clone());
    }
}
