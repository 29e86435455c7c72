//! The Target interface: the object a chain runs against.

use crate::error::CallbackError;
use crate::id::Identity;
use crate::value::Value;

/// The remaining work an around callback wraps: more around callbacks,
/// then the core action.
///
/// Consumed on call to prevent double-invoke. Dropping it without calling
/// [`Next::run`] short-circuits everything nested inside; that is a
/// legitimate outcome, not an error.
pub struct Next<'a, T> {
    inner: Box<dyn FnOnce(&mut T) -> Result<Value, CallbackError> + 'a>,
}

impl<'a, T> Next<'a, T> {
    /// Wrap a continuation.
    pub fn new(f: impl FnOnce(&mut T) -> Result<Value, CallbackError> + 'a) -> Self {
        Self { inner: Box::new(f) }
    }

    /// Continue the chain, eventually running the core action.
    pub fn run(self, target: &mut T) -> Result<Value, CallbackError> {
        (self.inner)(target)
    }
}

/// An object whose lifecycle hooks are run by a chain.
///
/// The engine has no reflection: method-name callbacks and guards reach the
/// target through [`Target::call`] and [`Target::call_around`], and legacy
/// expression strings through [`Target::evaluate`]. Which methods exist is
/// declared up front on the registry's type table so registration can fail
/// fast; the target is only asked to dispatch them.
pub trait Target: Sized {
    /// Name of this object's type in the registry.
    fn type_name(&self) -> &str;

    /// Call a method by name. `args` are the run's call arguments; methods
    /// that take none ignore them.
    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, CallbackError>;

    /// Call a method by name, passing `next` as its block. The method must
    /// call `next.run(self)` to proceed.
    fn call_around(
        &mut self,
        method: &str,
        args: &[Value],
        next: Next<'_, Self>,
    ) -> Result<Value, CallbackError> {
        let _ = (args, next);
        Err(CallbackError::NoMethod(method.to_owned()))
    }

    /// Evaluate a legacy expression string in this object's context.
    ///
    /// Deprecated path. Targets that never register legacy expressions can
    /// leave the default, which refuses.
    fn evaluate(&mut self, expr: &str) -> Result<Value, CallbackError> {
        Err(CallbackError::LegacyUnsupported(expr.to_owned()))
    }

    /// Called when a before callback's result matches the terminator.
    fn halted_callback_hook(&mut self, identity: &Identity) {
        let _ = identity;
    }
}

/// An object that carries callback methods for a target.
///
/// The method called is chosen by the chain's scope at registration time
/// (`before`, or `before_save` with a `[kind, name]` scope).
pub trait Delegate<T>: Send + Sync {
    /// Whether `method` exists on this object.
    fn responds_to(&self, method: &str) -> bool;

    /// Run a before/after method.
    fn call(&self, method: &str, target: &mut T, args: &[Value]) -> Result<Value, CallbackError>;

    /// Run an around method. Must call `next.run(target)` to proceed.
    fn call_around(
        &self,
        method: &str,
        target: &mut T,
        args: &[Value],
        next: Next<'_, T>,
    ) -> Result<Value, CallbackError> {
        let _ = (target, args, next);
        Err(CallbackError::NoMethod(method.to_owned()))
    }
}
