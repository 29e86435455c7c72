//! Hook and guard declarations.
//!
//! A [`Hook`] is what a caller hands to `set_callback`: one of four shapes
//! (method name, legacy expression, closure, delegate object). A
//! [`Predicate`] is the resolvable half of an `if`/`unless` guard. Both are
//! declarations; the engine turns them into compiled callbacks.

use crate::error::CallbackError;
use crate::id::{HandleId, Identity};
use crate::target::{Delegate, Next};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Body of a closure hook that takes the target and call arguments.
pub type SimpleFn<T> = dyn Fn(&mut T, &[Value]) -> Result<Value, CallbackError> + Send + Sync;

/// Body of a closure hook that takes nothing.
pub type ThunkFn = dyn Fn() -> Result<Value, CallbackError> + Send + Sync;

/// Body of an around closure.
pub type AroundFn<T> =
    dyn for<'n> Fn(&mut T, &[Value], Next<'n, T>) -> Result<Value, CallbackError> + Send + Sync;

/// Body of a closure guard.
pub type GuardFn<T> = dyn Fn(&T, &[Value]) -> Result<bool, CallbackError> + Send + Sync;

/// The shape of a closure hook, fixed when it is constructed.
pub enum Closure<T> {
    /// Called with the target and call arguments.
    WithTarget(Arc<SimpleFn<T>>),
    /// Called with no arguments.
    NoArgs(Arc<ThunkFn>),
    /// Called with the target, call arguments, and the continuation.
    Around(Arc<AroundFn<T>>),
}

impl<T> Clone for Closure<T> {
    fn clone(&self) -> Self {
        match self {
            Closure::WithTarget(f) => Closure::WithTarget(Arc::clone(f)),
            Closure::NoArgs(f) => Closure::NoArgs(Arc::clone(f)),
            Closure::Around(f) => Closure::Around(Arc::clone(f)),
        }
    }
}

/// A declared hook, before normalization.
pub enum Hook<T> {
    /// A method on the target.
    Method(String),
    /// A legacy expression evaluated in the target's context. Deprecated.
    Legacy(String),
    /// A closure.
    Closure {
        /// Identity used by `skip_callback`.
        id: HandleId,
        /// The closure body.
        body: Closure<T>,
    },
    /// An object whose scoped method is called with the target.
    Delegate {
        /// Identity used by `skip_callback`.
        id: HandleId,
        /// The delegate object.
        object: Arc<dyn Delegate<T>>,
    },
}

impl<T> Hook<T> {
    /// A method on the target, by name.
    pub fn method(name: impl Into<String>) -> Self {
        Hook::Method(name.into())
    }

    /// A legacy expression string. Kept for compatibility only; the target
    /// must implement `Target::evaluate`.
    pub fn legacy(expr: impl Into<String>) -> Self {
        Hook::Legacy(expr.into())
    }

    /// A before/after closure taking the target and call arguments.
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&mut T, &[Value]) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        Hook::Closure {
            id: HandleId::next(),
            body: Closure::WithTarget(Arc::new(f)),
        }
    }

    /// A before/after closure that ignores the target.
    pub fn thunk<F>(f: F) -> Self
    where
        F: Fn() -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        Hook::Closure {
            id: HandleId::next(),
            body: Closure::NoArgs(Arc::new(f)),
        }
    }

    /// An around closure. It must call `next.run(target)` to proceed.
    pub fn around<F>(f: F) -> Self
    where
        F: for<'n> Fn(&mut T, &[Value], Next<'n, T>) -> Result<Value, CallbackError>
            + Send
            + Sync
            + 'static,
    {
        Hook::Closure {
            id: HandleId::next(),
            body: Closure::Around(Arc::new(f)),
        }
    }

    /// A delegate object.
    pub fn delegate(object: impl Delegate<T> + 'static) -> Self {
        Self::shared_delegate(Arc::new(object))
    }

    /// A delegate object that is already shared.
    pub fn shared_delegate(object: Arc<dyn Delegate<T>>) -> Self {
        Hook::Delegate {
            id: HandleId::next(),
            object,
        }
    }

    /// The identity `skip_callback` matches this hook by.
    pub fn identity(&self) -> Identity {
        match self {
            Hook::Method(name) => Identity::Method(name.clone()),
            Hook::Legacy(expr) => Identity::Legacy(expr.clone()),
            Hook::Closure { id, .. } | Hook::Delegate { id, .. } => Identity::Handle(*id),
        }
    }
}

impl<T> Clone for Hook<T> {
    fn clone(&self) -> Self {
        match self {
            Hook::Method(name) => Hook::Method(name.clone()),
            Hook::Legacy(expr) => Hook::Legacy(expr.clone()),
            Hook::Closure { id, body } => Hook::Closure {
                id: *id,
                body: body.clone(),
            },
            Hook::Delegate { id, object } => Hook::Delegate {
                id: *id,
                object: Arc::clone(object),
            },
        }
    }
}

impl<T> fmt::Debug for Hook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hook({})", self.identity())
    }
}

impl<T> From<&str> for Hook<T> {
    fn from(name: &str) -> Self {
        Hook::method(name)
    }
}

/// Whether a guard must hold or must not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Run only when the predicate is truthy.
    If,
    /// Run only when the predicate is falsy.
    Unless,
}

impl Polarity {
    /// The opposite polarity.
    pub fn negate(self) -> Self {
        match self {
            Polarity::If => Polarity::Unless,
            Polarity::Unless => Polarity::If,
        }
    }
}

/// The resolvable half of a guard.
pub enum Predicate<T> {
    /// A method on the target whose result is tested for truthiness.
    Method(String),
    /// A closure.
    Closure(Arc<GuardFn<T>>),
    /// A legacy expression string. Deprecated.
    Legacy(String),
}

impl<T> Predicate<T> {
    /// A method on the target.
    pub fn method(name: impl Into<String>) -> Self {
        Predicate::Method(name.into())
    }

    /// A closure over the target.
    pub fn when<F>(f: F) -> Self
    where
        T: 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Predicate::Closure(Arc::new(
            move |target: &T, _: &[Value]| -> Result<bool, CallbackError> { Ok(f(target)) },
        ))
    }

    /// A closure over the target and call arguments.
    pub fn when_args<F>(f: F) -> Self
    where
        T: 'static,
        F: Fn(&T, &[Value]) -> bool + Send + Sync + 'static,
    {
        Predicate::Closure(Arc::new(
            move |target: &T, args: &[Value]| -> Result<bool, CallbackError> {
                Ok(f(target, args))
            },
        ))
    }

    /// A fallible closure. An error aborts the run.
    pub fn try_when<F>(f: F) -> Self
    where
        F: Fn(&T, &[Value]) -> Result<bool, CallbackError> + Send + Sync + 'static,
    {
        Predicate::Closure(Arc::new(f))
    }

    /// A legacy expression string.
    pub fn legacy(expr: impl Into<String>) -> Self {
        Predicate::Legacy(expr.into())
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        match self {
            Predicate::Method(name) => Predicate::Method(name.clone()),
            Predicate::Closure(f) => Predicate::Closure(Arc::clone(f)),
            Predicate::Legacy(expr) => Predicate::Legacy(expr.clone()),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Method(name) => write!(f, "Method({name})"),
            Predicate::Closure(_) => f.write_str("Closure"),
            Predicate::Legacy(expr) => write!(f, "Legacy({expr:?})"),
        }
    }
}

impl<T> From<&str> for Predicate<T> {
    fn from(name: &str) -> Self {
        Predicate::method(name)
    }
}

/// A guard attached to a callback.
pub struct Condition<T> {
    /// Whether the predicate must hold or must not hold.
    pub polarity: Polarity,
    /// What to test.
    pub predicate: Predicate<T>,
}

impl<T> Condition<T> {
    /// An `if` guard.
    pub fn if_(predicate: impl Into<Predicate<T>>) -> Self {
        Self {
            polarity: Polarity::If,
            predicate: predicate.into(),
        }
    }

    /// An `unless` guard.
    pub fn unless(predicate: impl Into<Predicate<T>>) -> Self {
        Self {
            polarity: Polarity::Unless,
            predicate: predicate.into(),
        }
    }
}

impl<T> Clone for Condition<T> {
    fn clone(&self) -> Self {
        Self {
            polarity: self.polarity,
            predicate: self.predicate.clone(),
        }
    }
}

impl<T> fmt::Debug for Condition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.polarity, self.predicate)
    }
}
