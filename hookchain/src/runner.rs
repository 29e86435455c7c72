//! The invocation runner.
//!
//! A run has three phases, always in this order:
//!
//! 1. **Before**: callbacks in declaration order. The first result that
//!    matches the chain's terminator halts the run.
//! 2. **Around + core**: skipped when halted. The first declared around
//!    callback is the outermost wrapper; the core action is innermost.
//! 3. **After**: callbacks in reverse declaration order. Runs even when
//!    halted unless the chain is configured to skip it.
//!
//! Any error from a guard, a callback, or the core action aborts the
//! remaining phases, the after phase included.

use crate::callback::Callback;
use crate::chain::CallbackChain;
use hookchain_core::{CallbackError, Identity, Kind, Next, Target, Value};
use std::sync::Arc;

/// The innermost continuation.
type Core<'a, T> = Box<dyn FnOnce(&mut T) -> Result<Value, CallbackError> + 'a>;

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The core action's value. `Null` when an around callback did not
    /// continue, so the core never ran.
    Completed(Value),
    /// A before callback's result matched the terminator.
    Halted {
        /// The callback that halted the chain.
        by: Identity,
    },
}

impl Outcome {
    /// Whether the chain halted.
    pub fn is_halted(&self) -> bool {
        matches!(self, Outcome::Halted { .. })
    }

    /// The completed value, if the chain did not halt.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Halted { .. } => None,
        }
    }

    /// Take the completed value, if the chain did not halt.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Halted { .. } => None,
        }
    }

    /// The identity that halted the chain, if any.
    pub fn halted_by(&self) -> Option<&Identity> {
        match self {
            Outcome::Halted { by } => Some(by),
            Outcome::Completed(_) => None,
        }
    }
}

/// Run `chain` against `target`, wrapping `core`.
pub fn run<T, F>(
    chain: &CallbackChain<T>,
    target: &mut T,
    args: &[Value],
    core: F,
) -> Result<Outcome, CallbackError>
where
    T: Target,
    F: FnOnce(&mut T) -> Result<Value, CallbackError>,
{
    if chain.is_empty() {
        return core(target).map(Outcome::Completed);
    }

    let hook = chain.name();
    let mut halted_by = None;
    for callback in chain.callbacks(Kind::Before) {
        if !callback.should_run(target, args)? {
            continue;
        }
        tracing::trace!(
            hook = %hook,
            kind = "before",
            identity = %callback.identity(),
            "hookchain.run.callback"
        );
        let result = callback.call(target, args)?;
        if chain.config().terminator.halts(&result) {
            tracing::debug!(hook = %hook, identity = %callback.identity(), "hookchain.run.halted");
            target.halted_callback_hook(callback.identity());
            halted_by = Some(callback.identity().clone());
            break;
        }
    }

    let outcome = match halted_by {
        Some(by) => Outcome::Halted { by },
        None => {
            // Around return values are discarded; the run yields the core's.
            let mut produced = None;
            let innermost: Core<'_, T> = Box::new(|target: &mut T| {
                let value = core(target)?;
                produced = Some(value.clone());
                Ok(value)
            });
            let around = chain.callbacks(Kind::Around);
            continuation(around, args, innermost).run(target)?;
            Outcome::Completed(produced.unwrap_or(Value::Null))
        }
    };

    if outcome.is_halted() && chain.config().skip_after_callbacks_if_terminated {
        return Ok(outcome);
    }
    for callback in chain.callbacks(Kind::After).iter().rev() {
        if !callback.should_run(target, args)? {
            continue;
        }
        tracing::trace!(
            hook = %hook,
            kind = "after",
            identity = %callback.identity(),
            "hookchain.run.callback"
        );
        callback.call(target, args)?;
    }

    Ok(outcome)
}

/// Build the continuation for `around`, ending in `core`.
///
/// Guards are checked as each wrapper is reached, so a wrapper further out
/// can change what the guards of the ones inside it see.
fn continuation<'a, T: Target>(
    around: &'a [Arc<Callback<T>>],
    args: &'a [Value],
    core: Core<'a, T>,
) -> Next<'a, T> {
    Next::new(move |target: &mut T| {
        let Some((head, tail)) = around.split_first() else {
            return core(target);
        };
        let next = continuation(tail, args, core);
        if !head.should_run(target, args)? {
            return next.run(target);
        }
        tracing::trace!(kind = "around", identity = %head.identity(), "hookchain.run.callback");
        head.call_around(target, args, next)
    })
}
