//! Guard evaluation.

use hookchain_core::{CallbackError, Condition, Polarity, Predicate, Target, Value, truthy};

/// Whether every `if` guard holds and every `unless` guard does not.
///
/// Guards are checked in declaration order and evaluation stops at the
/// first one that fails. An empty set passes.
pub(crate) fn evaluate<T: Target>(
    conditions: &[Condition<T>],
    target: &mut T,
    args: &[Value],
) -> Result<bool, CallbackError> {
    for condition in conditions {
        let holds = resolve(&condition.predicate, target, args)?;
        let pass = match condition.polarity {
            Polarity::If => holds,
            Polarity::Unless => !holds,
        };
        if !pass {
            return Ok(false);
        }
    }
    Ok(true)
}

fn resolve<T: Target>(
    predicate: &Predicate<T>,
    target: &mut T,
    args: &[Value],
) -> Result<bool, CallbackError> {
    match predicate {
        Predicate::Method(name) => Ok(truthy(&target.call(name, args)?)),
        Predicate::Closure(f) => f(&*target, args),
        Predicate::Legacy(expr) => Ok(truthy(&target.evaluate(expr)?)),
    }
}
