//! Compiled callbacks.

use crate::callable::{Callable, NormalizeContext, normalize};
use crate::condition;
use hookchain_core::{
    CallbackError, Condition, Hook, Identity, Kind, Next, Polarity, Predicate, RegistrationError,
    Target, Value,
};
use std::fmt;

/// One compiled hook: identity, kind, normalized body, and guards.
pub struct Callback<T> {
    identity: Identity,
    kind: Kind,
    callable: Callable<T>,
    conditions: Vec<Condition<T>>,
}

impl<T: Target> Callback<T> {
    /// Normalize `hook` for `kind` and attach `conditions`.
    pub(crate) fn compile(
        kind: Kind,
        hook: &Hook<T>,
        conditions: Vec<Condition<T>>,
        ctx: &NormalizeContext<'_>,
    ) -> Result<Self, RegistrationError> {
        Ok(Self {
            identity: hook.identity(),
            kind,
            callable: normalize(kind, hook, ctx)?,
            conditions,
        })
    }

    /// Whether this callback's guards pass for `target`.
    pub(crate) fn should_run(&self, target: &mut T, args: &[Value]) -> Result<bool, CallbackError> {
        condition::evaluate(&self.conditions, target, args)
    }

    /// Run a before/after body.
    pub(crate) fn call(&self, target: &mut T, args: &[Value]) -> Result<Value, CallbackError> {
        match &self.callable {
            Callable::Simple(simple) => simple.call(target, args),
            Callable::Wrapping(_) => Err(self.out_of_phase()),
        }
    }

    /// Run an around body.
    pub(crate) fn call_around(
        &self,
        target: &mut T,
        args: &[Value],
        next: Next<'_, T>,
    ) -> Result<Value, CallbackError> {
        match &self.callable {
            Callable::Wrapping(wrapping) => wrapping.call(target, args, next),
            Callable::Simple(_) => Err(self.out_of_phase()),
        }
    }

    fn out_of_phase(&self) -> CallbackError {
        CallbackError::Failed(format!(
            "{} callback {} invoked in the wrong phase",
            self.kind, self.identity
        ))
    }
}

impl<T> Callback<T> {
    /// The declared reference this callback was registered with.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Before, after, or around.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Guards, in declaration order.
    pub fn conditions(&self) -> &[Condition<T>] {
        &self.conditions
    }

    /// A copy that is additionally skipped when a skip guard applies.
    ///
    /// A skip's `if` guard becomes an `unless` on the callback and a skip's
    /// `unless` guard becomes an `if`, so repeated skips accumulate.
    pub(crate) fn narrowed(&self, only_if: &[Predicate<T>], unless: &[Predicate<T>]) -> Self {
        let mut conditions = self.conditions.clone();
        conditions.extend(only_if.iter().map(|p| Condition {
            polarity: Polarity::Unless,
            predicate: p.clone(),
        }));
        conditions.extend(unless.iter().map(|p| Condition {
            polarity: Polarity::If,
            predicate: p.clone(),
        }));
        Self {
            identity: self.identity.clone(),
            kind: self.kind,
            callable: self.callable.clone(),
            conditions,
        }
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("identity", &self.identity)
            .field("kind", &self.kind)
            .field("conditions", &self.conditions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookchain_core::test_utils::RecordingTarget;
    use hookchain_core::{HookName, ScopeComponent, TypeName};
    use serde_json::json;

    fn compile(kind: Kind, hook: &Hook<RecordingTarget>) -> Callback<RecordingTarget> {
        let owner = TypeName::new("Doc");
        let name = HookName::new("save");
        let responds_to = |_: &str| true;
        let ctx = NormalizeContext {
            owner: &owner,
            hook: &name,
            scope: &[ScopeComponent::Kind],
            responds_to: &responds_to,
        };
        Callback::compile(kind, hook, Vec::new(), &ctx).unwrap()
    }

    #[test]
    fn narrowing_adds_negated_guards() {
        let callback = compile(Kind::Before, &Hook::method("audit"));
        let skip_if = [Predicate::method("draft")];
        let skip_unless = [Predicate::method("admin")];
        let narrowed = callback.narrowed(&skip_if, &skip_unless);
        let polarities: Vec<_> = narrowed.conditions().iter().map(|c| c.polarity).collect();
        assert_eq!(polarities, [Polarity::Unless, Polarity::If]);
        assert_eq!(narrowed.identity(), callback.identity());
        assert!(callback.conditions().is_empty());
    }

    #[test]
    fn narrowed_callback_skips_when_skip_guard_holds() {
        let callback = compile(Kind::Before, &Hook::method("audit"));
        let narrowed = callback.narrowed(&[Predicate::method("draft")], &[]);
        let mut target = RecordingTarget::new("Doc")
            .with_method("audit", json!(null))
            .with_method("draft", json!(true));
        assert!(!narrowed.should_run(&mut target, &[]).unwrap());

        target.set_method("draft", json!(false));
        assert!(narrowed.should_run(&mut target, &[]).unwrap());
    }

    #[test]
    fn wrong_phase_is_an_error_not_a_panic() {
        let around = compile(
            Kind::Around,
            &Hook::around(|t: &mut RecordingTarget, _: &[Value], next| next.run(t)),
        );
        let mut target = RecordingTarget::new("Doc");
        let result = around.call(&mut target, &[]);
        assert!(matches!(result, Err(CallbackError::Failed(_))));
    }
}
