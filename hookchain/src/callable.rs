//! Normalizing declared hooks into one of two call contracts.
//!
//! Before and after callbacks use the simple contract
//! `(target, args) -> value`; around callbacks use the wrapping contract
//! `(target, args, next) -> value`. The shape of each declared hook is
//! resolved once, here, so a run is a single dispatch per callback.

use hookchain_core::hook::{AroundFn, SimpleFn, ThunkFn};
use hookchain_core::{
    CallbackError, Closure, Delegate, Hook, HookName, Kind, Next, RegistrationError,
    ScopeComponent, Target, TypeName, Value, scoped_method_name,
};
use std::sync::Arc;

/// What a declared hook needs to know about where it is being registered.
pub(crate) struct NormalizeContext<'a> {
    pub owner: &'a TypeName,
    pub hook: &'a HookName,
    pub scope: &'a [ScopeComponent],
    pub responds_to: &'a dyn Fn(&str) -> bool,
}

/// Simple contract: `(target, args) -> value`.
pub(crate) enum Simple<T> {
    Method(String),
    Legacy(String),
    Closure(Arc<SimpleFn<T>>),
    Thunk(Arc<ThunkFn>),
    Delegate {
        object: Arc<dyn Delegate<T>>,
        method: String,
    },
}

/// Wrapping contract: `(target, args, next) -> value`.
pub(crate) enum Wrapping<T> {
    Method(String),
    Closure(Arc<AroundFn<T>>),
    Delegate {
        object: Arc<dyn Delegate<T>>,
        method: String,
    },
}

/// A normalized hook body.
pub(crate) enum Callable<T> {
    Simple(Simple<T>),
    Wrapping(Wrapping<T>),
}

impl<T: Target> Simple<T> {
    pub(crate) fn call(&self, target: &mut T, args: &[Value]) -> Result<Value, CallbackError> {
        match self {
            Simple::Method(name) => target.call(name, args),
            Simple::Legacy(expr) => target.evaluate(expr),
            Simple::Closure(f) => f(target, args),
            Simple::Thunk(f) => f(),
            Simple::Delegate { object, method } => object.call(method, target, args),
        }
    }
}

impl<T: Target> Wrapping<T> {
    pub(crate) fn call(
        &self,
        target: &mut T,
        args: &[Value],
        next: Next<'_, T>,
    ) -> Result<Value, CallbackError> {
        match self {
            Wrapping::Method(name) => target.call_around(name, args, next),
            Wrapping::Closure(f) => f(target, args, next),
            Wrapping::Delegate { object, method } => object.call_around(method, target, args, next),
        }
    }
}

/// Resolve `hook` for `kind`, failing fast on anything that could not run.
pub(crate) fn normalize<T: Target>(
    kind: Kind,
    hook: &Hook<T>,
    ctx: &NormalizeContext<'_>,
) -> Result<Callable<T>, RegistrationError> {
    match hook {
        Hook::Method(name) => {
            if !(ctx.responds_to)(name) {
                return Err(RegistrationError::MissingMethod {
                    owner: ctx.owner.to_string(),
                    method: name.clone(),
                    kind,
                });
            }
            Ok(match kind {
                Kind::Around => Callable::Wrapping(Wrapping::Method(name.clone())),
                Kind::Before | Kind::After => Callable::Simple(Simple::Method(name.clone())),
            })
        }
        Hook::Legacy(expr) => {
            if kind == Kind::Around {
                return Err(RegistrationError::UnsupportedLegacyAround(expr.clone()));
            }
            tracing::warn!(
                owner = %ctx.owner,
                hook = %ctx.hook,
                expr = %expr,
                "hookchain.legacy_expression: deprecated callback, use a closure or method"
            );
            Ok(Callable::Simple(Simple::Legacy(expr.clone())))
        }
        Hook::Closure { body, .. } => match (body, kind) {
            (Closure::Around(f), Kind::Around) => {
                Ok(Callable::Wrapping(Wrapping::Closure(Arc::clone(f))))
            }
            (Closure::Around(_), kind) => Err(RegistrationError::ArityMismatch {
                kind,
                reason: "closure takes a continuation; declare it as around".into(),
            }),
            (_, Kind::Around) => Err(RegistrationError::ArityMismatch {
                kind,
                reason: "around callbacks must accept a continuation".into(),
            }),
            (Closure::WithTarget(f), _) => Ok(Callable::Simple(Simple::Closure(Arc::clone(f)))),
            (Closure::NoArgs(f), _) => Ok(Callable::Simple(Simple::Thunk(Arc::clone(f)))),
        },
        Hook::Delegate { object, .. } => {
            let method = scoped_method_name(ctx.scope, kind, ctx.hook);
            if !object.responds_to(&method) {
                return Err(RegistrationError::MissingMethod {
                    owner: "delegate".into(),
                    method,
                    kind,
                });
            }
            let object = Arc::clone(object);
            Ok(match kind {
                Kind::Around => Callable::Wrapping(Wrapping::Delegate { object, method }),
                Kind::Before | Kind::After => Callable::Simple(Simple::Delegate { object, method }),
            })
        }
    }
}

impl<T> Clone for Simple<T> {
    fn clone(&self) -> Self {
        match self {
            Simple::Method(name) => Simple::Method(name.clone()),
            Simple::Legacy(expr) => Simple::Legacy(expr.clone()),
            Simple::Closure(f) => Simple::Closure(Arc::clone(f)),
            Simple::Thunk(f) => Simple::Thunk(Arc::clone(f)),
            Simple::Delegate { object, method } => Simple::Delegate {
                object: Arc::clone(object),
                method: method.clone(),
            },
        }
    }
}

impl<T> Clone for Wrapping<T> {
    fn clone(&self) -> Self {
        match self {
            Wrapping::Method(name) => Wrapping::Method(name.clone()),
            Wrapping::Closure(f) => Wrapping::Closure(Arc::clone(f)),
            Wrapping::Delegate { object, method } => Wrapping::Delegate {
                object: Arc::clone(object),
                method: method.clone(),
            },
        }
    }
}

impl<T> Clone for Callable<T> {
    fn clone(&self) -> Self {
        match self {
            Callable::Simple(s) => Callable::Simple(s.clone()),
            Callable::Wrapping(w) => Callable::Wrapping(w.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookchain_core::test_utils::RecordingTarget;
    use serde_json::json;

    struct Auditor;

    impl Delegate<RecordingTarget> for Auditor {
        fn responds_to(&self, method: &str) -> bool {
            matches!(method, "before_save" | "around_save")
        }

        fn call(
            &self,
            method: &str,
            target: &mut RecordingTarget,
            _args: &[Value],
        ) -> Result<Value, CallbackError> {
            target.record(format!("auditor.{method}"));
            Ok(Value::Null)
        }
    }

    fn with_ctx<R>(scope: &[ScopeComponent], f: impl FnOnce(&NormalizeContext<'_>) -> R) -> R {
        let owner = TypeName::new("Doc");
        let hook = HookName::new("save");
        let responds_to = |m: &str| m == "audit";
        let ctx = NormalizeContext {
            owner: &owner,
            hook: &hook,
            scope,
            responds_to: &responds_to,
        };
        f(&ctx)
    }

    #[test]
    fn declared_method_normalizes_for_every_kind() {
        with_ctx(&[ScopeComponent::Kind], |ctx| {
            let hook: Hook<RecordingTarget> = Hook::method("audit");
            assert!(matches!(
                normalize(Kind::Before, &hook, ctx),
                Ok(Callable::Simple(Simple::Method(_)))
            ));
            assert!(matches!(
                normalize(Kind::Around, &hook, ctx),
                Ok(Callable::Wrapping(Wrapping::Method(_)))
            ));
        });
    }

    #[test]
    fn undeclared_method_fails_at_registration() {
        with_ctx(&[ScopeComponent::Kind], |ctx| {
            let hook: Hook<RecordingTarget> = Hook::method("publish");
            assert!(matches!(
                normalize(Kind::After, &hook, ctx),
                Err(RegistrationError::MissingMethod { method, kind: Kind::After, .. })
                    if method == "publish"
            ));
        });
    }

    #[test]
    fn legacy_cannot_wrap() {
        with_ctx(&[ScopeComponent::Kind], |ctx| {
            let hook: Hook<RecordingTarget> = Hook::legacy("ready?");
            assert!(normalize(Kind::Before, &hook, ctx).is_ok());
            assert!(matches!(
                normalize(Kind::Around, &hook, ctx),
                Err(RegistrationError::UnsupportedLegacyAround(_))
            ));
        });
    }

    #[test]
    fn closure_shape_must_fit_kind() {
        with_ctx(&[ScopeComponent::Kind], |ctx| {
            let simple: Hook<RecordingTarget> = Hook::thunk(|| Ok(Value::Null));
            let around: Hook<RecordingTarget> =
                Hook::around(|t: &mut RecordingTarget, _: &[Value], next| next.run(t));

            assert!(normalize(Kind::After, &simple, ctx).is_ok());
            assert!(matches!(
                normalize(Kind::Around, &simple, ctx),
                Err(RegistrationError::ArityMismatch { kind: Kind::Around, .. })
            ));
            assert!(normalize(Kind::Around, &around, ctx).is_ok());
            assert!(matches!(
                normalize(Kind::Before, &around, ctx),
                Err(RegistrationError::ArityMismatch { kind: Kind::Before, .. })
            ));
        });
    }

    #[test]
    fn delegate_method_follows_scope() {
        let scope = [ScopeComponent::Kind, ScopeComponent::Name];
        with_ctx(&scope, |ctx| {
            let hook = Hook::delegate(Auditor);
            let Ok(Callable::Simple(simple)) = normalize(Kind::Before, &hook, ctx) else {
                panic!("expected a simple delegate callable");
            };
            let mut target = RecordingTarget::new("Doc");
            simple.call(&mut target, &[]).unwrap();
            assert_eq!(target.log(), ["auditor.before_save"]);

            assert!(matches!(
                normalize(Kind::After, &hook, ctx),
                Err(RegistrationError::MissingMethod { method, .. }) if method == "after_save"
            ));
        });
    }

    #[test]
    fn default_scope_looks_for_bare_kind() {
        with_ctx(&[ScopeComponent::Kind], |ctx| {
            let hook = Hook::delegate(Auditor);
            assert!(matches!(
                normalize(Kind::Before, &hook, ctx),
                Err(RegistrationError::MissingMethod { method, .. }) if method == "before"
            ));
        });
    }

    #[test]
    fn simple_closure_receives_target_and_args() {
        with_ctx(&[ScopeComponent::Kind], |ctx| {
            let hook = Hook::closure(|t: &mut RecordingTarget, args: &[Value]| {
                t.record(format!("closure:{}", args.len()));
                Ok(json!(1))
            });
            let Ok(Callable::Simple(simple)) = normalize(Kind::Before, &hook, ctx) else {
                panic!("expected a simple closure callable");
            };
            let mut target = RecordingTarget::new("Doc");
            let value = simple.call(&mut target, &[json!(1), json!(2)]).unwrap();
            assert_eq!(value, json!(1));
            assert_eq!(target.log(), ["closure:2"]);
        });
    }
}
