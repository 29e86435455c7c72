//! Error types for registration and invocation.

use crate::id::Identity;
use crate::kind::Kind;
use thiserror::Error;

/// Errors raised while declaring types, chains, and callbacks.
///
/// These surface immediately at setup time, never during a run.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The owner type was never declared.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A type with this name is already declared.
    #[error("type already defined: {0}")]
    DuplicateType(String),

    /// No chain with this name exists for the owner or any ancestor.
    #[error("no `{hook}` callbacks defined for {owner}")]
    UnknownHook {
        /// The owner type.
        owner: String,
        /// The hook name.
        hook: String,
    },

    /// A method reference names a method the owner type does not declare.
    #[error("{owner} does not respond to `{method}` (declared as {kind} callback)")]
    MissingMethod {
        /// The owner type, or `delegate` for delegate objects.
        owner: String,
        /// The method that was not found.
        method: String,
        /// The kind the callback was declared for.
        kind: Kind,
    },

    /// A closure's shape does not fit the kind it was declared for.
    #[error("closure cannot be used as a {kind} callback: {reason}")]
    ArityMismatch {
        /// The kind the closure was declared for.
        kind: Kind,
        /// What was wrong.
        reason: String,
    },

    /// Legacy expression strings cannot wrap a continuation.
    #[error("legacy expression `{0}` cannot be used as an around callback")]
    UnsupportedLegacyAround(String),

    /// The delegate method scope is unusable.
    #[error("invalid callback scope: {0}")]
    InvalidScope(String),

    /// A terminator expression could not be parsed.
    #[error("malformed terminator `{0}`")]
    MalformedTerminator(String),

    /// `skip_callback` found nothing to skip.
    #[error("{kind} `{hook}` callback {identity} has not been defined on {owner}")]
    CallbackNotFound {
        /// The owner type.
        owner: String,
        /// The hook name.
        hook: String,
        /// The kind searched.
        kind: Kind,
        /// The identity that did not match.
        identity: Identity,
    },

    /// `set_callback` was called without any hook.
    #[error("set_callback requires at least one hook")]
    NoHooks,
}

/// Errors raised by a callback body, a guard, or the core action.
///
/// Any of these aborts the remaining phases of the run.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The target (or delegate) has no such method.
    #[error("undefined method `{0}`")]
    NoMethod(String),

    /// The target cannot evaluate legacy expressions.
    #[error("legacy expression not supported: {0}")]
    LegacyUnsupported(String),

    /// The callback failed.
    #[error("callback failed: {0}")]
    Failed(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors from `run_callbacks`.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RunError {
    /// The target reports a type the registry does not know.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// No chain with this name exists for the target's type.
    #[error("no `{hook}` callbacks defined for {owner}")]
    UnknownHook {
        /// The owner type.
        owner: String,
        /// The hook name.
        hook: String,
    },

    /// A callback, guard, or the core action failed.
    #[error(transparent)]
    Callback(#[from] CallbackError),
}
