//! # hookchain-core: Protocol types for lifecycle callback chains
//!
//! This crate defines the vocabulary shared by the `hookchain` engine and
//! the types that use it. It has no engine logic of its own.
//!
//! | Concept | Types | What it does |
//! |---------|-------|-------------|
//! | Kinds | [`Kind`], [`ScopeComponent`] | Before / around / after, and delegate naming |
//! | Declarations | [`Hook`], [`Predicate`], [`Condition`] | What callers register |
//! | Targets | [`Target`], [`Delegate`], [`Next`] | What chains run against |
//! | Halting | [`Terminator`] | When a before callback stops the chain |
//! | Configuration | [`ChainConfig`], [`ChainConfigFile`] | Per-chain settings |
//! | Errors | [`RegistrationError`], [`CallbackError`], [`RunError`] | Setup vs. run failures |
//!
//! ## Values
//!
//! Call arguments and callback results are `serde_json::Value`. Only `null`
//! and `false` are falsy (see [`truthy`]).

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod hook;
pub mod id;
pub mod kind;
pub mod target;
pub mod terminator;
pub mod value;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use config::{ChainConfig, ChainConfigFile};
pub use error::{CallbackError, RegistrationError, RunError};
pub use hook::{Closure, Condition, Hook, Polarity, Predicate};
pub use id::{HandleId, HookName, Identity, TypeName};
pub use kind::{Kind, ScopeComponent, scoped_method_name};
pub use target::{Delegate, Next, Target};
pub use terminator::Terminator;
pub use value::{Value, truthy};
