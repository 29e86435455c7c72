#![deny(missing_docs)]
//! # hookchain: lifecycle callback chains
//!
//! Declare named chains of before, around, and after callbacks on a type,
//! inherit them in subtypes, and run them around a core action.
//!
//! ```
//! use hookchain::prelude::*;
//! use serde_json::json;
//!
//! struct Post {
//!     log: Vec<String>,
//! }
//!
//! impl Target for Post {
//!     fn type_name(&self) -> &str {
//!         "Post"
//!     }
//!
//!     fn call(&mut self, method: &str, _args: &[Value]) -> Result<Value, CallbackError> {
//!         self.log.push(method.to_owned());
//!         Ok(Value::Null)
//!     }
//! }
//!
//! let registry = Registry::new();
//! registry.define_type(TypeDef::new("Post").method("normalize"))?;
//! registry.define_callbacks("Post", "save", ChainConfig::default())?;
//! let normalize = [Hook::method("normalize")];
//! registry.set_callback("Post", "save", Kind::Before, normalize, SetOptions::new())?;
//! registry.set_callback(
//!     "Post",
//!     "save",
//!     Kind::After,
//!     [Hook::closure(|post: &mut Post, _: &[Value]| {
//!         post.log.push("notified".into());
//!         Ok(Value::Null)
//!     })],
//!     SetOptions::new(),
//! )?;
//!
//! let mut post = Post { log: Vec::new() };
//! let outcome = registry.run_callbacks("save", &mut post, &[], |post| {
//!     post.log.push("saved".into());
//!     Ok(json!(true))
//! })?;
//!
//! assert_eq!(outcome, Outcome::Completed(json!(true)));
//! assert_eq!(post.log, ["normalize", "saved", "notified"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Layout
//!
//! | Module | What it does |
//! |--------|-------------|
//! | [`registry`] | Types, per-type chains, copy-on-write inheritance, declarative API |
//! | [`chain`] | The three ordered callback lists for one hook name |
//! | [`callback`] | A compiled hook with its guards |
//! | [`runner`] | Before, around + core, after |
//! | [`options`] | Guards and placement for set/skip |
//! | [`compose`] | Reusable bundles of registrations |
//!
//! Protocol types (hooks, predicates, terminators, errors) live in
//! [`hookchain_core`] and are re-exported here.

mod callable;
pub mod callback;
pub mod chain;
pub mod compose;
mod condition;
pub mod options;
pub mod registry;
pub mod runner;

pub use hookchain_core;

pub use callback::Callback;
pub use chain::CallbackChain;
pub use compose::Compose;
pub use options::{SetOptions, SkipOptions};
pub use registry::{Registry, TypeDef};
pub use runner::Outcome;

/// Happy-path imports for declaring and running chains.
pub mod prelude {
    pub use hookchain_core::{
        CallbackError, ChainConfig, Delegate, Hook, Identity, Kind, Next, Predicate,
        RegistrationError, RunError, ScopeComponent, Target, Terminator, TypeName, Value,
    };

    pub use crate::{Compose, Outcome, Registry, SetOptions, SkipOptions, TypeDef};
}
