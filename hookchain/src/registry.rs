//! The chain registry: per-type chains with copy-on-write inheritance.
//!
//! Types are declared with a name, an optional parent, and the methods
//! their objects respond to. A type reads its nearest ancestor's chain for a
//! hook name until it mutates that chain itself; the first local
//! `set_callback`, `skip_callback`, or `reset_callbacks` copies the inherited
//! chain into the type's own slot. Ancestors are never changed by
//! descendants.
//!
//! Changes made on a type also reach descendants that already hold their own
//! copy of the chain. Descendants without a copy see them by inheritance.
//!
//! All mutation happens under a write lock. `run_callbacks` holds the read
//! lock only long enough to take an `Arc` snapshot of the chain, so a run
//! never observes a concurrent change.

use crate::callable::NormalizeContext;
use crate::callback::Callback;
use crate::chain::{CallbackChain, Replacements};
use crate::compose::Compose;
use crate::options::{SetOptions, SkipOptions};
use crate::runner::{self, Outcome};
use hookchain_core::{
    CallbackError, ChainConfig, Hook, HookName, Identity, Kind, Predicate, RegistrationError,
    RunError, Target, TypeName, Value,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Table<T> = HashMap<TypeName, TypeEntry<T>>;

struct TypeEntry<T> {
    parent: Option<TypeName>,
    methods: HashSet<String>,
    chains: HashMap<HookName, Arc<CallbackChain<T>>>,
}

/// Declaration of an owner type.
///
/// `methods` lists what objects of this type respond to; method-name
/// callbacks are checked against it (and the ancestors' lists) when they are
/// registered.
#[derive(Debug, Clone)]
pub struct TypeDef {
    name: TypeName,
    parent: Option<TypeName>,
    methods: Vec<String>,
}

impl TypeDef {
    /// A root type with no methods.
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            methods: Vec::new(),
        }
    }

    /// Inherit from `parent`, which must already be declared.
    #[must_use]
    pub fn parent(mut self, parent: impl Into<TypeName>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Declare one method.
    #[must_use]
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.methods.push(name.into());
        self
    }

    /// Declare several methods.
    #[must_use]
    pub fn methods<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Per-type callback chains.
///
/// `Registry` is `Send + Sync`; share it behind an `Arc` or in a static.
pub struct Registry<T> {
    types: RwLock<Table<T>>,
}

impl<T: Target> Registry<T> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Table<T>> {
        self.types.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table<T>> {
        self.types.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Declare a type.
    pub fn define_type(&self, def: TypeDef) -> Result<(), RegistrationError> {
        let mut types = self.write();
        if types.contains_key(def.name.as_str()) {
            return Err(RegistrationError::DuplicateType(def.name.to_string()));
        }
        if let Some(parent) = &def.parent {
            if !types.contains_key(parent.as_str()) {
                return Err(RegistrationError::UnknownType(parent.to_string()));
            }
        }
        tracing::debug!(
            owner = %def.name,
            parent = ?def.parent.as_ref().map(TypeName::as_str),
            "hookchain.registry.define_type"
        );
        types.insert(
            def.name,
            TypeEntry {
                parent: def.parent,
                methods: def.methods.into_iter().collect(),
                chains: HashMap::new(),
            },
        );
        Ok(())
    }

    /// Whether `name` has been declared.
    pub fn has_type(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Create an empty chain for `name` on `owner` and record its
    /// configuration. Replaces any chain `owner` already had for `name`.
    pub fn define_callbacks(
        &self,
        owner: impl Into<TypeName>,
        name: impl Into<HookName>,
        config: ChainConfig,
    ) -> Result<(), RegistrationError> {
        config.validate()?;
        let (owner, name) = (owner.into(), name.into());
        let mut types = self.write();
        let entry = types
            .get_mut(owner.as_str())
            .ok_or_else(|| RegistrationError::UnknownType(owner.to_string()))?;
        tracing::debug!(owner = %owner, hook = %name, "hookchain.registry.define_callbacks");
        entry
            .chains
            .insert(name.clone(), Arc::new(CallbackChain::new(name, config)));
        Ok(())
    }

    /// Compile `hooks` as `kind` callbacks and add them to `owner`'s chain.
    pub fn set_callback<I>(
        &self,
        owner: impl Into<TypeName>,
        name: impl Into<HookName>,
        kind: Kind,
        hooks: I,
        options: SetOptions<T>,
    ) -> Result<(), RegistrationError>
    where
        I: IntoIterator<Item = Hook<T>>,
    {
        let (owner, name) = (owner.into(), name.into());
        let hooks: Vec<Hook<T>> = hooks.into_iter().collect();
        if hooks.is_empty() {
            return Err(RegistrationError::NoHooks);
        }

        let mut types = self.write();
        // Only the scope is kept, so the owner's own chain stays unique.
        let scope = existing_chain(&*types, &owner, &name)?
            .config()
            .scope
            .clone();
        warn_legacy(&owner, &name, &options.only_if, &options.unless);

        let conditions = options.conditions();
        let known = |method: &str| responds_to(&*types, owner.as_str(), method);
        let ctx = NormalizeContext {
            owner: &owner,
            hook: &name,
            scope: &scope,
            responds_to: &known,
        };
        let compile = |hook: &Hook<T>| Callback::compile(kind, hook, conditions.clone(), &ctx);
        let callbacks = hooks
            .iter()
            .map(|hook| compile(hook).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        let add = |chain: &mut CallbackChain<T>| {
            if options.prepend {
                chain.prepend(&callbacks);
            } else {
                chain.append(&callbacks);
            }
        };
        add(local_chain_mut(&mut *types, &owner, &name)?);
        for descendant in descendants_with_chain(&*types, &owner, &name) {
            if let Some(chain) = own_chain_mut(&mut *types, &descendant, &name) {
                add(chain);
            }
        }

        tracing::debug!(
            owner = %owner,
            hook = %name,
            kind = %kind,
            count = callbacks.len(),
            prepend = options.prepend,
            "hookchain.registry.set_callback"
        );
        Ok(())
    }

    /// Remove `kind` callbacks matching `identity` from `owner`'s chain, or
    /// with guards, narrow them so they are skipped when the guards apply.
    pub fn skip_callback(
        &self,
        owner: impl Into<TypeName>,
        name: impl Into<HookName>,
        kind: Kind,
        identity: impl Into<Identity>,
        options: SkipOptions<T>,
    ) -> Result<(), RegistrationError> {
        let (owner, name, identity) = (owner.into(), name.into(), identity.into());
        let mut types = self.write();

        let contains = match existing_chain(&*types, &owner, &name) {
            Ok(chain) => chain.contains(kind, &identity),
            Err(RegistrationError::UnknownHook { .. }) if !options.raise => {
                tracing::debug!(
                    owner = %owner,
                    hook = %name,
                    "hookchain.registry.skip_unknown_hook"
                );
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        if !contains {
            if options.raise {
                return Err(RegistrationError::CallbackNotFound {
                    owner: owner.to_string(),
                    hook: name.to_string(),
                    kind,
                    identity,
                });
            }
            tracing::debug!(
                owner = %owner,
                hook = %name,
                identity = %identity,
                "hookchain.registry.skip_not_found"
            );
            return Ok(());
        }
        warn_legacy(&owner, &name, &options.only_if, &options.unless);

        let mut replacements: Replacements<T> = Vec::new();
        let mut skip = |chain: &mut CallbackChain<T>| {
            if options.is_conditional() {
                chain.narrow(
                    kind,
                    &identity,
                    &options.only_if,
                    &options.unless,
                    &mut replacements,
                )
            } else {
                chain.remove(kind, &identity)
            }
        };
        let count = skip(local_chain_mut(&mut *types, &owner, &name)?);
        for descendant in descendants_with_chain(&*types, &owner, &name) {
            if let Some(chain) = own_chain_mut(&mut *types, &descendant, &name) {
                skip(chain);
            }
        }

        tracing::debug!(
            owner = %owner,
            hook = %name,
            kind = %kind,
            identity = %identity,
            count,
            conditional = options.is_conditional(),
            "hookchain.registry.skip_callback"
        );
        Ok(())
    }

    /// Clear `owner`'s chain for `name`. Ancestors are untouched;
    /// descendants lose the callbacks they inherited from it but keep their
    /// own.
    pub fn reset_callbacks(
        &self,
        owner: impl Into<TypeName>,
        name: impl Into<HookName>,
    ) -> Result<(), RegistrationError> {
        let (owner, name) = (owner.into(), name.into());
        let mut types = self.write();
        let current = existing_chain(&*types, &owner, &name)?;

        for descendant in descendants_with_chain(&*types, &owner, &name) {
            if let Some(chain) = own_chain_mut(&mut *types, &descendant, &name) {
                chain.forget(&current);
            }
        }
        let mut cleared = (*current).clone();
        cleared.reset(None);
        if let Some(entry) = types.get_mut(owner.as_str()) {
            entry.chains.insert(name.clone(), Arc::new(cleared));
        }

        tracing::debug!(owner = %owner, hook = %name, "hookchain.registry.reset_callbacks");
        Ok(())
    }

    /// The chain `owner` would run for `name`, resolved through ancestors.
    pub fn chain(&self, owner: &str, name: &str) -> Option<Arc<CallbackChain<T>>> {
        resolve(&*self.read(), owner, name)
    }

    /// Apply a composed unit's registrations to `owner`.
    pub fn compose<C>(&self, owner: impl Into<TypeName>, unit: &C) -> Result<(), RegistrationError>
    where
        C: Compose<T> + ?Sized,
    {
        let owner = owner.into();
        if !self.has_type(owner.as_str()) {
            return Err(RegistrationError::UnknownType(owner.to_string()));
        }
        tracing::debug!(owner = %owner, "hookchain.registry.compose");
        unit.compose(self, &owner)
    }

    /// Run the `name` chain for `target`'s type around `core`.
    ///
    /// Returns the core action's value, or [`Outcome::Halted`] when a
    /// before callback matched the terminator.
    pub fn run_callbacks<F>(
        &self,
        name: &str,
        target: &mut T,
        args: &[Value],
        core: F,
    ) -> Result<Outcome, RunError>
    where
        F: FnOnce(&mut T) -> Result<Value, CallbackError>,
    {
        let chain = {
            let types = self.read();
            let owner = target.type_name();
            if !types.contains_key(owner) {
                return Err(RunError::UnknownType(owner.to_owned()));
            }
            let unknown_hook = || RunError::UnknownHook {
                owner: owner.to_owned(),
                hook: name.to_owned(),
            };
            resolve(&*types, owner, name).ok_or_else(unknown_hook)?
        };
        Ok(runner::run(&chain, target, args, core)?)
    }
}

impl<T: Target> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Nearest chain for `name`, starting at `owner` and walking up parents.
fn resolve<T>(types: &Table<T>, owner: &str, name: &str) -> Option<Arc<CallbackChain<T>>> {
    let mut current = Some(owner);
    while let Some(type_name) = current {
        let entry = types.get(type_name)?;
        if let Some(chain) = entry.chains.get(name) {
            return Some(Arc::clone(chain));
        }
        current = entry.parent.as_ref().map(TypeName::as_str);
    }
    None
}

/// Like [`resolve`], but distinguishes an unknown type from a missing chain.
fn existing_chain<T>(
    types: &Table<T>,
    owner: &TypeName,
    name: &HookName,
) -> Result<Arc<CallbackChain<T>>, RegistrationError> {
    if !types.contains_key(owner.as_str()) {
        return Err(RegistrationError::UnknownType(owner.to_string()));
    }
    let unknown_hook = || RegistrationError::UnknownHook {
        owner: owner.to_string(),
        hook: name.to_string(),
    };
    resolve(types, owner.as_str(), name.as_str())
        .ok_or_else(unknown_hook)
}

fn responds_to<T>(types: &Table<T>, owner: &str, method: &str) -> bool {
    let mut current = Some(owner);
    while let Some(type_name) = current {
        let Some(entry) = types.get(type_name) else {
            return false;
        };
        if entry.methods.contains(method) {
            return true;
        }
        current = entry.parent.as_ref().map(TypeName::as_str);
    }
    false
}

fn parent_of<'t, T>(types: &'t Table<T>, name: &str) -> Option<&'t TypeName> {
    types.get(name)?.parent.as_ref()
}

fn is_descendant<T>(types: &Table<T>, candidate: &TypeName, ancestor: &TypeName) -> bool {
    let mut current = parent_of(types, candidate.as_str());
    while let Some(type_name) = current {
        if type_name == ancestor {
            return true;
        }
        current = parent_of(types, type_name.as_str());
    }
    false
}

/// Descendants of `owner` holding their own copy of `name`.
fn descendants_with_chain<T>(
    types: &Table<T>,
    owner: &TypeName,
    name: &HookName,
) -> Vec<TypeName> {
    types
        .iter()
        .filter(|(type_name, entry)| {
            entry.chains.contains_key(name.as_str()) && is_descendant(types, type_name, owner)
        })
        .map(|(type_name, _)| type_name.clone())
        .collect()
}

/// `owner`'s own chain for `name`, made unique for mutation.
fn own_chain_mut<'t, T>(
    types: &'t mut Table<T>,
    owner: &TypeName,
    name: &HookName,
) -> Option<&'t mut CallbackChain<T>> {
    let entry = types.get_mut(owner.as_str())?;
    let chain = entry.chains.get_mut(name.as_str())?;
    Some(Arc::make_mut(chain))
}

/// `owner`'s own chain for `name`, copying the inherited one first if
/// `owner` has none yet.
fn local_chain_mut<'t, T>(
    types: &'t mut Table<T>,
    owner: &TypeName,
    name: &HookName,
) -> Result<&'t mut CallbackChain<T>, RegistrationError> {
    let unknown_hook = || RegistrationError::UnknownHook {
        owner: owner.to_string(),
        hook: name.to_string(),
    };
    let has_own = types
        .get(owner.as_str())
        .ok_or_else(|| RegistrationError::UnknownType(owner.to_string()))?
        .chains
        .contains_key(name.as_str());
    if !has_own {
        let inherited = resolve(types, owner.as_str(), name.as_str())
            .ok_or_else(unknown_hook)?;
        tracing::trace!(owner = %owner, hook = %name, "hookchain.registry.copy_on_write");
        if let Some(entry) = types.get_mut(owner.as_str()) {
            entry.chains.insert(name.clone(), inherited);
        }
    }
    own_chain_mut(types, owner, name).ok_or_else(unknown_hook)
}

fn warn_legacy<T>(
    owner: &TypeName,
    name: &HookName,
    only_if: &[Predicate<T>],
    unless: &[Predicate<T>],
) {
    for predicate in only_if.iter().chain(unless) {
        if let Predicate::Legacy(expr) = predicate {
            tracing::warn!(
                owner = %owner,
                hook = %name,
                expr = %expr,
                "hookchain.legacy_expression: deprecated guard, use a closure or method"
            );
        }
    }
}
