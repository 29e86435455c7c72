//! Callback chains: the before, around, and after lists for one hook name.

use crate::callback::Callback;
use hookchain_core::{ChainConfig, HookName, Identity, Kind, Predicate};
use std::fmt;
use std::sync::Arc;

/// Narrowed replacements made during one skip, so every chain that shares
/// an original callback gets the same replacement.
pub(crate) type Replacements<T> = Vec<(Arc<Callback<T>>, Arc<Callback<T>>)>;

/// The ordered callbacks for one (owner type, hook name) pair.
///
/// Each kind keeps its own list in declaration order; declarations of
/// different kinds never interleave at run time. Callbacks are shared
/// between a chain and the copies descendants take of it, so cloning a chain
/// is cheap and callback identity survives the copy.
pub struct CallbackChain<T> {
    name: HookName,
    config: ChainConfig,
    before: Vec<Arc<Callback<T>>>,
    around: Vec<Arc<Callback<T>>>,
    after: Vec<Arc<Callback<T>>>,
}

impl<T> CallbackChain<T> {
    /// An empty chain.
    pub fn new(name: impl Into<HookName>, config: ChainConfig) -> Self {
        Self {
            name: name.into(),
            config,
            before: Vec::new(),
            around: Vec::new(),
            after: Vec::new(),
        }
    }

    /// The hook name.
    pub fn name(&self) -> &HookName {
        &self.name
    }

    /// Terminator, scope, and after-phase settings.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Callbacks of one kind, in declaration order.
    pub fn callbacks(&self, kind: Kind) -> &[Arc<Callback<T>>] {
        match kind {
            Kind::Before => &self.before,
            Kind::Around => &self.around,
            Kind::After => &self.after,
        }
    }

    /// Total callbacks across all kinds.
    pub fn len(&self) -> usize {
        self.before.len() + self.around.len() + self.after.len()
    }

    /// Whether the chain has no callbacks at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn list_mut(&mut self, kind: Kind) -> &mut Vec<Arc<Callback<T>>> {
        match kind {
            Kind::Before => &mut self.before,
            Kind::Around => &mut self.around,
            Kind::After => &mut self.after,
        }
    }

    /// Push callbacks onto the end of their kind's list.
    pub(crate) fn append(&mut self, callbacks: &[Arc<Callback<T>>]) {
        for callback in callbacks {
            self.list_mut(callback.kind()).push(Arc::clone(callback));
        }
    }

    /// Insert callbacks at the front of their kind's list, keeping their
    /// relative order.
    pub(crate) fn prepend(&mut self, callbacks: &[Arc<Callback<T>>]) {
        for callback in callbacks.iter().rev() {
            self.list_mut(callback.kind())
                .insert(0, Arc::clone(callback));
        }
    }

    /// Whether any callback of `kind` has `identity`.
    pub(crate) fn contains(&self, kind: Kind, identity: &Identity) -> bool {
        self.callbacks(kind)
            .iter()
            .any(|c| c.identity() == identity)
    }

    /// Remove every callback of `kind` with `identity`. Returns how many.
    pub(crate) fn remove(&mut self, kind: Kind, identity: &Identity) -> usize {
        let list = self.list_mut(kind);
        let before = list.len();
        list.retain(|c| c.identity() != identity);
        before - list.len()
    }

    /// Narrow every callback of `kind` with `identity` so it is also skipped
    /// under the given guards. Returns how many were narrowed.
    pub(crate) fn narrow(
        &mut self,
        kind: Kind,
        identity: &Identity,
        only_if: &[Predicate<T>],
        unless: &[Predicate<T>],
        replacements: &mut Replacements<T>,
    ) -> usize {
        let mut narrowed = 0;
        for slot in self.list_mut(kind).iter_mut() {
            if slot.identity() != identity {
                continue;
            }
            let replacement = match replacements.iter().find(|(old, _)| Arc::ptr_eq(old, slot)) {
                Some((_, new)) => Arc::clone(new),
                None => {
                    let new = Arc::new(slot.narrowed(only_if, unless));
                    replacements.push((Arc::clone(slot), Arc::clone(&new)));
                    new
                }
            };
            *slot = replacement;
            narrowed += 1;
        }
        narrowed
    }

    /// Clear one kind, or every kind when `kind` is `None`.
    pub(crate) fn reset(&mut self, kind: Option<Kind>) {
        match kind {
            Some(kind) => self.list_mut(kind).clear(),
            None => {
                for kind in Kind::ALL {
                    self.list_mut(kind).clear();
                }
            }
        }
    }

    /// Drop every callback that is shared with `other`.
    pub(crate) fn forget(&mut self, other: &CallbackChain<T>) {
        for kind in Kind::ALL {
            let theirs = other.callbacks(kind);
            self.list_mut(kind)
                .retain(|c| !theirs.iter().any(|o| Arc::ptr_eq(o, c)));
        }
    }
}

impl<T> Clone for CallbackChain<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            config: self.config.clone(),
            before: self.before.clone(),
            around: self.around.clone(),
            after: self.after.clone(),
        }
    }
}

impl<T> fmt::Debug for CallbackChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackChain")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("before", &self.before)
            .field("around", &self.around)
            .field("after", &self.after)
            .finish()
    }
}
