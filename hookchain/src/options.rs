//! Options for `set_callback` and `skip_callback`.

use hookchain_core::{Condition, Predicate};

/// Guards and placement for `set_callback`.
pub struct SetOptions<T> {
    pub(crate) only_if: Vec<Predicate<T>>,
    pub(crate) unless: Vec<Predicate<T>>,
    pub(crate) prepend: bool,
}

impl<T> SetOptions<T> {
    /// No guards, appended.
    pub fn new() -> Self {
        Self {
            only_if: Vec::new(),
            unless: Vec::new(),
            prepend: false,
        }
    }

    /// Run only when `predicate` is truthy.
    #[must_use]
    pub fn only_if(mut self, predicate: impl Into<Predicate<T>>) -> Self {
        self.only_if.push(predicate.into());
        self
    }

    /// Run only when `predicate` is falsy.
    #[must_use]
    pub fn unless(mut self, predicate: impl Into<Predicate<T>>) -> Self {
        self.unless.push(predicate.into());
        self
    }

    /// Insert at the front of the kind's list instead of the end.
    #[must_use]
    pub fn prepend(mut self, prepend: bool) -> Self {
        self.prepend = prepend;
        self
    }

    /// The guards as conditions: every `if`, then every `unless`.
    pub(crate) fn conditions(&self) -> Vec<Condition<T>> {
        self.only_if
            .iter()
            .cloned()
            .map(Condition::if_)
            .chain(self.unless.iter().cloned().map(Condition::unless))
            .collect()
    }
}

impl<T> Default for SetOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Guards and strictness for `skip_callback`.
///
/// Without guards, matching callbacks are removed. With guards, they stay
/// but are skipped whenever an `only_if` guard holds or an `unless` guard
/// does not.
pub struct SkipOptions<T> {
    pub(crate) only_if: Vec<Predicate<T>>,
    pub(crate) unless: Vec<Predicate<T>>,
    pub(crate) raise: bool,
}

impl<T> SkipOptions<T> {
    /// Remove unconditionally; error if nothing matches.
    pub fn new() -> Self {
        Self {
            only_if: Vec::new(),
            unless: Vec::new(),
            raise: true,
        }
    }

    /// Skip only when `predicate` is truthy.
    #[must_use]
    pub fn only_if(mut self, predicate: impl Into<Predicate<T>>) -> Self {
        self.only_if.push(predicate.into());
        self
    }

    /// Skip only when `predicate` is falsy.
    #[must_use]
    pub fn unless(mut self, predicate: impl Into<Predicate<T>>) -> Self {
        self.unless.push(predicate.into());
        self
    }

    /// Whether skipping an identity that is not in the chain is an error.
    #[must_use]
    pub fn raise(mut self, raise: bool) -> Self {
        self.raise = raise;
        self
    }

    pub(crate) fn is_conditional(&self) -> bool {
        !self.only_if.is_empty() || !self.unless.is_empty()
    }
}

impl<T> Default for SkipOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}
