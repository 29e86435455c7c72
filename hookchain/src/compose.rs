//! Late composition: units that add callbacks to a type that already has
//! them.

use crate::registry::Registry;
use hookchain_core::{RegistrationError, Target, TypeName};

/// A reusable bundle of callback registrations, applied to an owner type
/// with [`Registry::compose`].
///
/// Registrations go through the normal `set_callback` path, so composed
/// callbacks are appended after the ones the type already has. Composing
/// the same unit twice registers its callbacks twice; guarding against
/// that is the caller's job.
pub trait Compose<T: Target> {
    /// Register this unit's callbacks on `owner`.
    fn compose(&self, registry: &Registry<T>, owner: &TypeName) -> Result<(), RegistrationError>;
}

impl<T, F> Compose<T> for F
where
    T: Target,
    F: Fn(&Registry<T>, &TypeName) -> Result<(), RegistrationError>,
{
    fn compose(&self, registry: &Registry<T>, owner: &TypeName) -> Result<(), RegistrationError> {
        self(registry, owner)
    }
}
