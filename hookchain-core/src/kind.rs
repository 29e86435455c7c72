//! Callback kinds and delegate method scopes.

use crate::error::RegistrationError;
use crate::id::HookName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a callback composes with the rest of its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Runs in declaration order before the core action. May halt the chain.
    Before,
    /// Runs in reverse declaration order after the core action.
    After,
    /// Wraps the core action; must call its continuation to proceed.
    Around,
}

impl Kind {
    /// All kinds, in phase order.
    pub const ALL: [Kind; 3] = [Kind::Before, Kind::Around, Kind::After];

    /// Lowercase name, as used in delegate method names.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Before => "before",
            Kind::After => "after",
            Kind::Around => "around",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One component of the naming rule that picks a delegate object's method.
///
/// A scope of `[Kind]` resolves to `before`/`after`/`around`; a scope of
/// `[Kind, Name]` on the `save` hook resolves to `before_save`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeComponent {
    /// The callback kind.
    Kind,
    /// The hook name.
    Name,
}

impl FromStr for ScopeComponent {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kind" => Ok(ScopeComponent::Kind),
            "name" => Ok(ScopeComponent::Name),
            other => Err(RegistrationError::InvalidScope(format!(
                "unknown scope component `{other}`"
            ))),
        }
    }
}

/// Check a scope is usable: non-empty, no repeated component.
pub fn validate_scope(scope: &[ScopeComponent]) -> Result<(), RegistrationError> {
    if scope.is_empty() {
        return Err(RegistrationError::InvalidScope("scope is empty".into()));
    }
    for (i, component) in scope.iter().enumerate() {
        if scope[..i].contains(component) {
            return Err(RegistrationError::InvalidScope(format!(
                "scope component {component:?} repeated"
            )));
        }
    }
    Ok(())
}

/// Build the delegate method name for `kind` on hook `name` under `scope`.
pub fn scoped_method_name(scope: &[ScopeComponent], kind: Kind, name: &HookName) -> String {
    scope
        .iter()
        .map(|component| match component {
            ScopeComponent::Kind => kind.as_str(),
            ScopeComponent::Name => name.as_str(),
        })
        .collect::<Vec<_>>()
        .join("_")
}
