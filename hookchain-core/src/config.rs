//! Per-chain configuration recorded by `define_callbacks`.

use crate::error::RegistrationError;
use crate::kind::{ScopeComponent, validate_scope};
use crate::terminator::Terminator;
use serde::Deserialize;

/// How a chain halts and how delegate methods are named.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Halting rule applied to before callback results.
    pub terminator: Terminator,
    /// Naming rule for delegate object methods.
    pub scope: Vec<ScopeComponent>,
    /// Skip the after phase when a before callback halted the chain.
    pub skip_after_callbacks_if_terminated: bool,
}

impl ChainConfig {
    /// Defaults: never halt, `[kind]` scope, after callbacks always run.
    pub fn new() -> Self {
        Self {
            terminator: Terminator::never(),
            scope: vec![ScopeComponent::Kind],
            skip_after_callbacks_if_terminated: false,
        }
    }

    /// Set the terminator.
    #[must_use]
    pub fn terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    /// Set the delegate method scope.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<Vec<ScopeComponent>>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Skip after callbacks when the chain halts.
    #[must_use]
    pub fn skip_after_callbacks_if_terminated(mut self, skip: bool) -> Self {
        self.skip_after_callbacks_if_terminated = skip;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        validate_scope(&self.scope)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized form of [`ChainConfig`], e.g. loaded from a settings file.
///
/// ```json
/// { "terminator": "result == false", "scope": ["kind", "name"] }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfigFile {
    /// Terminator expression; see [`Terminator::parse`].
    #[serde(default)]
    pub terminator: Option<String>,
    /// Scope component names (`kind`, `name`).
    #[serde(default)]
    pub scope: Option<Vec<String>>,
    /// Skip after callbacks when the chain halts.
    #[serde(default)]
    pub skip_after_callbacks_if_terminated: bool,
}

impl TryFrom<ChainConfigFile> for ChainConfig {
    type Error = RegistrationError;

    fn try_from(file: ChainConfigFile) -> Result<Self, Self::Error> {
        let mut config = ChainConfig::new()
            .skip_after_callbacks_if_terminated(file.skip_after_callbacks_if_terminated);
        if let Some(expr) = file.terminator {
            config = config.terminator(Terminator::parse(&expr)?);
        }
        if let Some(scope) = file.scope {
            let scope = scope
                .iter()
                .map(|s| s.parse::<ScopeComponent>())
                .collect::<Result<Vec<_>, _>>()?;
            config = config.scope(scope);
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let config = ChainConfig::default();
        assert_eq!(config.scope, vec![ScopeComponent::Kind]);
        assert!(!config.skip_after_callbacks_if_terminated);
        assert!(!config.terminator.halts(&json!(false)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_file() {
        let file: ChainConfigFile = serde_json::from_value(json!({
            "terminator": "result == false",
            "scope": ["kind", "name"],
            "skip_after_callbacks_if_terminated": true
        }))
        .unwrap();
        let config = ChainConfig::try_from(file).unwrap();
        assert_eq!(config.scope, [ScopeComponent::Kind, ScopeComponent::Name]);
        assert!(config.skip_after_callbacks_if_terminated);
        assert!(config.terminator.halts(&json!(false)));
    }

    #[test]
    fn empty_file_is_default() {
        let file: ChainConfigFile = serde_json::from_value(json!({})).unwrap();
        let config = ChainConfig::try_from(file).unwrap();
        assert_eq!(config.scope, vec![ScopeComponent::Kind]);
    }

    #[test]
    fn bad_scope_and_terminator_fail() {
        let parse = |value| serde_json::from_value::<ChainConfigFile>(value).unwrap();

        let file = parse(json!({ "scope": [] }));
        assert!(matches!(
            ChainConfig::try_from(file),
            Err(RegistrationError::InvalidScope(_))
        ));

        let file = parse(json!({ "scope": ["verb"] }));
        assert!(matches!(
            ChainConfig::try_from(file),
            Err(RegistrationError::InvalidScope(_))
        ));

        let file = parse(json!({ "terminator": "halt!" }));
        assert!(matches!(
            ChainConfig::try_from(file),
            Err(RegistrationError::MalformedTerminator(_))
        ));
    }

    #[test]
    fn unknown_fields_rejected() {
        let parsed: Result<ChainConfigFile, _> = serde_json::from_value(json!({ "halt": true }));
        assert!(parsed.is_err());
    }
}
