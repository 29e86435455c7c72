//! Terminators: the rule that halts a chain from a before callback's result.

use crate::error::RegistrationError;
use crate::value::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Clone)]
enum Rule {
    Never,
    Equals(Value),
    NotEquals(Value),
    Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
}

/// Decides, from each before callback's result, whether to halt the chain.
///
/// Configured once per hook name when the chain is defined. The default
/// never halts.
///
/// # Examples
///
/// ```
/// use hookchain_core::Terminator;
/// use serde_json::json;
///
/// let t: Terminator = "result == false".parse().unwrap();
/// assert!(t.halts(&json!(false)));
/// assert!(!t.halts(&json!(null)));
/// ```
#[derive(Clone)]
pub struct Terminator {
    rule: Rule,
}

impl Terminator {
    /// Never halt.
    pub fn never() -> Self {
        Self { rule: Rule::Never }
    }

    /// Halt when a before callback returns exactly `value`.
    pub fn on_value(value: Value) -> Self {
        Self {
            rule: Rule::Equals(value),
        }
    }

    /// Halt when a before callback returns anything but `value`.
    pub fn unless_value(value: Value) -> Self {
        Self {
            rule: Rule::NotEquals(value),
        }
    }

    /// Halt when `f` returns true for a before callback's result.
    pub fn when<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            rule: Rule::Predicate(Arc::new(f)),
        }
    }

    /// Whether `result` halts the chain.
    pub fn halts(&self, result: &Value) -> bool {
        match &self.rule {
            Rule::Never => false,
            Rule::Equals(value) => result == value,
            Rule::NotEquals(value) => result != value,
            Rule::Predicate(f) => f(result),
        }
    }

    /// Parse a terminator expression.
    ///
    /// Accepted forms: `never`, `result == <json>`, `result != <json>`.
    pub fn parse(expr: &str) -> Result<Self, RegistrationError> {
        let malformed = || RegistrationError::MalformedTerminator(expr.to_owned());
        let trimmed = expr.trim();
        if trimmed == "never" {
            return Ok(Self::never());
        }
        let rest = trimmed
            .strip_prefix("result")
            .ok_or_else(malformed)?
            .trim_start();
        let (equals, literal) = if let Some(literal) = rest.strip_prefix("==") {
            (true, literal)
        } else if let Some(literal) = rest.strip_prefix("!=") {
            (false, literal)
        } else {
            return Err(malformed());
        };
        let Ok(value) = serde_json::from_str::<Value>(literal.trim()) else {
            return Err(malformed());
        };
        Ok(if equals {
            Self::on_value(value)
        } else {
            Self::unless_value(value)
        })
    }
}

impl Default for Terminator {
    fn default() -> Self {
        Self::never()
    }
}

impl FromStr for Terminator {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rule {
            Rule::Never => f.write_str("Terminator(never)"),
            Rule::Equals(v) => write!(f, "Terminator(result == {v})"),
            Rule::NotEquals(v) => write!(f, "Terminator(result != {v})"),
            Rule::Predicate(_) => f.write_str("Terminator(<fn>)"),
        }
    }
}
