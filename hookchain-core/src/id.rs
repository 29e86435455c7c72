//! Typed names for hook families and owner types, plus handle ids for
//! closure and delegate hooks.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Typed name wrappers keep hook names and type names from being mixed up.
/// These are just strings underneath.
macro_rules! typed_name {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed name from anything that converts to String.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&$name> for $name {
            fn from(s: &$name) -> Self {
                s.clone()
            }
        }
    };
}

typed_name!(HookName, "A family of callbacks on a type, e.g. `save`.");
typed_name!(TypeName, "Name of an owner type in the registry.");

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Process-unique id assigned to closure and delegate hooks when they are
/// constructed. Clones of a hook share its id.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct HandleId(u64);

impl HandleId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The declared reference a callback was registered with.
///
/// This is the key `skip_callback` matches on. Method names and legacy
/// expressions compare by text; closures and delegates compare by handle.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum Identity {
    /// A method on the target, by name.
    Method(String),
    /// A legacy expression string.
    Legacy(String),
    /// A closure or delegate object, by handle.
    Handle(HandleId),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Method(name) => write!(f, ":{name}"),
            Identity::Legacy(expr) => write!(f, "{expr:?}"),
            Identity::Handle(id) => write!(f, "<hook {id}>"),
        }
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Identity::Method(s.to_owned())
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Identity::Method(s)
    }
}
