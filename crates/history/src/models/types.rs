use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Opaque instrument identifier (e.g. "SPY", "SPY 240119C00470000").
///
/// Security type, time zones and trading hours are looked up through
/// [`SecurityLookup`](crate::resolver::SecurityLookup), never parsed out of the symbol.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(Arc::from(value.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

/// Identifier of a history provider (e.g. "LOCAL_DISK", "VENDOR_API").
pub type ProviderId = &'static str;
