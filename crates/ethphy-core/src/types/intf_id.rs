//! Interface identifier

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one physical interface
///
/// Identifiers are assigned by the platform, never by the manager. The name
/// is carried verbatim; its format is the platform's business. A platform may
/// reuse an identifier after the interface it named has been deleted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntfId(String);

impl IntfId {
    /// Create an identifier from a platform-assigned name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The interface name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntfId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IntfId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(crate::Error::invalid_input("interface name cannot be empty"));
        }
        Ok(Self(name.to_string()))
    }
}

impl From<&str> for IntfId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for IntfId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
