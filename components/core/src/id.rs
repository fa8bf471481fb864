use std::fmt;

use serde::Serialize;

/// Name of a device, bus or entity, unique within one build.
///
/// Valid identifiers start with an ASCII letter or `_` and continue with
/// ASCII alphanumerics or `_`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn parse(value: &str) -> Option<Self> {
        let mut chars = value.chars();
        let first = chars.next()?;
        if !(first.is_ascii_alphabetic() || first == '_') {
            return None;
        }
        if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Some(Identifier(value.to_string()))
        } else {
            None
        }
    }

    // Only for names assembled from already valid parts.
    pub(crate) fn generated(value: String) -> Self {
        Identifier(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
