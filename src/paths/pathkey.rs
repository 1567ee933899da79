//! [PathKey] is the single identity a [CollectionPath] is known by inside the stores: it is the
//! cache key and the change-notification topic at the same time.
//!
//! Segments are joined with [`SEPARATOR`]. Occurrences of the separator or of [`ESCAPE`] inside a
//! segment are escaped, so the encoding stays injective for arbitrary titles:
//!
//! ```rust
//! use tchaik_core::paths::{CollectionPath, PathKey};
//!
//! let nested = CollectionPath::new(["Root", "AC", "DC"]).unwrap();
//! let slashed = CollectionPath::new(["Root", "AC/DC"]).unwrap();
//! assert_eq!(PathKey::from(&nested).as_str(), "Root/AC/DC");
//! assert_eq!(PathKey::from(&slashed).as_str(), r"Root/AC\/DC");
//! assert_ne!(PathKey::from(&nested), PathKey::from(&slashed));
//! ```
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use super::CollectionPath;

pub const SEPARATOR: char = '/';
pub const ESCAPE: char = '\\';

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathKey(String);

impl PathKey {
    pub fn encode(path: &CollectionPath) -> PathKey {
        let mut key = String::new();
        for (idx, segment) in path.segments().iter().enumerate() {
            if idx > 0 {
                key.push(SEPARATOR);
            }
            for c in segment.chars() {
                if c == SEPARATOR || c == ESCAPE {
                    key.push(ESCAPE);
                }
                key.push(c);
            }
        }
        PathKey(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the key back into its segments. Keys are opaque to the stores; this exists for
    /// diagnostics.
    pub fn segments(&self) -> Vec<String> {
        let mut segments = vec![String::new()];
        let mut chars = self.0.chars();
        while let Some(c) = chars.next() {
            match c {
                ESCAPE => {
                    if let (Some(next), Some(current)) = (chars.next(), segments.last_mut()) {
                        current.push(next);
                    }
                }
                SEPARATOR => segments.push(String::new()),
                _ => {
                    if let Some(current) = segments.last_mut() {
                        current.push(c);
                    }
                }
            }
        }
        segments
    }
}

impl From<&CollectionPath> for PathKey {
    fn from(path: &CollectionPath) -> Self {
        PathKey::encode(path)
    }
}

impl AsRef<str> for PathKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PathKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
