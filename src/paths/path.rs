use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::error::TchaikError;

/// Name of the top-level segment of every collection path.
pub const ROOT_SEGMENT: &str = "Root";

/// Root-inclusive, ordered sequence of segments locating a node in the collection hierarchy.
///
/// Paths are never empty. Order is significant: `["Root", "A", "B"]` is the child `B` of the
/// group `A`, and two paths denote the same node only when they are element-wise equal.
/// Serializes as a plain JSON array of strings, the shape the server sends and expects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CollectionPath(Vec<String>);

impl CollectionPath {
    pub fn new<I, S>(segments: I) -> Result<CollectionPath, TchaikError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(TchaikError::InvalidPath(
                "a collection path needs at least one segment".to_string(),
            ));
        }
        Ok(CollectionPath(segments))
    }

    /// The `["Root"]` path.
    pub fn root() -> CollectionPath {
        CollectionPath(vec![ROOT_SEGMENT.to_string()])
    }

    /// Path of the child `segment` below this path.
    pub fn child<S: Into<String>>(&self, segment: S) -> CollectionPath {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        CollectionPath(segments)
    }

    /// Path of the enclosing group, or `None` for a single-segment path.
    pub fn parent(&self) -> Option<CollectionPath> {
        if self.0.len() < 2 {
            return None;
        }
        Some(CollectionPath(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Number of segments below the root, so `["Root"]` has depth 0.
    pub fn depth(&self) -> usize {
        self.0.len() - 1
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn last(&self) -> &str {
        // Non-empty by construction.
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// True when `self` is `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &CollectionPath) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

impl Default for CollectionPath {
    fn default() -> Self {
        CollectionPath::root()
    }
}

impl TryFrom<Vec<String>> for CollectionPath {
    type Error = TchaikError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        CollectionPath::new(segments)
    }
}

impl TryFrom<&[&str]> for CollectionPath {
    type Error = TchaikError;

    fn try_from(segments: &[&str]) -> Result<Self, Self::Error> {
        CollectionPath::new(segments.iter().copied())
    }
}

impl From<CollectionPath> for Vec<String> {
    fn from(path: CollectionPath) -> Self {
        path.0
    }
}

impl Display for CollectionPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}
