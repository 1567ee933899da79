//! Payload types carried between the server and the stores.
//!
//! The stores treat [CollectionNode] as opaque: they store it, hand it out and replace it. A node
//! wraps the JSON the server sent, unchanged, and the accessors here read the parts views need
//! (name, children, track attributes). A payload the accessors do not understand is still cached
//! and returned as-is.
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use std::fmt::{Display, Formatter};

use crate::paths::CollectionPath;

/// Resolved data for one collection path: a group with ordered child references, or a leaf
/// carrying track attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CollectionNode(Value);

impl<'de> Deserialize<'de> for CollectionNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Err(de::Error::custom("collection data is null")),
            value => Ok(CollectionNode(value)),
        }
    }
}

impl Default for CollectionNode {
    fn default() -> Self {
        CollectionNode(Value::Object(Map::new()))
    }
}

impl From<Value> for CollectionNode {
    fn from(value: Value) -> Self {
        CollectionNode(value)
    }
}

impl CollectionNode {
    pub fn group<S: Into<String>>(name: S, children: Vec<ChildRef>) -> CollectionNode {
        CollectionNode(json!({ "name": name.into(), "children": children }))
    }

    pub fn leaf(track: Track) -> CollectionNode {
        CollectionNode(json!({ "name": track.name, "key": track.id, "track": track }))
    }

    /// Set `name` to `value`. A node that is not a JSON object is left unchanged.
    pub fn with_field<S: Into<String>>(mut self, name: S, value: Value) -> CollectionNode {
        if let Value::Object(map) = &mut self.0 {
            map.insert(name.into(), value);
        }
        self
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Display name; empty when the server sent none.
    pub fn name(&self) -> &str {
        self.field("name").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn key(&self) -> Option<&str> {
        self.field("key").and_then(Value::as_str)
    }

    /// Child references in server order. Entries of an unknown shape are skipped.
    pub fn children(&self) -> Vec<ChildRef> {
        let Some(Value::Array(items)) = self.field("children") else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| match ChildRef::deserialize(item) {
                Ok(child) => Some(child),
                Err(e) => {
                    tracing::debug!("[CollectionNode] skipping child reference {item}: {e}");
                    None
                }
            })
            .collect()
    }

    pub fn track(&self) -> Option<Track> {
        self.field("track")
            .and_then(|t| Track::deserialize(t).ok())
    }

    pub fn is_leaf(&self) -> bool {
        self.track().is_some()
    }

    /// Paths of this node's children, given the path this node was resolved at.
    pub fn child_paths(&self, own_path: &CollectionPath) -> Vec<CollectionPath> {
        self.children()
            .iter()
            .filter_map(|child| child.resolve(own_path))
            .collect()
    }
}

/// Reference from a group to one of its children: a bare name, an object with a `name` and an
/// optional `key`, or a sub-path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildRef {
    Name(String),
    Path(Vec<String>),
    Entry {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
    },
}

impl ChildRef {
    pub fn named<S: Into<String>>(name: S) -> ChildRef {
        ChildRef::Name(name.into())
    }

    pub fn keyed<N: Into<String>, K: Into<String>>(name: N, key: K) -> ChildRef {
        ChildRef::Entry {
            name: name.into(),
            key: Some(key.into()),
        }
    }

    pub fn path<I, S>(segments: I) -> ChildRef
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ChildRef::Path(segments.into_iter().map(Into::into).collect())
    }

    pub fn name(&self) -> &str {
        match self {
            ChildRef::Name(name) | ChildRef::Entry { name, .. } => name,
            ChildRef::Path(segments) => segments.last().map(String::as_str).unwrap_or_default(),
        }
    }

    /// The path of this child below `parent`.
    ///
    /// A sub-path that already starts with `parent` is taken as the full path; any other sub-path
    /// is relative to `parent`. An empty sub-path resolves to nothing.
    pub fn resolve(&self, parent: &CollectionPath) -> Option<CollectionPath> {
        match self {
            ChildRef::Name(name) => Some(parent.child(name.as_str())),
            ChildRef::Entry { name, key } => {
                Some(parent.child(key.as_deref().unwrap_or(name.as_str())))
            }
            ChildRef::Path(segments) if segments.is_empty() => None,
            ChildRef::Path(segments) => {
                if segments.len() > parent.depth() && segments.starts_with(parent.segments()) {
                    CollectionPath::new(segments.iter().cloned()).ok()
                } else {
                    Some(
                        segments
                            .iter()
                            .fold(parent.clone(), |path, segment| path.child(segment.as_str())),
                    )
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    /// Duration in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl Display for Track {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.artist {
            Some(artist) => write!(f, "{} - {} ({})", artist, self.name, self.id),
            None => write!(f, "{} ({})", self.name, self.id),
        }
    }
}
