//! An in-process stand-in for the collection server, answering FETCH and SEARCH requests from
//! a library tree held in memory.
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::{
    action::MessageType,
    error::TchaikError,
    paths::CollectionPath,
    properties::{ChildRef, CollectionNode, Track},
    wire::{InboundMessage, OutboundMessage},
};

/// One node of a fully materialised library, children inline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LibraryNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<Track>,
    #[serde(default, flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl LibraryNode {
    pub fn segment(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    /// The node as the server sends it: children reduced to references so each level is fetched
    /// on its own.
    pub fn shallow(&self) -> CollectionNode {
        let children = self
            .children
            .iter()
            .map(|c| match &c.key {
                Some(key) => ChildRef::keyed(c.name.as_str(), key.as_str()),
                None => ChildRef::named(c.name.as_str()),
            })
            .collect();
        let mut node = CollectionNode::group(self.name.as_str(), children);
        if let Some(key) = &self.key {
            node = node.with_field("key", json!(key));
        }
        if let Some(track) = &self.track {
            node = node.with_field("track", json!(track));
        }
        for (name, value) in &self.fields {
            node = node.with_field(name.as_str(), value.clone());
        }
        node
    }
}

#[derive(Debug, Clone)]
pub struct LoopbackServer {
    root: LibraryNode,
}

impl LoopbackServer {
    pub fn new(root: LibraryNode) -> Self {
        LoopbackServer { root }
    }

    pub fn from_json(text: &str) -> Result<Self, TchaikError> {
        Ok(LoopbackServer::new(serde_json::from_str(text)?))
    }

    pub fn root(&self) -> &LibraryNode {
        &self.root
    }

    pub fn resolve(&self, path: &CollectionPath) -> Option<&LibraryNode> {
        let (first, rest) = path.segments().split_first()?;
        if first.as_str() != self.root.segment() {
            return None;
        }
        rest.iter().try_fold(&self.root, |node, segment| {
            node.children.iter().find(|c| c.segment() == segment.as_str())
        })
    }

    /// Case-insensitive name match over every node below the root, in depth-first order.
    pub fn search(&self, input: &str) -> Vec<CollectionNode> {
        let needle = input.trim().to_lowercase();
        let mut results = Vec::new();
        if needle.is_empty() {
            return results;
        }
        let mut stack: Vec<&LibraryNode> = self.root.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if node.name.to_lowercase().contains(&needle) {
                results.push(node.shallow());
            }
            stack.extend(node.children.iter().rev());
        }
        results
    }

    /// The reply to `request`, or `None` when the server has nothing to say (an unknown path is
    /// never answered).
    pub fn respond(&self, request: &OutboundMessage) -> Option<InboundMessage> {
        match request.action {
            MessageType::Fetch => {
                let path = request.fetch_path()?;
                match self.resolve(&path) {
                    Some(node) => Some(InboundMessage::collection(&path, &node.shallow())),
                    None => {
                        tracing::warn!("[LoopbackServer] no collection at {path}");
                        None
                    }
                }
            }
            MessageType::Search => {
                let input = request.search_input()?;
                Some(InboundMessage::search_results(input, &self.search(input)))
            }
        }
    }

    /// Answer requests until either side of the connection goes away.
    pub async fn serve(
        self,
        mut requests: UnboundedReceiver<OutboundMessage>,
        responses: UnboundedSender<InboundMessage>,
    ) {
        while let Some(request) = requests.recv().await {
            let Some(response) = self.respond(&request) else {
                continue;
            };
            if let Err(e) = responses.send(response) {
                tracing::info!("[LoopbackServer] client went away: {}", TchaikError::from(e));
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::tests::helpers::sample_library;

    #[test]
    fn test_resolve_by_key_and_name() {
        let server = LoopbackServer::new(sample_library());
        let album = CollectionPath::new(["Root", "Album:Foo"]).unwrap();
        assert_eq!(server.resolve(&album).map(|n| n.name.as_str()), Some("Foo"));

        let track = album.child("Intro");
        assert!(server.resolve(&track).unwrap().track.is_some());

        assert!(server
            .resolve(&CollectionPath::new(["Elsewhere"]).unwrap())
            .is_none());
        assert!(server.resolve(&CollectionPath::root().child("Nope")).is_none());
    }

    #[test]
    fn test_fetch_reply_is_shallow() {
        let server = LoopbackServer::new(sample_library());
        let reply = server
            .respond(&OutboundMessage::fetch(&CollectionPath::root()))
            .unwrap();
        let Action::CollectionFetched { path, data } = Action::try_from(reply).unwrap() else {
            panic!("expected a collection reply");
        };
        assert_eq!(path, CollectionPath::root());
        assert_eq!(
            data.children(),
            vec![
                ChildRef::keyed("Foo", "Album:Foo"),
                ChildRef::keyed("Bar", "Album:Bar"),
            ]
        );
        assert_eq!(data.child_paths(&path)[0], path.child("Album:Foo"));
    }

    #[test]
    fn test_search_matches_names() {
        let server = LoopbackServer::new(sample_library());
        let names: Vec<String> = server.search("OUT").into_iter().map(|n| n.name().to_string()).collect();
        assert_eq!(names, vec!["Outro".to_string()]);
        assert!(server.search("   ").is_empty());
    }
}
