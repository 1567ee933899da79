//! Shared test utilities for store and view testing

use crate::{
    paths::{CollectionPath, PathKey},
    properties::{ChildRef, CollectionNode, Track},
    store::{CollectionStore, ListenerHandle},
    transport::{ChannelTransport, LibraryNode},
    wire::OutboundMessage,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

pub fn path(segments: &[&str]) -> CollectionPath {
    CollectionPath::try_from(segments).unwrap()
}

pub fn test_track(id: &str, name: &str) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        artist: Some("Test Artist".to_string()),
        ..Default::default()
    }
}

pub fn track_node(id: &str, name: &str) -> LibraryNode {
    LibraryNode {
        name: name.to_string(),
        track: Some(test_track(id, name)),
        ..Default::default()
    }
}

/// Root
/// ├── Foo (Album:Foo)
/// │   ├── Intro
/// │   └── Outro
/// └── Bar (Album:Bar)
///     └── Middle
pub fn sample_library() -> LibraryNode {
    LibraryNode {
        name: "Root".to_string(),
        children: vec![
            LibraryNode {
                name: "Foo".to_string(),
                key: Some("Album:Foo".to_string()),
                children: vec![track_node("t1", "Intro"), track_node("t2", "Outro")],
                ..Default::default()
            },
            LibraryNode {
                name: "Bar".to_string(),
                key: Some("Album:Bar".to_string()),
                children: vec![track_node("t3", "Middle")],
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

pub fn group(name: &str, children: &[&str]) -> CollectionNode {
    CollectionNode::group(
        name,
        children.iter().map(|c| ChildRef::named(*c)).collect(),
    )
}

/// A [CollectionStore] whose outbound requests land in the returned receiver.
pub fn channel_store() -> (Arc<CollectionStore>, UnboundedReceiver<OutboundMessage>) {
    init_logging();
    let (transport, rx) = ChannelTransport::new();
    (Arc::new(CollectionStore::new(Arc::new(transport))), rx)
}

/// Every message currently waiting in `rx`.
pub fn drain_requests(rx: &mut UnboundedReceiver<OutboundMessage>) -> Vec<OutboundMessage> {
    let mut sent = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        sent.push(msg);
    }
    sent
}

/// Register a listener that records every key it is notified with.
pub fn record_keys(store: &CollectionStore) -> (ListenerHandle, Arc<Mutex<Vec<PathKey>>>) {
    let keys = Arc::new(Mutex::new(Vec::new()));
    let sink = keys.clone();
    let handle = store.add_change_listener(move |key: &PathKey| sink.lock().push(key.clone()));
    (handle, keys)
}
