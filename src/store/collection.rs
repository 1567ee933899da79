//! CollectionStore: the client-side cache of resolved collection subtrees.
//!
//! Entries are keyed by [PathKey] and only ever created from a server response to a path this
//! store asked for. The store keeps a pending set so each path is requested at most once while
//! unanswered, and tags every change notification with the key whose data changed so views can
//! ignore updates to subtrees they do not show.
use parking_lot::RwLock;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

use crate::{
    action::Action,
    dispatcher::ActionHandler,
    error::TchaikError,
    paths::{CollectionPath, PathKey},
    properties::CollectionNode,
    transport::Transport,
    wire::OutboundMessage,
};

use super::emitter::{ChangeEmitter, ListenerHandle, MaybeSendSync};

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Absent,
    Present(Arc<CollectionNode>),
}

impl Lookup {
    pub fn is_present(&self) -> bool {
        matches!(self, Lookup::Present(_))
    }

    pub fn into_option(self) -> Option<Arc<CollectionNode>> {
        match self {
            Lookup::Absent => None,
            Lookup::Present(node) => Some(node),
        }
    }
}

/// What [CollectionStore::fetch] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Already cached; a change notification was emitted synchronously.
    Cached,
    /// A FETCH request went out and the key is now pending.
    Requested,
    /// A request for this key is still unanswered; nothing was sent.
    AlreadyPending,
}

#[derive(Debug, Default)]
struct CacheState {
    cache: BTreeMap<PathKey, Arc<CollectionNode>>,
    pending: BTreeSet<PathKey>,
}

pub struct CollectionStore {
    transport: Arc<dyn Transport>,
    state: RwLock<CacheState>,
    listeners: ChangeEmitter<PathKey>,
}

impl fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("CollectionStore")
            .field("cached", &state.cache.len())
            .field("pending", &state.pending)
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl CollectionStore {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        CollectionStore {
            transport,
            state: RwLock::new(CacheState::default()),
            listeners: ChangeEmitter::new(),
        }
    }

    /// The key (and notification topic) of `path`.
    pub fn path_to_key(&self, path: &CollectionPath) -> PathKey {
        PathKey::encode(path)
    }

    pub fn get_collection(&self, path: &CollectionPath) -> Lookup {
        match self.state.read().cache.get(&self.path_to_key(path)) {
            Some(node) => Lookup::Present(node.clone()),
            None => Lookup::Absent,
        }
    }

    /// Make sure the data for `path` is on its way.
    ///
    /// A cached path is announced to the listeners straight away, so callers handle warm and cold
    /// caches the same way: subscribe, fetch, wait for their key.
    pub fn fetch(&self, path: &CollectionPath) -> Result<FetchOutcome, TchaikError> {
        let key = self.path_to_key(path);
        {
            let mut state = self.state.write();
            if state.cache.contains_key(&key) {
                drop(state);
                tracing::debug!("[CollectionStore] cache hit for {key}");
                self.emit_change(&key);
                return Ok(FetchOutcome::Cached);
            }
            if state.pending.contains(&key) {
                tracing::debug!("[CollectionStore] {key} already requested");
                return Ok(FetchOutcome::AlreadyPending);
            }
            state.pending.insert(key.clone());
        }

        // The lock is released before sending: a synchronous transport may answer immediately.
        tracing::debug!("[CollectionStore] requesting {path}");
        if let Err(e) = self.transport.send(OutboundMessage::fetch(path)) {
            self.state.write().pending.remove(&key);
            tracing::warn!("[CollectionStore] could not request {path}: {e}");
            return Err(e);
        }
        Ok(FetchOutcome::Requested)
    }

    /// Store a server response and notify listeners of its key. Returns false (and changes
    /// nothing) for a response to a path that was never requested.
    pub fn ingest(&self, path: &CollectionPath, node: CollectionNode) -> bool {
        let key = self.path_to_key(path);
        {
            let mut state = self.state.write();
            let was_pending = state.pending.remove(&key);
            if !was_pending && !state.cache.contains_key(&key) {
                tracing::warn!("[CollectionStore] dropping unsolicited response for {path}");
                return false;
            }
            if !was_pending {
                tracing::debug!("[CollectionStore] replacing cached {key}");
            }
            state.cache.insert(key.clone(), Arc::new(node));
        }
        self.emit_change(&key);
        true
    }

    pub fn emit_change(&self, key: &PathKey) -> usize {
        self.listeners.emit(key)
    }

    pub fn add_change_listener<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn(&PathKey) + MaybeSendSync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn remove_change_listener(&self, handle: ListenerHandle) -> bool {
        self.listeners.unsubscribe(handle)
    }

    pub fn is_pending(&self, path: &CollectionPath) -> bool {
        self.state.read().pending.contains(&self.path_to_key(path))
    }

    pub fn pending_count(&self) -> usize {
        self.state.read().pending.len()
    }

    pub fn cached_count(&self) -> usize {
        self.state.read().cache.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Forget every cached entry, pending request and listener.
    pub fn reset(&self) {
        *self.state.write() = CacheState::default();
        self.listeners.clear();
    }
}

impl ActionHandler for CollectionStore {
    fn name(&self) -> &'static str {
        "CollectionStore"
    }

    fn handle(&self, action: &Action) {
        if let Action::CollectionFetched { path, data } = action {
            self.ingest(path, data.clone());
        }
    }
}
