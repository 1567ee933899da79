use parking_lot::RwLock;
use std::{fmt, sync::Arc};

use crate::{
    action::Action, dispatcher::ActionHandler, error::TchaikError, properties::CollectionNode,
    transport::Transport, wire::OutboundMessage,
};

use super::emitter::{ChangeEmitter, ListenerHandle, MaybeSendSync};

#[derive(Debug, Default)]
struct SearchState {
    query: Option<String>,
    results: Arc<Vec<CollectionNode>>,
}

/// Holds the single, global list of search results. Every update replaces the whole list and
/// fires one topic-less notification.
pub struct SearchStore {
    transport: Arc<dyn Transport>,
    state: RwLock<SearchState>,
    listeners: ChangeEmitter<()>,
}

impl fmt::Debug for SearchStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("SearchStore")
            .field("query", &state.query)
            .field("results", &state.results.len())
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl SearchStore {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        SearchStore {
            transport,
            state: RwLock::new(SearchState::default()),
            listeners: ChangeEmitter::new(),
        }
    }

    /// Ask the server for results matching `input`. The current results stay in place until the
    /// answer arrives.
    pub fn search(&self, input: &str) -> Result<(), TchaikError> {
        self.state.write().query = Some(input.to_string());
        tracing::debug!("[SearchStore] searching for {input:?}");
        self.transport.send(OutboundMessage::search(input))
    }

    pub fn get_results(&self) -> Arc<Vec<CollectionNode>> {
        self.state.read().results.clone()
    }

    /// The last query sent with [SearchStore::search].
    pub fn query(&self) -> Option<String> {
        self.state.read().query.clone()
    }

    pub fn ingest(&self, query: &str, results: Vec<CollectionNode>) {
        tracing::debug!(
            "[SearchStore] {} results for {query:?}",
            results.len()
        );
        self.state.write().results = Arc::new(results);
        self.listeners.emit(&());
    }

    pub fn add_change_listener<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn() + MaybeSendSync + 'static,
    {
        self.listeners.subscribe(move |_: &()| listener())
    }

    pub fn remove_change_listener(&self, handle: ListenerHandle) -> bool {
        self.listeners.unsubscribe(handle)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn reset(&self) {
        *self.state.write() = SearchState::default();
        self.listeners.clear();
    }
}

impl ActionHandler for SearchStore {
    fn name(&self) -> &'static str {
        "SearchStore"
    }

    fn handle(&self, action: &Action) {
        if let Action::SearchResults { query, results } = action {
            self.ingest(query, results.clone());
        }
    }
}
