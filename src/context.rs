//! AppContext: the application's single state container.
//!
//! One [AppContext] is built at startup and handed to everything that needs a store. It wires the
//! stores to the [Dispatcher], owns the outbound [Transport] they share, and pumps inbound server
//! messages into the dispatcher one at a time.
//!
//! ```rust
//! use std::sync::Arc;
//! use tchaik_core::{
//!     context::AppContext,
//!     paths::CollectionPath,
//!     transport::ChannelTransport,
//!     views::{Component, RootGroup},
//!     wire::InboundMessage,
//!     properties::CollectionNode,
//! };
//!
//! let (transport, mut outbound) = ChannelTransport::new();
//! let ctx = AppContext::new(Arc::new(transport));
//!
//! let mut view = RootGroup::new(ctx.collections(), CollectionPath::root());
//! view.mount();
//! assert!(outbound.try_recv().is_ok());
//!
//! let reply = InboundMessage::collection(&CollectionPath::root(), &CollectionNode::group("Root", vec![]));
//! ctx.receive(reply)?;
//! assert!(view.item().is_some());
//! # Ok::<(), tchaik_core::TchaikError>(())
//! ```
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    action::{Action, ActionSource},
    dispatcher::Dispatcher,
    error::TchaikError,
    paths::CollectionPath,
    properties::Track,
    store::{CollectionStore, FetchOutcome, NowPlayingStore, SearchStore},
    transport::Transport,
    wire::InboundMessage,
};

/// Origin tag for tracks selected from the collection browser.
pub const COLLECTION_ORIGIN: &str = "collection";

#[derive(Debug)]
pub struct AppContext {
    dispatcher: Dispatcher,
    collections: Arc<CollectionStore>,
    search: Arc<SearchStore>,
    now_playing: Arc<NowPlayingStore>,
}

impl AppContext {
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        let collections = Arc::new(CollectionStore::new(transport.clone()));
        let search = Arc::new(SearchStore::new(transport));
        let now_playing = Arc::new(NowPlayingStore::new());

        let dispatcher = Dispatcher::new();
        dispatcher.register(collections.clone());
        dispatcher.register(search.clone());
        dispatcher.register(now_playing.clone());

        tracing::info!("[AppContext] stores registered");
        Arc::new(AppContext {
            dispatcher,
            collections,
            search,
            now_playing,
        })
    }

    pub fn collections(&self) -> Arc<CollectionStore> {
        self.collections.clone()
    }

    pub fn search_store(&self) -> Arc<SearchStore> {
        self.search.clone()
    }

    pub fn now_playing(&self) -> Arc<NowPlayingStore> {
        self.now_playing.clone()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Request the collection at `path`, or re-announce it if it is already cached.
    pub fn fetch(&self, path: &CollectionPath) -> Result<FetchOutcome, TchaikError> {
        self.collections.fetch(path)
    }

    pub fn search(&self, input: &str) -> Result<(), TchaikError> {
        self.search.search(input)
    }

    pub fn set_current_track(&self, track: Track) -> Result<(), TchaikError> {
        self.dispatcher.dispatch(Action::SetCurrentTrack {
            track,
            origin: COLLECTION_ORIGIN.to_string(),
            source: ActionSource::View,
        })
    }

    /// Decode one server message and dispatch it. A message that does not decode is logged and
    /// reported without touching any store.
    pub fn receive(&self, message: InboundMessage) -> Result<(), TchaikError> {
        let action = Action::try_from(message).inspect_err(|e| {
            tracing::warn!("[AppContext] dropping inbound message: {e}");
        })?;
        self.dispatcher.dispatch(action)
    }

    /// Same as [AppContext::receive], starting from the raw JSON text.
    pub fn receive_json(&self, text: &str) -> Result<(), TchaikError> {
        let message = InboundMessage::from_json(text).inspect_err(|e| {
            tracing::warn!("[AppContext] dropping inbound message: {e}");
        })?;
        self.receive(message)
    }

    /// Drain `inbound` until the sending side closes, one message at a time. Bad messages are
    /// skipped; they never stop the loop.
    #[tracing::instrument(skip_all)]
    pub async fn run(&self, mut inbound: UnboundedReceiver<InboundMessage>) {
        while let Some(message) = inbound.recv().await {
            let _ = self.receive(message);
        }
        tracing::info!("[AppContext] inbound channel closed");
    }

    /// Handle every message already waiting in `inbound` without waiting for more. Returns how
    /// many were dispatched successfully.
    pub fn drain(&self, inbound: &mut UnboundedReceiver<InboundMessage>) -> usize {
        let mut handled = 0;
        while let Ok(message) = inbound.try_recv() {
            if self.receive(message).is_ok() {
                handled += 1;
            }
        }
        handled
    }

    /// Return every store to its initial state, listeners included.
    pub fn reset(&self) {
        self.collections.reset();
        self.search.reset();
        self.now_playing.reset();
    }
}
