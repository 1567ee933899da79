//! View bindings: the contract between the stores and the components that display them.
//!
//! A component never reaches into a store's maps. It reads through the store API once when it
//! mounts, subscribes, triggers the fetch for its own path, and from then on only re-reads when
//! it is told its own key changed. Markup is not produced here; [Component::render] returns a
//! [Rendered] description of what would be drawn.
use parking_lot::RwLock;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Weak,
};

use crate::{
    paths::{CollectionPath, PathKey},
    properties::CollectionNode,
    store::{CollectionStore, ListenerHandle, SearchStore},
};

/// What a component would draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// Placeholder while data is outstanding.
    Nothing,
    Group {
        path: CollectionPath,
        item: Arc<CollectionNode>,
        depth: usize,
        children: Vec<CollectionPath>,
    },
    GroupList {
        path: CollectionPath,
        list: Arc<Vec<CollectionNode>>,
        depth: usize,
    },
    NoResults,
    /// The outer collection container around another rendering.
    Collection(Box<Rendered>),
}

pub trait Component {
    /// Subscribe to the backing store and request whatever the component shows.
    fn mount(&mut self);

    /// Drop the subscription. Must be called before the component goes away; dropping a mounted
    /// component does it automatically.
    fn unmount(&mut self);

    fn is_mounted(&self) -> bool;

    fn render(&self) -> Rendered;
}

/// Component state shared with the store listener.
#[derive(Debug)]
struct ViewState<T> {
    value: RwLock<T>,
    refreshes: AtomicUsize,
}

impl<T: Clone> ViewState<T> {
    fn new(value: T) -> Arc<Self> {
        Arc::new(ViewState {
            value: RwLock::new(value),
            refreshes: AtomicUsize::new(0),
        })
    }

    fn get(&self) -> T {
        self.value.read().clone()
    }

    fn set(&self, value: T) {
        *self.value.write() = value;
    }

    fn refresh(&self, value: T) {
        self.set(value);
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }
}

/// Shows the group at one path of the collection.
pub struct RootGroup {
    path: CollectionPath,
    key: PathKey,
    store: Arc<CollectionStore>,
    state: Arc<ViewState<Option<Arc<CollectionNode>>>>,
    handle: Option<ListenerHandle>,
}

impl RootGroup {
    pub fn new(store: Arc<CollectionStore>, path: CollectionPath) -> Self {
        let key = store.path_to_key(&path);
        let state = ViewState::new(store.get_collection(&path).into_option());
        RootGroup {
            path,
            key,
            store,
            state,
            handle: None,
        }
    }

    pub fn path(&self) -> &CollectionPath {
        &self.path
    }

    pub fn item(&self) -> Option<Arc<CollectionNode>> {
        self.state.get()
    }

    /// How many notifications made this component re-read the store.
    pub fn refreshes(&self) -> usize {
        self.state.refreshes.load(Ordering::Relaxed)
    }
}

impl Component for RootGroup {
    fn mount(&mut self) {
        if self.handle.is_some() {
            return;
        }
        self.state
            .set(self.store.get_collection(&self.path).into_option());

        let store: Weak<CollectionStore> = Arc::downgrade(&self.store);
        let state = self.state.clone();
        let own_key = self.key.clone();
        let own_path = self.path.clone();
        self.handle = Some(self.store.add_change_listener(move |key: &PathKey| {
            if *key != own_key {
                return;
            }
            if let Some(store) = store.upgrade() {
                state.refresh(store.get_collection(&own_path).into_option());
            }
        }));

        // A stalled or failed fetch leaves the placeholder in place.
        if let Err(e) = self.store.fetch(&self.path) {
            tracing::warn!("[RootGroup] fetch for {} failed: {e}", self.path);
        }
    }

    fn unmount(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.store.remove_change_listener(handle);
        }
    }

    fn is_mounted(&self) -> bool {
        self.handle.is_some()
    }

    fn render(&self) -> Rendered {
        match self.state.get() {
            None => Rendered::Nothing,
            Some(item) => Rendered::Group {
                children: item.child_paths(&self.path),
                path: self.path.clone(),
                item,
                depth: 1,
            },
        }
    }
}

impl Drop for RootGroup {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Lists the current search results.
pub struct Results {
    store: Arc<SearchStore>,
    state: Arc<ViewState<Arc<Vec<CollectionNode>>>>,
    handle: Option<ListenerHandle>,
}

impl Results {
    pub fn new(store: Arc<SearchStore>) -> Self {
        let state = ViewState::new(store.get_results());
        Results {
            store,
            state,
            handle: None,
        }
    }

    pub fn refreshes(&self) -> usize {
        self.state.refreshes.load(Ordering::Relaxed)
    }
}

impl Component for Results {
    fn mount(&mut self) {
        if self.handle.is_some() {
            return;
        }
        let store: Weak<SearchStore> = Arc::downgrade(&self.store);
        let state = self.state.clone();
        self.handle = Some(self.store.add_change_listener(move || {
            if let Some(store) = store.upgrade() {
                state.refresh(store.get_results());
            }
        }));
    }

    fn unmount(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.store.remove_change_listener(handle);
        }
    }

    fn is_mounted(&self) -> bool {
        self.handle.is_some()
    }

    fn render(&self) -> Rendered {
        let list = self.state.get();
        if list.is_empty() {
            return Rendered::Collection(Box::new(Rendered::NoResults));
        }
        Rendered::GroupList {
            path: CollectionPath::root(),
            list,
            depth: 0,
        }
    }
}

impl Drop for Results {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// The search page: a collection container around [Results].
pub struct Search {
    results: Results,
}

impl Search {
    pub fn new(store: Arc<SearchStore>) -> Self {
        Search {
            results: Results::new(store),
        }
    }

    pub fn results(&self) -> &Results {
        &self.results
    }
}

impl Component for Search {
    fn mount(&mut self) {
        self.results.mount();
    }

    fn unmount(&mut self) {
        self.results.unmount();
    }

    fn is_mounted(&self) -> bool {
        self.results.is_mounted()
    }

    fn render(&self) -> Rendered {
        Rendered::Collection(Box::new(self.results.render()))
    }
}
