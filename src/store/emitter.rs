//! Typed change-notification registry embedded in every store.
//!
//! A [ChangeEmitter] delivers a topic value of type `T` to every listener registered at the
//! moment [ChangeEmitter::emit] is called. Listeners run synchronously, outside the registry
//! lock, so a listener may read the store, subscribe, or unsubscribe while being notified.
use parking_lot::Mutex;
use std::{
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

/// `Send + Sync` on native targets. The browser build runs on one thread and holds JS functions,
/// which are neither, so there the bound is empty.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}

pub trait ListenerFn<T>: Fn(&T) + MaybeSendSync {}
impl<T, F: Fn(&T) + MaybeSendSync> ListenerFn<T> for F {}

pub type Listener<T> = Arc<dyn ListenerFn<T>>;

static NEXT_EMITTER: AtomicU64 = AtomicU64::new(0);

/// Returned by `subscribe`; pass it back to `unsubscribe` on the same emitter. A handle is only
/// ever accepted by the emitter that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerHandle {
    emitter: u64,
    id: u64,
}

impl fmt::Display for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}.{}", self.emitter, self.id)
    }
}

pub struct ChangeEmitter<T> {
    id: u64,
    next_id: AtomicU64,
    listeners: Mutex<Vec<(ListenerHandle, Listener<T>)>>,
}

impl<T> Default for ChangeEmitter<T> {
    fn default() -> Self {
        ChangeEmitter {
            id: NEXT_EMITTER.fetch_add(1, Ordering::Relaxed),
            next_id: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
        }
    }
}

impl<T> fmt::Debug for ChangeEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeEmitter")
            .field("listeners", &self.len())
            .finish()
    }
}

impl<T> ChangeEmitter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn(&T) + MaybeSendSync + 'static,
    {
        let handle = ListenerHandle {
            emitter: self.id,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };
        self.listeners.lock().push((handle, Arc::new(listener)));
        handle
    }

    /// Returns false if `handle` was not (or no longer) registered here.
    pub fn unsubscribe(&self, handle: ListenerHandle) -> bool {
        if handle.emitter != self.id {
            tracing::warn!("[ChangeEmitter] ignoring {handle} issued by another emitter");
            return false;
        }
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(h, _)| *h != handle);
        before != listeners.len()
    }

    /// Notify every currently registered listener of `topic`. A panicking listener is logged and
    /// skipped; the remaining listeners are still notified. Returns how many listeners completed.
    pub fn emit(&self, topic: &T) -> usize {
        let snapshot: Vec<(ListenerHandle, Listener<T>)> = self.listeners.lock().clone();
        let mut delivered = 0;
        for (handle, listener) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| listener(topic))) {
                Ok(()) => delivered += 1,
                Err(panic) => {
                    let msg = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "non-string panic payload".to_string());
                    tracing::error!("[ChangeEmitter] {handle} panicked during notification: {msg}");
                }
            }
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.listeners.lock().clear();
    }
}
