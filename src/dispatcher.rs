//! The action bus between the transport/views and the stores.
//!
//! [Dispatcher::dispatch] hands one [Action] to every registered [ActionHandler] and returns only
//! once all of them are done. Dispatching from inside a handler is a programming error: it is
//! rejected with [TchaikError::ReentrantDispatch] instead of being queued behind the current
//! action. All dispatching happens on the UI thread; the flag below is not a lock.
use parking_lot::RwLock;
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::{action::Action, error::TchaikError, store::MaybeSendSync};

pub trait ActionHandler: MaybeSendSync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn handle(&self, action: &Action);
}

#[derive(Default)]
pub struct Dispatcher {
    handlers: RwLock<Vec<Arc<dyn ActionHandler>>>,
    dispatching: AtomicBool,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field(
                "handlers",
                &self
                    .handlers
                    .read()
                    .iter()
                    .map(|h| h.name())
                    .collect::<Vec<_>>(),
            )
            .field("dispatching", &self.is_dispatching())
            .finish()
    }
}

/// Clears the dispatching flag even if a handler panics.
struct DispatchGuard<'a>(&'a AtomicBool);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handler: Arc<dyn ActionHandler>) {
        tracing::debug!("[Dispatcher] registering {}", handler.name());
        self.handlers.write().push(handler);
    }

    pub fn is_dispatching(&self) -> bool {
        self.dispatching.load(Ordering::Acquire)
    }

    pub fn dispatch(&self, action: Action) -> Result<(), TchaikError> {
        if self
            .dispatching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::error!("[Dispatcher] rejected re-entrant dispatch of {action}");
            return Err(TchaikError::ReentrantDispatch(action.to_string()));
        }
        let _guard = DispatchGuard(&self.dispatching);

        let handlers = self.handlers.read().clone();
        tracing::debug!(
            "[Dispatcher] {} ({:?}) -> {} handlers",
            action,
            action.source(),
            handlers.len()
        );
        for handler in handlers {
            handler.handle(&action);
        }
        Ok(())
    }
}
