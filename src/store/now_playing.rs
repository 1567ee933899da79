use parking_lot::RwLock;

use crate::{action::Action, dispatcher::ActionHandler, properties::Track};

use super::emitter::{ChangeEmitter, ListenerHandle, MaybeSendSync};

/// Tracks the track a view last asked to play. Nothing here is cached or fetched; the action
/// passes straight through.
#[derive(Debug, Default)]
pub struct NowPlayingStore {
    current: RwLock<Option<(Track, String)>>,
    listeners: ChangeEmitter<()>,
}

impl NowPlayingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.current.read().as_ref().map(|(track, _)| track.clone())
    }

    /// Which view family selected the current track.
    pub fn origin(&self) -> Option<String> {
        self.current.read().as_ref().map(|(_, origin)| origin.clone())
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

    pub fn reset(&self) {
        *self.current.write() = None;
        self.listeners.clear();
    }
}

impl ActionHandler for NowPlayingStore {
    fn name(&self) -> &'static str {
        "NowPlayingStore"
    }

    fn handle(&self, action: &Action) {
        if let Action::SetCurrentTrack { track, origin, .. } = action {
            tracing::info!("[NowPlayingStore] now playing {track}");
            *self.current.write() = Some((track.clone(), origin.clone()));
            self.listeners.emit(&());
        }
    }
}
