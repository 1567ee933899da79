//! Stores: the application state the views read from.
//!
//! - [`collection`]: path-keyed cache of collection subtrees ([CollectionStore])
//! - [`search`]: the current search result list ([SearchStore])
//! - [`now_playing`]: the selected track ([NowPlayingStore])
//! - [`emitter`]: the change-notification registry they all embed

pub mod collection;
pub mod emitter;
pub mod now_playing;
pub mod search;


pub use collection::{CollectionStore, FetchOutcome, Lookup};
pub use emitter::{ChangeEmitter, ListenerFn, ListenerHandle, MaybeSendSync};
pub use now_playing::NowPlayingStore;
pub use search::SearchStore;
