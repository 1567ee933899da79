//! # tchaik-core
//!
//! The client-side data layer of the tchaik media browser: a lazily fetched, locally cached view
//! of a server-side music collection, with change notifications scoped to the subtree that
//! changed.
//!
//! ## Overview
//!
//! The collection is a tree of groups (artists, albums, ...) and tracks. The UI never loads it in
//! one go. Each view asks for the one node it displays, identified by its [`paths::CollectionPath`]
//! (`["Root", "Album:Foo"]`), and the store fetches that node over the websocket the first time
//! anyone asks for it.
//!
//! ### Key Features
//!
//! - **One request per path**: cached paths are answered locally, in-flight paths are not
//!   requested twice
//! - **Scoped notifications**: every change carries the [`paths::PathKey`] of the path whose data
//!   changed, so only the views showing that path re-read the store
//! - **Uniform mount flow**: fetching a cached path still emits a notification, so a view handles
//!   warm and cold caches through the same listener
//! - **Serialized dispatch**: server responses and view actions reach the stores one at a time;
//!   re-entrant dispatch is an error
//!
//! ## Architecture
//!
//! - **[`paths`]**: `CollectionPath` and its injective `PathKey` encoding
//! - **[`store`]**: `CollectionStore`, `SearchStore`, `NowPlayingStore` and the `ChangeEmitter`
//!   they embed
//! - **[`dispatcher`]**: the action bus in front of the stores
//! - **[`transport`]**: the outbound `Transport` seam, a channel implementation and an in-process
//!   `LoopbackServer`
//! - **[`wire`]**: JSON message envelopes
//! - **[`views`]**: `RootGroup`, `Results` and `Search` bindings
//! - **[`context`]**: `AppContext`, which owns and wires all of the above
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tchaik_core::{
//!     context::AppContext,
//!     paths::CollectionPath,
//!     store::FetchOutcome,
//!     transport::{ChannelTransport, LoopbackServer},
//! };
//!
//! let server = LoopbackServer::from_json(r#"{"name": "Root", "children": [{"name": "Foo"}]}"#)?;
//! let (transport, mut requests) = ChannelTransport::new();
//! let ctx = AppContext::new(Arc::new(transport));
//!
//! let root = CollectionPath::root();
//! let key = ctx.collections().path_to_key(&root);
//! ctx.collections().add_change_listener(move |changed| {
//!     if *changed == key {
//!         println!("root is ready");
//!     }
//! });
//!
//! assert_eq!(ctx.fetch(&root)?, FetchOutcome::Requested);
//! assert_eq!(ctx.fetch(&root)?, FetchOutcome::AlreadyPending);
//!
//! // Deliver the request to the server and its answer back to the client.
//! let request = requests.try_recv().expect("one request");
//! ctx.receive(server.respond(&request).expect("a reply"))?;
//!
//! assert!(ctx.collections().get_collection(&root).is_present());
//! assert_eq!(ctx.fetch(&root)?, FetchOutcome::Cached);
//! # Ok::<(), tchaik_core::TchaikError>(())
//! ```
//!
//! ## Threading
//!
//! Everything runs on the UI thread. Stores use `parking_lot` locks only so they can be shared
//! behind `Arc`; no lock is held while listeners run, so listeners may call back into the store.

pub mod action;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod paths;
pub mod properties;
pub mod store;
#[cfg(test)]
mod tests;
pub mod transport;
pub mod views;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;
pub mod wire;

pub use error::*;
