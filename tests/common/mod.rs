//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::{path::PathBuf, sync::Arc};
use tchaik_core::{
    context::AppContext,
    transport::{ChannelTransport, LoopbackServer},
    wire::OutboundMessage,
};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; later calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// A small library: two artists, one with a slash in its name.
#[allow(dead_code)]
pub const LIBRARY_JSON: &str = r#"{
  "name": "Root",
  "children": [
    {
      "name": "AC/DC",
      "key": "Artist:ACDC",
      "children": [
        {
          "name": "Back In Black",
          "key": "Album:BIB",
          "year": 1980,
          "children": [
            {"name": "Hells Bells", "track": {"id": "acdc-1", "name": "Hells Bells", "artist": "AC/DC"}},
            {"name": "Shoot to Thrill", "track": {"id": "acdc-2", "name": "Shoot to Thrill", "artist": "AC/DC"}}
          ]
        }
      ]
    },
    {
      "name": "Bach",
      "key": "Artist:Bach",
      "children": [
        {
          "name": "Goldberg Variations",
          "key": "Album:Goldberg",
          "children": [
            {"name": "Aria", "track": {"id": "bach-1", "name": "Aria", "artist": "Bach"}}
          ]
        }
      ]
    }
  ]
}"#;

/// Write [LIBRARY_JSON] to `<temp_dir>/library.json` and return its path.
#[allow(dead_code)]
pub fn create_library_file(temp_dir: &TempDir) -> PathBuf {
    let path = temp_dir.path().join("library.json");
    std::fs::write(&path, LIBRARY_JSON).unwrap();
    path
}

/// An [AppContext] wired to a [LoopbackServer] by hand: `pump` plays the network.
#[allow(dead_code)]
pub struct Harness {
    pub ctx: Arc<AppContext>,
    pub server: LoopbackServer,
    pub requests: UnboundedReceiver<OutboundMessage>,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Harness {
        init_logging();
        let server = LoopbackServer::from_json(LIBRARY_JSON).unwrap();
        let (transport, requests) = ChannelTransport::new();
        Harness {
            ctx: AppContext::new(Arc::new(transport)),
            server,
            requests,
        }
    }

    /// Requests waiting to go out, without answering them.
    pub fn outgoing(&mut self) -> Vec<OutboundMessage> {
        let mut sent = Vec::new();
        while let Ok(request) = self.requests.try_recv() {
            sent.push(request);
        }
        sent
    }

    /// Answer every waiting request. Returns how many were answered.
    pub fn pump(&mut self) -> usize {
        let mut answered = 0;
        for request in self.outgoing() {
            if let Some(reply) = self.server.respond(&request) {
                self.ctx.receive(reply).unwrap();
                answered += 1;
            }
        }
        answered
    }
}
