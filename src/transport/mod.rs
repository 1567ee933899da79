//! The client's side of the server connection.
//!
//! The stores only ever see [Transport::send]. Replies come back on a separate inbound channel
//! that [crate::context::AppContext::run] drains, so `send` never waits for an answer.
use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::{error::TchaikError, store::MaybeSendSync, wire::OutboundMessage};

pub mod loopback;

pub use loopback::{LibraryNode, LoopbackServer};

pub trait Transport: MaybeSendSync {
    /// Queue `message` for delivery and return immediately.
    fn send(&self, message: OutboundMessage) -> Result<(), TchaikError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, message: OutboundMessage) -> Result<(), TchaikError> {
        (**self).send(message)
    }
}

/// [Transport] over a tokio channel. Whatever owns the receiving half (a websocket writer, the
/// [LoopbackServer], a test) carries the messages to the server.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: UnboundedSender<OutboundMessage>,
}

impl ChannelTransport {
    pub fn new() -> (ChannelTransport, UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = unbounded_channel();
        (ChannelTransport { tx }, rx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Transport for ChannelTransport {
    fn send(&self, message: OutboundMessage) -> Result<(), TchaikError> {
        tracing::debug!("[ChannelTransport] sending {}", message.action);
        Ok(self.tx.send(message)?)
    }
}
