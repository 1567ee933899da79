use std::{fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;
use tokio::sync::mpsc::error::SendError as TokioSendError;
use url::ParseError as UrlParseError;

#[cfg(feature = "wasm")]
use serde_wasm_bindgen::Error as WasmError;

use crate::wire::{InboundMessage, OutboundMessage};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum TchaikError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Invalid collection path: {0}")]
    InvalidPath(String),
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("Re-entrant dispatch of '{0}' while another action is being dispatched")]
    ReentrantDispatch(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<toml::de::Error> for TchaikError {
    fn from(src: toml::de::Error) -> TchaikError {
        TchaikError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for TchaikError {
    fn from(src: toml::ser::Error) -> TchaikError {
        TchaikError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for TchaikError {
    fn from(src: JsonError) -> TchaikError {
        TchaikError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<UrlParseError> for TchaikError {
    fn from(src: UrlParseError) -> TchaikError {
        TchaikError::Config(format!("Invalid URL: {src}"))
    }
}

impl From<io::Error> for TchaikError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => TchaikError::NotFound(format!("{x}")),
            _ => TchaikError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for TchaikError {
    fn from(x: fmt::Error) -> Self {
        TchaikError::Serialization(format!("{x}"))
    }
}

impl From<TokioSendError<OutboundMessage>> for TchaikError {
    fn from(x: TokioSendError<OutboundMessage>) -> Self {
        TchaikError::Transport(format!(
            "Channel closed, could not transmit outbound {} message",
            x.0.action
        ))
    }
}

impl From<TokioSendError<InboundMessage>> for TchaikError {
    fn from(x: TokioSendError<InboundMessage>) -> Self {
        TchaikError::Transport(format!(
            "Channel closed, could not deliver inbound {} message",
            x.0.action
        ))
    }
}

#[cfg(feature = "wasm")]
impl From<WasmError> for TchaikError {
    fn from(wasm_error: WasmError) -> Self {
        TchaikError::Serialization(format!("Serde-wasm-bindgen error: {wasm_error}"))
    }
}
