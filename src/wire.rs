//! JSON envelopes exchanged with the server.
//!
//! Every message is `{"action": "<TYPE>", "data": {...}}`:
//!
//! | direction | action | data |
//! |---|---|---|
//! | out | `FETCH` | `{"path": [...]}` |
//! | out | `SEARCH` | `{"input": "..."}` |
//! | in | `FETCH` | `{"path": [...], "data": {...}}` |
//! | in | `SEARCH` | `{"query": "...", "results": [...]}` |
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{
    action::{Action, MessageType},
    error::TchaikError,
    paths::CollectionPath,
    properties::CollectionNode,
};

/// A request the client sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub action: MessageType,
    pub data: Value,
}

impl OutboundMessage {
    pub fn fetch(path: &CollectionPath) -> OutboundMessage {
        OutboundMessage {
            action: MessageType::Fetch,
            data: json!({ "path": path }),
        }
    }

    pub fn search(input: &str) -> OutboundMessage {
        OutboundMessage {
            action: MessageType::Search,
            data: json!({ "input": input }),
        }
    }

    /// The path of a FETCH request, if this is one.
    pub fn fetch_path(&self) -> Option<CollectionPath> {
        if self.action != MessageType::Fetch {
            return None;
        }
        self.data
            .get("path")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// The query of a SEARCH request, if this is one.
    pub fn search_input(&self) -> Option<&str> {
        if self.action != MessageType::Search {
            return None;
        }
        self.data.get("input").and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Result<String, TchaikError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<OutboundMessage, TchaikError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A message the server pushed to the client. The action stays a string until it is decoded
/// into an [Action], so unknown message types survive transport and are rejected in one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub action: String,
    #[serde(default)]
    pub data: Value,
}

impl InboundMessage {
    pub fn collection(path: &CollectionPath, node: &CollectionNode) -> InboundMessage {
        InboundMessage {
            action: MessageType::Fetch.to_string(),
            data: json!({ "path": path, "data": node }),
        }
    }

    pub fn search_results(query: &str, results: &[CollectionNode]) -> InboundMessage {
        InboundMessage {
            action: MessageType::Search.to_string(),
            data: json!({ "query": query, "results": results }),
        }
    }

    pub fn to_json(&self) -> Result<String, TchaikError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<InboundMessage, TchaikError> {
        serde_json::from_str(text)
            .map_err(|e| TchaikError::MalformedPayload(format!("not a message envelope: {e}")))
    }
}

fn field<T: DeserializeOwned>(data: &Map<String, Value>, name: &str) -> Result<T, TchaikError> {
    let value = data
        .get(name)
        .ok_or_else(|| TchaikError::MalformedPayload(format!("missing '{name}'")))?;
    serde_json::from_value(value.clone())
        .map_err(|e| TchaikError::MalformedPayload(format!("invalid '{name}': {e}")))
}

impl TryFrom<InboundMessage> for Action {
    type Error = TchaikError;

    fn try_from(msg: InboundMessage) -> Result<Self, Self::Error> {
        let Some(kind) = MessageType::parse(&msg.action) else {
            return Err(TchaikError::MalformedPayload(format!(
                "unknown action type '{}'",
                msg.action
            )));
        };
        let Value::Object(data) = msg.data else {
            return Err(TchaikError::MalformedPayload(format!(
                "{kind} payload is not an object"
            )));
        };
        match kind {
            MessageType::Fetch => Ok(Action::CollectionFetched {
                path: field(&data, "path")?,
                data: field(&data, "data")?,
            }),
            MessageType::Search => Ok(Action::SearchResults {
                query: field::<Option<String>>(&data, "query")
                    .ok()
                    .flatten()
                    .unwrap_or_default(),
                results: field(&data, "results")?,
            }),
        }
    }
}
