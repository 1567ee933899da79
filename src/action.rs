use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::{
    paths::CollectionPath,
    properties::{CollectionNode, Track},
};

/// Indicates where an [Action] entered the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ActionSource {
    /// Raised by a view in response to user interaction.
    View,
    /// Decoded from a message the server pushed over the transport.
    #[default]
    Server,
}

/// Transport-level message types shared by the outbound requests and the inbound responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "FETCH")]
    Fetch,
    #[serde(rename = "SEARCH")]
    Search,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Fetch => "FETCH",
            MessageType::Search => "SEARCH",
        }
    }

    pub fn parse(s: &str) -> Option<MessageType> {
        match s {
            "FETCH" => Some(MessageType::Fetch),
            "SEARCH" => Some(MessageType::Search),
            _ => None,
        }
    }
}

impl Display for MessageType {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the [crate::dispatcher::Dispatcher] delivers to the registered stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// The server resolved `path` to `data`.
    CollectionFetched {
        path: CollectionPath,
        data: CollectionNode,
    },
    /// The server answered a search for `query`.
    SearchResults {
        query: String,
        results: Vec<CollectionNode>,
    },
    /// A view selected a track to play. `origin` names the view family that raised it.
    SetCurrentTrack {
        track: Track,
        origin: String,
        source: ActionSource,
    },
}

impl Action {
    pub fn source(&self) -> ActionSource {
        match self {
            Action::CollectionFetched { .. } => ActionSource::Server,
            Action::SearchResults { .. } => ActionSource::Server,
            Action::SetCurrentTrack { source, .. } => *source,
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Action::CollectionFetched { path, .. } => write!(f, "CollectionFetched({path})"),
            Action::SearchResults { query, results } => {
                write!(f, "SearchResults({query:?}, {} results)", results.len())
            }
            Action::SetCurrentTrack { track, origin, .. } => {
                write!(f, "SetCurrentTrack({track} from {origin})")
            }
        }
    }
}
