use serde::{Deserialize, Serialize};

use crate::{ContentId, Identity, ProtocolError};

/// Aggregate intent counts for one content item
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentCount {
    #[serde(rename = "A")]
    pub a: u32,
    #[serde(rename = "B")]
    pub b: u32,
}

impl IntentCount {
    pub fn new(a: u32, b: u32) -> Self {
        Self { a, b }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentCountUpdate {
    #[serde(rename = "contentId")]
    pub content_id: ContentId,
    #[serde(rename = "A")]
    pub a: u32,
    #[serde(rename = "B")]
    pub b: u32,
}

impl IntentCountUpdate {
    pub fn new(content_id: &ContentId, count: &IntentCount) -> Self {
        Self {
            content_id: content_id.clone(),
            a: count.a,
            b: count.b,
        }
    }

    pub fn count(&self) -> IntentCount {
        IntentCount::new(self.a, self.b)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingEnded {
    pub uuid: Identity,
    #[serde(rename = "contentId")]
    pub content_id: ContentId,
}

/// Every event the server may send
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    #[serde(rename = "are you alive")]
    Probe,
    #[serde(rename = "response")]
    Response(String),
    #[serde(rename = "endedWaiting")]
    EndedWaiting(WaitingEnded),
    #[serde(rename = "intentCount")]
    IntentCount(IntentCountUpdate),
}

impl ServerMessage {
    pub fn response(text: impl Into<String>) -> Self {
        ServerMessage::Response(text.into())
    }

    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(frame).map_err(|error| ProtocolError::MalformedFrame {
            reason: error.to_string(),
        })
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|error| ProtocolError::EncodeFailed {
            event: self.name(),
            reason: error.to_string(),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerMessage::Probe => "are you alive",
            ServerMessage::Response(_) => "response",
            ServerMessage::EndedWaiting(_) => "endedWaiting",
            ServerMessage::IntentCount(_) => "intentCount",
        }
    }
}
