use serde::{Deserialize, Serialize};

use crate::{Button, ContentId, Identity, ProtocolError};

/// Payload of a `button pressed` event. The button is kept as the raw wire
/// string so that an unknown value can be reported back to the client
/// instead of failing the whole frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonPress {
    pub button: String,
    #[serde(rename = "contentId")]
    pub content_id: ContentId,
}

impl ButtonPress {
    pub fn new(button: impl Into<String>, content_id: impl Into<ContentId>) -> Self {
        Self {
            button: button.into(),
            content_id: content_id.into(),
        }
    }
}

/// Payload of `express intent` / `cancel intent`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentChange {
    #[serde(rename = "contentId")]
    pub content_id: ContentId,
    pub variant: Button,
}

/// Every event a client may send
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientMessage {
    #[serde(rename = "return UUID")]
    ClaimIdentity(Identity),
    #[serde(rename = "im alive")]
    LivenessReply(Option<Identity>),
    #[serde(rename = "button pressed")]
    ButtonPress(ButtonPress),
    #[serde(rename = "request intent")]
    RequestIntent(ContentId),
    #[serde(rename = "express intent")]
    ExpressIntent(IntentChange),
    #[serde(rename = "cancel intent")]
    CancelIntent(IntentChange),
}

impl ClientMessage {
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
            ClientMessage::ClaimIdentity(_) => "return UUID",
            ClientMessage::LivenessReply(_) => "im alive",
            ClientMessage::ButtonPress(_) => "button pressed",
            ClientMessage::RequestIntent(_) => "request intent",
            ClientMessage::ExpressIntent(_) => "express intent",
            ClientMessage::CancelIntent(_) => "cancel intent",
        }
    }
}
