use thiserror::Error;

use pairup_shared::{Button, ContentId};

use crate::ConnectionKey;

/// Reasons a button press does not reach the waiting queues. The `Display`
/// text of each variant is what the offending connection is told.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("Invalid button input. buttonId:{button} contentId:{content_id}.")]
    InvalidButton {
        button: String,
        content_id: ContentId,
    },

    /// The connection pressed a button before claiming an identity
    #[error("Identity is not claimed. Order is invalid.")]
    MissingIdentity,

    #[error("{connection} tried to press button {button} but it's still cooling down. contentId:{content_id}")]
    CoolingDown {
        connection: ConnectionKey,
        button: Button,
        content_id: ContentId,
    },

    /// A previous attempt from the same connection has not finished. Never
    /// reported to the client.
    #[error("A match attempt is already in flight for {connection}")]
    ConcurrentAttempt { connection: ConnectionKey },
}

/// Failure raised by a [`PairingHandler`](super::PairingHandler)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("Pairing handler failed: {reason}")]
    HandlerFailed { reason: String },
}
