use thiserror::Error;

/// Errors that can occur while encoding or decoding wire frames
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Inbound frame could not be decoded into a known event
    #[error("Malformed frame ({reason}). Frames must be JSON objects of the form {{\"event\": ..., \"data\": ...}}")]
    MalformedFrame { reason: String },

    /// Outbound event could not be encoded
    #[error("Failed to encode '{event}' event: {reason}")]
    EncodeFailed { event: &'static str, reason: String },
}
