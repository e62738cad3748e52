use std::net::SocketAddr;

use thiserror::Error;

mod local;
pub use local::{LocalClient, LocalHub, LocalSocket};

cfg_if! {
    if #[cfg(feature = "transport_websocket")] {
        pub mod websocket;
    }
}

/// Something that happened on the transport, in arrival order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SocketEvent {
    Connected(SocketAddr),
    Payload(SocketAddr, String),
    /// The remote end went away without the server asking it to
    Disconnected(SocketAddr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transport could not deliver to the given address")]
pub struct SendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transport receive queue is unavailable")]
pub struct RecvError;

/// Used to send frames to, and forcibly close, individual connections
pub trait PacketSender: Send + Sync {
    fn send(&self, address: &SocketAddr, payload: &str) -> Result<(), SendError>;
    /// Terminates the connection at `address`. The transport must not report
    /// a `Disconnected` event for a connection closed this way.
    fn disconnect(&self, address: &SocketAddr) -> Result<(), SendError>;
}

/// Used to receive connection lifecycle events and frames
pub trait PacketReceiver: Send + Sync {
    fn receive(&mut self) -> Result<Option<SocketEvent>, RecvError>;
}

pub trait Socket {
    fn listen(self: Box<Self>) -> (Box<dyn PacketSender>, Box<dyn PacketReceiver>);
}
