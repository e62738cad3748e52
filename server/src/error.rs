use std::net::SocketAddr;

use thiserror::Error;

use pairup_shared::ProtocolError;

/// Non-fatal faults surfaced through `ErrorEvent`
#[derive(Debug, Error)]
pub enum PairupServerError {
    #[error("failed to send to {address}")]
    SendError { address: SocketAddr },
    #[error("transport receive failed")]
    RecvError,
    #[error("bad frame from {address}: {source}")]
    Protocol {
        address: SocketAddr,
        #[source]
        source: ProtocolError,
    },
    #[error("no connection is bound to {address}")]
    UnknownAddress { address: SocketAddr },
}

/// Invalid startup configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {name} is not a valid {expected}: {value:?}")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}
