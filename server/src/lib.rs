//! # Pairup Server
//! A server that pairs clients pressing opposite buttons on the same piece
//! of content. Clients claim a durable identity, are probed for liveness,
//! and wait in per-content queues until a partner arrives or the wait
//! expires.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub mod transport;
pub mod shared {
    pub use pairup_shared::{
        BigMap, BigMapKey, Button, ButtonPress, ClientMessage, ContentId, Identity, Instant,
        IntentChange, IntentCount, IntentCountUpdate, ProtocolError, ServerMessage, Timer,
        WaitingEnded, BUTTON_COOLDOWN, DEFAULT_PORT, DEFAULT_PROBE_INTERVAL,
        DEFAULT_PROBE_TIMEOUT, WAITING_EVICTION,
    };
}

mod connection;
mod error;
mod events;
mod intent;
mod liveness;
mod matchmaking;
mod registry;
mod server;

pub use connection::connection_key::ConnectionKey;
pub use error::{ConfigError, PairupServerError};
pub use events::{
    ConnectEvent, DisconnectEvent, DisconnectReason, ErrorEvent, IdentifyEvent, MatchEvent,
    ServerEvent, ServerEvents, WaitingEndedEvent,
};
pub use intent::{IntentLedger, IntentTracker};
pub use liveness::{LivenessAction, LivenessConfig, LivenessState, LivenessSupervisor, ReplyOutcome};
pub use matchmaking::{
    Eviction, LogPairing, MatchAttempt, MatchEngine, MatchError, MatchPair, MatchTicket,
    PairingError, PairingHandler, Waiter, WaitingQueue,
};
pub use registry::{IdentityRegistry, Link};
pub use server::{Server, ServerConfig};
