//! # Pairup Shared
//! Common functionality shared between the pairup server & its clients:
//! the JSON wire protocol, identity/content/button types, and the clock
//! primitives every timer in the server is measured against.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod backends;
mod bigmap;
mod constants;
mod protocol;
mod types;

pub use backends::{Instant, TimeError, Timer, Timestamp};
pub use bigmap::{BigMap, BigMapKey};
pub use constants::{
    BUTTON_COOLDOWN, DEFAULT_PORT, DEFAULT_PROBE_INTERVAL, DEFAULT_PROBE_TIMEOUT, WAITING_EVICTION,
};
pub use protocol::{
    client_message::{ButtonPress, ClientMessage, IntentChange},
    error::ProtocolError,
    server_message::{IntentCount, IntentCountUpdate, ServerMessage, WaitingEnded},
};
pub use types::{Button, ButtonParseError, ContentId, Identity};
