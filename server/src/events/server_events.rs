use std::{mem, vec::IntoIter};

use pairup_shared::Identity;

use crate::{
    matchmaking::{Eviction, MatchPair},
    ConnectionKey, PairupServerError,
};

/// Why a connection was torn down
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The transport reported the client went away
    ClientClosed,
    /// No liveness reply arrived before the probe deadline
    LivenessTimeout,
    /// A newer connection claimed the same identity
    Superseded,
    /// The application called `Server::disconnect_connection`
    ServerInitiated,
}

pub struct ServerEvents {
    connections: Vec<ConnectionKey>,
    disconnections: Vec<(ConnectionKey, DisconnectReason)>,
    identifications: Vec<(ConnectionKey, Identity)>,
    matches: Vec<MatchPair>,
    evictions: Vec<Eviction>,
    errors: Vec<PairupServerError>,

    empty: bool,
}

impl ServerEvents {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            disconnections: Vec::new(),
            identifications: Vec::new(),
            matches: Vec::new(),
            evictions: Vec::new(),
            errors: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ServerEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ServerEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self, connection: &ConnectionKey) {
        self.connections.push(*connection);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, connection: &ConnectionKey, reason: DisconnectReason) {
        self.disconnections.push((*connection, reason));
        self.empty = false;
    }

    pub(crate) fn push_identification(&mut self, connection: &ConnectionKey, identity: &Identity) {
        self.identifications.push((*connection, identity.clone()));
        self.empty = false;
    }

    pub(crate) fn push_match(&mut self, pair: MatchPair) {
        self.matches.push(pair);
        self.empty = false;
    }

    pub(crate) fn push_eviction(&mut self, eviction: Eviction) {
        self.evictions.push(eviction);
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: PairupServerError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait ServerEvent {
    type Iter;

    fn iter(events: &mut ServerEvents) -> Self::Iter;

    fn has(events: &ServerEvents) -> bool;
}

// ConnectEvent
pub struct ConnectEvent;
impl ServerEvent for ConnectEvent {
    type Iter = IntoIter<ConnectionKey>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        mem::take(&mut events.connections).into_iter()
    }

    fn has(events: &ServerEvents) -> bool {
        !events.connections.is_empty()
    }
}

// DisconnectEvent
pub struct DisconnectEvent;
impl ServerEvent for DisconnectEvent {
    type Iter = IntoIter<(ConnectionKey, DisconnectReason)>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        mem::take(&mut events.disconnections).into_iter()
    }

    fn has(events: &ServerEvents) -> bool {
        !events.disconnections.is_empty()
    }
}

// IdentifyEvent
pub struct IdentifyEvent;
impl ServerEvent for IdentifyEvent {
    type Iter = IntoIter<(ConnectionKey, Identity)>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        mem::take(&mut events.identifications).into_iter()
    }

    fn has(events: &ServerEvents) -> bool {
        !events.identifications.is_empty()
    }
}

// MatchEvent
pub struct MatchEvent;
impl ServerEvent for MatchEvent {
    type Iter = IntoIter<MatchPair>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        mem::take(&mut events.matches).into_iter()
    }

    fn has(events: &ServerEvents) -> bool {
        !events.matches.is_empty()
    }
}

// WaitingEndedEvent
pub struct WaitingEndedEvent;
impl ServerEvent for WaitingEndedEvent {
    type Iter = IntoIter<Eviction>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        mem::take(&mut events.evictions).into_iter()
    }

    fn has(events: &ServerEvents) -> bool {
        !events.evictions.is_empty()
    }
}

// Error Event
pub struct ErrorEvent;
impl ServerEvent for ErrorEvent {
    type Iter = IntoIter<PairupServerError>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        mem::take(&mut events.errors).into_iter()
    }

    fn has(events: &ServerEvents) -> bool {
        !events.errors.is_empty()
    }
}
