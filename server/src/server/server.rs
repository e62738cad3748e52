use std::{collections::HashMap, mem, net::SocketAddr};

use log::{debug, info, warn};

use pairup_shared::{
    BigMap, Button, ButtonPress, ClientMessage, ContentId, Identity, Instant, IntentChange,
    IntentCount, IntentCountUpdate, ServerMessage, Timestamp, WaitingEnded,
};

use crate::{
    connection::{connection::Connection, io::Io},
    events::{DisconnectReason, ServerEvents},
    intent::IntentLedger,
    liveness::{LivenessAction, LivenessState, LivenessSupervisor, ReplyOutcome},
    matchmaking::{
        Eviction, LogPairing, MatchAttempt, MatchEngine, MatchError, PairingHandler,
    },
    registry::IdentityRegistry,
    transport::{Socket, SocketEvent},
    ConnectionKey, PairupServerError, ServerConfig,
};

const PAIRING_FAULT: &str = "Error occurred during matching process.";

/// A server that pairs connected clients pressing opposite buttons on the
/// same content, over any transport implementing [`Socket`].
///
/// The server never reads the clock or blocks: the application calls
/// [`Server::receive`] regularly with the current instant.
pub struct Server {
    config: ServerConfig,
    io: Io,
    connections: BigMap<ConnectionKey, Connection>,
    address_index: HashMap<SocketAddr, ConnectionKey>,
    registry: IdentityRegistry,
    liveness: LivenessSupervisor,
    engine: MatchEngine,
    ledger: IntentLedger,
    pairing_handler: Box<dyn PairingHandler>,
    incoming_events: ServerEvents,
}

impl Server {
    /// Create a new Server
    pub fn new(config: ServerConfig) -> Self {
        let liveness = LivenessSupervisor::new(&config.liveness);
        Self {
            config,
            io: Io::new(),
            connections: BigMap::new(),
            address_index: HashMap::new(),
            registry: IdentityRegistry::new(),
            liveness,
            engine: MatchEngine::new(),
            ledger: IntentLedger::new(),
            pairing_handler: Box::new(LogPairing),
            incoming_events: ServerEvents::new(),
        }
    }

    /// Listen on the given socket
    pub fn listen<S: Into<Box<dyn Socket>>>(&mut self, socket: S) {
        let boxed_socket: Box<dyn Socket> = socket.into();
        let (packet_sender, packet_receiver) = boxed_socket.listen();

        self.io.load(packet_sender, packet_receiver);
    }

    /// Returns whether or not the Server has initialized correctly and is
    /// listening for Clients
    pub fn is_listening(&self) -> bool {
        self.io.is_loaded()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Replaces the side-effect run for every formed pair
    pub fn set_pairing_handler<H: PairingHandler + 'static>(&mut self, handler: H) {
        self.pairing_handler = Box::new(handler);
    }

    /// Must be called regularly. Drains the transport, then fires every
    /// liveness and eviction deadline reached by `now`.
    pub fn receive(&mut self, now: &Instant) -> ServerEvents {
        self.maintain_socket(now);
        self.maintain_liveness(now);
        self.flush_evictions(now);

        mem::replace(&mut self.incoming_events, ServerEvents::new())
    }

    // Connections

    /// Forcibly closes a connection and tears down all of its state
    pub fn disconnect_connection(&mut self, connection_key: &ConnectionKey) {
        self.terminate_connection(connection_key, DisconnectReason::ServerInitiated);
    }

    pub fn connection_exists(&self, connection_key: &ConnectionKey) -> bool {
        self.connections.contains_key(connection_key)
    }

    pub fn connection_keys(&self) -> Vec<ConnectionKey> {
        let mut keys = self.connections.keys();
        keys.sort();
        keys
    }

    pub fn connections_count(&self) -> usize {
        self.connections.len()
    }

    pub fn connection_identity(&self, connection_key: &ConnectionKey) -> Option<Identity> {
        self.connections
            .get(connection_key)
            .and_then(|connection| connection.identity().cloned())
    }

    pub fn connection_address(&self, connection_key: &ConnectionKey) -> Option<SocketAddr> {
        self.connections
            .get(connection_key)
            .map(|connection| connection.address)
    }

    pub fn identity_connections(&self, identity: &Identity) -> Vec<ConnectionKey> {
        self.registry.connections(identity).to_vec()
    }

    pub fn liveness_state(&self, connection_key: &ConnectionKey) -> Option<LivenessState> {
        self.liveness.state(connection_key)
    }

    // Matchmaking

    pub fn waiting_identities(&self, content_id: &ContentId, button: Button) -> Vec<Identity> {
        self.engine.waiting(content_id, button)
    }

    pub fn is_cooling_down(&self, connection_key: &ConnectionKey, now: &Instant) -> bool {
        self.engine.is_cooling_down(connection_key, now)
    }

    pub fn intent_count(&self, content_id: &ContentId) -> IntentCount {
        self.ledger.peek(content_id).unwrap_or_default()
    }

    // Private methods

    fn maintain_socket(&mut self, now: &Instant) {
        loop {
            match self.io.recv_event() {
                Ok(Some(SocketEvent::Connected(address))) => {
                    self.add_connection(&address, now);
                }
                Ok(Some(SocketEvent::Payload(address, frame))) => {
                    let Some(connection_key) = self.address_index.get(&address).copied() else {
                        warn!("Server Error: frame from unknown address {}", address);
                        self.incoming_events
                            .push_error(PairupServerError::UnknownAddress { address });
                        continue;
                    };
                    match ClientMessage::decode(&frame) {
                        Ok(message) => self.handle_message(&connection_key, message, now),
                        Err(source) => {
                            warn!("Server Error: cannot read malformed frame from {}", address);
                            self.incoming_events
                                .push_error(PairupServerError::Protocol { address, source });
                        }
                    }
                }
                Ok(Some(SocketEvent::Disconnected(address))) => {
                    if let Some(connection_key) = self.address_index.get(&address).copied() {
                        self.teardown(&connection_key, DisconnectReason::ClientClosed);
                    }
                }
                Ok(None) => {
                    // No more events, break loop
                    break;
                }
                Err(error) => {
                    self.incoming_events.push_error(error);
                    break;
                }
            }
        }
    }

    fn maintain_liveness(&mut self, now: &Instant) {
        for action in self.liveness.poll(now) {
            match action {
                LivenessAction::SendProbe(connection_key) => {
                    self.send_to(&connection_key, &ServerMessage::Probe);
                }
                LivenessAction::Terminate(connection_key) => {
                    info!("{} did not answer the liveness probe", connection_key);
                    self.terminate_connection(&connection_key, DisconnectReason::LivenessTimeout);
                }
            }
        }
    }

    fn flush_evictions(&mut self, now: &Instant) {
        for eviction in self.engine.poll_evictions(now) {
            self.notify_eviction(&eviction);
            self.incoming_events.push_eviction(eviction);
        }
    }

    fn notify_eviction(&mut self, eviction: &Eviction) {
        info!(
            "Removed {} contentId:{}.",
            eviction.identity, eviction.content_id
        );
        self.send_to(
            &eviction.connection,
            &ServerMessage::response(format!(
                "Removed {} contentId:{}.",
                eviction.identity, eviction.content_id
            )),
        );
        self.send_to(
            &eviction.connection,
            &ServerMessage::EndedWaiting(WaitingEnded {
                uuid: eviction.identity.clone(),
                content_id: eviction.content_id.clone(),
            }),
        );
    }

    fn add_connection(&mut self, address: &SocketAddr, now: &Instant) {
        if let Some(stale_key) = self.address_index.get(address).copied() {
            warn!("{} reconnected before its previous session closed", address);
            self.teardown(&stale_key, DisconnectReason::ClientClosed);
        }

        let connection_key = self.connections.insert(Connection::new(address));
        self.address_index.insert(*address, connection_key);
        self.liveness.arm(&connection_key, now);

        info!("{} connected from {}", connection_key, address);
        self.incoming_events.push_connection(&connection_key);
    }

    fn handle_message(&mut self, connection_key: &ConnectionKey, message: ClientMessage, now: &Instant) {
        match message {
            ClientMessage::ClaimIdentity(identity) => {
                self.claim_identity(connection_key, &identity);
            }
            ClientMessage::LivenessReply(token) => {
                self.receive_liveness_reply(connection_key, token.as_ref());
            }
            ClientMessage::ButtonPress(press) => {
                self.press_button(connection_key, &press, now);
            }
            ClientMessage::RequestIntent(content_id) => {
                let Some(connection) = self.connections.get_mut(connection_key) else {
                    return;
                };
                let count = connection.intents.request(&content_id, &mut self.ledger);
                self.send_to(
                    connection_key,
                    &ServerMessage::IntentCount(IntentCountUpdate::new(&content_id, &count)),
                );
            }
            ClientMessage::ExpressIntent(IntentChange { content_id, variant }) => {
                let Some(connection) = self.connections.get_mut(connection_key) else {
                    return;
                };
                let count = connection.intents.express(&content_id, variant, &mut self.ledger);
                self.broadcast(&ServerMessage::IntentCount(IntentCountUpdate::new(
                    &content_id,
                    &count,
                )));
            }
            ClientMessage::CancelIntent(IntentChange { content_id, variant }) => {
                let Some(connection) = self.connections.get_mut(connection_key) else {
                    return;
                };
                let count = connection.intents.cancel(&content_id, variant, &mut self.ledger);
                self.broadcast(&ServerMessage::IntentCount(IntentCountUpdate::new(
                    &content_id,
                    &count,
                )));
            }
        }
    }

    fn claim_identity(&mut self, connection_key: &ConnectionKey, identity: &Identity) {
        if !identity.is_valid() {
            warn!("{} sent an empty identity token", connection_key);
            return;
        }
        let Some(connection) = self.connections.get_mut(connection_key) else {
            return;
        };

        if let Some(previous) = connection.claim_identity(identity) {
            self.registry.unlink(&previous, connection_key);
            let withdrawn = self.engine.withdraw_connection(connection_key);
            if withdrawn > 0 {
                debug!("{} left {} queue(s) held as {}", connection_key, withdrawn, previous);
            }
        }

        let link = self.registry.link(identity, connection_key);
        info!("{} claimed identity {}", connection_key, identity);
        self.incoming_events
            .push_identification(connection_key, identity);

        for superseded in link.superseded {
            info!("{} superseded by {} for {}", superseded, connection_key, identity);
            self.terminate_connection(&superseded, DisconnectReason::Superseded);
        }
    }

    fn receive_liveness_reply(&mut self, connection_key: &ConnectionKey, token: Option<&Identity>) {
        let identity_claimed = self
            .connections
            .get(connection_key)
            .is_some_and(Connection::has_identity);

        match self
            .liveness
            .receive_reply(connection_key, token, identity_claimed)
        {
            ReplyOutcome::Confirmed => {
                debug!("{} confirmed liveness", connection_key);
            }
            ReplyOutcome::Unidentified => {
                debug!("{} replied to a probe before claiming an identity", connection_key);
            }
            ReplyOutcome::Invalid => {
                warn!("{} replied to a probe without an identity token", connection_key);
            }
            ReplyOutcome::Unsolicited | ReplyOutcome::UnknownConnection => {
                debug!("{} sent an unsolicited liveness reply", connection_key);
            }
        }
    }

    fn press_button(&mut self, connection_key: &ConnectionKey, press: &ButtonPress, now: &Instant) {
        // evictions due by now must not be paired with
        self.flush_evictions(now);

        let Some(identity) = self.connection_identity(connection_key) else {
            self.reply(connection_key, MatchError::MissingIdentity.to_string());
            return;
        };

        let attempt = match self.engine.attempt_match(
            connection_key,
            &press.button,
            &press.content_id,
            &identity,
            now,
        ) {
            Ok(attempt) => attempt,
            Err(MatchError::ConcurrentAttempt { connection }) => {
                debug!("Dropped press from {} while its match is in flight", connection);
                return;
            }
            Err(error) => {
                info!("{}", error);
                self.reply(connection_key, error.to_string());
                return;
            }
        };

        let button = match &attempt {
            MatchAttempt::Waiting { button, .. } => *button,
            MatchAttempt::Paired(ticket) => ticket.pair().initiator_button,
        };
        self.reply(
            connection_key,
            format!(
                "Button {} pressed by {} time:{} contentId:{}",
                button,
                connection_key,
                Timestamp::now_millis_or_zero(),
                press.content_id
            ),
        );

        match attempt {
            MatchAttempt::Waiting { content_id, .. } => {
                let stacked = format!(
                    "Stacked {} ( {} ) contentId:{}.",
                    connection_key, identity, content_id
                );
                info!("{}", stacked);
                self.reply(connection_key, stacked);
            }
            MatchAttempt::Paired(ticket) => {
                let outcome = self.pairing_handler.on_pair(ticket.pair());
                let paired = outcome.is_ok();
                let pair = self.engine.finish(ticket, paired);

                if let Err(error) = outcome {
                    warn!("{} ({})", PAIRING_FAULT, error);
                    self.reply(connection_key, PAIRING_FAULT.to_string());
                    return;
                }

                let description = pair.describe();
                self.reply(&pair.initiator_connection, description.clone());
                self.reply(&pair.partner_connection, description);
                self.incoming_events.push_match(pair);
            }
        }
    }

    fn reply(&mut self, connection_key: &ConnectionKey, text: String) {
        self.send_to(connection_key, &ServerMessage::Response(text));
    }

    fn send_to(&mut self, connection_key: &ConnectionKey, message: &ServerMessage) {
        let Some(connection) = self.connections.get(connection_key) else {
            return;
        };
        if let Err(error) = self.io.send_message(&connection.address, message) {
            warn!("Server Error: cannot send '{}' to {}", message.name(), connection_key);
            self.incoming_events.push_error(error);
        }
    }

    fn broadcast(&mut self, message: &ServerMessage) {
        let mut keys = self.connections.keys();
        fastrand::shuffle(&mut keys);
        for connection_key in keys {
            self.send_to(&connection_key, message);
        }
    }

    fn terminate_connection(&mut self, connection_key: &ConnectionKey, reason: DisconnectReason) {
        let Some(address) = self.connection_address(connection_key) else {
            return;
        };
        if let Err(error) = self.io.disconnect(&address) {
            warn!("Server Error: cannot close {}", address);
            self.incoming_events.push_error(error);
        }
        self.teardown(connection_key, reason);
    }

    /// Releases everything held for a connection. Runs exactly once per
    /// connection whatever ended it.
    fn teardown(&mut self, connection_key: &ConnectionKey, reason: DisconnectReason) {
        let Some(mut connection) = self.connections.remove(connection_key) else {
            return;
        };
        if self.address_index.get(&connection.address) == Some(connection_key) {
            self.address_index.remove(&connection.address);
        }

        self.liveness.disarm(connection_key);
        self.engine.purge_connection(connection_key);
        if let Some(identity) = connection.take_identity() {
            self.registry.unlink(&identity, connection_key);
        }

        for update in connection.intents.clean_up(&mut self.ledger) {
            self.broadcast(&ServerMessage::IntentCount(update));
        }

        info!("{} disconnected ({:?})", connection_key, reason);
        self.incoming_events
            .push_disconnection(connection_key, reason);
    }
}
