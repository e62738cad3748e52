use log::{info, warn};

use pairup_server::{
    shared::Instant,
    transport::websocket::{ServerAddrs, Socket},
    ConfigError, ConnectEvent, DisconnectEvent, ErrorEvent, IdentifyEvent, MatchEvent, Server,
    ServerConfig, WaitingEndedEvent,
};

pub struct App {
    server: Server,
}

impl App {
    pub fn new() -> Result<Self, ConfigError> {
        info!("Pairup Server Demo started");

        let config = ServerConfig::from_env()?;
        let addrs = ServerAddrs::from_env()?;
        info!(
            "Probing every {:?}, timing out after {:?}",
            config.liveness.probe_interval, config.liveness.probe_timeout
        );

        let mut server = Server::new(config);
        server.listen(Socket::new(&addrs));
        info!("Listening on {}", addrs.listen_addr);

        Ok(Self { server })
    }

    pub fn update(&mut self) {
        let mut events = self.server.receive(&Instant::now());
        if events.is_empty() {
            return;
        }

        for connection_key in events.read::<ConnectEvent>() {
            info!("Server connected to: {}", connection_key);
        }
        for (connection_key, identity) in events.read::<IdentifyEvent>() {
            info!("{} is now {}", connection_key, identity);
        }
        for (connection_key, reason) in events.read::<DisconnectEvent>() {
            info!("Server disconnected from: {} ({:?})", connection_key, reason);
        }
        for pair in events.read::<MatchEvent>() {
            info!("Paired {} with {} on {}", pair.initiator, pair.partner, pair.content_id);
        }
        for eviction in events.read::<WaitingEndedEvent>() {
            info!("{} stopped waiting on {}", eviction.identity, eviction.content_id);
        }
        for error in events.read::<ErrorEvent>() {
            warn!("Server Error: {}", error);
        }
    }
}
