//! WebSocket transport. Every client frame is a JSON text message; the I/O
//! runs on a dedicated thread with its own tokio runtime and hands events to
//! the server through shared queues.

use std::{
    collections::{HashMap, VecDeque},
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use futures_util::{SinkExt, StreamExt};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::{
        mpsc::{self, UnboundedSender},
        oneshot,
    },
};
use tokio_tungstenite::{accept_async, tungstenite::protocol::Message};

use pairup_shared::DEFAULT_PORT;

use super::{
    PacketReceiver as TransportReceiver, PacketSender as TransportSender, RecvError, SendError,
    Socket as TransportSocket, SocketEvent,
};
use crate::ConfigError;

enum Outbound {
    Text(String),
    Close,
}

// One live WebSocket. `id` tells apart successive connections that reuse
// an address.
struct Peer {
    id: u64,
    outbound: UnboundedSender<Outbound>,
    shutdown: oneshot::Sender<()>,
}

impl Peer {
    // Stops the read loop first so no frame arrives after the close
    fn close(self) -> Result<(), SendError> {
        let _ = self.shutdown.send(());
        self.outbound.send(Outbound::Close).map_err(|_| SendError)
    }
}

static NEXT_PEER_ID: AtomicU64 = AtomicU64::new(0);

type Peers = Arc<Mutex<HashMap<SocketAddr, Peer>>>;
type EventQueue = Arc<Mutex<VecDeque<SocketEvent>>>;

/// Addresses the WebSocket transport binds to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerAddrs {
    pub listen_addr: SocketAddr,
}

impl ServerAddrs {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self { listen_addr }
    }

    /// Listens on every interface, on `PORT` if set
    pub fn from_env() -> Result<Self, ConfigError> {
        let Ok(value) = env::var("PORT") else {
            return Ok(Self::default());
        };
        let port = value
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                expected: "port number",
                value: value.clone(),
            })?;
        Ok(Self::new(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)))
    }
}

impl Default for ServerAddrs {
    fn default() -> Self {
        Self::new(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT))
    }
}

// Socket
pub struct Socket {
    listen_addr: SocketAddr,
}

impl Socket {
    pub fn new(addrs: &ServerAddrs) -> Self {
        Self {
            listen_addr: addrs.listen_addr,
        }
    }
}

impl From<Socket> for Box<dyn TransportSocket> {
    fn from(socket: Socket) -> Self {
        Box::new(socket)
    }
}

impl TransportSocket for Socket {
    fn listen(self: Box<Self>) -> (Box<dyn TransportSender>, Box<dyn TransportReceiver>) {
        let peers: Peers = Arc::new(Mutex::new(HashMap::new()));
        let events: EventQueue = Arc::new(Mutex::new(VecDeque::new()));

        spawn_connection_acceptor(self.listen_addr, peers.clone(), events.clone());

        (
            Box::new(WebsocketPacketSender { peers }),
            Box::new(WebsocketPacketReceiver { events }),
        )
    }
}

fn push_event(events: &EventQueue, event: SocketEvent) {
    match events.lock() {
        Ok(mut queue) => queue.push_back(event),
        Err(_) => log::error!("WebSocket event queue is poisoned, dropping {:?}", event),
    }
}

fn spawn_connection_acceptor(listen_addr: SocketAddr, peers: Peers, events: EventQueue) {
    log::info!("Spawning WebSocket acceptor thread for {}", listen_addr);
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(error) => {
                log::error!("Failed to create tokio runtime: {}", error);
                return;
            }
        };

        runtime.block_on(async {
            let listener = match TcpListener::bind(listen_addr).await {
                Ok(listener) => listener,
                Err(error) => {
                    log::error!("Failed to bind {}: {}", listen_addr, error);
                    return;
                }
            };
            log::info!("WebSocket acceptor listening on {}", listen_addr);

            loop {
                match listener.accept().await {
                    Ok((stream, remote_addr)) => {
                        let peers = peers.clone();
                        let events = events.clone();
                        tokio::spawn(async move {
                            if let Err(error) =
                                handle_connection(stream, remote_addr, peers, events).await
                            {
                                log::warn!("Connection handling error: {}", error);
                            }
                        });
                    }
                    Err(error) => {
                        log::warn!("Failed to accept TCP connection: {}", error);
                    }
                }
            }
        });
    });
}

async fn handle_connection(
    stream: TcpStream,
    remote_addr: SocketAddr,
    peers: Peers,
    events: EventQueue,
) -> Result<(), String> {
    let websocket = accept_async(stream)
        .await
        .map_err(|error| format!("Handshake with {} failed: {}", remote_addr, error))?;
    let (mut write, mut read) = websocket.split();

    let (outbound_sender, mut outbound_receiver) = mpsc::unbounded_channel::<Outbound>();
    let (shutdown_sender, mut shutdown_receiver) = oneshot::channel::<()>();
    let peer_id = NEXT_PEER_ID.fetch_add(1, Ordering::Relaxed);
    {
        let mut peers = peers
            .lock()
            .map_err(|_| "peer table is poisoned".to_string())?;
        let peer = Peer {
            id: peer_id,
            outbound: outbound_sender,
            shutdown: shutdown_sender,
        };
        if let Some(stale) = peers.insert(remote_addr, peer) {
            let _ = stale.close();
        }
    }
    push_event(&events, SocketEvent::Connected(remote_addr));

    tokio::spawn(async move {
        while let Some(outbound) = outbound_receiver.recv().await {
            let result = match outbound {
                Outbound::Text(text) => write.send(Message::Text(text)).await,
                Outbound::Close => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            };
            if let Err(error) = result {
                log::warn!("Failed to write to {}: {}", remote_addr, error);
                break;
            }
        }
    });

    loop {
        let message = tokio::select! {
            biased;
            _ = &mut shutdown_receiver => break,
            message = read.next() => message,
        };
        let Some(message) = message else {
            break;
        };
        match message {
            Ok(Message::Text(text)) => {
                push_event(&events, SocketEvent::Payload(remote_addr, text));
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(error) => {
                log::warn!("Read error from {}: {}", remote_addr, error);
                break;
            }
        }
    }

    // a peer removed by `disconnect` was closed by the server, which already
    // knows about it
    let still_registered = peers
        .lock()
        .map(|mut peers| {
            if peers.get(&remote_addr).is_some_and(|peer| peer.id == peer_id) {
                peers.remove(&remote_addr).is_some()
            } else {
                false
            }
        })
        .unwrap_or(false);
    if still_registered {
        push_event(&events, SocketEvent::Disconnected(remote_addr));
    }
    log::debug!("Cleaned up connection for {}", remote_addr);
    Ok(())
}

// Packet Sender
struct WebsocketPacketSender {
    peers: Peers,
}

impl TransportSender for WebsocketPacketSender {
    fn send(&self, address: &SocketAddr, payload: &str) -> Result<(), SendError> {
        let peers = self.peers.lock().map_err(|_| SendError)?;
        let Some(peer) = peers.get(address) else {
            return Err(SendError);
        };
        peer.outbound
            .send(Outbound::Text(payload.to_string()))
            .map_err(|_| SendError)
    }

    fn disconnect(&self, address: &SocketAddr) -> Result<(), SendError> {
        let mut peers = self.peers.lock().map_err(|_| SendError)?;
        let Some(peer) = peers.remove(address) else {
            return Err(SendError);
        };
        peer.close()
    }
}

// Packet Receiver
struct WebsocketPacketReceiver {
    events: EventQueue,
}

impl TransportReceiver for WebsocketPacketReceiver {
    fn receive(&mut self) -> Result<Option<SocketEvent>, RecvError> {
        let mut events = self.events.lock().map_err(|_| RecvError)?;
        Ok(events.pop_front())
    }
}
