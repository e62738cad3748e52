//! In-process transport. The server end plugs into [`Server::listen`] and
//! every [`LocalClient`] behaves like a remote peer, which is how the test
//! harness and embedding applications drive the server without sockets.
//!
//! [`Server::listen`]: crate::Server::listen

use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{
        atomic::{AtomicU16, Ordering},
        Arc, Mutex,
    },
};

use smol::channel::{self, Receiver, Sender, TryRecvError};

use super::{
    PacketReceiver as TransportReceiver, PacketSender as TransportSender, RecvError, SendError,
    Socket as TransportSocket, SocketEvent,
};

const FIRST_CLIENT_PORT: u16 = 12345;

enum LocalFrame {
    Payload(String),
    Closed,
}

type ClientFrames = Arc<Mutex<HashMap<SocketAddr, Sender<LocalFrame>>>>;

// Socket
pub struct LocalSocket {
    events: Receiver<SocketEvent>,
    clients: ClientFrames,
}

impl LocalSocket {
    /// Creates the server end of the transport, plus a hub used to open
    /// client connections into it
    pub fn new() -> (Self, LocalHub) {
        let (event_sender, event_receiver) = channel::unbounded();
        let clients: ClientFrames = Arc::new(Mutex::new(HashMap::new()));

        let socket = Self {
            events: event_receiver,
            clients: clients.clone(),
        };
        let hub = LocalHub {
            events: event_sender,
            clients,
            next_port: Arc::new(AtomicU16::new(FIRST_CLIENT_PORT)),
        };

        (socket, hub)
    }
}

impl From<LocalSocket> for Box<dyn TransportSocket> {
    fn from(socket: LocalSocket) -> Self {
        Box::new(socket)
    }
}

impl TransportSocket for LocalSocket {
    fn listen(self: Box<Self>) -> (Box<dyn TransportSender>, Box<dyn TransportReceiver>) {
        let sender = LocalPacketSender {
            clients: self.clients,
        };
        let receiver = LocalPacketReceiver {
            events: self.events,
        };
        (Box::new(sender), Box::new(receiver))
    }
}

// Hub
#[derive(Clone)]
pub struct LocalHub {
    events: Sender<SocketEvent>,
    clients: ClientFrames,
    next_port: Arc<AtomicU16>,
}

impl LocalHub {
    /// Opens a new connection, which the server will see on its next receive
    pub fn connect(&self) -> LocalClient {
        let port = self.next_port.fetch_add(1, Ordering::SeqCst);
        let address = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);

        let (frame_sender, frame_receiver) = channel::unbounded();
        if let Ok(mut clients) = self.clients.lock() {
            clients.insert(address, frame_sender);
        }
        let _ = self.events.try_send(SocketEvent::Connected(address));

        LocalClient {
            address,
            events: self.events.clone(),
            clients: self.clients.clone(),
            frames: frame_receiver,
            closed: false,
        }
    }
}

// Client
pub struct LocalClient {
    address: SocketAddr,
    events: Sender<SocketEvent>,
    clients: ClientFrames,
    frames: Receiver<LocalFrame>,
    closed: bool,
}

impl LocalClient {
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn send(&self, payload: impl Into<String>) -> Result<(), SendError> {
        if self.is_closed() {
            return Err(SendError);
        }
        self.events
            .try_send(SocketEvent::Payload(self.address, payload.into()))
            .map_err(|_| SendError)
    }

    /// Returns the next frame the server sent, if any
    pub fn receive(&mut self) -> Option<String> {
        match self.frames.try_recv() {
            Ok(LocalFrame::Payload(payload)) => Some(payload),
            Ok(LocalFrame::Closed) => {
                self.closed = true;
                None
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    pub fn receive_all(&mut self) -> Vec<String> {
        let mut output = Vec::new();
        while let Some(payload) = self.receive() {
            output.push(payload);
        }
        output
    }

    /// Whether either end has closed this connection
    pub fn is_closed(&self) -> bool {
        if self.closed {
            return true;
        }
        match self.clients.lock() {
            Ok(clients) => !clients.contains_key(&self.address),
            Err(_) => true,
        }
    }

    /// Drops the connection from the client side, as a closed browser tab
    /// would
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let was_open = match self.clients.lock() {
            Ok(mut clients) => clients.remove(&self.address).is_some(),
            Err(_) => false,
        };
        if was_open {
            let _ = self.events.try_send(SocketEvent::Disconnected(self.address));
        }
    }
}

impl Drop for LocalClient {
    fn drop(&mut self) {
        self.close();
    }
}

// Packet Sender
struct LocalPacketSender {
    clients: ClientFrames,
}

impl TransportSender for LocalPacketSender {
    fn send(&self, address: &SocketAddr, payload: &str) -> Result<(), SendError> {
        let clients = self.clients.lock().map_err(|_| SendError)?;
        let Some(frames) = clients.get(address) else {
            return Err(SendError);
        };
        frames
            .try_send(LocalFrame::Payload(payload.to_string()))
            .map_err(|_| SendError)
    }

    fn disconnect(&self, address: &SocketAddr) -> Result<(), SendError> {
        let mut clients = self.clients.lock().map_err(|_| SendError)?;
        let Some(frames) = clients.remove(address) else {
            return Err(SendError);
        };
        frames.try_send(LocalFrame::Closed).map_err(|_| SendError)
    }
}

// Packet Receiver
struct LocalPacketReceiver {
    events: Receiver<SocketEvent>,
}

impl TransportReceiver for LocalPacketReceiver {
    fn receive(&mut self) -> Result<Option<SocketEvent>, RecvError> {
        match self.events.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Closed) => Err(RecvError),
        }
    }
}
