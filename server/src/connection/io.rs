use std::net::SocketAddr;

use pairup_shared::ServerMessage;

use crate::{
    transport::{PacketReceiver, PacketSender, SocketEvent},
    PairupServerError,
};

/// Owns both halves of the transport once the server is listening
pub struct Io {
    packet_sender: Option<Box<dyn PacketSender>>,
    packet_receiver: Option<Box<dyn PacketReceiver>>,
}

impl Default for Io {
    fn default() -> Self {
        Self::new()
    }
}

impl Io {
    pub fn new() -> Self {
        Self {
            packet_sender: None,
            packet_receiver: None,
        }
    }

    pub fn load(
        &mut self,
        packet_sender: Box<dyn PacketSender>,
        packet_receiver: Box<dyn PacketReceiver>,
    ) {
        if self.packet_sender.is_some() {
            panic!("Packet sender/receiver already loaded! Cannot do this twice!");
        }

        self.packet_sender = Some(packet_sender);
        self.packet_receiver = Some(packet_receiver);
    }

    pub fn is_loaded(&self) -> bool {
        self.packet_sender.is_some()
    }

    pub fn send_message(
        &self,
        address: &SocketAddr,
        message: &ServerMessage,
    ) -> Result<(), PairupServerError> {
        let payload = message
            .encode()
            .map_err(|source| PairupServerError::Protocol {
                address: *address,
                source,
            })?;
        let Some(sender) = self.packet_sender.as_ref() else {
            return Err(PairupServerError::SendError { address: *address });
        };
        sender
            .send(address, &payload)
            .map_err(|_| PairupServerError::SendError { address: *address })
    }

    pub fn disconnect(&self, address: &SocketAddr) -> Result<(), PairupServerError> {
        let Some(sender) = self.packet_sender.as_ref() else {
            return Err(PairupServerError::SendError { address: *address });
        };
        sender
            .disconnect(address)
            .map_err(|_| PairupServerError::SendError { address: *address })
    }

    pub fn recv_event(&mut self) -> Result<Option<SocketEvent>, PairupServerError> {
        let Some(receiver) = self.packet_receiver.as_mut() else {
            return Ok(None);
        };
        receiver
            .receive()
            .map_err(|_| PairupServerError::RecvError)
    }
}
