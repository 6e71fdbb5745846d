use std::net::UdpSocket;

use thiserror::Error;

use crate::protocol::{encode_packet, BodiesPacket, MAX_DATAGRAM_SIZE};
use crate::sdk::{Bodies, CommunicationParameters};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("Packet too large: {0} bytes")]
    TooLarge(usize),
}

pub type Result<T> = std::result::Result<T, PublishError>;

/// Sends one datagram per detection frame to the publishing endpoint.
pub struct BodyPublisher {
    socket: UdpSocket,
    target_addr: String,
    sequence: u64,
}

impl BodyPublisher {
    pub fn new(params: &CommunicationParameters) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        // Needed for the default broadcast destination, harmless otherwise.
        socket.set_broadcast(true)?;
        Ok(Self {
            socket,
            target_addr: params.endpoint(),
            sequence: 0,
        })
    }

    pub fn target_addr(&self) -> &str {
        &self.target_addr
    }

    /// Number of frames sent so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn publish(&mut self, bodies: &Bodies) -> Result<()> {
        let packet = BodiesPacket::from_bodies(self.sequence, bodies);
        let data = encode_packet(&packet)?;
        if data.len() > MAX_DATAGRAM_SIZE {
            return Err(PublishError::TooLarge(data.len()));
        }
        self.socket.send_to(&data, &self.target_addr)?;
        self.sequence += 1;
        Ok(())
    }
}
