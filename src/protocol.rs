//! Datagram format for published detections.
//!
//! Every datagram carries exactly one bincode-encoded [`BodiesPacket`].

use serde::{Deserialize, Serialize};

use crate::sdk::{Bodies, BodyData, BodyFormat};

/// Largest payload a single UDP datagram can carry over IPv4.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodiesPacket {
    /// Increments by one per published frame; gaps mean dropped datagrams.
    pub sequence: u64,
    pub timestamp_ns: u64,
    pub body_format: BodyFormat,
    pub is_tracked: bool,
    pub bodies: Vec<BodyData>,
}

impl BodiesPacket {
    pub fn from_bodies(sequence: u64, bodies: &Bodies) -> Self {
        Self {
            sequence,
            timestamp_ns: bodies.timestamp_ns,
            body_format: bodies.body_format,
            is_tracked: bodies.is_tracked,
            bodies: bodies.body_list.clone(),
        }
    }
}

pub fn encode_packet(packet: &BodiesPacket) -> bincode::Result<Vec<u8>> {
    bincode::serialize(packet)
}

pub fn decode_packet(data: &[u8]) -> bincode::Result<BodiesPacket> {
    bincode::deserialize(data)
}
