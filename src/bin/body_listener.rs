//! Body listener: receives published detection frames and prints a summary
//! line per frame.
//!
//! Usage: body-listener [port]

use anyhow::{Context, Result};
use std::net::UdpSocket;

use camera_edge_publisher::config::Config;
use camera_edge_publisher::protocol::{decode_packet, BodiesPacket, MAX_DATAGRAM_SIZE};

const CONFIG_PATH: &str = "camera_edge_publisher.toml";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load_or_default(CONFIG_PATH);
    let port = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<u16>().with_context(|| format!("invalid port: {arg}"))?,
        None => config.publishing.port,
    };

    let socket = UdpSocket::bind(("0.0.0.0", port))
        .with_context(|| format!("failed to bind UDP port {port}"))?;
    println!("Listening for bodies on port {}", port);

    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    let mut sequence = SequenceTracker::default();

    loop {
        let (len, from) = socket.recv_from(&mut buf)?;
        let packet = match decode_packet(&buf[..len]) {
            Ok(packet) => packet,
            Err(e) => {
                log::warn!("ignoring {len} byte datagram from {from}: {e}");
                continue;
            }
        };

        match sequence.observe(packet.sequence) {
            Gap::None => {}
            Gap::Dropped(count) => {
                log::warn!("{} frames dropped ({} total)", count, sequence.dropped)
            }
            Gap::Restarted => log::info!("publisher restarted at sequence {}", packet.sequence),
        }

        println!("{}", summarize(&packet));
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Gap {
    None,
    Dropped(u64),
    Restarted,
}

#[derive(Debug, Default)]
struct SequenceTracker {
    /// `None` before the first packet and after `u64::MAX`.
    expected: Option<u64>,
    dropped: u64,
}

impl SequenceTracker {
    fn observe(&mut self, sequence: u64) -> Gap {
        let gap = match self.expected {
            Some(next) if sequence > next => {
                self.dropped = self.dropped.saturating_add(sequence - next);
                Gap::Dropped(sequence - next)
            }
            Some(next) if sequence < next => Gap::Restarted,
            _ => Gap::None,
        };
        self.expected = sequence.checked_add(1);
        gap
    }
}

fn summarize(packet: &BodiesPacket) -> String {
    let mut line = format!(
        "#{:<6} {} {} bodies",
        packet.sequence,
        packet.body_format.as_str(),
        packet.bodies.len()
    );
    for body in &packet.bodies {
        line.push_str(&format!(
            " | id {} conf {:.0} kp {}/{} at [{:.2}, {:.2}, {:.2}]",
            body.id,
            body.confidence,
            body.visible_keypoints(),
            body.keypoint.len(),
            body.position[0],
            body.position[1],
            body.position[2]
        ));
    }
    line
}
