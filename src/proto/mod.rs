//! Framed command protocol spoken over the LoRa link.
//!
//! Wire frame: `0xAA 0x55 LEN CMD PAYLOAD[LEN-1]` where `LEN` counts
//! the command byte plus the payload.  The command byte packs a
//! destination class, an origin class, and a 4-bit command id; see
//! [`command`] for the layout and [`dispatch`] for the command table.

pub mod codec;
pub mod command;
pub mod dispatch;

/// First sync byte of every frame.
pub const SYNC1: u8 = 0xAA;
/// Second sync byte of every frame.
pub const SYNC2: u8 = 0x55;

/// Capacity of the frame reassembly buffer.  Declared lengths above
/// this are clamped, never overrun.
pub const MAX_PACKET_SIZE: usize = 64;

/// Largest payload a frame can carry (the length field also counts the
/// command byte).
pub const MAX_PAYLOAD: usize = MAX_PACKET_SIZE - 1;

/// ACK reply payload byte.
pub const ACK: u8 = 0x06;
/// NACK reply payload byte.
pub const NACK: u8 = 0x15;
