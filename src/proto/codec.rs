//! Frame codec: byte stream ⇄ command frames.
//!
//! Reception is a four-state machine fed one byte at a time:
//!
//! ```text
//! WaitSync1 ──0xAA──▶ WaitSync2 ──0x55──▶ ReadLength ──L──▶ ReadPayload
//!     ▲                  │other                                  │
//!     └──────────────────┴──────────────── frame complete ◀──────┘
//! ```
//!
//! Exactly one frame is under construction at a time; nothing is ever
//! dispatched partially.  Malformed input (bad sync, zero length) is
//! silently discarded by resetting to `WaitSync1`; the link is
//! fire-and-forget and the peer owns retries.

use heapless::Vec;
use log::warn;

use super::{MAX_PACKET_SIZE, MAX_PAYLOAD, SYNC1, SYNC2};
use crate::app::ports::RadioPort;
use crate::error::RadioError;
use crate::proto::command::force_module_origin;

// ───────────────────────────────────────────────────────────────
// Frame
// ───────────────────────────────────────────────────────────────

/// One complete received frame: the raw command byte plus its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: u8,
    pub payload: Vec<u8, MAX_PAYLOAD>,
}

// ───────────────────────────────────────────────────────────────
// Decoder
// ───────────────────────────────────────────────────────────────

enum DecoderState {
    WaitSync1,
    WaitSync2,
    ReadLength,
    /// Collecting `declared` bytes (command byte + payload).
    ReadPayload { declared: usize, collected: usize },
}

/// Streaming frame reassembler.
pub struct FrameDecoder {
    state: DecoderState,
    buf: [u8; MAX_PACKET_SIZE],
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::WaitSync1,
            buf: [0; MAX_PACKET_SIZE],
        }
    }

    /// Feed one received byte.  Returns a completed frame when this
    /// byte finished one.
    pub fn push(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            DecoderState::WaitSync1 => {
                if byte == SYNC1 {
                    self.state = DecoderState::WaitSync2;
                }
                None
            }
            DecoderState::WaitSync2 => {
                // No partial credit: a stray byte sends us all the way
                // back to scanning for SYNC1.
                self.state = if byte == SYNC2 {
                    DecoderState::ReadLength
                } else {
                    DecoderState::WaitSync1
                };
                None
            }
            DecoderState::ReadLength => {
                let declared = (byte as usize).min(MAX_PACKET_SIZE);
                if declared == 0 {
                    // A frame with no command byte carries nothing.
                    warn!("frame with zero length discarded");
                    self.state = DecoderState::WaitSync1;
                } else {
                    self.state = DecoderState::ReadPayload {
                        declared,
                        collected: 0,
                    };
                }
                None
            }
            DecoderState::ReadPayload {
                declared,
                ref mut collected,
            } => {
                self.buf[*collected] = byte;
                *collected += 1;
                if *collected < declared {
                    return None;
                }
                let mut payload = Vec::new();
                // Capacity is MAX_PAYLOAD and declared <= MAX_PACKET_SIZE,
                // so the extend cannot fail.
                let _ = payload.extend_from_slice(&self.buf[1..declared]);
                let frame = Frame {
                    command: self.buf[0],
                    payload,
                };
                self.state = DecoderState::WaitSync1;
                Some(frame)
            }
        }
    }

    /// Feed a chunk of bytes, handing every completed frame to `sink`.
    pub fn feed(&mut self, bytes: &[u8], mut sink: impl FnMut(Frame)) {
        for &byte in bytes {
            if let Some(frame) = self.push(byte) {
                sink(frame);
            }
        }
    }

    /// Hard reset to `WaitSync1`, discarding any frame under
    /// construction.
    pub fn reset(&mut self) {
        self.state = DecoderState::WaitSync1;
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Serialization (outbound)
// ───────────────────────────────────────────────────────────────

/// Transmit one frame: `SYNC1 SYNC2 LEN CMD PAYLOAD`.
///
/// The origin bits of `command` are forced to `MODULE` regardless of
/// what the caller packed.  Blocks until any prior transmission has
/// drained (bounded by the radio adapter's timeout); payloads beyond
/// the frame capacity are truncated rather than overrun.
pub fn send_frame(
    radio: &mut impl RadioPort,
    command: u8,
    payload: &[u8],
) -> Result<(), RadioError> {
    let command = force_module_origin(command);
    let payload = &payload[..payload.len().min(MAX_PAYLOAD)];

    radio.wait_tx_idle()?;
    radio.begin_packet();
    radio.write_byte(SYNC1);
    radio.write_byte(SYNC2);
    radio.write_byte(payload.len() as u8 + 1);
    radio.write_byte(command);
    for &byte in payload {
        radio.write_byte(byte);
    }
    radio.end_packet();
    Ok(())
}
