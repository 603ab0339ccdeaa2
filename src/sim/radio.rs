//! Simulated LoRa radio.
//!
//! Outbound packets are recorded whole; [`sent_frames`] strips the
//! sync/length framing so tests assert on command byte and payload
//! only.  Inbound bytes come from [`push_inbound`] and drain through
//! `read_byte` exactly as the hardware FIFO would.
//!
//! [`sent_frames`]: SimRadio::sent_frames
//! [`push_inbound`]: SimRadio::push_inbound

use std::collections::VecDeque;

use crate::app::ports::RadioPort;
use crate::error::RadioError;
use crate::proto::{SYNC1, SYNC2};

pub struct SimRadio {
    inbound: VecDeque<u8>,
    packets: Vec<Vec<u8>>,
    current: Option<Vec<u8>>,
    tx_stuck: bool,
    fail_init: bool,
    powered_down: bool,
}

impl SimRadio {
    pub fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            packets: Vec::new(),
            current: None,
            tx_stuck: false,
            fail_init: false,
            powered_down: false,
        }
    }

    /// Simulate a part that does not identify itself at bring-up.
    pub fn set_fail_init(&mut self, fail: bool) {
        self.fail_init = fail;
    }

    /// Queue bytes as if they were received over the air.
    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }

    /// Simulate a wedged transmitter: `wait_tx_idle` fails until
    /// cleared.
    pub fn set_tx_stuck(&mut self, stuck: bool) {
        self.tx_stuck = stuck;
    }

    pub fn powered_down(&self) -> bool {
        self.powered_down
    }

    /// Forget transmitted packets recorded so far.
    pub fn clear_sent(&mut self) {
        self.packets.clear();
    }

    /// Raw transmitted packets, framing included.
    pub fn raw_packets(&self) -> &[Vec<u8>] {
        &self.packets
    }

    /// Transmitted packets as `(command byte, payload)` pairs.
    /// Packets that do not carry valid framing are skipped.
    pub fn sent_frames(&self) -> Vec<(u8, Vec<u8>)> {
        self.packets
            .iter()
            .filter_map(|packet| {
                let [SYNC1, SYNC2, len, cmd, payload @ ..] = packet.as_slice() else {
                    return None;
                };
                if *len as usize != payload.len() + 1 {
                    return None;
                }
                Some((*cmd, payload.to_vec()))
            })
            .collect()
    }
}

impl Default for SimRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioPort for SimRadio {
    fn init(&mut self) -> Result<(), RadioError> {
        if self.fail_init {
            Err(RadioError::InitFailed)
        } else {
            Ok(())
        }
    }

    fn is_transmitting(&self) -> bool {
        self.tx_stuck
    }

    fn wait_tx_idle(&mut self) -> Result<(), RadioError> {
        if self.tx_stuck {
            Err(RadioError::TxTimeout)
        } else {
            Ok(())
        }
    }

    fn begin_packet(&mut self) {
        self.current = Some(Vec::new());
    }

    fn write_byte(&mut self, byte: u8) {
        if let Some(packet) = self.current.as_mut() {
            packet.push(byte);
        }
    }

    fn end_packet(&mut self) {
        if let Some(packet) = self.current.take() {
            self.packets.push(packet);
        }
    }

    fn bytes_available(&self) -> usize {
        self.inbound.len()
    }

    fn read_byte(&mut self) -> u8 {
        self.inbound.pop_front().unwrap_or(0)
    }

    fn power_down(&mut self) {
        self.powered_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::codec::send_frame;

    #[test]
    fn records_framed_packets() {
        let mut radio = SimRadio::new();
        send_frame(&mut radio, 0xA3, &[1, 2, 3]).unwrap();
        let frames = radio.sent_frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].1, vec![1, 2, 3]);
    }

    #[test]
    fn failed_bring_up_is_reported() {
        let mut radio = SimRadio::new();
        assert_eq!(radio.init(), Ok(()));
        radio.set_fail_init(true);
        assert_eq!(radio.init(), Err(RadioError::InitFailed));
    }

    #[test]
    fn stuck_transmitter_times_out() {
        let mut radio = SimRadio::new();
        radio.set_tx_stuck(true);
        assert_eq!(
            send_frame(&mut radio, 0xA3, &[]),
            Err(RadioError::TxTimeout)
        );
        assert!(radio.sent_frames().is_empty());
    }
}
