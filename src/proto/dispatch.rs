//! Command dispatcher: one completed frame in, zero or one reply out.
//!
//! Every received frame, including those with unknown ids or reserved
//! command-byte bit patterns, resets the inactivity timeout: receipt is
//! itself a keep-alive.  Replies re-tag origin as `MODULE` and address
//! the destination class derived from the requester's origin, so one
//! module can serve a configuration tool and a mesh router at once.

use log::{debug, warn};

use super::codec::{send_frame, Frame};
use super::command::{CommandByte, CommandId, Origin};
use super::{ACK, NACK};
use crate::app::node::TaskFlags;
use crate::app::ports::{ClockPort, RadioPort, StoragePort};
use crate::control::channels::{ChannelBank, OperationMode};
use crate::datetime::DateTime;
use crate::power::{PowerManager, TimeoutState};
use crate::store;

// ───────────────────────────────────────────────────────────────
// Control-config wire record
// ───────────────────────────────────────────────────────────────

/// Payload of GET/SET_CONTROL_CONFIG:
/// `index u8, operation u8, minThreshold u16 LE, maxThreshold u16 LE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigRecord {
    pub index: u8,
    pub operation: u8,
    pub min_threshold: u16,
    pub max_threshold: u16,
}

impl ConfigRecord {
    pub const WIRE_SIZE: usize = 6;

    pub fn to_wire(self) -> [u8; Self::WIRE_SIZE] {
        let min = self.min_threshold.to_le_bytes();
        let max = self.max_threshold.to_le_bytes();
        [self.index, self.operation, min[0], min[1], max[0], max[1]]
    }

    pub fn from_wire(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::WIRE_SIZE {
            return None;
        }
        Some(Self {
            index: bytes[0],
            operation: bytes[1],
            min_threshold: u16::from_le_bytes([bytes[2], bytes[3]]),
            max_threshold: u16::from_le_bytes([bytes[4], bytes[5]]),
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Dispatch
// ───────────────────────────────────────────────────────────────

/// Execute one received frame.
pub fn dispatch(
    frame: &Frame,
    bank: &mut ChannelBank,
    power: &mut PowerManager,
    flags: &mut TaskFlags,
    clock: &mut impl ClockPort,
    storage: &mut impl StoragePort,
    radio: &mut impl RadioPort,
) {
    // Keep-alive first: any frame receipt restarts the countdown.
    power.reset(clock.tick_count());

    let cmd = match CommandByte::decode(frame.command) {
        Ok(cmd) => cmd,
        Err(e) => {
            debug!("ignoring frame with bad command byte {:#04x}: {e}", frame.command);
            return;
        }
    };

    match cmd.id {
        CommandId::Message => {
            // Echo service for the configuration tool only.
            if cmd.origin == Origin::Software {
                reply(radio, cmd, &frame.payload);
            }
        }

        CommandId::GetDateTime => {
            let now = clock.read_datetime();
            reply(radio, cmd, &now.to_wire());
        }

        CommandId::SetDateTime => {
            let Some(value) = DateTime::from_wire(&frame.payload) else {
                debug!("SET_DATETIME with short payload ignored");
                return;
            };
            clock.write_datetime(&value);
            if cmd.origin == Origin::Software {
                ack(radio, cmd);
            }
            // Updating the calendar just under an alarm boundary can
            // swallow the pending alarm; re-run task setup instead of
            // waiting a whole period.
            if value.seconds_bin() < 10 {
                flags.setup_tasks = true;
            }
        }

        CommandId::SendSamples => {
            // The broadcast sample is the response; no ACK.
            flags.send_samples = true;
        }

        CommandId::GetControlConfig => {
            let Some(&index) = frame.payload.first() else {
                debug!("GET_CONTROL_CONFIG without index ignored");
                return;
            };
            let Some(ch) = bank.get(index as usize) else {
                debug!("GET_CONTROL_CONFIG for channel {index} ignored");
                return;
            };
            let record = ConfigRecord {
                index,
                operation: ch.operation as u8,
                min_threshold: ch.min_threshold,
                max_threshold: ch.max_threshold,
            };
            reply(radio, cmd, &record.to_wire());
        }

        CommandId::SetControlConfig => {
            let Some(record) = ConfigRecord::from_wire(&frame.payload) else {
                nack(radio, cmd);
                return;
            };
            let Some(operation) = OperationMode::from_u8(record.operation) else {
                warn!("SET_CONTROL_CONFIG with unknown operation {:#04x}", record.operation);
                nack(radio, cmd);
                return;
            };
            // Inverted thresholds are stored as-is: with hysteresis
            // they behave as a latched always-on/off channel.
            if bank.set_config(
                record.index as usize,
                operation,
                record.min_threshold,
                record.max_threshold,
            ) {
                ack(radio, cmd);
            } else {
                nack(radio, cmd);
            }
        }

        CommandId::SaveConfig => match store::save(bank, storage) {
            Ok(()) => ack(radio, cmd),
            Err(e) => {
                warn!("configuration save failed: {e}");
                nack(radio, cmd);
            }
        },

        CommandId::PowerDown => {
            // The ACK is UI feedback only; the sleep itself happens at
            // the power decision after the current iteration.
            if cmd.origin == Origin::Software {
                ack(radio, cmd);
            }
            power.set_state(TimeoutState::Forced);
        }

        CommandId::RequestAction => {
            // Module-originated only; receiving one is a no-op (the
            // keep-alive reset above already happened).
        }

        CommandId::SetTimeout => {
            let Some(state) = frame.payload.first().copied().and_then(TimeoutState::from_u8)
            else {
                nack(radio, cmd);
                return;
            };
            power.set_state(state);
            ack(radio, cmd);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Reply helpers
// ───────────────────────────────────────────────────────────────

fn reply(radio: &mut impl RadioPort, request: CommandByte, payload: &[u8]) {
    let cmd = CommandByte::reply_to(request);
    if let Err(e) = send_frame(radio, cmd.encode(), payload) {
        warn!("reply to {:?} failed: {e}", request.id);
    }
}

fn ack(radio: &mut impl RadioPort, request: CommandByte) {
    reply(radio, request, &[ACK]);
}

fn nack(radio: &mut impl RadioPort, request: CommandByte) {
    reply(radio, request, &[NACK]);
}
