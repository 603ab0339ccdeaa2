//! Sensor/valve controller: one all-or-nothing sampling pass across
//! the six channels.
//!
//! A pass powers the shared analog supply exactly once, samples every
//! enabled channel while it is up, and only then, with the supply
//! back off, applies the per-channel valve policy.  This keeps the
//! analog-supply on-time as short as the hardware allows.

use log::warn;

use super::channels::{ChannelBank, OperationMode, CHANNEL_COUNT};
use crate::app::ports::{AnalogPort, ClockPort, RadioPort, ValvePort};
use crate::datetime::{DateTime, DATETIME_WIRE_SIZE};
use crate::proto::codec::send_frame;
use crate::proto::command::{CommandByte, CommandId, Destination, Origin};

// ───────────────────────────────────────────────────────────────
// Sample
// ───────────────────────────────────────────────────────────────

/// One snapshot per sampling pass.  Transient: broadcast when asked
/// for, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub instant: DateTime,
    pub values: [u16; CHANNEL_COUNT],
    pub states: [bool; CHANNEL_COUNT],
}

impl Sample {
    /// DateTime image + `value[6]` u16 LE + `state[6]` u16 LE.
    pub const WIRE_SIZE: usize = DATETIME_WIRE_SIZE + 4 * CHANNEL_COUNT;

    /// Serialize into the broadcast payload image.
    pub fn to_wire(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[..DATETIME_WIRE_SIZE].copy_from_slice(&self.instant.to_wire());
        let mut offset = DATETIME_WIRE_SIZE;
        for value in self.values {
            out[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
            offset += 2;
        }
        for state in self.states {
            let word: u16 = u16::from(state);
            out[offset..offset + 2].copy_from_slice(&word.to_le_bytes());
            offset += 2;
        }
        out
    }
}

// ───────────────────────────────────────────────────────────────
// Sampling pass
// ───────────────────────────────────────────────────────────────

/// Run one sampling pass.
///
/// 1. Assert the activity pin.
/// 2. Timestamp the sample.
/// 3. Supply on → sample all six channels (disabled channels read as
///    zero without a conversion) → supply off.
/// 4. Apply the valve policy per channel.
/// 5. Broadcast the sample when `broadcast` is set.
/// 6. Clear the activity pin.
pub fn sampling_pass(
    bank: &mut ChannelBank,
    broadcast: bool,
    hw: &mut (impl AnalogPort + ValvePort),
    clock: &impl ClockPort,
    radio: &mut impl RadioPort,
) -> Sample {
    hw.set_activity(true);

    let mut sample = Sample {
        instant: clock.read_datetime(),
        values: [0; CHANNEL_COUNT],
        states: [false; CHANNEL_COUNT],
    };

    // Read every sensor before any processing, to keep the sensor
    // supply on for the shortest possible window.
    hw.set_supply(true);
    for (slot, ch) in sample.values.iter_mut().zip(bank.iter()) {
        *slot = if ch.operation == OperationMode::Disabled {
            0
        } else {
            hw.sample(ch.adc_channel)
        };
    }
    hw.set_supply(false);

    // Policy, with the analog supply off.
    for (index, ch) in bank.iter_mut().enumerate() {
        let next = match ch.operation {
            OperationMode::SensorControlsValve => {
                // Hysteresis: the two comparisons are mutually
                // exclusive on last_state, so at most one fires.
                if ch.last_state && sample.values[index] > ch.max_threshold {
                    false
                } else if !ch.last_state && sample.values[index] < ch.min_threshold {
                    true
                } else {
                    ch.last_state
                }
            }
            OperationMode::ForceValveOn => true,
            OperationMode::ForceValveOff | OperationMode::Disabled => false,
        };
        hw.set_valve(ch.valve as usize, next);
        ch.last_state = next;
        sample.states[index] = next;
    }

    if broadcast {
        let cmd = CommandByte {
            destination: Destination::Broadcast,
            origin: Origin::Module,
            id: CommandId::SendSamples,
        };
        if let Err(e) = send_frame(radio, cmd.encode(), &sample.to_wire()) {
            warn!("sample broadcast failed: {e}");
        }
    }

    hw.set_activity(false);
    sample
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimAnalogHw, SimClock, SimRadio};

    fn setup() -> (ChannelBank, SimAnalogHw, SimClock, SimRadio) {
        (
            ChannelBank::default(),
            SimAnalogHw::new(),
            SimClock::new(),
            SimRadio::new(),
        )
    }

    #[test]
    fn dry_soil_opens_valve() {
        let (mut bank, mut hw, clock, mut radio) = setup();
        hw.set_reading(0, 100); // below min threshold 620
        let sample = sampling_pass(&mut bank, false, &mut hw, &clock, &mut radio);
        assert!(sample.states[0]);
        assert!(bank.get(0).unwrap().last_state);
        assert!(hw.valve_level(0));
    }

    #[test]
    fn hysteresis_holds_between_thresholds() {
        let (mut bank, mut hw, clock, mut radio) = setup();
        hw.set_reading(1, 100);
        sampling_pass(&mut bank, false, &mut hw, &clock, &mut radio);
        assert!(bank.get(1).unwrap().last_state);

        // In-band reading: valve must stay on.
        hw.set_reading(1, 700);
        let sample = sampling_pass(&mut bank, false, &mut hw, &clock, &mut radio);
        assert!(sample.states[1]);

        // Above max: valve turns off.
        hw.set_reading(1, 900);
        let sample = sampling_pass(&mut bank, false, &mut hw, &clock, &mut radio);
        assert!(!sample.states[1]);

        // Back in band: valve stays off.
        hw.set_reading(1, 700);
        let sample = sampling_pass(&mut bank, false, &mut hw, &clock, &mut radio);
        assert!(!sample.states[1]);
    }

    #[test]
    fn disabled_channel_reads_zero_and_forces_off() {
        let (mut bank, mut hw, clock, mut radio) = setup();
        hw.set_reading(2, 100);
        bank.get_mut(2).unwrap().operation = OperationMode::Disabled;
        bank.get_mut(2).unwrap().last_state = true;
        let sample = sampling_pass(&mut bank, false, &mut hw, &clock, &mut radio);
        assert_eq!(sample.values[2], 0);
        assert!(!sample.states[2]);
        assert_eq!(hw.conversions_on(2), 0, "no conversion for a disabled channel");
    }

    #[test]
    fn force_modes_override_readings() {
        let (mut bank, mut hw, clock, mut radio) = setup();
        hw.set_reading(3, 900); // wet: sensor policy would close
        hw.set_reading(4, 100); // dry: sensor policy would open
        bank.get_mut(3).unwrap().operation = OperationMode::ForceValveOn;
        bank.get_mut(4).unwrap().operation = OperationMode::ForceValveOff;
        let sample = sampling_pass(&mut bank, false, &mut hw, &clock, &mut radio);
        assert!(sample.states[3]);
        assert!(!sample.states[4]);
    }

    #[test]
    fn supply_cycled_once_per_pass() {
        let (mut bank, mut hw, clock, mut radio) = setup();
        sampling_pass(&mut bank, false, &mut hw, &clock, &mut radio);
        assert_eq!(hw.supply_cycles(), 1);
        assert!(!hw.supply_on());
    }

    #[test]
    fn activity_pin_cleared_after_pass() {
        let (mut bank, mut hw, clock, mut radio) = setup();
        sampling_pass(&mut bank, false, &mut hw, &clock, &mut radio);
        assert!(hw.activity_was_asserted());
        assert!(!hw.activity_on());
    }

    #[test]
    fn broadcast_emits_one_frame_with_sample_image() {
        let (mut bank, mut hw, clock, mut radio) = setup();
        let sample = sampling_pass(&mut bank, true, &mut hw, &clock, &mut radio);
        let frames = radio.sent_frames();
        assert_eq!(frames.len(), 1);
        let cmd = CommandByte::decode(frames[0].0).unwrap();
        assert_eq!(cmd.destination, Destination::Broadcast);
        assert_eq!(cmd.origin, Origin::Module);
        assert_eq!(cmd.id, CommandId::SendSamples);
        assert_eq!(frames[0].1, sample.to_wire());
    }

    #[test]
    fn no_broadcast_when_not_requested() {
        let (mut bank, mut hw, clock, mut radio) = setup();
        sampling_pass(&mut bank, false, &mut hw, &clock, &mut radio);
        assert!(radio.sent_frames().is_empty());
    }
}
