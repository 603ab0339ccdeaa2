//! Simulated analog front-end and valve bank.
//!
//! One adapter covers both ports because on the reference hardware the
//! sensor supply, the ADC, the valve drivers and the activity pin all
//! hang off the same GPIO block.

use crate::app::ports::{AnalogPort, ValvePort};
use crate::control::channels::CHANNEL_COUNT;

use super::pin::SimPin;

pub struct SimAnalogHw {
    readings: [u16; CHANNEL_COUNT],
    conversions: [u32; CHANNEL_COUNT],
    valves: [SimPin; CHANNEL_COUNT],
    activity: SimPin,
    supply: bool,
    supply_cycles: u32,
    unpowered_conversions: u32,
}

impl SimAnalogHw {
    pub fn new() -> Self {
        Self {
            readings: [0; CHANNEL_COUNT],
            conversions: [0; CHANNEL_COUNT],
            valves: Default::default(),
            activity: SimPin::new(),
            supply: false,
            supply_cycles: 0,
            unpowered_conversions: 0,
        }
    }

    /// Set what the ADC will report for a sensor channel.
    pub fn set_reading(&mut self, channel: usize, value: u16) {
        self.readings[channel] = value;
    }

    /// Number of conversions run on the given channel.
    pub fn conversions_on(&self, channel: usize) -> u32 {
        self.conversions[channel]
    }

    /// Number of times the sensor supply was switched on.
    pub fn supply_cycles(&self) -> u32 {
        self.supply_cycles
    }

    pub fn supply_on(&self) -> bool {
        self.supply
    }

    /// Conversions attempted while the supply was off.  Always zero
    /// for a correct control loop.
    pub fn unpowered_conversions(&self) -> u32 {
        self.unpowered_conversions
    }

    /// Current level of a valve pin.
    pub fn valve_level(&self, index: usize) -> bool {
        self.valves[index].level()
    }

    /// Force a valve pin level from outside the control loop, as a
    /// pre-restart GPIO state would.
    pub fn drive_valve(&mut self, index: usize, on: bool) {
        self.valves[index].drive(on);
    }

    pub fn activity_on(&self) -> bool {
        self.activity.level()
    }

    pub fn activity_was_asserted(&self) -> bool {
        self.activity.was_high()
    }
}

impl Default for SimAnalogHw {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalogPort for SimAnalogHw {
    fn set_supply(&mut self, on: bool) {
        if on && !self.supply {
            self.supply_cycles += 1;
        }
        self.supply = on;
    }

    fn sample(&mut self, channel: u8) -> u16 {
        let channel = channel as usize;
        self.conversions[channel] += 1;
        if !self.supply {
            self.unpowered_conversions += 1;
        }
        self.readings[channel]
    }
}

impl ValvePort for SimAnalogHw {
    fn set_valve(&mut self, index: usize, on: bool) {
        self.valves[index].drive(on);
    }

    fn valve_state(&self, index: usize) -> bool {
        self.valves[index].level()
    }

    fn set_activity(&mut self, on: bool) {
        self.activity.drive(on);
    }
}
