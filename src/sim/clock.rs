//! Simulated RTCC and tick counter.

use crate::app::ports::{AlarmFrequency, ClockPort};
use crate::datetime::DateTime;

pub struct SimClock {
    now: DateTime,
    alarm_time: DateTime,
    frequency: AlarmFrequency,
    calendar_set: bool,
    alarm_latched: bool,
    ticks: u32,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            now: DateTime::default(),
            alarm_time: DateTime::default(),
            frequency: AlarmFrequency::EveryMinute,
            calendar_set: false,
            alarm_latched: false,
            ticks: 0,
        }
    }

    pub fn set_datetime(&mut self, value: DateTime) {
        self.now = value;
    }

    pub fn set_calendar_set(&mut self, set: bool) {
        self.calendar_set = set;
    }

    /// Latch the alarm flag, as the alarm ISR would.
    pub fn fire_alarm(&mut self) {
        self.alarm_latched = true;
    }

    pub fn set_ticks(&mut self, ticks: u32) {
        self.ticks = ticks;
    }

    pub fn advance(&mut self, ticks: u32) {
        self.ticks = self.ticks.wrapping_add(ticks);
    }

    /// Alarm match time last programmed through the port.
    pub fn alarm_time(&self) -> DateTime {
        self.alarm_time
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SimClock {
    fn read_datetime(&self) -> DateTime {
        self.now
    }

    fn write_datetime(&mut self, value: &DateTime) {
        self.now = *value;
        self.calendar_set = true;
    }

    fn write_alarm_time(&mut self, value: &DateTime) {
        self.alarm_time = *value;
    }

    fn set_alarm_frequency(&mut self, freq: AlarmFrequency) {
        self.frequency = freq;
    }

    fn alarm_frequency(&self) -> AlarmFrequency {
        self.frequency
    }

    fn is_calendar_set(&self) -> bool {
        self.calendar_set
    }

    fn take_alarm(&mut self) -> bool {
        core::mem::take(&mut self.alarm_latched)
    }

    fn tick_count(&self) -> u32 {
        self.ticks
    }
}
