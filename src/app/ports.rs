//! Port traits: the boundary between the control core and peripherals.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Node (domain)
//! ```
//!
//! Driven adapters (LoRa radio, RTCC, ADC front-end, valve GPIO bank,
//! EEPROM) implement these traits.  The [`Node`](super::node::Node)
//! consumes them via generics, so the control core never touches
//! hardware registers directly.
//!
//! Blocking discipline: everything here is synchronous.  Calls that the
//! bare-metal firmware busy-waited on (`wait_tx_idle`, the analog
//! supply settling inside `set_supply`, the valve switching delay
//! inside `set_valve`) are modeled as blocking calls with a bounded
//! timeout owned by the adapter.

use crate::datetime::DateTime;
use crate::error::{RadioError, StorageError};

// ───────────────────────────────────────────────────────────────
// Radio port (framed byte I/O over the LoRa link)
// ───────────────────────────────────────────────────────────────

/// Byte-level access to the long-range radio.
///
/// Packet framing (sync bytes, length) is the codec's job; this port
/// only moves bytes and delimits physical packets.
pub trait RadioPort {
    /// Bring the radio up and verify it identifies itself.  The core
    /// defines no recovery for a failure here; the caller decides
    /// whether to retry or give up.
    fn init(&mut self) -> Result<(), RadioError>;

    /// True while a previously started transmission is in flight.
    fn is_transmitting(&self) -> bool;

    /// Block until the radio is ready to accept a new packet.
    /// Bounded: returns [`RadioError::TxTimeout`] instead of spinning
    /// forever on a wedged radio.
    fn wait_tx_idle(&mut self) -> Result<(), RadioError>;

    /// Open an outbound packet buffer.
    fn begin_packet(&mut self);

    /// Append one byte to the open packet.
    fn write_byte(&mut self, byte: u8);

    /// Close the packet and start transmission.
    fn end_packet(&mut self);

    /// Number of received bytes waiting to be read.
    fn bytes_available(&self) -> usize;

    /// Read the next received byte.  Only call when
    /// [`bytes_available`](Self::bytes_available) is non-zero.
    fn read_byte(&mut self) -> u8;

    /// Put the radio in its lowest-power state (used before deep sleep).
    fn power_down(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Clock port (RTCC + monotonic timer)
// ───────────────────────────────────────────────────────────────

/// RTCC alarm cadences supported by the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlarmFrequency {
    Every10Seconds = 2,
    EveryMinute = 3,
    Every10Minutes = 4,
    EveryHour = 5,
    OnceADay = 6,
}

impl AlarmFrequency {
    /// Validated conversion from a raw register/wire value.
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            2 => Some(Self::Every10Seconds),
            3 => Some(Self::EveryMinute),
            4 => Some(Self::Every10Minutes),
            5 => Some(Self::EveryHour),
            6 => Some(Self::OnceADay),
            _ => None,
        }
    }
}

/// Real-time clock/calendar plus the free-running timer tick.
///
/// The alarm interrupt is surfaced as a latched flag the main loop
/// polls via [`take_alarm`](Self::take_alarm); the ISR does nothing
/// but set that flag.
pub trait ClockPort {
    /// Current calendar value (BCD fields).
    fn read_datetime(&self) -> DateTime;

    /// Program the calendar (BCD fields).
    fn write_datetime(&mut self, value: &DateTime);

    /// Program the alarm match time (minutes/seconds are what the
    /// hardware compares at the supported cadences).
    fn write_alarm_time(&mut self, value: &DateTime);

    /// Set the alarm cadence.
    fn set_alarm_frequency(&mut self, freq: AlarmFrequency);

    /// Current alarm cadence.
    fn alarm_frequency(&self) -> AlarmFrequency;

    /// True once the calendar has been set since the last power loss.
    fn is_calendar_set(&self) -> bool;

    /// Consume the latched alarm flag.  Returns true at most once per
    /// alarm event.
    fn take_alarm(&mut self) -> bool;

    /// Free-running monotonic tick counter (wraps at `u32::MAX`).
    fn tick_count(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Analog port (shared sensor supply + ADC)
// ───────────────────────────────────────────────────────────────

/// The shared analog front-end: one switchable supply feeding all six
/// soil sensors, plus the ADC.
pub trait AnalogPort {
    /// Switch the shared sensor supply.  The adapter owns the settling
    /// wait the supply hardware requires after switching on.
    fn set_supply(&mut self, on: bool);

    /// Run one conversion on the given ADC channel.
    /// Only meaningful while the supply is on.
    fn sample(&mut self, channel: u8) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Valve port (valve GPIO bank + activity pin)
// ───────────────────────────────────────────────────────────────

/// The six valve driver pins plus the diagnostic activity pin.
///
/// `set_valve` must hold the new level for the driver's minimum
/// switching delay before returning; that contract belongs to the
/// adapter, not the control loop.
pub trait ValvePort {
    /// Drive one valve pin.
    fn set_valve(&mut self, index: usize, on: bool);

    /// Actual current pin level.  Valve GPIO state survives a
    /// deep-sleep restart even though RAM does not, so configuration
    /// load reconciles from here rather than from any persisted value.
    fn valve_state(&self, index: usize) -> bool;

    /// Drive the diagnostic activity pin (asserted for the duration of
    /// a sampling pass).
    fn set_activity(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Storage port (256-byte persistent region)
// ───────────────────────────────────────────────────────────────

/// Raw persistent byte storage (EEPROM-class, 256-byte region).
///
/// First-boot initialization (writing compiled-in defaults and the
/// sentinel word when the region is blank) is the adapter's job; the
/// configuration store only consumes a region the adapter guarantees
/// is populated.
pub trait StoragePort {
    /// Read `buf.len()` bytes starting at `offset`.
    /// Returns the number of bytes actually read (clamped to the
    /// region end).
    fn load(&self, offset: u16, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write `data` starting at `offset`.
    /// Returns the number of bytes actually written (clamped to the
    /// region end).
    fn save(&mut self, offset: u16, data: &[u8]) -> Result<usize, StorageError>;
}
