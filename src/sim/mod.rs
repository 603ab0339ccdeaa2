//! Simulated peripheral adapters.
//!
//! Host-side implementations of every port trait, used by the
//! `irrinode-sim` binary and by the test suites.  Each adapter records
//! enough of what the core did to it (pin levels, supply cycles,
//! transmitted packets) for tests to assert on observable hardware
//! behavior instead of internal state.

mod analog;
mod clock;
mod eeprom;
mod pin;
mod radio;

pub use analog::SimAnalogHw;
pub use clock::SimClock;
pub use eeprom::SimEeprom;
pub use pin::SimPin;
pub use radio::SimRadio;
