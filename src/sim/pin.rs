//! A simulated push-pull output pin.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};

/// One GPIO output.  Remembers whether it was ever driven high, which
/// is how tests observe momentary assertions (the activity pin).
#[derive(Debug, Default)]
pub struct SimPin {
    level: bool,
    ever_high: bool,
}

impl SimPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current output level without the `&mut` the HAL trait requires.
    pub fn level(&self) -> bool {
        self.level
    }

    /// True if the pin was driven high at any point since creation.
    pub fn was_high(&self) -> bool {
        self.ever_high
    }

    /// Drive the pin through the HAL trait.
    pub fn drive(&mut self, high: bool) {
        let result: Result<(), Infallible> = if high {
            self.set_high()
        } else {
            self.set_low()
        };
        match result {
            Ok(()) => (),
            Err(never) => match never {},
        }
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level = true;
        self.ever_high = true;
        Ok(())
    }
}

impl StatefulOutputPin for SimPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level)
    }
}
