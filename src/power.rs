//! Power lifecycle: the inactivity timeout and the deep-sleep decision.
//!
//! Deep sleep on this hardware is irrecoverable except through a
//! reset-equivalent wake path, so it is modeled as process termination
//! plus external restart: the manager only *decides*; the owner of the
//! main loop powers the radio down and stops executing.  No in-memory
//! state survives, and the timeout state re-initializes to `Enabled`
//! on the next boot.

use log::info;

/// Timeout override state.  `Disabled` and `Forced` are explicit
/// overrides of the default `Enabled` countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TimeoutState {
    /// Countdown runs; sleep on expiry.
    #[default]
    Enabled = 1,
    /// Never sleep from elapsed time alone.
    Disabled = 0,
    /// Sleep at the next opportunity regardless of elapsed time.
    Forced = 2,
}

impl TimeoutState {
    /// Validated conversion from the SET_TIMEOUT payload byte.
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Disabled),
            1 => Some(Self::Enabled),
            2 => Some(Self::Forced),
            _ => None,
        }
    }
}

/// Outcome of one power evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepDecision {
    Stay,
    Sleep,
}

/// Owns the inactivity countdown.
///
/// Created at boot with the countdown `Enabled` and freshly reset;
/// mutated by dispatcher commands; consumed once per main-loop
/// iteration after the sensor/valve pass.
#[derive(Debug)]
pub struct PowerManager {
    state: TimeoutState,
    timeout_ticks: u32,
    last_reset: u32,
}

impl PowerManager {
    pub fn new(timeout_ticks: u32, now: u32) -> Self {
        Self {
            state: TimeoutState::default(),
            timeout_ticks,
            last_reset: now,
        }
    }

    pub fn state(&self) -> TimeoutState {
        self.state
    }

    pub fn set_state(&mut self, state: TimeoutState) {
        if self.state != state {
            info!("timeout state: {:?} -> {:?}", self.state, state);
        }
        self.state = state;
    }

    /// Restart the inactivity countdown.  Every received frame and
    /// every outbound request counts as activity.
    pub fn reset(&mut self, now: u32) {
        self.last_reset = now;
    }

    /// Evaluate the sleep decision for this iteration.
    ///
    /// * Any valve on: no decision, and the countdown reference is left
    ///   untouched.
    /// * On the on→off transition the countdown restarts from full
    ///   inactivity.
    /// * `Forced` sleeps immediately; `Enabled` sleeps on expiry;
    ///   `Disabled` never sleeps from time alone.
    pub fn evaluate(&mut self, now: u32, any_valve_on: bool, prev_any_valve_on: bool) -> SleepDecision {
        if any_valve_on {
            return SleepDecision::Stay;
        }
        if prev_any_valve_on {
            self.reset(now);
        }
        match self.state {
            TimeoutState::Forced => SleepDecision::Sleep,
            TimeoutState::Enabled => {
                if now.wrapping_sub(self.last_reset) >= self.timeout_ticks {
                    SleepDecision::Sleep
                } else {
                    SleepDecision::Stay
                }
            }
            TimeoutState::Disabled => SleepDecision::Stay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boots_enabled() {
        let pm = PowerManager::new(100, 0);
        assert_eq!(pm.state(), TimeoutState::Enabled);
    }

    #[test]
    fn sleeps_exactly_at_threshold() {
        let mut pm = PowerManager::new(100, 0);
        assert_eq!(pm.evaluate(99, false, false), SleepDecision::Stay);
        assert_eq!(pm.evaluate(100, false, false), SleepDecision::Sleep);
    }

    #[test]
    fn valve_on_inhibits_sleep_entirely() {
        let mut pm = PowerManager::new(100, 0);
        // Way past the threshold, but a valve is on.
        assert_eq!(pm.evaluate(10_000, true, true), SleepDecision::Stay);
        // Forced is also held off while watering.
        pm.set_state(TimeoutState::Forced);
        assert_eq!(pm.evaluate(10_001, true, true), SleepDecision::Stay);
    }

    #[test]
    fn countdown_restarts_on_valve_off_transition() {
        let mut pm = PowerManager::new(100, 0);
        // Valves turn off at tick 500: countdown restarts there.
        assert_eq!(pm.evaluate(500, false, true), SleepDecision::Stay);
        assert_eq!(pm.evaluate(599, false, false), SleepDecision::Stay);
        assert_eq!(pm.evaluate(600, false, false), SleepDecision::Sleep);
    }

    #[test]
    fn forced_sleeps_immediately() {
        let mut pm = PowerManager::new(100, 0);
        pm.set_state(TimeoutState::Forced);
        assert_eq!(pm.evaluate(1, false, false), SleepDecision::Sleep);
    }

    #[test]
    fn disabled_never_sleeps_from_time() {
        let mut pm = PowerManager::new(100, 0);
        pm.set_state(TimeoutState::Disabled);
        assert_eq!(pm.evaluate(u32::MAX, false, false), SleepDecision::Stay);
    }

    #[test]
    fn reset_defers_expiry() {
        let mut pm = PowerManager::new(100, 0);
        pm.reset(80);
        assert_eq!(pm.evaluate(150, false, false), SleepDecision::Stay);
        assert_eq!(pm.evaluate(180, false, false), SleepDecision::Sleep);
    }

    #[test]
    fn tick_wraparound_is_handled() {
        let mut pm = PowerManager::new(100, 0);
        pm.reset(u32::MAX - 10);
        assert_eq!(pm.evaluate(50, false, false), SleepDecision::Stay);
        assert_eq!(pm.evaluate(89, false, false), SleepDecision::Sleep);
    }

    #[test]
    fn timeout_state_from_u8_validates() {
        assert_eq!(TimeoutState::from_u8(0), Some(TimeoutState::Disabled));
        assert_eq!(TimeoutState::from_u8(1), Some(TimeoutState::Enabled));
        assert_eq!(TimeoutState::from_u8(2), Some(TimeoutState::Forced));
        assert_eq!(TimeoutState::from_u8(3), None);
    }
}
