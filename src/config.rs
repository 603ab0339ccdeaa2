//! Node-level tunable parameters.
//!
//! Channel thresholds live in the channel control model and are
//! persisted; the values here are compiled-in operating parameters for
//! the power lifecycle and the RTCC alarm.

use crate::app::ports::AlarmFrequency;

/// Compiled-in node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Inactivity ticks before an `Enabled` timeout enters deep sleep.
    pub inactivity_timeout_ticks: u32,
    /// RTCC alarm cadence programmed at startup.
    pub alarm_frequency: AlarmFrequency,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // One tick per timer interrupt (1 kHz on the reference
            // hardware): 20 s of radio silence with no valve on.
            inactivity_timeout_ticks: 20_000,
            alarm_frequency: AlarmFrequency::EveryMinute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = NodeConfig::default();
        assert!(c.inactivity_timeout_ticks > 0);
        assert_eq!(c.alarm_frequency, AlarmFrequency::EveryMinute);
    }
}
