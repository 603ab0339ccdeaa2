//! Channel control model: six independently configured
//! sensor/valve channels.

/// Fixed channel cardinality of the hardware.
pub const CHANNEL_COUNT: usize = 6;

/// Compiled-in threshold defaults (raw ADC counts).
pub const DEFAULT_MIN_THRESHOLD: u16 = 620;
pub const DEFAULT_MAX_THRESHOLD: u16 = 860;

// ───────────────────────────────────────────────────────────────
// Operation mode
// ───────────────────────────────────────────────────────────────

/// Per-channel operating policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OperationMode {
    /// Channel ignored: no ADC conversion, valve forced off.
    #[default]
    Disabled = 0,
    /// Hysteresis control: the soil sensor drives the valve.
    SensorControlsValve = 1,
    /// Valve held on unconditionally.
    ForceValveOn = 2,
    /// Valve held off unconditionally.
    ForceValveOff = 3,
}

impl OperationMode {
    /// Validated conversion from a wire/persisted byte.
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Disabled),
            1 => Some(Self::SensorControlsValve),
            2 => Some(Self::ForceValveOn),
            3 => Some(Self::ForceValveOff),
            _ => None,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Channel
// ───────────────────────────────────────────────────────────────

/// One sensor/valve channel.
///
/// `min_threshold <= max_threshold` is assumed by the hysteresis policy
/// but deliberately not enforced here: an inverted pair is the field
/// idiom for a latched always-on/always-off channel, and the
/// configuration-set command stores whatever the peer sent.
#[derive(Debug, Clone, Copy)]
pub struct Channel {
    pub operation: OperationMode,
    /// ADC channel the soil sensor is wired to.
    pub adc_channel: u8,
    /// Index of the valve pin in the valve bank.
    pub valve: u8,
    pub min_threshold: u16,
    pub max_threshold: u16,
    /// Valve level commanded by the last sampling pass.
    pub last_state: bool,
}

/// The full six-channel model.
#[derive(Debug, Clone)]
pub struct ChannelBank {
    channels: [Channel; CHANNEL_COUNT],
}

impl Default for ChannelBank {
    fn default() -> Self {
        let mut index = 0u8;
        let channels = [(); CHANNEL_COUNT].map(|()| {
            let ch = Channel {
                operation: OperationMode::SensorControlsValve,
                adc_channel: index,
                valve: index,
                min_threshold: DEFAULT_MIN_THRESHOLD,
                max_threshold: DEFAULT_MAX_THRESHOLD,
                last_state: false,
            };
            index += 1;
            ch
        });
        Self { channels }
    }
}

impl ChannelBank {
    pub fn get(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Channel> {
        self.channels.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.channels.iter_mut()
    }

    /// True when any channel's valve ended the last pass on.  Sleep is
    /// inhibited for as long as this holds.
    pub fn any_valve_on(&self) -> bool {
        self.channels.iter().any(|c| c.last_state)
    }

    /// Overwrite one channel's configurable fields.
    /// Returns false for an out-of-range index.
    pub fn set_config(
        &mut self,
        index: usize,
        operation: OperationMode,
        min_threshold: u16,
        max_threshold: u16,
    ) -> bool {
        let Some(ch) = self.channels.get_mut(index) else {
            return false;
        };
        ch.operation = operation;
        ch.min_threshold = min_threshold;
        ch.max_threshold = max_threshold;
        true
    }
}
