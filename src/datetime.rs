//! BCD calendar date/time, as kept by the RTCC collaborator.
//!
//! Every field is binary-coded decimal because that is what the RTCC
//! hardware registers hold; comparisons and arithmetic only make sense
//! after [`bcd_to_bin`] conversion.  The 8-byte wire image mirrors the
//! RTCC register pair layout:
//!
//! ```text
//! byte  0     1        2    3      4      5        6        7
//!       year  reserved day  month  hours  weekday  seconds  minutes
//! ```

/// Size of the serialized date/time image on the wire.
pub const DATETIME_WIRE_SIZE: usize = 8;

/// Convert a packed BCD byte (0x00–0x99) to binary.
pub fn bcd_to_bin(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}

/// Convert a binary value (0–99) to packed BCD.
pub fn bin_to_bcd(bin: u8) -> u8 {
    ((bin / 10) << 4) | (bin % 10)
}

/// A point-in-time calendar value, all fields BCD-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime {
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub weekday: u8,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl DateTime {
    /// Seconds field decoded from BCD to binary (0–59).
    pub fn seconds_bin(&self) -> u8 {
        bcd_to_bin(self.seconds)
    }

    /// Serialize into the RTCC register-pair wire layout.
    pub fn to_wire(&self) -> [u8; DATETIME_WIRE_SIZE] {
        [
            self.year,
            0, // reserved
            self.day,
            self.month,
            self.hours,
            self.weekday,
            self.seconds,
            self.minutes,
        ]
    }

    /// Parse the RTCC register-pair wire layout.
    /// Returns `None` when fewer than 8 bytes are supplied.
    pub fn from_wire(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < DATETIME_WIRE_SIZE {
            return None;
        }
        Some(Self {
            year: bytes[0],
            day: bytes[2],
            month: bytes[3],
            hours: bytes[4],
            weekday: bytes[5],
            seconds: bytes[6],
            minutes: bytes[7],
        })
    }
}
