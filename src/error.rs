//! Unified error types for the irrigation node firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the main loop's error handling uniform.  All variants are `Copy` so
//! they can be passed around without allocation.  The device is
//! unattended, so every error path degrades to "drop and continue";
//! nothing here is allowed to halt the node permanently.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A radio operation failed.
    Radio(RadioError),
    /// Persistent storage failed.
    Storage(StorageError),
    /// A received frame or command byte was malformed.
    Frame(FrameError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radio(e) => write!(f, "radio: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Frame(e) => write!(f, "frame: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Radio errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// The transmit-idle wait exceeded its bounded timeout.
    TxTimeout,
    /// The radio did not identify itself during bring-up.
    InitFailed,
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TxTimeout => write!(f, "transmit-idle wait timed out"),
            Self::InitFailed => write!(f, "radio identification failed"),
        }
    }
}

impl From<RadioError> for Error {
    fn from(e: RadioError) -> Self {
        Self::Radio(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Address or length falls outside the 256-byte persistent region.
    OutOfBounds,
    /// Fewer bytes were written than requested.
    ShortWrite,
    /// Fewer bytes were read than requested.
    ShortRead,
    /// The written blob did not read back identical.
    VerifyFailed,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "address out of bounds"),
            Self::ShortWrite => write!(f, "short write"),
            Self::ShortRead => write!(f, "short read"),
            Self::VerifyFailed => write!(f, "read-back verification failed"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Frame / command-byte errors
// ---------------------------------------------------------------------------

/// Malformed frames are silently discarded on the wire; these variants
/// exist so the decode paths can report *why* to the log and to tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Destination bits decoded to the reserved pattern.
    ReservedDestination,
    /// Origin bits decoded to the reserved pattern.
    ReservedOrigin,
    /// Command id outside the assigned 0x0–0x9 range.
    UnknownCommand,
    /// Payload shorter than the command requires.
    TruncatedPayload,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReservedDestination => write!(f, "reserved destination bits"),
            Self::ReservedOrigin => write!(f, "reserved origin bits"),
            Self::UnknownCommand => write!(f, "unknown command id"),
            Self::TruncatedPayload => write!(f, "truncated payload"),
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// The binary entry point wraps these in anyhow.
impl std::error::Error for Error {}
impl std::error::Error for RadioError {}
impl std::error::Error for StorageError {}
impl std::error::Error for FrameError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
