//! Command byte encode/decode.
//!
//! ```text
//! bit 7 6   5 4   3 2 1 0
//!     └─┘   └─┘   └─────┘
//!     dest  origin  command id
//! ```
//!
//! Destination: `11` broadcast, `10` endpoint, `01` router (`00`
//! reserved).  Origin: `10` module, `01` software, `00` router (`11`
//! reserved).  The packed form never travels through application
//! logic: it is decoded into [`CommandByte`] at the reception edge
//! and re-encoded at the transmit edge.

use crate::error::FrameError;

const DEST_SHIFT: u8 = 6;
const ORIGIN_SHIFT: u8 = 4;
const ORIGIN_MASK: u8 = 0b0011_0000;
const ID_MASK: u8 = 0b0000_1111;

// ───────────────────────────────────────────────────────────────
// Field enums
// ───────────────────────────────────────────────────────────────

/// Intended recipient category of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Destination {
    Broadcast = 0b11,
    Endpoint = 0b10,
    Router = 0b01,
}

/// Class of peer that produced a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Origin {
    Module = 0b10,
    Software = 0b01,
    Router = 0b00,
}

impl Origin {
    /// Destination class for a reply to a request from this origin:
    /// software peers are addressed as endpoints, routers as routers.
    /// One physical module can thereby serve a configuration tool and
    /// a mesh router without protocol ambiguity.
    pub fn reply_destination(self) -> Destination {
        match self {
            Self::Software => Destination::Endpoint,
            Self::Router => Destination::Router,
            // A request claiming module origin is protocol misuse;
            // answer it as an endpoint.
            Self::Module => Destination::Endpoint,
        }
    }
}

/// Assigned command ids (0x0–0x9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandId {
    Message = 0x0,
    GetDateTime = 0x1,
    SetDateTime = 0x2,
    SendSamples = 0x3,
    GetControlConfig = 0x4,
    SetControlConfig = 0x5,
    SaveConfig = 0x6,
    PowerDown = 0x7,
    RequestAction = 0x8,
    SetTimeout = 0x9,
}

impl CommandId {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0x0 => Some(Self::Message),
            0x1 => Some(Self::GetDateTime),
            0x2 => Some(Self::SetDateTime),
            0x3 => Some(Self::SendSamples),
            0x4 => Some(Self::GetControlConfig),
            0x5 => Some(Self::SetControlConfig),
            0x6 => Some(Self::SaveConfig),
            0x7 => Some(Self::PowerDown),
            0x8 => Some(Self::RequestAction),
            0x9 => Some(Self::SetTimeout),
            _ => None,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// CommandByte
// ───────────────────────────────────────────────────────────────

/// Decoded command byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandByte {
    pub destination: Destination,
    pub origin: Origin,
    pub id: CommandId,
}

impl CommandByte {
    /// Decode a packed command byte, rejecting reserved bit patterns.
    pub fn decode(raw: u8) -> Result<Self, FrameError> {
        let destination = match raw >> DEST_SHIFT {
            0b11 => Destination::Broadcast,
            0b10 => Destination::Endpoint,
            0b01 => Destination::Router,
            _ => return Err(FrameError::ReservedDestination),
        };
        let origin = match (raw & ORIGIN_MASK) >> ORIGIN_SHIFT {
            0b10 => Origin::Module,
            0b01 => Origin::Software,
            0b00 => Origin::Router,
            _ => return Err(FrameError::ReservedOrigin),
        };
        let id = CommandId::from_u8(raw & ID_MASK).ok_or(FrameError::UnknownCommand)?;
        Ok(Self {
            destination,
            origin,
            id,
        })
    }

    /// Pack into the wire byte.
    pub fn encode(self) -> u8 {
        ((self.destination as u8) << DEST_SHIFT)
            | ((self.origin as u8) << ORIGIN_SHIFT)
            | self.id as u8
    }

    /// Build the command byte for a reply to `request`: origin is the
    /// module, destination derives from the request's origin, id echoes
    /// the request.
    pub fn reply_to(request: CommandByte) -> Self {
        Self {
            destination: request.origin.reply_destination(),
            origin: Origin::Module,
            id: request.id,
        }
    }
}

/// Force the origin field of a packed command byte to `MODULE`.
///
/// The send primitive applies this to every outbound frame, overwriting
/// whatever origin bits the caller supplied.
pub fn force_module_origin(raw: u8) -> u8 {
    (raw & !ORIGIN_MASK) | ((Origin::Module as u8) << ORIGIN_SHIFT)
}
