//! IrriNode firmware library.
//!
//! Core logic for an autonomous, battery-powered plant-irrigation node:
//! a framed command protocol over a LoRa link, a six-channel
//! sensor/valve control loop with hysteresis, persisted channel
//! configuration, and a deep-sleep power lifecycle.
//!
//! All peripheral access (SPI, ADC timing, EEPROM word programming,
//! RTCC registers) lives behind the port traits in [`app::ports`]; the
//! modules here are pure logic and fully host-testable.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod datetime;
pub mod power;
pub mod proto;
pub mod sim;
pub mod store;

mod error;

pub use error::{Error, FrameError, RadioError, Result, StorageError};
