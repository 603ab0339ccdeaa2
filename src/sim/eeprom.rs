//! Simulated 256-byte EEPROM region.
//!
//! First-boot initialization lives here, as it does in the real
//! storage adapter: a region without the sentinel word gets the
//! compiled-in channel defaults written before anything reads it.

use log::info;

use crate::app::ports::StoragePort;
use crate::control::channels::ChannelBank;
use crate::error::StorageError;
use crate::store;

/// Size of the persistent region in bytes.
pub const REGION_SIZE: usize = 256;

pub struct SimEeprom {
    region: [u8; REGION_SIZE],
}

impl SimEeprom {
    /// A fresh part, taken through first-boot initialization.
    pub fn new() -> Self {
        let mut eeprom = Self {
            region: [0xFF; REGION_SIZE],
        };
        eeprom.ensure_initialized();
        eeprom
    }

    /// A fresh part left blank, for exercising the first-boot path
    /// explicitly.
    pub fn blank() -> Self {
        Self {
            region: [0xFF; REGION_SIZE],
        }
    }

    /// Write the sentinel and the default configuration blob unless
    /// the sentinel is already present.
    pub fn ensure_initialized(&mut self) {
        let sentinel = u16::from_le_bytes([
            self.region[store::SENTINEL_OFFSET as usize],
            self.region[store::SENTINEL_OFFSET as usize + 1],
        ]);
        if sentinel == store::SENTINEL {
            return;
        }
        info!("blank storage region, writing configuration defaults");
        let blob = store::encode(&ChannelBank::default());
        let base = store::CONFIG_OFFSET as usize;
        self.region[base..base + blob.len()].copy_from_slice(&blob);
        self.region[store::SENTINEL_OFFSET as usize..][..2]
            .copy_from_slice(&store::SENTINEL.to_le_bytes());
    }

    /// The whole region, for byte-level assertions.
    pub fn region(&self) -> &[u8] {
        &self.region
    }

    /// Corrupt one byte, bypassing the port.
    pub fn poke(&mut self, addr: usize, byte: u8) {
        self.region[addr] = byte;
    }
}

impl Default for SimEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl StoragePort for SimEeprom {
    fn load(&self, offset: u16, buf: &mut [u8]) -> Result<usize, StorageError> {
        let offset = offset as usize;
        if offset >= REGION_SIZE {
            return Err(StorageError::OutOfBounds);
        }
        let n = buf.len().min(REGION_SIZE - offset);
        buf[..n].copy_from_slice(&self.region[offset..offset + n]);
        Ok(n)
    }

    fn save(&mut self, offset: u16, data: &[u8]) -> Result<usize, StorageError> {
        let offset = offset as usize;
        if offset >= REGION_SIZE {
            return Err(StorageError::OutOfBounds);
        }
        let n = data.len().min(REGION_SIZE - offset);
        self.region[offset..offset + n].copy_from_slice(&data[..n]);
        Ok(n)
    }
}
