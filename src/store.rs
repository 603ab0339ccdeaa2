//! Configuration store: the channel model ⇄ the persisted blob.
//!
//! Persisted layout (within the 256-byte region):
//!
//! ```text
//! word 0 (offset 0):  sentinel 0x4353, written once on first boot
//! offset 2:           operation[6]     u16 LE
//! offset 14:          minThreshold[6]  u16 LE
//! offset 26:          maxThreshold[6]  u16 LE
//! ```
//!
//! `save` writes the blob as one unit and reads it back for
//! verification; `load` overlays the blob onto the in-memory model and
//! reconciles each channel's `last_state` from the *actual* valve pin
//! level, since valve GPIO state survives a deep-sleep restart even
//! though RAM does not.

use log::{info, warn};

use crate::app::ports::{StoragePort, ValvePort};
use crate::control::channels::{ChannelBank, OperationMode, CHANNEL_COUNT};
use crate::error::StorageError;

/// Magic sentinel marking an initialized configuration region.
pub const SENTINEL: u16 = 0x4353;
/// Byte offset of the sentinel word.
pub const SENTINEL_OFFSET: u16 = 0;
/// Byte offset of the configuration blob.
pub const CONFIG_OFFSET: u16 = 2;
/// Blob size: three u16 arrays of six channels.
pub const CONFIG_SIZE: usize = 3 * 2 * CHANNEL_COUNT;

/// Serialize the bank's persisted fields into the blob image.
pub fn encode(bank: &ChannelBank) -> [u8; CONFIG_SIZE] {
    let mut blob = [0u8; CONFIG_SIZE];
    for (index, ch) in bank.iter().enumerate() {
        let op = index * 2;
        let min = (CHANNEL_COUNT + index) * 2;
        let max = (2 * CHANNEL_COUNT + index) * 2;
        blob[op..op + 2].copy_from_slice(&u16::from(ch.operation as u8).to_le_bytes());
        blob[min..min + 2].copy_from_slice(&ch.min_threshold.to_le_bytes());
        blob[max..max + 2].copy_from_slice(&ch.max_threshold.to_le_bytes());
    }
    blob
}

/// Persist the channel configuration.
///
/// Success means the full blob was written and read back identical;
/// anything less is an error the dispatcher answers with a NACK.  There
/// is no retry here; retry policy belongs to the remote peer.
pub fn save(bank: &ChannelBank, storage: &mut impl StoragePort) -> Result<(), StorageError> {
    let blob = encode(bank);
    let written = storage.save(CONFIG_OFFSET, &blob)?;
    if written != CONFIG_SIZE {
        return Err(StorageError::ShortWrite);
    }

    let mut check = [0u8; CONFIG_SIZE];
    let read = storage.load(CONFIG_OFFSET, &mut check)?;
    if read != CONFIG_SIZE || check != blob {
        return Err(StorageError::VerifyFailed);
    }
    info!("configuration saved ({CONFIG_SIZE} bytes)");
    Ok(())
}

/// Load the persisted configuration over the in-memory model.
///
/// Operation words that decode to no known mode fall back to
/// `Disabled` rather than poisoning the channel.
pub fn load(
    bank: &mut ChannelBank,
    storage: &impl StoragePort,
    valves: &impl ValvePort,
) -> Result<(), StorageError> {
    let mut blob = [0u8; CONFIG_SIZE];
    let read = storage.load(CONFIG_OFFSET, &mut blob)?;
    if read != CONFIG_SIZE {
        return Err(StorageError::ShortRead);
    }

    for (index, ch) in bank.iter_mut().enumerate() {
        let op = index * 2;
        let min = (CHANNEL_COUNT + index) * 2;
        let max = (2 * CHANNEL_COUNT + index) * 2;

        let op_word = u16::from_le_bytes([blob[op], blob[op + 1]]);
        ch.operation = match OperationMode::from_u8(op_word as u8) {
            Some(mode) => mode,
            None => {
                warn!("channel {index}: persisted operation {op_word:#06x} unknown, disabling");
                OperationMode::Disabled
            }
        };
        ch.min_threshold = u16::from_le_bytes([blob[min], blob[min + 1]]);
        ch.max_threshold = u16::from_le_bytes([blob[max], blob[max + 1]]);
        // Trust the pin, not the blob: the valve may still be driven
        // from before the deep-sleep restart.
        ch.last_state = valves.valve_state(ch.valve as usize);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimAnalogHw, SimEeprom};

    #[test]
    fn save_load_roundtrip() {
        let mut bank = ChannelBank::default();
        bank.set_config(2, OperationMode::ForceValveOn, 111, 222);
        bank.set_config(5, OperationMode::Disabled, 0, 0);

        let mut eeprom = SimEeprom::new();
        save(&bank, &mut eeprom).unwrap();

        let mut restored = ChannelBank::default();
        let hw = SimAnalogHw::new();
        load(&mut restored, &eeprom, &hw).unwrap();

        for (a, b) in bank.iter().zip(restored.iter()) {
            assert_eq!(a.operation, b.operation);
            assert_eq!(a.min_threshold, b.min_threshold);
            assert_eq!(a.max_threshold, b.max_threshold);
        }
    }

    #[test]
    fn save_is_idempotent() {
        let bank = ChannelBank::default();
        let mut eeprom = SimEeprom::new();
        save(&bank, &mut eeprom).unwrap();
        let first = eeprom.region().to_vec();
        save(&bank, &mut eeprom).unwrap();
        assert_eq!(eeprom.region(), &first[..]);
    }

    #[test]
    fn load_reconciles_last_state_from_pins() {
        let bank = ChannelBank::default();
        let mut eeprom = SimEeprom::new();
        save(&bank, &mut eeprom).unwrap();

        let mut hw = SimAnalogHw::new();
        hw.drive_valve(3, true); // as left before the restart

        let mut restored = ChannelBank::default();
        load(&mut restored, &eeprom, &hw).unwrap();
        assert!(restored.get(3).unwrap().last_state);
        assert!(!restored.get(0).unwrap().last_state);
    }

    #[test]
    fn unknown_operation_word_falls_back_to_disabled() {
        let bank = ChannelBank::default();
        let mut eeprom = SimEeprom::new();
        save(&bank, &mut eeprom).unwrap();
        // Corrupt channel 1's operation word.
        eeprom.poke(CONFIG_OFFSET as usize + 2, 0x77);

        let mut restored = ChannelBank::default();
        let hw = SimAnalogHw::new();
        load(&mut restored, &eeprom, &hw).unwrap();
        assert_eq!(restored.get(1).unwrap().operation, OperationMode::Disabled);
    }

    #[test]
    fn truncated_region_reports_short_read() {
        // A part smaller than the configuration blob.
        struct TruncatedStorage {
            region: [u8; 20],
        }

        impl StoragePort for TruncatedStorage {
            fn load(&self, offset: u16, buf: &mut [u8]) -> Result<usize, StorageError> {
                let offset = offset as usize;
                let n = buf.len().min(self.region.len().saturating_sub(offset));
                buf[..n].copy_from_slice(&self.region[offset..offset + n]);
                Ok(n)
            }

            fn save(&mut self, offset: u16, data: &[u8]) -> Result<usize, StorageError> {
                let offset = offset as usize;
                let n = data.len().min(self.region.len().saturating_sub(offset));
                self.region[offset..offset + n].copy_from_slice(&data[..n]);
                Ok(n)
            }
        }

        let storage = TruncatedStorage { region: [0; 20] };
        let mut bank = ChannelBank::default();
        let hw = SimAnalogHw::new();
        assert_eq!(
            load(&mut bank, &storage, &hw),
            Err(StorageError::ShortRead)
        );
    }

    #[test]
    fn blob_layout_is_fixed() {
        let mut bank = ChannelBank::default();
        bank.set_config(0, OperationMode::SensorControlsValve, 0x1234, 0x5678);
        let blob = encode(&bank);
        assert_eq!(blob.len(), 36);
        assert_eq!(&blob[0..2], &[0x01, 0x00]); // operation[0], LE
        assert_eq!(&blob[12..14], &[0x34, 0x12]); // minThreshold[0], LE
        assert_eq!(&blob[24..26], &[0x78, 0x56]); // maxThreshold[0], LE
    }
}
