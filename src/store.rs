//! Loading and saving the persisted configuration.
//!
//! The store is byte-addressed with a fixed layout:
//!
//! ```text
//! 0  channel        (low 4 bits)
//! 1  range index    (modulo table size)
//! 2  last patch MSB (optional)
//! 3  last patch LSB (optional)
//! 4  display flag   (bit 0)
//! ```
//!
//! An erased, all-zero store decodes to channel 1 (0-based 0), the
//! 0-127 range and 1-based display. Only bytes that differ from what
//! is stored get written; the backing memory has finite endurance.

use crate::config::{
    CHANNEL_OFFSET, DISPLAY_OFFSET, LAST_PATCH_LSB_OFFSET, LAST_PATCH_MSB_OFFSET, RANGE_OFFSET,
};
use crate::fmt::{debug, info, warn};
use crate::hal::ByteStore;
use crate::settings::Configuration;

/// Open write bracket; relocks the store when dropped.
struct WriteSession<'a, S: ByteStore> {
    store: &'a mut S,
    written: u8,
    failed: u8,
}

impl<'a, S: ByteStore> WriteSession<'a, S> {
    fn open(store: &'a mut S) -> Self {
        store.begin_write();
        Self {
            store,
            written: 0,
            failed: 0,
        }
    }

    /// Write `value` at `offset` unless it is already there.
    fn write_if_changed(&mut self, offset: u8, value: u8) {
        if self.store.read_byte(offset) == value {
            return;
        }
        match self.store.write_byte(offset, value) {
            Ok(()) => self.written += 1,
            Err(e) => {
                warn!("settings write at {} failed: {}", offset, e);
                self.failed += 1;
            }
        }
    }
}

impl<S: ByteStore> Drop for WriteSession<'_, S> {
    fn drop(&mut self) {
        self.store.end_write();
    }
}

/// What a save actually did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SaveReport {
    /// Bytes written and verified.
    pub written: u8,
    /// Bytes whose read-back did not match.
    pub failed: u8,
}

impl SaveReport {
    pub fn is_noop(&self) -> bool {
        self.written == 0 && self.failed == 0
    }
}

/// Configuration persistence on top of a [`ByteStore`].
pub struct ConfigStore<S> {
    store: S,
}

impl<S: ByteStore> ConfigStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Give back the underlying byte store.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Read the configuration. Never fails; junk is normalised.
    pub fn load(&mut self) -> Configuration {
        let cfg = Configuration::from_raw(
            self.store.read_byte(CHANNEL_OFFSET),
            self.store.read_byte(RANGE_OFFSET),
            self.store.read_byte(DISPLAY_OFFSET),
        );
        info!(
            "settings: channel {} range {} zero-based {}",
            cfg.channel, cfg.range_index, cfg.display_zero_based
        );
        cfg
    }

    /// Persist the fields of `cfg` whose stored byte differs.
    ///
    /// Best effort: a write that does not verify is counted and logged,
    /// never retried.
    pub fn save_if_changed(&mut self, cfg: &Configuration) -> SaveReport {
        let fields = [
            (CHANNEL_OFFSET, cfg.channel),
            (RANGE_OFFSET, cfg.range_index),
            (DISPLAY_OFFSET, u8::from(cfg.display_zero_based)),
        ];
        if fields
            .iter()
            .all(|&(offset, value)| self.store.read_byte(offset) == value)
        {
            debug!("settings unchanged, nothing to save");
            return SaveReport::default();
        }

        let report = {
            let mut session = WriteSession::open(&mut self.store);
            for (offset, value) in fields {
                session.write_if_changed(offset, value);
            }
            SaveReport {
                written: session.written,
                failed: session.failed,
            }
        };
        info!("settings saved: {} written, {} failed", report.written, report.failed);
        report
    }

    /// Patch stored by [`save_last_patch`](Self::save_last_patch).
    ///
    /// A value above `max` (stale range, corrupt bytes) gives 0.
    pub fn load_last_patch(&mut self, max: u16) -> u16 {
        let patch = u16::from_be_bytes([
            self.store.read_byte(LAST_PATCH_MSB_OFFSET),
            self.store.read_byte(LAST_PATCH_LSB_OFFSET),
        ]);
        if patch > max {
            warn!("stored patch {} above range max {}, using 0", patch, max);
            0
        } else {
            patch
        }
    }

    pub fn save_last_patch(&mut self, patch: u16) -> SaveReport {
        let [msb, lsb] = patch.to_be_bytes();
        if self.store.read_byte(LAST_PATCH_MSB_OFFSET) == msb
            && self.store.read_byte(LAST_PATCH_LSB_OFFSET) == lsb
        {
            return SaveReport::default();
        }

        let mut session = WriteSession::open(&mut self.store);
        session.write_if_changed(LAST_PATCH_MSB_OFFSET, msb);
        session.write_if_changed(LAST_PATCH_LSB_OFFSET, lsb);
        SaveReport {
            written: session.written,
            failed: session.failed,
        }
    }
}
