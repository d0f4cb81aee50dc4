//! EEPROM-style byte store on top of internal flash.
//!
//! The nRF52840 has no data EEPROM. Settings bytes live in a
//! `sequential-storage` key-value map, one item per byte offset, so a
//! write appends a small item instead of rewriting a page. The crate
//! spreads items over the region, only erases a page during garbage
//! collection, and a write cut short by a reset leaves the previous
//! value readable.
//!
//! A RAM shadow serves reads. Offsets never written read as 0, which
//! decodes to the factory defaults.

use core::ops::Range;

use embassy_futures::block_on;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map::{fetch_item, store_item};

use crate::config::SETTINGS_RECORD_LEN;
use crate::error::Error;
use crate::fmt::{error, warn};
use crate::hal::ByteStore;

/// Scratch space for one serialized item (header, key, value).
const ITEM_BUF_LEN: usize = 32;

/// Settings bytes persisted in a wear-levelled flash map.
pub struct FlashByteStore<F> {
    flash: F,
    /// Page-aligned flash region, at least two pages.
    range: Range<u32>,
    shadow: [u8; SETTINGS_RECORD_LEN],
    unlocked: bool,
}

impl<F: NorFlash> FlashByteStore<F> {
    /// Open the map in `range` and load every settings byte.
    ///
    /// A byte that cannot be read keeps its default.
    pub fn new(flash: F, range: Range<u32>) -> Self {
        let mut store = Self {
            flash,
            range,
            shadow: [0; SETTINGS_RECORD_LEN],
            unlocked: false,
        };
        for offset in 0..SETTINGS_RECORD_LEN as u8 {
            match store.fetch(offset) {
                Ok(Some(value)) => store.shadow[usize::from(offset)] = value,
                Ok(None) => {}
                Err(e) => {
                    error!("settings byte {} unreadable ({}), using default", offset, e);
                }
            }
        }
        store
    }

    pub fn into_inner(self) -> F {
        self.flash
    }

    fn fetch(&mut self, offset: u8) -> Result<Option<u8>, Error> {
        let mut buf = [0u8; ITEM_BUF_LEN];
        block_on(fetch_item::<u8, u8, _>(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buf,
            &offset,
        ))
        .map_err(|_| Error::Storage)
    }

    fn store(&mut self, offset: u8, value: u8) -> Result<(), Error> {
        let mut buf = [0u8; ITEM_BUF_LEN];
        block_on(store_item::<u8, u8, _>(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buf,
            &offset,
            &value,
        ))
        .map_err(|_| Error::Storage)
    }
}

impl<F: NorFlash> ByteStore for FlashByteStore<F> {
    fn read_byte(&mut self, offset: u8) -> u8 {
        self.shadow.get(usize::from(offset)).copied().unwrap_or(0)
    }

    fn write_byte(&mut self, offset: u8, value: u8) -> Result<(), Error> {
        let index = usize::from(offset);
        if index >= SETTINGS_RECORD_LEN {
            return Err(Error::OutOfRange);
        }
        if !self.unlocked {
            warn!("settings write at {} outside write bracket", offset);
            return Err(Error::Storage);
        }

        self.store(offset, value)?;

        let stored = self.fetch(offset)?.unwrap_or(0);
        self.shadow[index] = stored;
        if stored == value {
            Ok(())
        } else {
            Err(Error::VerifyMismatch { offset })
        }
    }

    fn begin_write(&mut self) {
        self.unlocked = true;
    }

    fn end_write(&mut self) {
        self.unlocked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Configuration;
    use crate::store::{ConfigStore, SaveReport};
    use embassy_embedded_hal::adapter::BlockingAsync;
    use embedded_storage::nor_flash::{
        ErrorType, NorFlash as BlockingNorFlash, NorFlashErrorKind, ReadNorFlash,
    };

    const PAGE: usize = 4096;
    const PAGES: usize = 2;
    const REGION: Range<u32> = 0..(PAGE * PAGES) as u32;

    /// NOR flash in RAM: erase sets 0xFF, write can only clear bits.
    struct RamFlash {
        mem: std::vec::Vec<u8>,
        erases: u32,
        /// Every program operation fails before touching the cells.
        fail_writes: bool,
    }

    impl RamFlash {
        fn erased() -> Self {
            Self {
                mem: std::vec![0xFF; PAGE * PAGES],
                erases: 0,
                fail_writes: false,
            }
        }
    }

    impl ErrorType for RamFlash {
        type Error = NorFlashErrorKind;
    }

    impl ReadNorFlash for RamFlash {
        const READ_SIZE: usize = 1;

        fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
            let start = offset as usize;
            let end = start + bytes.len();
            if end > self.mem.len() {
                return Err(NorFlashErrorKind::OutOfBounds);
            }
            bytes.copy_from_slice(&self.mem[start..end]);
            Ok(())
        }

        fn capacity(&self) -> usize {
            self.mem.len()
        }
    }

    impl BlockingNorFlash for RamFlash {
        const WRITE_SIZE: usize = 4;
        const ERASE_SIZE: usize = PAGE;

        fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
            if from as usize % PAGE != 0 || to as usize % PAGE != 0 {
                return Err(NorFlashErrorKind::NotAligned);
            }
            self.mem[from as usize..to as usize].fill(0xFF);
            self.erases += (to - from) / PAGE as u32;
            Ok(())
        }

        fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
            if offset as usize % Self::WRITE_SIZE != 0 || bytes.len() % Self::WRITE_SIZE != 0 {
                return Err(NorFlashErrorKind::NotAligned);
            }
            if self.fail_writes {
                return Err(NorFlashErrorKind::Other);
            }
            for (i, &b) in bytes.iter().enumerate() {
                self.mem[offset as usize + i] &= b;
            }
            Ok(())
        }
    }

    fn open(flash: &mut RamFlash) -> FlashByteStore<BlockingAsync<&mut RamFlash>> {
        FlashByteStore::new(BlockingAsync::new(flash), REGION)
    }

    #[test]
    fn erased_flash_reads_as_zero_record() {
        let mut flash = RamFlash::erased();
        let mut store = open(&mut flash);
        for offset in 0..SETTINGS_RECORD_LEN as u8 {
            assert_eq!(store.read_byte(offset), 0);
        }
        let cfg = ConfigStore::new(store).load();
        assert_eq!(cfg, Configuration::default());
    }

    #[test]
    fn write_survives_reopen_without_erasing() {
        let mut flash = RamFlash::erased();
        let mut store = open(&mut flash);
        store.begin_write();
        assert_eq!(store.write_byte(1, 3), Ok(()));
        assert_eq!(store.write_byte(4, 1), Ok(()));
        assert_eq!(store.write_byte(1, 2), Ok(()));
        store.end_write();
        drop(store);
        assert_eq!(flash.erases, 0);

        let mut reopened = open(&mut flash);
        assert_eq!(reopened.read_byte(0), 0);
        assert_eq!(reopened.read_byte(1), 2);
        assert_eq!(reopened.read_byte(4), 1);
    }

    #[test]
    fn write_outside_bracket_is_refused() {
        let mut flash = RamFlash::erased();
        let mut store = open(&mut flash);
        assert_eq!(store.write_byte(0, 5), Err(Error::Storage));
        assert_eq!(store.read_byte(0), 0);
    }

    #[test]
    fn offset_past_record_is_refused() {
        let mut flash = RamFlash::erased();
        let mut store = open(&mut flash);
        store.begin_write();
        assert_eq!(
            store.write_byte(SETTINGS_RECORD_LEN as u8, 1),
            Err(Error::OutOfRange)
        );
        assert_eq!(store.read_byte(200), 0);
    }

    #[test]
    fn failed_write_keeps_earlier_settings() {
        let saved = Configuration {
            channel: 9,
            range_index: 3,
            display_zero_based: true,
        };
        let mut flash = RamFlash::erased();
        let report = ConfigStore::new(open(&mut flash)).save_if_changed(&saved);
        assert_eq!(report, SaveReport { written: 3, failed: 0 });

        // reset in the middle of programming the next save
        flash.fail_writes = true;
        let report = ConfigStore::new(open(&mut flash)).save_last_patch(5);
        assert_eq!(report, SaveReport { written: 0, failed: 1 });

        flash.fail_writes = false;
        let mut config = ConfigStore::new(open(&mut flash));
        assert_eq!(config.load(), saved);
        assert_eq!(config.load_last_patch(998), 0);
    }

    #[test]
    fn patch_changes_rarely_erase() {
        const CHANGES: u16 = 1000;
        let saved = Configuration {
            channel: 4,
            range_index: 4,
            display_zero_based: false,
        };
        let mut flash = RamFlash::erased();

        let mut config = ConfigStore::new(open(&mut flash));
        config.save_if_changed(&saved);
        for patch in 1..=CHANGES {
            let report = config.save_last_patch(patch % 999);
            assert_eq!(report.failed, 0, "patch {patch}");
        }
        drop(config);

        // one page erase per page-full of items, not one per change
        assert!(
            flash.erases < u32::from(CHANGES) / 50,
            "{} erases for {} changes",
            flash.erases,
            CHANGES
        );

        let mut config = ConfigStore::new(open(&mut flash));
        assert_eq!(config.load(), saved);
        assert_eq!(config.load_last_patch(998), CHANGES % 999);
    }
}
