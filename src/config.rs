//! Application-wide constants and build-variant selection.
//!
//! All timing parameters, protocol constants and storage offsets live
//! here so they can be tuned in one place. Hardware variants are a
//! [`Features`] value picked when the board is composed in `main.rs`.

// Timing (all in 1 ms ticks)

/// Period of the tick interrupt (ms).
pub const TICK_PERIOD_MS: u32 = 1;

/// Time a switch must be closed before it activates (ms).
pub const DEBOUNCE_THRESHOLD_MS: u32 = 50;

/// Autorepeat interval for a held switch (ms).
pub const AUTOREPEAT_AFTER_MS: u32 = 300;

/// Once held this long, the autorepeat interval shortens (ms).
pub const AUTOREPEAT_FAST_AFTER_MS: u32 = 1000;

/// Accelerated autorepeat interval (ms).
pub const AUTOREPEAT_FAST_MS: u32 = 60;

/// Half-period of the display flash (ms).
pub const FLASH_PERIOD_MS: u16 = 150;

/// How long the indicator LED stays lit after a MIDI transmission (ms).
pub const LED_FLASH_LEN_MS: u16 = 150;

/// Window after power-up in which a held switch enters configuration (ms).
pub const BOOT_CHECK_TIMEOUT_MS: u32 = 100;

/// Idle time after which a configuration mode exits (ms).
pub const CONFIG_TIMEOUT_MS: u32 = 3000;

// Display

/// Dimmest level used while flashing.
pub const MIN_DISPLAY_INTENSITY: u8 = 0x00;

/// Normal display level.
pub const MAX_DISPLAY_INTENSITY: u8 = 0xFF;

/// Settle time after power-up before the display accepts commands (ms).
pub const DISPLAY_POWER_UP_MS: u16 = 500;

/// Number of digit cells on the display.
pub const DISPLAY_DIGITS: u8 = 3;

// MIDI

/// Program Change status nibble.
pub const MIDI_PC: u8 = 0xC0;

/// Control Change status nibble.
pub const MIDI_CC: u8 = 0xB0;

/// Bank Select MSB controller number.
pub const MIDI_CC_BANK_MSB: u8 = 0x00;

/// Number of MIDI channels.
pub const MIDI_CHANNELS: u8 = 16;

/// MIDI UART baud rate.
pub const MIDI_BAUD: u32 = 31_250;

/// Highest selectable patch for each range index.
///
/// Ranges past 127 are reached with a Bank Select message in front
/// of the Program Change.
pub const RANGE_TABLE: [u16; 5] = [127, 199, 299, 799, 998];

// Persisted settings layout (byte offsets into the settings record)

pub const CHANNEL_OFFSET: u8 = 0;
pub const RANGE_OFFSET: u8 = 1;
pub const LAST_PATCH_MSB_OFFSET: u8 = 2;
pub const LAST_PATCH_LSB_OFFSET: u8 = 3;
pub const DISPLAY_OFFSET: u8 = 4;

/// Size of the settings record in bytes.
pub const SETTINGS_RECORD_LEN: usize = 8;

// Settings flash region

/// Flash page size on the nRF52840 (4 KB).
pub const FLASH_PAGE_SIZE: u32 = 4096;

/// Flash page index where settings storage starts. Keep in sync with `memory.x`.
pub const SETTINGS_FLASH_PAGE_START: u32 = 252;

/// Number of flash pages the settings map rotates through.
pub const SETTINGS_FLASH_PAGE_COUNT: u32 = 4;

// GPIO pin assignments (nRF52840-DK defaults)
//
// Adjust in `main.rs` for a custom PCB.
//
//   Switch UP      → P0.11
//   Switch DOWN    → P0.12
//   Switch MODE    → P0.24 (three-switch build only)
//   I²C SDA        → P0.26
//   I²C SCL        → P0.27
//   MIDI TX        → P0.06
//   Indicator LED  → P0.13

/// How the MODE role is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchLayout {
    /// Only UP and DOWN exist; pressing both together means MODE.
    TwoSwitch,
    /// A dedicated MODE switch.
    ThreeSwitch,
}

/// When a Bank Select message precedes the Program Change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BankPolicy {
    /// Every transmission carries a bank message.
    Always,
    /// Only ranges that extend past patch 127 send the bank.
    ExtendedRangesOnly,
}

/// Hardware and behaviour variants chosen at composition time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Features {
    pub layout: SwitchLayout,
    pub bank: BankPolicy,
    /// Persist the last transmitted patch and restore it at power-up.
    pub restore_last_patch: bool,
    /// Pulse an indicator LED on transmit and flash it with the display.
    pub external_led: bool,
}

impl Features {
    /// Two switches, bank always sent, nothing restored, no LED.
    pub const DEFAULT: Self = Self {
        layout: SwitchLayout::TwoSwitch,
        bank: BankPolicy::Always,
        restore_last_patch: false,
        external_led: false,
    };
}

impl Default for Features {
    fn default() -> Self {
        Self::DEFAULT
    }
}
