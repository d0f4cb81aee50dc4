//! Unified error type for footswitch.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.
//!
//! Nothing here reaches the player: the controller logs these and
//! carries on with whatever state it already has.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Storage
    /// Flash read/write/erase failed.
    Storage,

    /// A written byte did not read back as written.
    VerifyMismatch {
        offset: u8,
    },

    /// Offset outside the settings record.
    OutOfRange,

    // MIDI
    /// The UART refused a byte.
    Serial,

    // Display
    /// I²C transaction to the display failed.
    Display,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Storage => f.write_str("storage access failed"),
            Error::VerifyMismatch { offset } => {
                write!(f, "read-back mismatch at offset {}", offset)
            }
            Error::OutOfRange => f.write_str("offset outside settings record"),
            Error::Serial => f.write_str("serial write failed"),
            Error::Display => f.write_str("display write failed"),
        }
    }
}
