//! Seams between the decision engine and the hardware.
//!
//! The controller only ever talks to these traits. The firmware in
//! `main.rs` and `ui/` implements them for the nRF52840; the tests
//! implement them with scripted timelines and recorders.

use crate::error::Error;
use crate::switch::SwitchRole;

/// Content of one display digit cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Glyph {
    Digit(u8),
    Blank,
}

/// Three-digit numeric display with adjustable intensity.
///
/// Digit position 0 is the rightmost (least significant) cell.
pub trait Display {
    fn show_digit(&mut self, position: u8, glyph: Glyph) -> Result<(), Error>;

    /// Show a 0-based MIDI channel together with the range marker.
    fn show_channel_and_range(&mut self, channel: u8, range_index: u8) -> Result<(), Error>;

    /// Show a single 0/1 value.
    fn show_flag(&mut self, value: bool) -> Result<(), Error>;

    fn clear(&mut self) -> Result<(), Error>;

    fn set_intensity(&mut self, level: u8) -> Result<(), Error>;
}

/// MIDI serial output. `send_byte` blocks until the byte is accepted.
pub trait MidiOut {
    fn send_byte(&mut self, byte: u8) -> Result<(), Error>;
}

/// Byte-addressed non-volatile store (EEPROM-like).
///
/// Writes must happen between `begin_write` and `end_write`.
/// `write_byte` reads the byte back and reports
/// [`Error::VerifyMismatch`] if it did not stick.
pub trait ByteStore {
    fn read_byte(&mut self, offset: u8) -> u8;
    fn write_byte(&mut self, offset: u8, value: u8) -> Result<(), Error>;
    fn begin_write(&mut self);
    fn end_write(&mut self);
}

/// Raw switch levels. Sampled once per role per scan iteration.
pub trait SwitchInput {
    fn is_closed(&mut self, role: SwitchRole) -> bool;
}

impl<T: Display + ?Sized> Display for &mut T {
    fn show_digit(&mut self, position: u8, glyph: Glyph) -> Result<(), Error> {
        (**self).show_digit(position, glyph)
    }

    fn show_channel_and_range(&mut self, channel: u8, range_index: u8) -> Result<(), Error> {
        (**self).show_channel_and_range(channel, range_index)
    }

    fn show_flag(&mut self, value: bool) -> Result<(), Error> {
        (**self).show_flag(value)
    }

    fn clear(&mut self) -> Result<(), Error> {
        (**self).clear()
    }

    fn set_intensity(&mut self, level: u8) -> Result<(), Error> {
        (**self).set_intensity(level)
    }
}

impl<T: MidiOut + ?Sized> MidiOut for &mut T {
    fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        (**self).send_byte(byte)
    }
}

impl<T: ByteStore + ?Sized> ByteStore for &mut T {
    fn read_byte(&mut self, offset: u8) -> u8 {
        (**self).read_byte(offset)
    }

    fn write_byte(&mut self, offset: u8, value: u8) -> Result<(), Error> {
        (**self).write_byte(offset, value)
    }

    fn begin_write(&mut self) {
        (**self).begin_write()
    }

    fn end_write(&mut self) {
        (**self).end_write()
    }
}

impl<T: SwitchInput + ?Sized> SwitchInput for &mut T {
    fn is_closed(&mut self, role: SwitchRole) -> bool {
        (**self).is_closed(role)
    }
}
