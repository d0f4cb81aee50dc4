//! User interface hardware - numeric display + footswitches.
//!
//! ## Components
//!
//! - **Display**: SSD1306 128×64 OLED via I²C, drawn as three large
//!   digit cells that stand in for a 3-digit 7-segment display
//! - **Buttons**: 2 or 3 footswitches, active-low with pull-up
//!
//! The cell bookkeeping below is plain logic and host-tested; the
//! drivers themselves only build with the `embedded` feature.

#[cfg(feature = "embedded")]
pub mod buttons;
#[cfg(feature = "embedded")]
pub mod display;

use crate::config::DISPLAY_DIGITS;
use crate::hal::Glyph;
use crate::settings::RANGE_COUNT;

/// Marker shown next to the channel for each patch range.
pub const RANGE_MARKERS: [char; RANGE_COUNT as usize] = ['c', 'n', 'C', 'u', 'U'];

const CELLS: usize = DISPLAY_DIGITS as usize;

pub fn glyph_char(glyph: Glyph) -> char {
    match glyph {
        Glyph::Digit(d) if d < 10 => (b'0' + d) as char,
        Glyph::Digit(_) => '-',
        Glyph::Blank => ' ',
    }
}

/// Channel view, position 0 first: the range marker in the units cell,
/// the 1-based channel to its left.
pub fn channel_view(channel: u8, range_index: u8) -> [char; CELLS] {
    let shown = (channel & 0x0F) + 1;
    let marker = RANGE_MARKERS[usize::from(range_index % RANGE_COUNT)];
    if shown > 9 {
        [marker, glyph_char(Glyph::Digit(shown - 10)), '1']
    } else {
        [marker, glyph_char(Glyph::Digit(shown)), ' ']
    }
}

/// A single `0` or `1` in the units cell.
pub fn flag_view(value: bool) -> [char; CELLS] {
    [if value { '1' } else { '0' }, ' ', ' ']
}

/// What the three display cells currently hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cells {
    /// Position 0 is the rightmost cell.
    cells: [char; CELLS],
}

impl Cells {
    pub const fn blank() -> Self {
        Self {
            cells: [' '; CELLS],
        }
    }

    /// Returns false if `position` is not a cell or already holds `c`.
    pub fn set(&mut self, position: u8, c: char) -> bool {
        match self.cells.get_mut(usize::from(position)) {
            Some(cell) if *cell != c => {
                *cell = c;
                true
            }
            _ => false,
        }
    }

    /// Replace every cell; returns whether anything changed.
    pub fn set_all(&mut self, cells: [char; CELLS]) -> bool {
        let changed = self.cells != cells;
        self.cells = cells;
        changed
    }

    /// Cell contents in reading order, leftmost first.
    pub fn text(&self) -> heapless::String<CELLS> {
        let mut s = heapless::String::new();
        for &c in self.cells.iter().rev() {
            // ASCII only, one byte per cell
            let _ = s.push(c);
        }
        s
    }
}

impl Default for Cells {
    fn default() -> Self {
        Self::blank()
    }
}
