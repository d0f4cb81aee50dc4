//! Player-adjustable settings and the patch arithmetic that depends on them.

use crate::config::{MIDI_CHANNELS, RANGE_TABLE};

/// Number of selectable patch ranges.
pub const RANGE_COUNT: u8 = RANGE_TABLE.len() as u8;

/// The persisted configuration, as loaded at power-up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    /// MIDI channel, 0-based (0..=15).
    pub channel: u8,
    /// Index into [`RANGE_TABLE`] (0..=4).
    pub range_index: u8,
    /// Display patch numbers as sent (0-based) instead of +1.
    pub display_zero_based: bool,
}

impl Configuration {
    /// Build from raw stored bytes, forcing every field into range.
    pub fn from_raw(channel: u8, range: u8, display: u8) -> Self {
        Self {
            channel: channel & 0x0F,
            range_index: range % RANGE_COUNT,
            display_zero_based: display & 0x01 != 0,
        }
    }

    pub fn max_patch(&self) -> u16 {
        max_patch(self.range_index)
    }

    pub fn next_channel(&mut self) {
        self.channel = (self.channel + 1) % MIDI_CHANNELS;
    }

    pub fn prev_channel(&mut self) {
        self.channel = (self.channel + MIDI_CHANNELS - 1) % MIDI_CHANNELS;
    }

    pub fn next_range(&mut self) {
        self.range_index = (self.range_index + 1) % RANGE_COUNT;
    }

    pub fn toggle_display_base(&mut self) {
        self.display_zero_based = !self.display_zero_based;
    }
}

/// Highest patch for `range_index`; out-of-table indices wrap.
pub fn max_patch(range_index: u8) -> u16 {
    RANGE_TABLE[usize::from(range_index % RANGE_COUNT)]
}

/// Next patch, wrapping from `max` back to 0.
pub fn patch_up(patch: u16, max: u16) -> u16 {
    (patch + 1) % (max + 1)
}

/// Previous patch; stepping down from 0 lands on `max`.
pub fn patch_down(patch: u16, max: u16) -> u16 {
    match patch.checked_sub(1) {
        Some(p) if p <= max => p,
        _ => max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_is_a_ring_of_sixteen() {
        let mut cfg = Configuration {
            channel: 15,
            ..Default::default()
        };
        cfg.next_channel();
        assert_eq!(cfg.channel, 0);
        cfg.prev_channel();
        assert_eq!(cfg.channel, 15);

        for _ in 0..100 {
            cfg.prev_channel();
            assert!(cfg.channel < 16);
        }
        assert_eq!(cfg.channel, (15 + 16 * 7 - 100) % 16);
    }

    #[test]
    fn range_wraps_past_last_entry() {
        let mut cfg = Configuration::default();
        let seen: [u8; 6] = core::array::from_fn(|_| {
            let r = cfg.range_index;
            cfg.next_range();
            r
        });
        assert_eq!(seen, [0, 1, 2, 3, 4, 0]);
    }

    #[test]
    fn patch_up_wraps_to_zero() {
        assert_eq!(patch_up(0, 127), 1);
        assert_eq!(patch_up(126, 127), 127);
        assert_eq!(patch_up(127, 127), 0);
        assert_eq!(patch_up(998, 998), 0);
    }

    #[test]
    fn patch_down_saturates_to_max() {
        assert_eq!(patch_down(10, 127), 9);
        assert_eq!(patch_down(1, 199), 0);
        assert_eq!(patch_down(0, 199), 199);
        assert_eq!(patch_down(0, 998), 998);
    }

    #[test]
    fn patch_arithmetic_matches_formula_for_every_range() {
        for max in RANGE_TABLE {
            for p in 0..=max {
                assert_eq!(patch_up(p, max), (p + 1) % (max + 1));
                let expect = if p > 0 { p - 1 } else { max };
                assert_eq!(patch_down(p, max), expect);
            }
        }
    }

    #[test]
    fn raw_bytes_are_normalised() {
        let cfg = Configuration::from_raw(0xF3, 7, 0xFE);
        assert_eq!(cfg.channel, 3);
        assert_eq!(cfg.range_index, 2);
        assert!(!cfg.display_zero_based);

        let erased = Configuration::from_raw(0, 0, 0);
        assert_eq!(erased, Configuration::default());
    }

    #[test]
    fn max_patch_follows_table() {
        assert_eq!(max_patch(0), 127);
        assert_eq!(max_patch(4), 998);
        assert_eq!(max_patch(5), 127);
    }
}
