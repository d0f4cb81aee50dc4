//! MIDI Program Change encoding.
//!
//! Wire layout for patch `p` on channel `ch`:
//! ```text
//! [0xB0|ch, 0x00, p / 128]   Bank Select MSB (only when a bank is due)
//! [0xC0|ch, p % 128]         Program Change
//! ```
//!
//! Only the bank MSB (CC 0) is sent, never the LSB (CC 32); some
//! receivers mis-handle the LSB.

use heapless::Vec;

use crate::config::{BankPolicy, MIDI_CC, MIDI_CC_BANK_MSB, MIDI_PC};
use crate::error::Error;
use crate::hal::MidiOut;

/// Longest encoded message: bank select (3) + program change (2).
pub const MAX_MESSAGE_LEN: usize = 5;

pub type MidiBytes = Vec<u8, MAX_MESSAGE_LEN>;

/// Whether `policy` calls for a bank prefix in range `range_index`.
pub fn needs_bank(policy: BankPolicy, range_index: u8) -> bool {
    match policy {
        BankPolicy::Always => true,
        BankPolicy::ExtendedRangesOnly => range_index != 0,
    }
}

/// Encode the bytes that select `patch` (0..=998) on `channel` (0..=15).
pub fn encode(patch: u16, channel: u8, policy: BankPolicy, range_index: u8) -> MidiBytes {
    let channel = channel & 0x0F;
    let mut out = MidiBytes::new();

    // Capacity is exactly the worst case, so the pushes cannot fail.
    if needs_bank(policy, range_index) {
        let bank = (patch / 128) as u8 & 0x7F;
        let _ = out.extend_from_slice(&[MIDI_CC | channel, MIDI_CC_BANK_MSB, bank]);
    }
    let program = (patch % 128) as u8;
    let _ = out.extend_from_slice(&[MIDI_PC | channel, program]);
    out
}

/// Write an encoded message byte by byte.
pub fn transmit<M: MidiOut>(out: &mut M, bytes: &[u8]) -> Result<(), Error> {
    for &b in bytes {
        out.send_byte(b)?;
    }
    Ok(())
}
