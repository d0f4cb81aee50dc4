//! Simulated hardware for driving the controller on the host.
//!
//! Time only moves when the controller samples the UP line, which it
//! does exactly once per scan iteration, so one iteration is one tick.

#![allow(dead_code)]

use footswitch::error::Error;
use footswitch::hal::{ByteStore, Display, Glyph, MidiOut, SwitchInput};
use footswitch::tick::elapsed;
use footswitch::{SwitchRole, TickSource};

/// A switch held closed for ticks `from..to`, relative to the script start.
#[derive(Clone, Copy, Debug)]
pub struct Press {
    pub role: SwitchRole,
    pub from: u32,
    pub to: u32,
}

pub fn press(role: SwitchRole, from: u32, to: u32) -> Press {
    Press { role, from, to }
}

/// UP and DOWN together, as the two-switch build reads MODE.
pub fn chord(from: u32, to: u32) -> [Press; 2] {
    [press(SwitchRole::Up, from, to), press(SwitchRole::Down, from, to)]
}

pub struct ScriptedSwitches<'t> {
    ticks: &'t TickSource,
    origin: u32,
    sampled_at: u32,
    presses: Vec<Press>,
    budget: u32,
}

impl<'t> ScriptedSwitches<'t> {
    /// Panics once more than `budget` ticks have run, so a stuck scan
    /// fails the test instead of hanging it.
    pub fn new(ticks: &'t TickSource, presses: &[Press], budget: u32) -> Self {
        let origin = ticks.now();
        Self {
            ticks,
            origin,
            sampled_at: 0,
            presses: presses.to_vec(),
            budget,
        }
    }

    /// Ticks since the script started.
    pub fn time(&self) -> u32 {
        elapsed(self.ticks.now(), self.origin)
    }

    fn level(&self, role: SwitchRole) -> bool {
        self.presses
            .iter()
            .any(|p| p.role == role && (p.from..p.to).contains(&self.sampled_at))
    }
}

impl SwitchInput for ScriptedSwitches<'_> {
    fn is_closed(&mut self, role: SwitchRole) -> bool {
        if role == SwitchRole::Up {
            self.sampled_at = self.time();
            assert!(
                self.sampled_at <= self.budget,
                "scan still running after {} ticks",
                self.budget
            );
            self.ticks.on_tick();
        }
        self.level(role)
    }
}

/// Remembers what the display was told.
pub struct RecordingDisplay {
    pub cells: [Glyph; 3],
    pub channel_views: Vec<(u8, u8)>,
    pub flags: Vec<bool>,
    /// Intensity changes, consecutive duplicates collapsed.
    pub intensities: Vec<u8>,
    pub clears: u32,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self {
            cells: [Glyph::Blank; 3],
            channel_views: Vec::new(),
            flags: Vec::new(),
            intensities: Vec::new(),
            clears: 0,
        }
    }

    /// The number in the digit cells, if they hold one.
    pub fn number(&self) -> Option<u16> {
        let mut value = None;
        for glyph in self.cells.iter().rev() {
            match (glyph, value) {
                (Glyph::Digit(d), v) => value = Some(v.unwrap_or(0) * 10 + u16::from(*d)),
                (Glyph::Blank, None) => {}
                (Glyph::Blank, Some(_)) => return None,
            }
        }
        value
    }
}

impl Display for RecordingDisplay {
    fn show_digit(&mut self, position: u8, glyph: Glyph) -> Result<(), Error> {
        let cell = self
            .cells
            .get_mut(usize::from(position))
            .ok_or(Error::OutOfRange)?;
        *cell = glyph;
        Ok(())
    }

    fn show_channel_and_range(&mut self, channel: u8, range_index: u8) -> Result<(), Error> {
        self.channel_views.push((channel, range_index));
        Ok(())
    }

    fn show_flag(&mut self, value: bool) -> Result<(), Error> {
        self.flags.push(value);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.cells = [Glyph::Blank; 3];
        self.clears += 1;
        Ok(())
    }

    fn set_intensity(&mut self, level: u8) -> Result<(), Error> {
        if self.intensities.last() != Some(&level) {
            self.intensities.push(level);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMidi {
    pub bytes: Vec<u8>,
}

impl MidiOut for RecordingMidi {
    fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.bytes.push(byte);
        Ok(())
    }
}

/// In-memory settings bytes that insist on the write bracket.
#[derive(Default)]
pub struct RamStore {
    pub bytes: [u8; 8],
    pub unlocked: bool,
    pub writes: Vec<u8>,
    pub brackets: u32,
}

impl RamStore {
    pub fn with_bytes(bytes: [u8; 8]) -> Self {
        Self {
            bytes,
            ..Self::default()
        }
    }
}

impl ByteStore for RamStore {
    fn read_byte(&mut self, offset: u8) -> u8 {
        self.bytes[usize::from(offset)]
    }

    fn write_byte(&mut self, offset: u8, value: u8) -> Result<(), Error> {
        assert!(self.unlocked, "write at {offset} outside bracket");
        self.writes.push(offset);
        self.bytes[usize::from(offset)] = value;
        Ok(())
    }

    fn begin_write(&mut self) {
        assert!(!self.unlocked, "nested write bracket");
        self.unlocked = true;
        self.brackets += 1;
    }

    fn end_write(&mut self) {
        assert!(self.unlocked, "unbalanced end_write");
        self.unlocked = false;
    }
}
