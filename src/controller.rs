//! Operating modes of the footswitch.
//!
//! ```text
//!                 ┌── DOWN held ──▶ DisplayConfig ──┐
//! BootConfigCheck ┼── UP/MODE held ─▶ MidiConfig ───┼─ save ─▶ Operational ◀──┐
//!                 └── nothing within 100 ms ────────┘              │ MODE     │ MODE
//!                                                                  ▼          │
//!                                                                Scroll ──────┘
//! ```
//!
//! Every wait is a blocking [`Controller::scan`]; there is no event queue.
//! In `Operational` each UP/DOWN press transmits at once. In `Scroll` the
//! display flashes and UP/DOWN edit a working copy that is transmitted
//! once, when MODE commits it.

use crate::config::{
    Features, BOOT_CHECK_TIMEOUT_MS, CONFIG_TIMEOUT_MS, DISPLAY_DIGITS, MAX_DISPLAY_INTENSITY,
};
use crate::error::Error;
use crate::fmt::{debug, info, warn};
use crate::hal::{ByteStore, Display, Glyph, MidiOut, SwitchInput};
use crate::midi;
use crate::settings::{patch_down, patch_up, Configuration};
use crate::store::ConfigStore;
use crate::switch::{Autorepeat, Debouncer, SwitchRole};
use crate::tick::{elapsed, TickSource};

/// Where the state machine currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    BootConfigCheck,
    MidiConfig,
    DisplayConfig,
    Operational,
    Scroll,
}

/// Result of a blocking scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanOutcome {
    Pressed(SwitchRole),
    Timeout,
}

fn check_display(result: Result<(), Error>) {
    if let Err(e) = result {
        warn!("display: {}", e);
    }
}

/// Digit cells for `number`, position 0 first.
///
/// Leading zeros are blank but the units cell always shows a digit.
pub fn number_glyphs(mut number: u16) -> [Glyph; DISPLAY_DIGITS as usize] {
    let mut cells = [Glyph::Blank; DISPLAY_DIGITS as usize];
    for (pos, cell) in cells.iter_mut().enumerate() {
        if number > 0 {
            *cell = Glyph::Digit((number % 10) as u8);
            number /= 10;
        } else if pos == 0 {
            *cell = Glyph::Digit(0);
        }
    }
    cells
}

/// The footswitch: switches in, MIDI and display out, settings persisted.
pub struct Controller<'t, I, D, M, S> {
    ticks: &'t TickSource,
    features: Features,
    debouncer: Debouncer,
    switches: I,
    display: D,
    midi: M,
    store: ConfigStore<S>,
    config: Configuration,
    patch: u16,
    mode: Mode,
}

impl<'t, I, D, M, S> Controller<'t, I, D, M, S>
where
    I: SwitchInput,
    D: Display,
    M: MidiOut,
    S: ByteStore,
{
    pub fn new(
        ticks: &'t TickSource,
        features: Features,
        switches: I,
        display: D,
        midi: M,
        store: S,
    ) -> Self {
        Self {
            ticks,
            features,
            debouncer: Debouncer::new(features.layout),
            switches,
            display,
            midi,
            store: ConfigStore::new(store),
            config: Configuration::default(),
            patch: 0,
            mode: Mode::BootConfigCheck,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// The committed (last transmitted or restored) patch.
    pub fn patch(&self) -> u16 {
        self.patch
    }

    pub fn into_parts(self) -> (I, D, M, S) {
        (self.switches, self.display, self.midi, self.store.into_inner())
    }

    /// Power-up sequence followed by the operational loop.
    pub fn run(&mut self) -> ! {
        self.boot();
        loop {
            self.step();
        }
    }

    /// Block until a switch fires or `timeout` ms pass.
    ///
    /// While the display is flashing, the current flash intensity is
    /// pushed to it on every iteration.
    pub fn scan(&mut self, autorepeat: Autorepeat, timeout: Option<u32>) -> ScanOutcome {
        let start = self.ticks.now();
        loop {
            let now = self.ticks.now();
            if let Some(limit) = timeout {
                if elapsed(now, start) > limit {
                    return ScanOutcome::Timeout;
                }
            }

            if let Some(level) = self.ticks.flash_intensity() {
                check_display(self.display.set_intensity(level));
            }

            if let Some(role) = self.debouncer.poll(&mut self.switches, now, autorepeat) {
                return ScanOutcome::Pressed(role);
            }
        }
    }

    /// Load settings, offer the configuration modes, show the start patch.
    ///
    /// Ends in [`Mode::Operational`] with the patch displayed but not sent.
    pub fn boot(&mut self) {
        self.mode = Mode::BootConfigCheck;
        self.config = self.store.load();

        match self.scan(Autorepeat::Off, Some(BOOT_CHECK_TIMEOUT_MS)) {
            ScanOutcome::Timeout => {
                debug!("no switch held at power-up");
            }
            ScanOutcome::Pressed(role) => {
                info!("switch {} held at power-up, configuring", role);
                self.start_flash();
                if role == SwitchRole::Down {
                    self.display_config();
                } else {
                    self.midi_config();
                }
                self.stop_flash();
                self.store.save_if_changed(&self.config);
            }
        }

        if self.features.restore_last_patch {
            self.patch = self.store.load_last_patch(self.config.max_patch());
        }

        self.mode = Mode::Operational;
        self.show_patch(self.patch);
        info!("operational at patch {}", self.patch);
    }

    /// Handle one press in [`Mode::Operational`].
    ///
    /// MODE runs a complete scroll session before returning.
    pub fn step(&mut self) {
        let max = self.config.max_patch();
        match self.scan(Autorepeat::Off, None) {
            ScanOutcome::Pressed(SwitchRole::Up) => {
                self.patch = patch_up(self.patch, max);
                self.send_patch();
            }
            ScanOutcome::Pressed(SwitchRole::Down) => {
                self.patch = patch_down(self.patch, max);
                self.send_patch();
            }
            ScanOutcome::Pressed(SwitchRole::Mode) => self.scroll(),
            ScanOutcome::Timeout => {}
        }
    }

    fn midi_config(&mut self) {
        self.mode = Mode::MidiConfig;
        self.show_channel();

        loop {
            match self.scan(Autorepeat::Off, Some(CONFIG_TIMEOUT_MS)) {
                ScanOutcome::Pressed(SwitchRole::Up) => self.config.next_channel(),
                ScanOutcome::Pressed(SwitchRole::Down) => self.config.prev_channel(),
                ScanOutcome::Pressed(SwitchRole::Mode) => self.config.next_range(),
                ScanOutcome::Timeout => return,
            }
            self.show_channel();
        }
    }

    fn display_config(&mut self) {
        self.mode = Mode::DisplayConfig;
        self.show_display_base();

        loop {
            match self.scan(Autorepeat::Off, Some(CONFIG_TIMEOUT_MS)) {
                ScanOutcome::Pressed(SwitchRole::Up | SwitchRole::Down) => {
                    self.config.toggle_display_base();
                    self.show_display_base();
                }
                ScanOutcome::Pressed(SwitchRole::Mode) | ScanOutcome::Timeout => return,
            }
        }
    }

    fn scroll(&mut self) {
        self.mode = Mode::Scroll;
        let max = self.config.max_patch();
        let mut working = self.patch;
        self.start_flash();

        loop {
            match self.scan(Autorepeat::On, None) {
                ScanOutcome::Pressed(SwitchRole::Up) => working = patch_up(working, max),
                ScanOutcome::Pressed(SwitchRole::Down) => working = patch_down(working, max),
                ScanOutcome::Pressed(SwitchRole::Mode) => break,
                ScanOutcome::Timeout => continue,
            }
            self.show_patch(working);
        }

        self.patch = working;
        self.send_patch();
        self.stop_flash();
        self.mode = Mode::Operational;
    }

    /// Transmit the committed patch, remember it if configured, show it.
    fn send_patch(&mut self) {
        let bytes = midi::encode(
            self.patch,
            self.config.channel,
            self.features.bank,
            self.config.range_index,
        );
        if self.features.external_led {
            self.ticks.pulse_led();
        }
        if let Err(e) = midi::transmit(&mut self.midi, &bytes) {
            warn!("midi transmit of patch {} failed: {}", self.patch, e);
        }
        if self.features.restore_last_patch {
            self.store.save_last_patch(self.patch);
        }
        self.show_patch(self.patch);
    }

    fn show_patch(&mut self, patch: u16) {
        let shown = if self.config.display_zero_based {
            patch
        } else {
            patch + 1
        };
        for (pos, glyph) in number_glyphs(shown).into_iter().enumerate() {
            check_display(self.display.show_digit(pos as u8, glyph));
        }
    }

    fn show_channel(&mut self) {
        check_display(self.display.clear());
        check_display(
            self.display
                .show_channel_and_range(self.config.channel, self.config.range_index),
        );
    }

    /// Shows the number the first patch is displayed as: 0 or 1.
    fn show_display_base(&mut self) {
        check_display(self.display.show_flag(!self.config.display_zero_based));
    }

    fn start_flash(&mut self) {
        self.ticks.start_flash();
    }

    fn stop_flash(&mut self) {
        self.ticks.stop_flash();
        check_display(self.display.set_intensity(MAX_DISPLAY_INTENSITY));
    }
}
