//! Monotonic 1 ms tick shared between the timer interrupt and the main loop.
//!
//! The interrupt calls [`TickSource::on_tick`]; everything else runs in
//! the main context. All shared fields sit in one `Copy` struct behind a
//! critical-section mutex, so a main-context read never observes a
//! half-updated counter.
//!
//! Elapsed time is always `now.wrapping_sub(reference)`; the counter
//! wraps after ~49 days and a single wrap is harmless.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::{FLASH_PERIOD_MS, LED_FLASH_LEN_MS, MAX_DISPLAY_INTENSITY, MIN_DISPLAY_INTENSITY};

/// Milliseconds between `since` and `now`, tolerant of one wraparound.
#[inline]
pub fn elapsed(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TickState {
    now: u32,
    /// Countdown for [`TickSource::delay_ms`].
    delay: u16,
    flashing: bool,
    flash_ticks: u16,
    intensity: u8,
    led_ticks: u16,
    led_on: bool,
}

impl TickState {
    const fn starting_at(now: u32) -> Self {
        Self {
            now,
            delay: 0,
            flashing: false,
            flash_ticks: 0,
            intensity: MAX_DISPLAY_INTENSITY,
            led_ticks: 0,
            led_on: false,
        }
    }
}

/// Tick counter plus the few values the interrupt animates.
pub struct TickSource {
    state: Mutex<CriticalSectionRawMutex, Cell<TickState>>,
}

impl TickSource {
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// A source whose counter starts at `now` (used to exercise wraparound).
    pub const fn starting_at(now: u32) -> Self {
        Self {
            state: Mutex::new(Cell::new(TickState::starting_at(now))),
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut TickState) -> R) -> R {
        self.state.lock(|cell| {
            let mut s = cell.get();
            let r = f(&mut s);
            cell.set(s);
            r
        })
    }

    fn read(&self) -> TickState {
        self.state.lock(|cell| cell.get())
    }

    /// Interrupt body. Returns the level the indicator LED should have.
    pub fn on_tick(&self) -> bool {
        self.update(|s| {
            s.now = s.now.wrapping_add(1);
            s.delay = s.delay.saturating_sub(1);

            if s.flashing {
                if s.flash_ticks == 0 {
                    if s.intensity == MIN_DISPLAY_INTENSITY {
                        s.intensity = MAX_DISPLAY_INTENSITY;
                        s.led_on = false;
                    } else {
                        s.intensity = MIN_DISPLAY_INTENSITY;
                        s.led_on = true;
                    }
                    s.flash_ticks = FLASH_PERIOD_MS;
                } else {
                    s.flash_ticks -= 1;
                }
            } else if s.led_ticks == 0 {
                s.led_on = false;
            } else {
                s.led_ticks -= 1;
            }

            s.led_on
        })
    }

    pub fn now(&self) -> u32 {
        self.read().now
    }

    /// Block for `ms` ticks. Needs the tick interrupt running.
    pub fn delay_ms(&self, ms: u16) {
        self.update(|s| s.delay = ms);
        while self.read().delay != 0 {
            core::hint::spin_loop();
        }
    }

    pub fn start_flash(&self) {
        self.update(|s| {
            s.flash_ticks = FLASH_PERIOD_MS;
            s.flashing = true;
        });
    }

    /// Stop flashing. The caller restores the display to full intensity.
    pub fn stop_flash(&self) {
        self.update(|s| {
            s.flashing = false;
            s.intensity = MAX_DISPLAY_INTENSITY;
        });
    }

    pub fn is_flashing(&self) -> bool {
        self.read().flashing
    }

    /// Current flash intensity, or `None` when not flashing.
    pub fn flash_intensity(&self) -> Option<u8> {
        let s = self.read();
        s.flashing.then_some(s.intensity)
    }

    /// Light the indicator LED for [`LED_FLASH_LEN_MS`].
    pub fn pulse_led(&self) {
        self.update(|s| {
            s.led_on = true;
            s.led_ticks = LED_FLASH_LEN_MS;
        });
    }

    pub fn led_on(&self) -> bool {
        self.read().led_on
    }
}

impl Default for TickSource {
    fn default() -> Self {
        Self::new()
    }
}
