//! Footswitch debouncing and autorepeat.
//!
//! Every scan iteration samples the lines and steps one small state
//! machine per switch:
//!
//! ```text
//! Released ──closed──▶ PressedPending ──closed > 50 ms──▶ PressedActioned
//!    ▲                        │                                  │
//!    └────────── open ────────┴──────────────── open ────────────┘
//! ```
//!
//! Entering `PressedActioned` emits the switch's role once. A switch left
//! in `PressedActioned` emits again only when the caller asked for
//! autorepeat: every 300 ms at first, every 60 ms once held past 1 s.
//!
//! With the two-switch layout there is no MODE line; UP and DOWN closed
//! together *are* MODE, and in that case neither UP nor DOWN is stepped
//! on its own, so a chord never leaks out as a stray UP or DOWN.

use crate::config::{
    SwitchLayout, AUTOREPEAT_AFTER_MS, AUTOREPEAT_FAST_AFTER_MS, AUTOREPEAT_FAST_MS,
    DEBOUNCE_THRESHOLD_MS,
};
use crate::fmt::trace;
use crate::hal::SwitchInput;
use crate::tick::elapsed;

/// Logical footswitch roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchRole {
    Up = 0,
    Down = 1,
    Mode = 2,
}

impl SwitchRole {
    /// Sampling and processing order.
    pub const ALL: [SwitchRole; 3] = [SwitchRole::Up, SwitchRole::Down, SwitchRole::Mode];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchState {
    Released,
    /// Closed, debounce timer running, nothing emitted yet.
    PressedPending,
    /// Emitted for this press; only autorepeat fires again.
    PressedActioned,
}

/// Whether a held switch keeps firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Autorepeat {
    Off,
    On,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Switch {
    state: SwitchState,
    /// Tick at which the continuous press began.
    pressed_at: u32,
    /// Tick of the last emitted event (or of the press, while pending).
    actioned_at: u32,
    repeat_period: u32,
}

impl Switch {
    const fn released() -> Self {
        Self {
            state: SwitchState::Released,
            pressed_at: 0,
            actioned_at: 0,
            repeat_period: AUTOREPEAT_AFTER_MS,
        }
    }

    fn release(&mut self) {
        self.state = SwitchState::Released;
        self.repeat_period = AUTOREPEAT_AFTER_MS;
    }

    /// Step a closed switch. Returns `true` when it should emit.
    fn step_closed(&mut self, now: u32, autorepeat: Autorepeat) -> bool {
        match self.state {
            SwitchState::Released => {
                self.state = SwitchState::PressedPending;
                self.pressed_at = now;
                self.actioned_at = now;
                false
            }
            SwitchState::PressedPending => {
                if elapsed(now, self.actioned_at) > DEBOUNCE_THRESHOLD_MS {
                    self.state = SwitchState::PressedActioned;
                    self.actioned_at = now;
                    true
                } else {
                    false
                }
            }
            SwitchState::PressedActioned => {
                if autorepeat == Autorepeat::Off {
                    return false;
                }
                if elapsed(now, self.pressed_at) > AUTOREPEAT_FAST_AFTER_MS {
                    self.repeat_period = AUTOREPEAT_FAST_MS;
                }
                if elapsed(now, self.actioned_at) > self.repeat_period {
                    self.actioned_at = now;
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Per-switch debounce state for the three roles.
#[derive(Clone, Debug)]
pub struct Debouncer {
    layout: SwitchLayout,
    switches: [Switch; 3],
}

impl Debouncer {
    pub const fn new(layout: SwitchLayout) -> Self {
        Self {
            layout,
            switches: [Switch::released(); 3],
        }
    }

    pub fn state(&self, role: SwitchRole) -> SwitchState {
        self.switches[role as usize].state
    }

    /// One scan iteration at tick `now`.
    ///
    /// Lines are sampled in [`SwitchRole::ALL`] order; the first switch
    /// that emits ends the iteration and the rest are left untouched.
    pub fn poll<I: SwitchInput>(
        &mut self,
        input: &mut I,
        now: u32,
        autorepeat: Autorepeat,
    ) -> Option<SwitchRole> {
        let closed = self.sample(input);

        if self.layout == SwitchLayout::TwoSwitch && closed[SwitchRole::Mode as usize] {
            // Chord: forget any half-debounced UP/DOWN so only MODE can fire.
            self.switches[SwitchRole::Up as usize].release();
            self.switches[SwitchRole::Down as usize].release();
            let mode = &mut self.switches[SwitchRole::Mode as usize];
            return mode.step_closed(now, autorepeat).then_some(SwitchRole::Mode);
        }

        for role in SwitchRole::ALL {
            let switch = &mut self.switches[role as usize];
            if !closed[role as usize] {
                switch.release();
                continue;
            }
            if switch.step_closed(now, autorepeat) {
                trace!("switch {} fired at {}", role, now);
                return Some(role);
            }
        }
        None
    }

    fn sample<I: SwitchInput>(&self, input: &mut I) -> [bool; 3] {
        let up = input.is_closed(SwitchRole::Up);
        let down = input.is_closed(SwitchRole::Down);
        let mode = match self.layout {
            SwitchLayout::TwoSwitch => up && down,
            SwitchLayout::ThreeSwitch => input.is_closed(SwitchRole::Mode),
        };
        [up, down, mode]
    }
}
