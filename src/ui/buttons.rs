//! GPIO footswitch input.
//!
//! Footswitches are active-low with internal pull-up:
//!   - UP   - next patch
//!   - DOWN - previous patch
//!   - MODE - scroll / commit (three-switch build; the two-switch build
//!     derives MODE from UP+DOWN in the debouncer)
//!
//! Levels are sampled raw; debouncing happens in [`crate::switch`].

use embassy_nrf::gpio::{AnyPin, Input, Pull};

use crate::hal::SwitchInput;
use crate::switch::SwitchRole;

pub struct Footswitches {
    up: Input<'static>,
    down: Input<'static>,
    mode: Option<Input<'static>>,
}

impl Footswitches {
    /// Configure the switch pins. Pass `None` for MODE on two-switch hardware.
    pub fn new(up: AnyPin, down: AnyPin, mode: Option<AnyPin>) -> Self {
        Self {
            up: Input::new(up, Pull::Up),
            down: Input::new(down, Pull::Up),
            mode: mode.map(|pin| Input::new(pin, Pull::Up)),
        }
    }
}

impl SwitchInput for Footswitches {
    fn is_closed(&mut self, role: SwitchRole) -> bool {
        match role {
            SwitchRole::Up => self.up.is_low(),
            SwitchRole::Down => self.down.is_low(),
            SwitchRole::Mode => self.mode.as_ref().is_some_and(|pin| pin.is_low()),
        }
    }
}
