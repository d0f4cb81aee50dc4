//! MIDI program-change footswitch.
//!
//! Scans two or three footswitches, debounces them, and turns presses
//! into MIDI Program Change (plus Bank Select) messages, with a
//! scroll-then-commit mode and power-up configuration of channel,
//! patch range and display numbering.
//!
//! Everything except `ui::buttons` / `ui::display` is plain `no_std`
//! logic that runs on the host: `cargo test`.
//!
//! The embedded binary (`src/main.rs`, feature `embedded`) wires these
//! modules to the nRF52840.

#![cfg_attr(not(test), no_std)]
// Bindings that only feed a log line go unused without defmt.
#![cfg_attr(not(feature = "defmt"), allow(unused_variables))]

mod fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Core decision engine
// ═══════════════════════════════════════════════════════════════════════════

pub mod config;
pub mod controller;
pub mod error;
pub mod hal;
pub mod midi;
pub mod settings;
pub mod store;
pub mod switch;
pub mod tick;

// ═══════════════════════════════════════════════════════════════════════════
// Hardware adapters
// ═══════════════════════════════════════════════════════════════════════════

pub mod storage;
pub mod ui;

pub use config::Features;
pub use controller::{Controller, Mode, ScanOutcome};
pub use error::Error;
pub use settings::Configuration;
pub use switch::SwitchRole;
pub use tick::TickSource;
