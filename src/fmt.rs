//! Logging macros.
//!
//! With the `defmt` feature these are defmt's own; without it they
//! swallow their arguments.
#![allow(unused_imports, unused_macros)]

#[cfg(feature = "defmt")]
pub(crate) use defmt::{debug, error, info, trace, warn};

// Define simple logging macros when defmt is not available
#[cfg(not(feature = "defmt"))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn_ {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "defmt"))]
macro_rules! error {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "defmt"))]
pub(crate) use {debug, error, info, trace};
#[cfg(not(feature = "defmt"))]
pub(crate) use warn_ as warn;
