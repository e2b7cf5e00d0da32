#![no_std]

//! Drivers for the Z20K14xM microcontroller family.
//!
//! Every driver owns its register blocks, and reaches them through a
//! [pac::Bus]. On the device that is [pac::Mmio]. The register
//! simulator in `z20k14x`'s `mock` feature stands in for it in tests.
//!
//! Three pieces are shared by all drivers:
//!
//!  * [lock]: the unlock, write, relock bracket for registers with a
//!    LOCK bit.
//!  * [interrupt]: per-peripheral callback tables and the one interrupt
//!    service routine they all use.
//!  * [flash]: the single-command flash engine, which depends on both.

#[cfg(test)]
extern crate std;

/// Peripheral access crate, providing raw, unconstrained access to
/// peripherals.
pub use z20k14x as pac;

#[macro_use]
mod fmt;

pub mod clock;
pub mod flash;
pub mod gpio;
pub mod interrupt;
pub mod lock;
pub mod rtc;
pub mod scm;
pub mod sysctrl;
pub mod time;
pub mod timer;
pub mod uart;
