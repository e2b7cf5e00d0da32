//! Pin control, pin interrupts and GPIO data.
//!
//! A [Port] owns the PORT block (per-pin configuration, locked one PCR
//! at a time) and the GPIO block (data) of one port. Individual pins
//! are borrowed from it as [Pin]s, which implement the embedded-hal
//! digital traits.

use crate::pac::{self, Interrupt};

mod hal1;

mod pin;
pub use pin::*;

mod port;
pub use port::*;

/// GPIO error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The pin number is past the last pin of the port.
    InvalidPin,
    /// The alternate function does not exist.
    InvalidFunction,
}

impl core::fmt::Display for Error {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "GPIO Error {:?}", self)
    }
}

/// One of the five pin ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortId {
    A,
    B,
    C,
    D,
    E,
}

impl PortId {
    pub const ALL: [PortId; 5] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    /// Base addresses of this port's PORT and GPIO blocks.
    #[inline(always)]
    pub const fn bases(self) -> (u32, u32) {
        (
            pac::memory_map::PORT[self as usize],
            pac::memory_map::GPIO[self as usize],
        )
    }

    /// The interrupt line shared by this port's pins.
    #[inline(always)]
    pub const fn interrupt(self) -> Interrupt {
        match self {
            Self::A => Interrupt::PortA,
            Self::B => Interrupt::PortB,
            Self::C => Interrupt::PortC,
            Self::D => Interrupt::PortD,
            Self::E => Interrupt::PortE,
        }
    }
}

/// Digital pin state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    Low = 0,
    High = 1,
}

impl From<bool> for PinState {
    #[inline(always)]
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl core::ops::Not for PinState {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        match self {
            Self::High => Self::Low,
            Self::Low => Self::High,
        }
    }
}

impl PinState {
    #[inline(always)]
    pub fn is_high(&self) -> bool {
        *self == Self::High
    }

    #[inline(always)]
    pub fn is_low(&self) -> bool {
        *self == Self::Low
    }
}

/// Pin direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input,
    Output,
}

/// Internal pull resistor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    #[default]
    Floating,
    Down,
    Up,
}

/// Electrical configuration of a pin, kept in its PCR.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    pub pull: Pull,
    pub slow_slew: bool,
    pub passive_filter: bool,
    pub open_drain: bool,
    pub high_drive: bool,
}
