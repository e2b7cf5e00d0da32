//! Power Management Unit.
//!
//! Unlike SCC, the PMU keeps its LOCK bit in a dedicated [Lock]
//! register, which guards writes to every other PMU register.

use bitfield_struct::bitfield;

use crate::register::{lockable, peripheral, register};

peripheral!(
    /// The PMU register block.
    Pmu
);

/// Unlock key for [Lock].
pub const KEY: u32 = 0x9473_0000;

/// 0x00 PMU register lock.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lock {
    /// Lock for every PMU register.
    pub lock: bool,
    #[bits(15)]
    __: u16,
    /// Unlock key, write only.
    pub key: u16,
}

register!(Lock: Pmu, 0x00);
lockable!(Lock, key = KEY, lock = 1);

/// 0x04 Control and status.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Csr {
    /// Low voltage detect enable.
    pub lvd_en: bool,
    /// On low voltage detect: reset (1) or flag only (0).
    pub lvd_reset: bool,
    /// Low voltage warning enable.
    pub lvw_en: bool,
    #[bits(5)]
    __: u8,
    /// Write 1 to release pad isolation after standby wakeup.
    pub iso_clr: bool,
    #[bits(7)]
    __: u8,
    /// Low voltage detected.
    #[bits(1, access = RO)]
    pub lvd_flag: bool,
    /// Low voltage warning.
    #[bits(1, access = RO)]
    pub lvw_flag: bool,
    #[bits(14)]
    __: u16,
}

register!(Csr: Pmu, 0x04);
