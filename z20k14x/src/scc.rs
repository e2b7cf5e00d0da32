//! System Clock Controller.
//!
//! Every SCC register carries its own LOCK bit (bit 23) and unlocks
//! with [KEY] written to the whole word. Bits 31:24 are the write-only
//! key field and read as 0.

use bitfield_struct::bitfield;

use crate::register::{lockable, peripheral, register};

peripheral!(
    /// The SCC register block.
    Scc
);

/// Unlock key shared by every SCC register.
pub const KEY: u32 = 0x5b00_0000;

/// Mask of the LOCK bit in every SCC register.
pub const LOCK: u32 = 1 << 23;

/// 0x00 System clock configuration.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cfg {
    /// Core clock divider, minus one.
    #[bits(4)]
    pub sys_div: u8,
    /// Bus clock divider, minus one.
    #[bits(4)]
    pub bus_div: u8,
    /// Slow clock divider, minus one.
    #[bits(4)]
    pub slow_div: u8,
    #[bits(4)]
    __: u8,
    /// System clock source, see [SysSrc].
    #[bits(2)]
    pub sys_src: u8,
    #[bits(5)]
    __: u8,
    /// Register lock.
    pub lock: bool,
    /// Unlock key, write only.
    #[bits(8)]
    pub key: u8,
}

register!(Cfg: Scc, 0x00);
lockable!(Cfg, key = KEY, lock = LOCK);

/// 0x04 System clock status.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Status {
    #[bits(16)]
    __: u16,
    /// System clock source actually in use, see [SysSrc].
    #[bits(2, access = RO)]
    pub sys_src: u8,
    #[bits(14)]
    __: u16,
}

register!(Status: Scc, 0x04);

/// System clock source selection values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SysSrc {
    /// Internal fast oscillator.
    Firc = 0,
    /// External oscillator.
    Osc = 1,
    /// System PLL.
    Spll = 2,
}

impl SysSrc {
    pub const fn from_bits(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Firc),
            1 => Some(Self::Osc),
            2 => Some(Self::Spll),
            _ => None,
        }
    }
}

/// 0x10 + 4n Clock source control and status, one per [Source].
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceCs {
    /// Source enable.
    pub en: bool,
    /// Keep running in stop mode.
    pub stop_en: bool,
    #[bits(14)]
    __: u16,
    /// Clock monitor enable.
    pub cm_en: bool,
    /// On loss of clock: reset (1) or interrupt (0).
    pub cm_reset: bool,
    #[bits(2)]
    __: u8,
    /// Loss of clock flag, write 1 to clear.
    pub loc: bool,
    /// Source is stable.
    #[bits(1, access = RO)]
    pub ready: bool,
    __: bool,
    /// Register lock.
    pub lock: bool,
    /// Unlock key, write only.
    #[bits(8)]
    pub key: u8,
}

/// Mask of [SourceCs::loc].
pub const SOURCE_LOC: u32 = 1 << 20;

register!(SourceCs: Scc, 0x10, count = 5, w1c = SOURCE_LOC);
lockable!(SourceCs, key = KEY, lock = LOCK);

/// Index of each clock source in the [SourceCs] array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Source {
    /// Internal fast oscillator.
    Firc = 0,
    /// Internal slow oscillator.
    Sirc = 1,
    /// External oscillator.
    Osc = 2,
    /// External 32.768kHz oscillator.
    Sosc = 3,
    /// System PLL.
    Spll = 4,
}

/// 0x30 System PLL configuration.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpllCfg {
    /// Reference pre-divider, minus one.
    #[bits(4)]
    pub prediv: u8,
    #[bits(4)]
    __: u8,
    /// Feedback multiplier.
    #[bits(8)]
    pub mult: u8,
    /// Output post-divider, minus one.
    #[bits(4)]
    pub postdiv: u8,
    #[bits(3)]
    __: u8,
    /// Register lock.
    pub lock: bool,
    /// Unlock key, write only.
    #[bits(8)]
    pub key: u8,
}

register!(SpllCfg: Scc, 0x30);
lockable!(SpllCfg, key = KEY, lock = LOCK);
