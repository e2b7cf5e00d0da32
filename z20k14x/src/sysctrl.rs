//! System control: per-module clock, reset, and access control (PARCC).

use bitfield_struct::bitfield;

use crate::register::{lockable, peripheral, register};

peripheral!(
    /// The SYSCTRL register block.
    Sysctrl
);

/// Unlock key for every [Parcc] register.
pub const KEY: u32 = 0x5b00_0000;

/// 0x00 Reset cause, sticky until the next power-on reset.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResetStatus {
    #[bits(1, access = RO)]
    pub por: bool,
    #[bits(1, access = RO)]
    pub lvd: bool,
    #[bits(1, access = RO)]
    pub pin: bool,
    #[bits(1, access = RO)]
    pub wdog: bool,
    #[bits(1, access = RO)]
    pub clock_loss: bool,
    #[bits(1, access = RO)]
    pub lockup: bool,
    #[bits(1, access = RO)]
    pub software: bool,
    #[bits(25)]
    __: u32,
}

register!(ResetStatus: Sysctrl, 0x00);

/// 0x100 + 4n Peripheral access, reset, and clock control, one per module.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Parcc {
    /// Module clock enable.
    pub clk_en: bool,
    #[bits(3)]
    __: u8,
    /// Functional clock source.
    #[bits(3)]
    pub clk_mux: u8,
    __: bool,
    /// Functional clock divider, minus one.
    #[bits(4)]
    pub clk_div: u8,
    #[bits(4)]
    __: u8,
    /// Module reset release: 0 holds the module in reset.
    pub prstb: bool,
    #[bits(3)]
    __: u8,
    /// Peripheral write lock: module registers ignore writes.
    pub pwlk: bool,
    /// Module registers accept supervisor-mode accesses only.
    pub psup: bool,
    __: bool,
    /// Register lock.
    pub lock: bool,
    /// Unlock key, write only.
    #[bits(8)]
    pub key: u8,
}

register!(Parcc: Sysctrl, 0x100, count = 64);
lockable!(Parcc, key = KEY, lock = 1 << 23);
