//! Pin control (PORT).
//!
//! Each pin has its own PCR with its own LOCK bit. A locked PCR also
//! ignores writes to its bit in [IrqFlg].

use bitfield_struct::bitfield;

use crate::register::{lockable, peripheral, register, word_register};

peripheral!(
    /// The PORT register block.
    Port
);

/// Unlock key for every [Pcr].
pub const KEY: u32 = 0x5b00_0000;

/// 0x00 + 4n Pin control, one per pin.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pcr {
    /// 1 pull up, 0 pull down.
    pub pull_select: bool,
    pub pull_enable: bool,
    #[bits(2)]
    __: u8,
    /// Slow slew rate.
    pub slew_rate: bool,
    pub passive_filter: bool,
    pub open_drain: bool,
    /// High drive strength.
    pub drive_strength: bool,
    /// Pin function, 1 is GPIO.
    #[bits(3)]
    pub mux: u8,
    #[bits(5)]
    __: u8,
    /// Interrupt and DMA request configuration, see [IrqConfig].
    #[bits(4)]
    pub irq_config: u8,
    #[bits(3)]
    __: u8,
    /// Register lock.
    pub lock: bool,
    /// Unlock key, write only.
    #[bits(8)]
    pub key: u8,
}

register!(Pcr: Port, 0x00, count = 32);
lockable!(Pcr, key = KEY, lock = 1 << 23);

/// Values of [Pcr::irq_config].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqConfig {
    Disabled = 0,
    DmaRising = 1,
    DmaFalling = 2,
    DmaEither = 3,
    Low = 8,
    Rising = 9,
    Falling = 10,
    Either = 11,
    High = 12,
}

impl IrqConfig {
    pub const fn from_bits(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::Disabled,
            1 => Self::DmaRising,
            2 => Self::DmaFalling,
            3 => Self::DmaEither,
            8 => Self::Low,
            9 => Self::Rising,
            10 => Self::Falling,
            11 => Self::Either,
            12 => Self::High,
            _ => return None,
        })
    }

    /// Does this configuration raise an interrupt, rather than a DMA
    /// request?
    pub const fn is_interrupt(self) -> bool {
        self as u8 >= 8
    }
}

word_register!(
    /// 0xA0 Pin interrupt flags, one bit per pin, write 1 to clear.
    IrqFlg,
    pins
);
register!(IrqFlg: Port, 0xa0, w1c = 0xffff_ffff);
