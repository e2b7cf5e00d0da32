//! General purpose timer.
//!
//! While GLBCR.WPEN is set, writes to CNT, MOD and CHVALUE are
//! ignored. Interrupt enables and status stay writable.

use bitfield_struct::bitfield;

use crate::register::{peripheral, register};

peripheral!(
    /// The TIM register block.
    Tim
);

/// 0x00 Global control.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Glbcr {
    pub cnt_en: bool,
    #[bits(3)]
    pub clk_src: u8,
    /// Counter clock divided by `2^prescaler`.
    #[bits(4)]
    pub prescaler: u8,
    /// Write protect enable.
    pub wp_en: bool,
    #[bits(23)]
    __: u32,
}

/// Mask of [Glbcr::wp_en].
pub const GLBCR_WP_EN: u32 = 1 << 8;

register!(Glbcr: Tim, 0x00);

macro_rules! counter_value {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[cfg_attr(not(feature = "defmt"), bitfield(u32))]
        #[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
        #[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            pub value: u16,
            __: u16,
        }
    };
}

counter_value!(
    /// 0x04 Counter.
    Cnt
);
register!(Cnt: Tim, 0x04);

counter_value!(
    /// 0x08 Modulo, the last count before overflow.
    Mod
);
register!(Mod: Tim, 0x08);

macro_rules! interrupt_bits {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[cfg_attr(not(feature = "defmt"), bitfield(u32))]
        #[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
        #[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            /// One bit per channel.
            pub channels: u8,
            pub overflow: bool,
            pub reload: bool,
            pub fault: bool,
            #[bits(21)]
            __: u32,
        }
    };
}

interrupt_bits!(
    /// 0x0C Interrupt enables.
    Ier
);
register!(Ier: Tim, 0x0c);

interrupt_bits!(
    /// 0x10 Status, write 1 to clear.
    Status
);
register!(Status: Tim, 0x10, w1c = 0x7ff);

counter_value!(
    /// 0x20 + 4n Channel compare or capture value.
    ChValue
);
register!(ChValue: Tim, 0x20, count = 8);
