//! Motor control PWM, with two counters and four fault inputs.
//!
//! While GLBCR.WPEN is set, writes to MOD and CHVALUE are ignored.

use bitfield_struct::bitfield;

use crate::register::{peripheral, register};

peripheral!(
    /// The MCPWM register block.
    Mcpwm
);

/// 0x00 Global control.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Glbcr {
    pub cnt0_en: bool,
    pub cnt1_en: bool,
    #[bits(6)]
    __: u8,
    /// Write protect enable.
    pub wp_en: bool,
    #[bits(23)]
    __: u32,
}

/// Mask of [Glbcr::wp_en].
pub const GLBCR_WP_EN: u32 = 1 << 8;

register!(Glbcr: Mcpwm, 0x00);

/// 0x08 + 4n Counter modulo, one per counter.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mod {
    pub value: u16,
    __: u16,
}

register!(Mod: Mcpwm, 0x08, count = 2);

macro_rules! interrupt_bits {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[cfg_attr(not(feature = "defmt"), bitfield(u32))]
        #[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
        #[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            /// One bit per channel.
            pub channels: u8,
            pub cnt0_overflow: bool,
            pub cnt1_overflow: bool,
            /// One bit per fault input.
            #[bits(4)]
            pub faults: u8,
            #[bits(18)]
            __: u32,
        }
    };
}

interrupt_bits!(
    /// 0x10 Interrupt enables.
    Ier
);
register!(Ier: Mcpwm, 0x10);

interrupt_bits!(
    /// 0x14 Status, write 1 to clear.
    Status
);
register!(Status: Mcpwm, 0x14, w1c = 0x3fff);

/// 0x20 + 4n Channel compare value.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChValue {
    pub value: u16,
    __: u16,
}

register!(ChValue: Mcpwm, 0x20, count = 8);
