//! System configuration module: code cache and FPU exception flags.

use bitfield_struct::bitfield;

use crate::register::{peripheral, register};

peripheral!(
    /// The SCM register block.
    Scm
);

/// 0x00 Code cache control.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheCtrl {
    /// Cache enable.
    pub enable: bool,
    /// Write 1 to invalidate every line. Reads as 0.
    pub clear: bool,
    #[bits(30)]
    __: u32,
}

register!(CacheCtrl: Scm, 0x00);

macro_rules! fpu_flags {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[cfg_attr(not(feature = "defmt"), bitfield(u32))]
        #[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
        #[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            /// Invalid operation.
            pub ioc: bool,
            /// Divide by zero.
            pub dzc: bool,
            /// Overflow.
            pub ofc: bool,
            /// Underflow.
            pub ufc: bool,
            /// Inexact result.
            pub ixc: bool,
            /// Input denormal.
            pub idc: bool,
            #[bits(26)]
            __: u32,
        }
    };
}

fpu_flags!(
    /// 0x10 FPU exception interrupt enables.
    FpuIntEn
);
register!(FpuIntEn: Scm, 0x10);

fpu_flags!(
    /// 0x14 FPU exception flags, write 1 to clear.
    FpuStatus
);
register!(FpuStatus: Scm, 0x14, w1c = 0x3f);
