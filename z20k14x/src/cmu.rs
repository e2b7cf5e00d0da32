//! Clock monitor unit.
//!
//! Each CMU counts cycles of a monitored clock over a window of the
//! reference clock, and flags counts outside `[Low, High]` or no
//! cycles at all.

use bitfield_struct::bitfield;

use crate::register::{peripheral, register, word_register};

peripheral!(
    /// The CMU register block.
    Cmu
);

/// 0x00 Control.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ctrl {
    /// Monitor enable.
    pub enable: bool,
    /// Reset the chip, instead of interrupting, on any error.
    pub reset_en: bool,
    #[bits(30)]
    __: u32,
}

register!(Ctrl: Cmu, 0x00);

word_register!(
    /// 0x04 Reference window, in reference clock cycles.
    RefWindow,
    cycles
);
register!(RefWindow: Cmu, 0x04);

word_register!(
    /// 0x08 Highest acceptable monitored count.
    High,
    count
);
register!(High: Cmu, 0x08);

word_register!(
    /// 0x0C Lowest acceptable monitored count.
    Low,
    count
);
register!(Low: Cmu, 0x0c);

macro_rules! monitor_flags {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[cfg_attr(not(feature = "defmt"), bitfield(u32))]
        #[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
        #[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            /// Count above [High].
            pub high: bool,
            /// Count below [Low].
            pub low: bool,
            /// No monitored cycles in the window.
            pub loss: bool,
            #[bits(29)]
            __: u32,
        }
    };
}

monitor_flags!(
    /// 0x10 Interrupt enables.
    Ier
);
register!(Ier: Cmu, 0x10);

monitor_flags!(
    /// 0x14 Status, write 1 to clear.
    Status
);
register!(Status: Cmu, 0x14, w1c = 0x7);
