//! Real time clock.
//!
//! CSR.LOCK guards every RTC register, not just CSR. The alarm flag
//! clears when ALARM is written, and the overflow flag when SEC is.

use bitfield_struct::bitfield;

use crate::register::{lockable, peripheral, register, word_register};

peripheral!(
    /// The RTC register block.
    Rtc
);

/// Unlock key for [Csr].
pub const KEY: u32 = 0x9867_0000;

word_register!(
    /// 0x00 Seconds counter. Writing it clears [Csr::overflow_flag].
    Sec,
    seconds
);
register!(Sec: Rtc, 0x00);

word_register!(
    /// 0x04 Alarm match value. Writing it clears [Csr::alarm_flag].
    Alarm,
    seconds
);
register!(Alarm: Rtc, 0x04);

/// 0x08 Control and status.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Csr {
    /// Counter enable. SEC is only writable while this is 0.
    pub counter_en: bool,
    /// Counter clock: 0 the internal 32kHz oscillator, 1 the external
    /// 32.768kHz crystal.
    pub clock_sel: bool,
    #[bits(6)]
    __: u8,
    /// SEC matched ALARM.
    #[bits(1, access = RO)]
    pub alarm_flag: bool,
    /// SEC wrapped around.
    #[bits(1, access = RO)]
    pub overflow_flag: bool,
    /// One second tick, write 1 to clear.
    pub second_flag: bool,
    #[bits(4)]
    __: u8,
    /// Lock for every RTC register.
    pub lock: bool,
    /// Unlock key, write only.
    pub key: u16,
}

pub const CSR_ALARM_FLAG: u32 = 1 << 8;
pub const CSR_OVERFLOW_FLAG: u32 = 1 << 9;
pub const CSR_SECOND_FLAG: u32 = 1 << 10;

register!(Csr: Rtc, 0x08, w1c = CSR_SECOND_FLAG);
lockable!(Csr, key = KEY, lock = 1 << 15);

/// 0x0C Interrupt enables.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ier {
    pub alarm_ie: bool,
    pub overflow_ie: bool,
    pub second_ie: bool,
    #[bits(29)]
    __: u32,
}

register!(Ier: Rtc, 0x0c);
