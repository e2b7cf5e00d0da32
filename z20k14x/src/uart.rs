//! UART with LIN support.

use bitfield_struct::bitfield;

use crate::register::{peripheral, register};

peripheral!(
    /// The UART register block.
    Uart
);

/// 0x00 Receive buffer on read, transmit holding on write.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Data {
    pub data: u8,
    #[bits(24)]
    __: u32,
}

register!(Data: Uart, 0x00);

macro_rules! interrupt_bits {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[cfg_attr(not(feature = "defmt"), bitfield(u32))]
        #[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
        #[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            /// Receive data available.
            pub rx_data: bool,
            /// Transmit holding register empty.
            pub tx_empty: bool,
            /// Any error flag in [Lsr].
            pub line_status: bool,
            #[bits(5)]
            __: u8,
            /// LIN break detected.
            pub lin_break: bool,
            /// LIN sync field error.
            pub sync_err: bool,
            /// LIN protected identifier parity error.
            pub pid_err: bool,
            /// LIN checksum error.
            pub checksum_err: bool,
            /// LIN frame timeout.
            pub timeout: bool,
            /// LIN header sent or received.
            pub header_done: bool,
            /// LIN response sent or received.
            pub response_done: bool,
            #[bits(17)]
            __: u32,
        }
    };
}

interrupt_bits!(
    /// 0x04 Interrupt enables.
    Ier
);
register!(Ier: Uart, 0x04);

interrupt_bits!(
    /// 0x08 Interrupt status. `rx_data` and `tx_empty` follow the data
    /// path, every other flag is write-1-to-clear.
    Isr
);
register!(Isr: Uart, 0x08, w1c = ISR_W1C);

/// The write-1-to-clear flags of [Isr].
pub const ISR_W1C: u32 = (1 << 2) | (0x7f << 8);

/// 0x0C Line status.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lsr {
    #[bits(1, access = RO)]
    pub data_ready: bool,
    /// Receive overrun, write 1 to clear.
    pub overrun: bool,
    /// Parity error, write 1 to clear.
    pub parity: bool,
    /// Framing error, write 1 to clear.
    pub framing: bool,
    /// Break received, write 1 to clear.
    pub brk: bool,
    #[bits(1, access = RO)]
    pub thr_empty: bool,
    /// Transmitter has nothing left to shift out.
    #[bits(1, access = RO)]
    pub tx_idle: bool,
    #[bits(25)]
    __: u32,
}

register!(Lsr: Uart, 0x0c, w1c = 0x1e);

/// 0x10 Line control.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lcr {
    /// Data bits, minus five.
    #[bits(2)]
    pub word_len: u8,
    /// Two stop bits.
    pub stop2: bool,
    pub parity_en: bool,
    /// Even parity, when enabled.
    pub even: bool,
    #[bits(27)]
    __: u32,
}

register!(Lcr: Uart, 0x10);

/// 0x14 Baud rate divisor.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Baud {
    /// Functional clock divided by 16 times the baud rate.
    pub divisor: u16,
    __: u16,
}

register!(Baud: Uart, 0x14);

/// 0x18 Control.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ctrl {
    pub tx_en: bool,
    pub rx_en: bool,
    pub fifo_en: bool,
    #[bits(5)]
    __: u8,
    /// LIN mode.
    pub lin_en: bool,
    /// LIN master node.
    pub lin_master: bool,
    /// Break length: 0 is 10 bits, then 11, 13 and 16.
    #[bits(2)]
    pub break_len: u8,
    /// LIN 2.x enhanced checksum, covering the protected identifier.
    pub checksum_enhanced: bool,
    #[bits(19)]
    __: u32,
}

register!(Ctrl: Uart, 0x18);

/// 0x1C LIN frame control.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinPid {
    /// Protected identifier, parity bits included.
    pub pid: u8,
    /// Response data length, in bytes.
    #[bits(4)]
    pub length: u8,
    /// Write 1 to send a header. Master only.
    pub send_header: bool,
    #[bits(19)]
    __: u32,
}

register!(LinPid: Uart, 0x1c);
