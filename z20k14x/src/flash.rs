//! Flash memory controller.
//!
//! One command runs at a time. FSTAT.CCIF reads 1 while the controller
//! is idle; writing 1 to it launches the command staged in FCMD, FADDR
//! and FDATA, and it reads 0 until that command completes.

use bitfield_struct::bitfield;

use crate::register::{lockable, peripheral, register, word_register};

peripheral!(
    /// The flash controller register block.
    Flash
);

/// 0x00 Status. Every flag is write-1-to-clear.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fstat {
    /// The command ran, and its verification failed.
    pub fail: bool,
    #[bits(3)]
    __: u8,
    /// The command was aborted.
    pub cmd_abort: bool,
    /// Illegal command, address, or access.
    pub acc_err: bool,
    /// Read collision with a running command.
    pub rd_col: bool,
    /// Command complete. Write 1 to launch a command.
    pub ccif: bool,
    #[bits(8)]
    __: u8,
    /// Corrected single-bit ECC error on read.
    pub single_bit_fault: bool,
    /// Uncorrectable double-bit ECC error on read.
    pub double_bit_fault: bool,
    #[bits(14)]
    __: u16,
}

pub const FSTAT_FAIL: u32 = 1 << 0;
pub const FSTAT_CMD_ABORT: u32 = 1 << 4;
pub const FSTAT_ACC_ERR: u32 = 1 << 5;
pub const FSTAT_RD_COL: u32 = 1 << 6;
pub const FSTAT_CCIF: u32 = 1 << 7;
pub const FSTAT_SINGLE_BIT_FAULT: u32 = 1 << 16;
pub const FSTAT_DOUBLE_BIT_FAULT: u32 = 1 << 17;

register!(
    Fstat: Flash,
    0x00,
    w1c = FSTAT_FAIL
        | FSTAT_CMD_ABORT
        | FSTAT_ACC_ERR
        | FSTAT_RD_COL
        | FSTAT_CCIF
        | FSTAT_SINGLE_BIT_FAULT
        | FSTAT_DOUBLE_BIT_FAULT
);

/// 0x04 Control.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fctrl {
    /// Request the running command to abort.
    pub abort_req: bool,
    #[bits(7)]
    __: u8,
    /// Command complete interrupt enable.
    pub cc_ie: bool,
    #[bits(7)]
    __: u8,
    /// Single-bit ECC fault interrupt enable.
    pub sbf_ie: bool,
    /// Double-bit ECC fault interrupt enable.
    pub dbf_ie: bool,
    #[bits(14)]
    __: u16,
}

register!(Fctrl: Flash, 0x04);

/// 0x08 Command code.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fcmd {
    pub code: u8,
    #[bits(24)]
    __: u32,
}

register!(Fcmd: Flash, 0x08);

word_register!(
    /// 0x0C Command address.
    Faddr,
    address
);
register!(Faddr: Flash, 0x0c);

word_register!(
    /// 0x10 + 4n Command data, four words.
    Fdata,
    data
);
register!(Fdata: Flash, 0x10, count = 4);

/// Unlock key for [Feic].
pub const FEIC_KEY: u32 = 0x5c00_0000;

/// 0x20 ECC error injection control.
#[cfg_attr(not(feature = "defmt"), bitfield(u32))]
#[cfg_attr(feature = "defmt", bitfield(u32, defmt = true))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Feic {
    /// Inject errors on reads from [Feia].
    pub enable: bool,
    /// 0 single-bit, 1 double-bit.
    #[bits(2)]
    pub mode: u8,
    #[bits(20)]
    __: u32,
    /// Register lock, also guards [Feia].
    pub lock: bool,
    /// Unlock key, write only.
    #[bits(8)]
    pub key: u8,
}

register!(Feic: Flash, 0x20);
lockable!(Feic, key = FEIC_KEY, lock = 1 << 23);

word_register!(
    /// 0x24 ECC error injection address.
    Feia,
    address
);
register!(Feia: Flash, 0x24);

/// Command codes written to [Fcmd].
pub mod command {
    pub const ERASE_VERIFY_ALL: u8 = 0x01;
    pub const ERASE_VERIFY_BLOCK: u8 = 0x02;
    pub const ERASE_VERIFY_SECTOR: u8 = 0x03;
    pub const PROGRAM_PHRASE: u8 = 0x10;
    pub const ERASE_SECTOR: u8 = 0x20;
    pub const ERASE_BLOCK: u8 = 0x21;
    pub const ERASE_ALL: u8 = 0x22;
    pub const VERIFY_BACKDOOR_KEY: u8 = 0x30;
}

/// Bytes in one program phrase.
pub const PHRASE_SIZE: u32 = 16;

/// Bytes in one erase sector.
pub const SECTOR_SIZE: u32 = 0x1000;

/// Bytes in one flash block.
pub const BLOCK_SIZE: u32 = 0x8_0000;
