//! LIN frame support on top of the UART.

use crate::pac::uart::{Ctrl, Isr, LinPid};
use crate::pac::Bus;

use super::{Error, Event, Uart};
use crate::interrupt::Kind;

/// LIN checksum model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Checksum {
    /// Data bytes only (LIN 1.x).
    Classic,
    /// Protected ID and data bytes (LIN 2.x).
    Enhanced,
}

/// Length of the break a master sends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BreakLength {
    #[default]
    Bits10 = 0,
    Bits11 = 1,
    Bits13 = 2,
    Bits16 = 3,
}

/// Longest LIN response, in data bytes.
pub const MAX_RESPONSE: u8 = 8;

/// Add the two parity bits to a 6 bit frame identifier.
#[inline]
pub fn protected_id(id: u8) -> u8 {
    let id = id & 0x3f;
    let bit = |n: u8| (id >> n) & 1;
    let p0 = bit(0) ^ bit(1) ^ bit(2) ^ bit(4);
    let p1 = !(bit(1) ^ bit(3) ^ bit(4) ^ bit(5)) & 1;
    id | p0 << 6 | p1 << 7
}

// eight bit sum with the carry added back in
const fn add_with_carry(sum: u8, byte: u8) -> u8 {
    let total = sum as u16 + byte as u16;
    (total as u8).wrapping_add((total >> 8) as u8)
}

/// Frame checksum of `data`, sent after the last data byte.
pub fn checksum(model: Checksum, pid: u8, data: &[u8]) -> u8 {
    let seed = match model {
        Checksum::Classic => 0,
        Checksum::Enhanced => pid,
    };
    !data.iter().fold(seed, |sum, byte| add_with_carry(sum, *byte))
}

/// LIN error flags, read after the fact.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinErrors {
    pub checksum: bool,
    pub pid: bool,
    pub sync: bool,
    pub timeout: bool,
}

impl LinErrors {
    #[inline]
    pub fn any(&self) -> bool {
        self.checksum || self.pid || self.sync || self.timeout
    }
}

const ERRORS: [Event; 4] = [
    Event::ChecksumError,
    Event::PidError,
    Event::SyncError,
    Event::Timeout,
];

impl<B> Uart<B>
where
    B: Bus,
{
    /// Switch to LIN framing. `break_len` is only used as master.
    #[inline]
    pub fn enable_lin(&mut self, master: bool, model: Checksum, break_len: BreakLength) {
        self.regs.modify::<Ctrl>(|r| {
            r.with_lin_en(true)
                .with_lin_master(master)
                .with_break_len(break_len as u8)
                .with_checksum_enhanced(model == Checksum::Enhanced)
        })
    }

    #[inline]
    pub fn disable_lin(&mut self) {
        self.regs.modify::<Ctrl>(|r| r.with_lin_en(false))
    }

    /// Send a break, sync and protected ID for frame `id`, followed by
    /// a response of `length` data bytes, up to [MAX_RESPONSE].
    #[inline]
    pub fn send_header(&mut self, id: u8, length: u8) -> Result<(), Error> {
        if id > 0x3f || length > MAX_RESPONSE {
            return Err(Error::OutOfRange);
        }
        trace!("LIN header {=u8:#x}", id);
        self.regs.write(
            LinPid::new()
                .with_pid(protected_id(id))
                .with_length(length)
                .with_send_header(true),
        );
        Ok(())
    }

    #[inline]
    pub fn lin_errors(&self) -> LinErrors {
        let isr = self.regs.read::<Isr>();
        LinErrors {
            checksum: isr.checksum_err(),
            pid: isr.pid_err(),
            sync: isr.sync_err(),
            timeout: isr.timeout(),
        }
    }

    #[inline]
    pub fn clear_lin_errors(&mut self) {
        let mask = ERRORS.iter().fold(0, |mask, event| mask | event.mask());
        self.regs.clear_flags::<Isr>(mask)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use quickcheck_macros::quickcheck;
    use std::vec::Vec;

    #[test]
    fn known_protected_ids() {
        assert_eq!(protected_id(0x00), 0x80);
        assert_eq!(protected_id(0x01), 0xc1);
        assert_eq!(protected_id(0x3c), 0x3c);
        assert_eq!(protected_id(0x3d), 0x7d);
    }

    #[quickcheck]
    fn parity_bits_only_depend_on_id(id: u8) -> bool {
        let pid = protected_id(id);
        pid & 0x3f == id & 0x3f && protected_id(pid) == pid
    }

    #[test]
    fn known_checksums() {
        assert_eq!(checksum(Checksum::Classic, 0x80, &[0x01, 0x02]), 0xfc);
        assert_eq!(checksum(Checksum::Enhanced, 0x80, &[0x01, 0x02]), 0x7c);
        assert_eq!(checksum(Checksum::Classic, 0, &[0xff, 0x02]), 0xfd);
    }

    #[quickcheck]
    fn receiver_sum_is_all_ones(pid: u8, data: Vec<u8>, enhanced: bool) -> bool {
        let model = if enhanced {
            Checksum::Enhanced
        } else {
            Checksum::Classic
        };
        let seed = if enhanced { pid } else { 0 };
        let sum = data.iter().fold(seed, |sum, byte| add_with_carry(sum, *byte));
        add_with_carry(sum, checksum(model, pid, &data)) == 0xff
    }
}
