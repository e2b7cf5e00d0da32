//! The unlock, write, relock discipline for lock-protected registers.
//!
//! A register with a LOCK bit drops every write while LOCK reads 1.
//! Writing the register's key to the whole word clears LOCK and keeps
//! every other field. Mutators bracket their writes with [acquire] and
//! [release] (or use [unlocked]), and issue no unrelated register
//! access inside the bracket.
//!
//! [acquire]: LockExt::acquire
//! [release]: LockExt::release
//! [unlocked]: LockExt::unlocked

use crate::pac::{Block, Bus, Lockable, Peripheral};

/// Lock bracketing for register blocks.
pub trait LockExt {
    /// The block the lock registers live in.
    type Peripheral: Peripheral;

    /// Clear LOCK on element `index` of `L`, if it is set.
    ///
    /// Returns whether the unlock key was written.
    fn acquire<L>(&self, index: usize) -> bool
    where
        L: Lockable<Peripheral = Self::Peripheral>;

    /// Set LOCK on element `index` of `L`.
    fn release<L>(&self, index: usize)
    where
        L: Lockable<Peripheral = Self::Peripheral>;

    /// Run `f` with element `index` of `L` unlocked, and lock it again.
    fn unlocked<L, R>(&self, index: usize, f: impl FnOnce(&Self) -> R) -> R
    where
        L: Lockable<Peripheral = Self::Peripheral>;

    /// Run `f` with every element of `L` named in `mask` unlocked, and
    /// lock exactly those again. Other elements are not touched.
    fn unlocked_mask<L, R>(&self, mask: u32, f: impl FnOnce(&Self) -> R) -> R
    where
        L: Lockable<Peripheral = Self::Peripheral>;
}

// indices of the set bits in mask, for an array of count elements
fn indices(mask: u32, count: usize) -> impl Iterator<Item = usize> {
    (0..count.min(32)).filter(move |i| mask & (1 << i) != 0)
}

impl<P, B> LockExt for Block<P, B>
where
    P: Peripheral,
    B: Bus,
{
    type Peripheral = P;

    #[inline]
    fn acquire<L>(&self, index: usize) -> bool
    where
        L: Lockable<Peripheral = P>,
    {
        if self.read_at::<L>(index).locked() {
            self.bus().write(self.address::<L>(index), L::KEY);
            true
        } else {
            false
        }
    }

    #[inline]
    fn release<L>(&self, index: usize)
    where
        L: Lockable<Peripheral = P>,
    {
        self.modify_at::<L>(index, |r| {
            let bits: u32 = r.into();
            L::from(bits | L::LOCK)
        })
    }

    #[inline]
    fn unlocked<L, R>(&self, index: usize, f: impl FnOnce(&Self) -> R) -> R
    where
        L: Lockable<Peripheral = P>,
    {
        self.acquire::<L>(index);
        let result = f(self);
        self.release::<L>(index);
        result
    }

    #[inline]
    fn unlocked_mask<L, R>(&self, mask: u32, f: impl FnOnce(&Self) -> R) -> R
    where
        L: Lockable<Peripheral = P>,
    {
        for i in indices(mask, L::COUNT) {
            self.acquire::<L>(i);
        }
        let result = f(self);
        for i in indices(mask, L::COUNT) {
            self.release::<L>(i);
        }
        result
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use quickcheck_macros::quickcheck;
    use std::vec::Vec;

    use crate::pac::mock::{Access, Mock, Model};
    use crate::pac::{flash, pmu, port, rtc, scc, sysctrl, Bus, Lockable, Register};

    const BASE: u32 = 0x4000_0000;

    // every lock family, as (lock register address, lock mask, key)
    fn families() -> [(u32, u32, u32); 6] {
        [
            (BASE + scc::Cfg::OFFSET, scc::Cfg::LOCK, scc::KEY),
            (BASE + sysctrl::Parcc::OFFSET, sysctrl::Parcc::LOCK, sysctrl::KEY),
            (BASE + port::Pcr::OFFSET, port::Pcr::LOCK, port::KEY),
            (BASE + rtc::Csr::OFFSET, rtc::Csr::LOCK, rtc::KEY),
            (BASE + flash::Feic::OFFSET, flash::Feic::LOCK, flash::FEIC_KEY),
            (BASE + pmu::Lock::OFFSET, pmu::Lock::LOCK, pmu::KEY),
        ]
    }

    #[test]
    fn keys_match_hardware() {
        assert_eq!(scc::SourceCs::KEY, 0x5b00_0000);
        assert_eq!(scc::SpllCfg::KEY, 0x5b00_0000);
        assert_eq!(sysctrl::Parcc::KEY, 0x5b00_0000);
        assert_eq!(port::Pcr::KEY, 0x5b00_0000);
        assert_eq!(rtc::Csr::KEY, 0x9867_0000);
        assert_eq!(flash::Feic::KEY, 0x5c00_0000);
        assert_eq!(pmu::Lock::KEY, 0x9473_0000);
    }

    // write `value` into the bits outside `keep` of a locked register,
    // through the bracket, and check it stuck and relocked
    fn round_trip<L>(value: u32, keep: u32) -> bool
    where
        L: Lockable,
    {
        let mock = Mock::new();
        let regs = mock.block::<L::Peripheral>(BASE);
        let address = regs.address::<L>(0);
        mock.model(address, Model::locked(L::LOCK, L::KEY).write_only(keep));
        mock.set(address, L::LOCK);

        let field = value & !(L::LOCK | keep);
        regs.unlocked::<L, _>(0, |regs| regs.write::<L>(L::from(field)));

        mock.get(address) == field | L::LOCK
    }

    #[quickcheck]
    fn lock_round_trip(value: u32) -> bool {
        round_trip::<scc::Cfg>(value, 0xff00_0000)
            && round_trip::<scc::SourceCs>(value & !scc::SOURCE_LOC, 0xff00_0000)
            && round_trip::<scc::SpllCfg>(value, 0xff00_0000)
            && round_trip::<sysctrl::Parcc>(value, 0xff00_0000)
            && round_trip::<port::Pcr>(value, 0xff00_0000)
            && round_trip::<rtc::Csr>(value & !rtc::CSR_SECOND_FLAG, 0xffff_0000)
            && round_trip::<flash::Feic>(value, 0xff00_0000)
            && round_trip::<pmu::Lock>(value, 0xffff_0000)
    }

    #[quickcheck]
    fn locked_write_is_dropped(value: u32) -> bool {
        families().iter().all(|&(address, lock, key)| {
            let mock = Mock::new();
            mock.model(address, Model::locked(lock, key));
            mock.set(address, lock);
            if value == key {
                return true;
            }
            mock.write(address, value);
            mock.get(address) == lock
        })
    }

    #[test]
    fn acquire_skips_key_when_unlocked() {
        let mock = Mock::new();
        let regs = mock.block::<port::Port>(BASE);
        mock.model(BASE, Model::locked(port::Pcr::LOCK, port::KEY));

        assert!(!regs.acquire::<port::Pcr>(0));
        assert!(mock.writes().is_empty());

        regs.release::<port::Pcr>(0);
        assert!(regs.acquire::<port::Pcr>(0));
        assert_eq!(mock.writes_to(BASE), [port::Pcr::LOCK, port::KEY]);
    }

    #[test]
    fn release_keeps_w1c_flags() {
        let mock = Mock::new();
        let regs = mock.block::<scc::Scc>(BASE);
        let address = regs.address::<scc::SourceCs>(2);
        mock.model(
            address,
            Model::locked(scc::SourceCs::LOCK, scc::KEY).w1c(scc::SOURCE_LOC),
        );
        mock.set(address, scc::SourceCs::LOCK | scc::SOURCE_LOC | 1);

        regs.unlocked::<scc::SourceCs, _>(2, |regs| {
            regs.modify_at::<scc::SourceCs>(2, |r| r.with_stop_en(true))
        });

        assert_eq!(
            mock.get(address),
            scc::SourceCs::LOCK | scc::SOURCE_LOC | 0b11
        );
    }

    #[test]
    fn mask_bracket_touches_only_named_elements() {
        let mock = Mock::new();
        let regs = mock.block::<port::Port>(BASE);
        for pin in 0..32 {
            let address = regs.address::<port::Pcr>(pin);
            mock.model(address, Model::locked(port::Pcr::LOCK, port::KEY));
            mock.set(address, port::Pcr::LOCK);
        }

        regs.unlocked_mask::<port::Pcr, _>(0b1010, |_| ());

        let touched: Vec<u32> = mock
            .journal()
            .into_iter()
            .filter_map(|access| match access {
                Access::Write { address, .. } => Some((address - BASE) / 4),
                _ => None,
            })
            .collect();
        assert_eq!(touched, [1, 3, 1, 3]);
        for pin in 0..32 {
            assert_eq!(mock.get(BASE + 4 * pin), port::Pcr::LOCK);
        }
    }
}
