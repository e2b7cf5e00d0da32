//! Real time clock: a free running seconds counter with an alarm.
//!
//! CSR.LOCK guards every RTC register, so each mutator here runs inside
//! one CSR unlock bracket. SEC only accepts writes while the counter is
//! stopped.

use crate::interrupt::{kinds, Callbacks, Dispatch, Kind};
use crate::lock::LockExt;
use crate::pac::rtc::{self, Alarm, Csr, Ier, Sec, CSR_SECOND_FLAG};
use crate::pac::{Block, Bus, Mmio};

kinds! {
    /// RTC interrupts.
    pub enum Event {
        /// The counter reached the alarm value.
        Alarm = 1 << 0,
        /// The counter wrapped.
        Overflow = 1 << 1,
        /// One second passed.
        Second = 1 << 2,
    }
}

/// RTC counter clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// The internal 32kHz oscillator.
    Internal,
    /// The external 32.768kHz crystal.
    External,
}

#[derive(Debug)]
pub struct Rtc<B = Mmio> {
    regs: Block<rtc::Rtc, B>,
    callbacks: Callbacks<Event, { Event::COUNT }>,
}

impl<B> Rtc<B>
where
    B: Bus,
{
    #[inline]
    pub fn new(regs: Block<rtc::Rtc, B>) -> Self {
        Self {
            regs,
            callbacks: Callbacks::new(),
        }
    }

    #[inline]
    pub fn free(self) -> Block<rtc::Rtc, B> {
        self.regs
    }

    // run f with every RTC register unlocked
    fn unlocked<R>(&self, f: impl FnOnce(&Block<rtc::Rtc, B>) -> R) -> R {
        self.regs.unlocked::<Csr, _>(0, f)
    }

    /// Start counting.
    #[inline]
    pub fn enable(&mut self) {
        self.unlocked(|regs| regs.modify::<Csr>(|r| r.with_counter_en(true)))
    }

    /// Stop counting.
    #[inline]
    pub fn disable(&mut self) {
        self.unlocked(|regs| regs.modify::<Csr>(|r| r.with_counter_en(false)))
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.regs.read::<Csr>().counter_en()
    }

    /// Pick the counter clock. The counter should be stopped.
    #[inline]
    pub fn select_clock(&mut self, source: ClockSource) {
        self.unlocked(|regs| {
            regs.modify::<Csr>(|r| r.with_clock_sel(source == ClockSource::External))
        })
    }

    /// Set the counter, stopping it around the write if it was running.
    /// This also clears the overflow flag.
    #[inline]
    pub fn set_seconds(&mut self, seconds: u32) {
        self.unlocked(|regs| write_seconds(regs, seconds))
    }

    #[inline]
    pub fn seconds(&self) -> u32 {
        self.regs.read::<Sec>().seconds()
    }

    /// Set the alarm. This also clears the alarm flag.
    #[inline]
    pub fn set_alarm(&mut self, seconds: u32) {
        self.unlocked(|regs| regs.write(Alarm::new().with_seconds(seconds)))
    }

    #[inline]
    pub fn alarm(&self) -> u32 {
        self.regs.read::<Alarm>().seconds()
    }

    /// Set or remove the callback for `event`.
    #[inline]
    pub fn install_callback(&mut self, event: Event, callback: Option<fn()>) {
        self.callbacks.install(event, callback);
    }

    #[inline]
    pub fn enable_interrupt(&mut self, event: Event) {
        self.unlocked(|regs| {
            regs.modify::<Ier>(|r| Ier::from(u32::from(r) | event.mask()))
        })
    }

    #[inline]
    pub fn disable_interrupt(&mut self, event: Event) {
        self.unlocked(|regs| {
            regs.modify::<Ier>(|r| Ier::from(u32::from(r) & !event.mask()))
        })
    }
}

// rewrite SEC with the counter stopped, then restart it if it ran
fn write_seconds<B: Bus>(regs: &Block<rtc::Rtc, B>, seconds: u32) {
    let running = regs.read::<Csr>().counter_en();
    if running {
        regs.modify::<Csr>(|r| r.with_counter_en(false));
    }
    regs.write(Sec::new().with_seconds(seconds));
    if running {
        regs.modify::<Csr>(|r| r.with_counter_en(true));
    }
}

impl<B> Dispatch for Rtc<B>
where
    B: Bus,
{
    type Kind = Event;
    const NAME: &'static str = "RTC";

    fn pending(&self) -> u32 {
        let csr = self.regs.read::<Csr>();
        let status = (csr.alarm_flag() as u32) * Event::Alarm.mask()
            | (csr.overflow_flag() as u32) * Event::Overflow.mask()
            | (csr.second_flag() as u32) * Event::Second.mask();
        status & u32::from(self.regs.read::<Ier>())
    }

    fn clear(&mut self, active: u32) {
        if active == 0 {
            return;
        }
        self.unlocked(|regs| {
            if active & Event::Alarm.mask() != 0 {
                let alarm = regs.read::<Alarm>();
                regs.write(alarm);
            }
            if active & Event::Overflow.mask() != 0 {
                let seconds = regs.read::<Sec>().seconds();
                write_seconds(regs, seconds);
            }
            if active & Event::Second.mask() != 0 {
                regs.clear_flags::<Csr>(CSR_SECOND_FLAG);
            }
        })
    }

    fn invoke(&mut self, event: Event) -> bool {
        self.callbacks.invoke(event)
    }

    fn mask(&mut self, event: Event) {
        self.disable_interrupt(event)
    }

    fn barrier(&self) {
        self.regs.barrier()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use quickcheck_macros::quickcheck;

    use crate::interrupt::test_support::Counters;
    use crate::interrupt::InterruptSource;
    use crate::pac::memory_map;
    use crate::pac::mock::{Access, Mock, Model};
    use crate::pac::rtc::{CSR_ALARM_FLAG, CSR_OVERFLOW_FLAG};
    use crate::pac::{Lockable, Register};

    const BASE: u32 = memory_map::RTC;
    const SEC: u32 = BASE + Sec::OFFSET;
    const ALARM: u32 = BASE + Alarm::OFFSET;
    const CSR: u32 = BASE + Csr::OFFSET;
    const IER: u32 = BASE + Ier::OFFSET;
    const LOCK: u32 = Csr::LOCK;

    fn mock() -> Mock {
        let mock = Mock::new();
        mock.model(
            CSR,
            Model::locked(LOCK, rtc::KEY)
                .w1c(CSR_SECOND_FLAG)
                .read_only(CSR_ALARM_FLAG | CSR_OVERFLOW_FLAG)
                .write_only(0xffff_0000),
        );
        mock.set(CSR, LOCK);
        mock.model(IER, Model::plain().guarded_by(CSR, LOCK));
        mock.on_write(SEC, |memory, value| {
            let csr = memory.get(CSR);
            // counter running or registers locked
            if csr & (LOCK | 1) == 0 {
                memory.set(SEC, value);
                memory.update(CSR, |v| v & !CSR_OVERFLOW_FLAG);
            }
        });
        mock.on_write(ALARM, |memory, value| {
            if memory.get(CSR) & LOCK == 0 {
                memory.set(ALARM, value);
                memory.update(CSR, |v| v & !CSR_ALARM_FLAG);
            }
        });
        mock
    }

    #[test]
    fn set_seconds_stops_counter_around_write() {
        let mock = mock();
        mock.set(CSR, LOCK | 1);
        let mut rtc = Rtc::new(mock.block(BASE));
        rtc.set_seconds(1234);

        assert_eq!(rtc.seconds(), 1234);
        assert_eq!(mock.get(CSR), LOCK | 1);
        assert_eq!(
            mock.writes(),
            [
                (CSR, rtc::KEY),
                (CSR, 0),
                (SEC, 1234),
                (CSR, 1),
                (CSR, LOCK | 1),
            ]
        );
    }

    #[test]
    fn writes_are_dropped_while_locked() {
        let mock = mock();
        let regs: Block<rtc::Rtc, &Mock> = mock.block(BASE);
        regs.write(Alarm::new().with_seconds(60));
        regs.write(Ier::from(0x7));
        assert_eq!((mock.get(ALARM), mock.get(IER)), (0, 0));

        let mut rtc = Rtc::new(regs);
        rtc.set_alarm(60);
        rtc.enable_interrupt(Event::Second);
        assert_eq!((rtc.alarm(), mock.get(IER)), (60, 1 << 2));
        assert_eq!(mock.get(CSR), LOCK);
    }

    static HITS: Counters<3> = Counters::new();

    fn alarm() {
        HITS.hit(0)
    }
    fn overflow() {
        HITS.hit(1)
    }
    fn second() {
        HITS.hit(2)
    }

    #[quickcheck]
    fn clear_by_rewrite(flags: u8, enabled: u8, installed: u8, running: bool) -> bool {
        let (flags, enabled) = (flags as u32 & 0x7, enabled as u32 & 0x7);
        let mock = mock();
        mock.set(CSR, LOCK | running as u32 | flags << 8);
        mock.set(IER, enabled);
        mock.set(SEC, 77);
        mock.set(ALARM, 99);
        let mut rtc = Rtc::new(mock.block(BASE));
        for (event, f) in Event::ALL.iter().zip([alarm as fn(), overflow, second]) {
            if installed as u32 & event.mask() != 0 {
                rtc.install_callback(*event, Some(f));
            }
        }
        HITS.reset();

        rtc.handle();
        let last = mock.journal().last().copied();

        let active = flags & enabled;
        let handled = active & installed as u32;
        let csr = Csr::from(mock.get(CSR));
        Event::ALL
            .iter()
            .all(|event| HITS.get(event.index()) == (handled & event.mask() != 0) as usize)
            && (mock.get(CSR) >> 8) & 0x7 == flags & !active
            && csr.locked()
            && csr.counter_en() == running
            && mock.get(IER) == enabled & !(active & !handled)
            && (mock.get(SEC), mock.get(ALARM)) == (77, 99)
            && last == Some(Access::Barrier)
            && (active != 0 || mock.writes().is_empty())
    }

    #[test]
    fn idle_handler_keeps_lock_closed() {
        let mock = mock();
        mock.set(CSR, LOCK | CSR_SECOND_FLAG);
        let mut rtc = Rtc::new(mock.block(BASE));

        rtc.handle();
        assert!(mock.writes().is_empty());
        assert_eq!(mock.journal().last(), Some(&Access::Barrier));
        assert_eq!(mock.get(CSR), LOCK | CSR_SECOND_FLAG);
    }
}
