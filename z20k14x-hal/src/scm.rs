//! System configuration module: code cache control and FPU exception
//! interrupts.

use crate::interrupt::{kinds, Callbacks, Dispatch, Kind};
use crate::pac::scm::{CacheCtrl, FpuIntEn, FpuStatus, Scm};
use crate::pac::{Block, Bus, Mmio};

/// Cache state saved by [CacheControl::disable()].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CacheState {
    Enabled,
    Disabled,
}

/// Code cache control, as needed around flash commands.
pub trait CacheControl {
    /// Disable the cache. Returns the state to restore later.
    fn disable(&mut self) -> CacheState;

    /// Put the cache back in `state`.
    fn restore(&mut self, state: CacheState);

    /// Invalidate every cache line.
    fn clear(&mut self);
}

/// Split the SCM into its cache and FPU halves.
pub fn split<B>(scm: Block<Scm, B>) -> (Cache<B>, Fpu<B>)
where
    B: Bus + Clone,
{
    // safety: Cache and Fpu touch disjoint registers
    let other = unsafe { Block::new(scm.bus().clone(), scm.base()) };
    (Cache { scm }, Fpu::new(other))
}

/// The code cache.
#[derive(Debug)]
pub struct Cache<B = Mmio> {
    scm: Block<Scm, B>,
}

impl<B> Cache<B>
where
    B: Bus,
{
    /// Turn the cache on.
    #[inline]
    pub fn enable(&mut self) {
        self.scm.modify::<CacheCtrl>(|r| r.with_enable(true))
    }

    /// Is the cache on?
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.scm.read::<CacheCtrl>().enable()
    }
}

impl<B> CacheControl for Cache<B>
where
    B: Bus,
{
    #[inline]
    fn disable(&mut self) -> CacheState {
        let ctrl = self.scm.read::<CacheCtrl>();
        self.scm.write(ctrl.with_enable(false).with_clear(false));
        if ctrl.enable() {
            CacheState::Enabled
        } else {
            CacheState::Disabled
        }
    }

    #[inline]
    fn restore(&mut self, state: CacheState) {
        let enable = state == CacheState::Enabled;
        self.scm
            .modify::<CacheCtrl>(|r| r.with_enable(enable).with_clear(false))
    }

    #[inline]
    fn clear(&mut self) {
        self.scm.modify::<CacheCtrl>(|r| r.with_clear(true))
    }
}

kinds! {
    /// FPU exception interrupts.
    pub enum Event {
        InvalidOperation = 1 << 0,
        DivideByZero = 1 << 1,
        Overflow = 1 << 2,
        Underflow = 1 << 3,
        Inexact = 1 << 4,
        InputDenormal = 1 << 5,
    }
}

/// FPU exception flags and their interrupts.
#[derive(Debug)]
pub struct Fpu<B = Mmio> {
    scm: Block<Scm, B>,
    callbacks: Callbacks<Event, { Event::COUNT }>,
}

impl<B> Fpu<B>
where
    B: Bus,
{
    fn new(scm: Block<Scm, B>) -> Self {
        Self {
            scm,
            callbacks: Callbacks::new(),
        }
    }

    /// Set or remove the callback for `event`.
    #[inline]
    pub fn install_callback(&mut self, event: Event, callback: Option<fn()>) {
        self.callbacks.install(event, callback);
    }

    /// Unmask `event`.
    #[inline]
    pub fn enable_interrupt(&mut self, event: Event) {
        self.scm
            .modify::<FpuIntEn>(|r| FpuIntEn::from(u32::from(r) | event.mask()))
    }

    /// Mask `event`.
    #[inline]
    pub fn disable_interrupt(&mut self, event: Event) {
        self.scm
            .modify::<FpuIntEn>(|r| FpuIntEn::from(u32::from(r) & !event.mask()))
    }

    /// Get the raw exception flags.
    #[inline]
    pub fn status(&self) -> FpuStatus {
        self.scm.read()
    }

    /// Clear the exception flags in `mask`.
    #[inline]
    pub fn clear_status(&mut self, mask: u32) {
        self.scm.clear_flags::<FpuStatus>(mask)
    }
}

impl<B> Dispatch for Fpu<B>
where
    B: Bus,
{
    type Kind = Event;
    const NAME: &'static str = "SCM";

    fn pending(&self) -> u32 {
        let status: u32 = self.scm.read::<FpuStatus>().into();
        let enabled: u32 = self.scm.read::<FpuIntEn>().into();
        status & enabled
    }

    fn clear(&mut self, active: u32) {
        self.scm.clear_flags::<FpuStatus>(active)
    }

    fn invoke(&mut self, event: Event) -> bool {
        self.callbacks.invoke(event)
    }

    fn mask(&mut self, event: Event) {
        self.disable_interrupt(event)
    }

    fn barrier(&self) {
        self.scm.barrier()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use quickcheck_macros::quickcheck;

    use crate::interrupt::test_support::Counters;
    use crate::interrupt::InterruptSource;
    use crate::pac::mock::{Access, Mock, Model};
    use crate::pac::Register;

    const BASE: u32 = crate::pac::memory_map::SCM;
    const STATUS: u32 = BASE + FpuStatus::OFFSET;
    const ENABLE: u32 = BASE + FpuIntEn::OFFSET;

    static HITS: Counters<6> = Counters::new();

    fn hit0() {
        HITS.hit(0)
    }
    fn hit1() {
        HITS.hit(1)
    }
    fn hit2() {
        HITS.hit(2)
    }
    fn hit3() {
        HITS.hit(3)
    }
    fn hit4() {
        HITS.hit(4)
    }
    fn hit5() {
        HITS.hit(5)
    }

    const HITS_FN: [fn(); 6] = [hit0, hit1, hit2, hit3, hit4, hit5];

    fn mock() -> Mock {
        let mock = Mock::new();
        mock.model(STATUS, Model::plain().w1c(0x3f));
        mock.model(BASE, Model::plain().write_only(0b10));
        mock
    }

    #[test]
    fn cache_disable_and_restore() {
        let mock = mock();
        mock.set(BASE, 1);
        let (mut cache, _) = split(mock.block::<Scm>(BASE));

        let state = cache.disable();
        assert_eq!(state, CacheState::Enabled);
        assert!(!cache.is_enabled());
        cache.clear();
        cache.restore(state);
        assert!(cache.is_enabled());
        assert_eq!(mock.writes_to(BASE), [0, 0b10, 1]);

        assert_eq!(cache.disable(), CacheState::Enabled);
        assert_eq!(cache.disable(), CacheState::Disabled);
        cache.restore(CacheState::Disabled);
        assert!(!cache.is_enabled());
    }

    // one test drives every subset, since the counters are shared
    #[quickcheck]
    fn fpu_dispatch(status: u8, enabled: u8, installed: u8) -> bool {
        let status = status as u32 & 0x3f;
        let enabled = enabled as u32 & 0x3f;
        let mock = mock();
        mock.set(STATUS, status);
        mock.set(ENABLE, enabled);
        let (_, mut fpu) = split(mock.block::<Scm>(BASE));
        for event in Event::ALL {
            if installed & event.mask() as u8 != 0 {
                fpu.install_callback(*event, Some(HITS_FN[event.index()]));
            }
        }
        HITS.reset();

        fpu.handle();

        let active = status & enabled;
        let mut unhandled = 0;
        for event in Event::ALL {
            let is_active = active & event.mask() != 0;
            let has_callback = installed & event.mask() as u8 != 0;
            let hits = HITS.get(event.index());
            if hits != (is_active && has_callback) as usize {
                return false;
            }
            if is_active && !has_callback {
                unhandled |= event.mask();
            }
        }

        mock.get(STATUS) == status & !active
            && mock.get(ENABLE) == enabled & !unhandled
            && mock.journal().last() == Some(&Access::Barrier)
    }
}
