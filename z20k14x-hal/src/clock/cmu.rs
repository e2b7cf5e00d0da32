use crate::interrupt::{kinds, Callbacks, Dispatch, Kind};
use crate::pac::cmu::{self, Ctrl, High, Ier, Low, RefWindow, Status};
use crate::pac::{Block, Bus, Mmio};

kinds! {
    /// Clock monitor events.
    pub enum Event {
        /// More cycles than allowed in one window.
        High = 1 << 0,
        /// Fewer cycles than allowed in one window.
        Low = 1 << 1,
        /// No cycles at all.
        Loss = 1 << 2,
    }
}

/// Monitor window and the allowed cycle count range inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Window {
    /// Window length, in reference clock cycles.
    pub reference: u32,
    pub low: u32,
    pub high: u32,
}

/// One clock monitor unit.
#[derive(Debug)]
pub struct Cmu<B = Mmio> {
    regs: Block<cmu::Cmu, B>,
    callbacks: Callbacks<Event, { Event::COUNT }>,
}

impl<B> Cmu<B>
where
    B: Bus,
{
    #[inline]
    pub fn new(regs: Block<cmu::Cmu, B>) -> Self {
        Self {
            regs,
            callbacks: Callbacks::new(),
        }
    }

    #[inline]
    pub fn free(self) -> Block<cmu::Cmu, B> {
        self.regs
    }

    /// Set the window. The monitor must be disabled.
    #[inline]
    pub fn configure(&mut self, window: Window) {
        self.regs
            .write(RefWindow::new().with_cycles(window.reference));
        self.regs.write(Low::new().with_count(window.low));
        self.regs.write(High::new().with_count(window.high));
    }

    /// Start monitoring. With `reset`, a fault resets the chip.
    #[inline]
    pub fn enable(&mut self, reset: bool) {
        self.regs
            .write(Ctrl::new().with_enable(true).with_reset_en(reset))
    }

    #[inline]
    pub fn disable(&mut self) {
        self.regs.write(Ctrl::new())
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.regs.read()
    }

    /// Clear the status flags in `mask`, a combination of [Event] masks.
    #[inline]
    pub fn clear_status(&mut self, mask: u32) {
        self.regs.clear_flags::<Status>(mask)
    }

    /// Set or remove the callback for `event`.
    #[inline]
    pub fn install_callback(&mut self, event: Event, callback: Option<fn()>) {
        self.callbacks.install(event, callback);
    }

    #[inline]
    pub fn enable_interrupt(&mut self, event: Event) {
        self.regs
            .modify::<Ier>(|r| Ier::from(u32::from(r) | event.mask()))
    }

    #[inline]
    pub fn disable_interrupt(&mut self, event: Event) {
        self.regs
            .modify::<Ier>(|r| Ier::from(u32::from(r) & !event.mask()))
    }
}

impl<B> Dispatch for Cmu<B>
where
    B: Bus,
{
    type Kind = Event;
    const NAME: &'static str = "CMU";

    fn pending(&self) -> u32 {
        u32::from(self.regs.read::<Status>()) & u32::from(self.regs.read::<Ier>())
    }

    fn clear(&mut self, active: u32) {
        self.clear_status(active)
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
    use crate::pac::Register;

    const BASE: u32 = memory_map::CMU[1];
    const IER: u32 = BASE + Ier::OFFSET;
    const STATUS: u32 = BASE + Status::OFFSET;

    fn mock() -> Mock {
        let mock = Mock::new();
        mock.model(STATUS, Model::plain().w1c(0x7));
        mock
    }

    #[test]
    fn window_and_enable() {
        let mock = mock();
        let mut cmu = Cmu::new(mock.block(BASE));
        cmu.configure(Window {
            reference: 100,
            low: 950,
            high: 1050,
        });
        cmu.enable(true);
        assert_eq!(
            mock.writes(),
            [
                (BASE + RefWindow::OFFSET, 100),
                (BASE + Low::OFFSET, 950),
                (BASE + High::OFFSET, 1050),
                (BASE + Ctrl::OFFSET, 0b11),
            ]
        );
    }

    static HITS: Counters<3> = Counters::new();

    fn high() {
        HITS.hit(0)
    }
    fn low() {
        HITS.hit(1)
    }
    fn loss() {
        HITS.hit(2)
    }

    #[quickcheck]
    fn monitor_dispatch(status: u8, enabled: u8, installed: u8) -> bool {
        let (status, enabled) = (status as u32 & 0x7, enabled as u32 & 0x7);
        let mock = mock();
        mock.set(STATUS, status);
        mock.set(IER, enabled);
        let mut cmu = Cmu::new(mock.block(BASE));
        for (event, f) in Event::ALL.iter().zip([high as fn(), low, loss]) {
            if installed as u32 & event.mask() != 0 {
                cmu.install_callback(*event, Some(f));
            }
        }
        HITS.reset();

        cmu.handle();

        let active = status & enabled;
        let handled = active & installed as u32;
        Event::ALL
            .iter()
            .all(|event| HITS.get(event.index()) == (handled & event.mask() != 0) as usize)
            && mock.get(STATUS) == status & !active
            && mock.get(IER) == enabled & !(active & !handled)
            && mock.journal().last() == Some(&Access::Barrier)
    }
}
