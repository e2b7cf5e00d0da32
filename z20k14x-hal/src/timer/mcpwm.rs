use crate::interrupt::{kinds, Callbacks, Dispatch, Kind};
use crate::pac::mcpwm::{self, ChValue, Glbcr, Ier, Mod, Status};
use crate::pac::{Block, Bus, Mmio};

use super::{channel_methods, impl_dispatch, interrupt_methods, write_protect_methods, Error};

/// Number of PWM channels.
pub const CHANNELS: usize = 8;

kinds! {
    /// MCPWM interrupts.
    pub enum Event {
        Channel0 = 1 << 0,
        Channel1 = 1 << 1,
        Channel2 = 1 << 2,
        Channel3 = 1 << 3,
        Channel4 = 1 << 4,
        Channel5 = 1 << 5,
        Channel6 = 1 << 6,
        Channel7 = 1 << 7,
        Counter0Overflow = 1 << 8,
        Counter1Overflow = 1 << 9,
        Fault0 = 1 << 10,
        Fault1 = 1 << 11,
        Fault2 = 1 << 12,
        Fault3 = 1 << 13,
    }
}

/// One of the two MCPWM counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Counter {
    Zero,
    One,
}

/// A motor control PWM block.
#[derive(Debug)]
pub struct Mcpwm<B = Mmio> {
    regs: Block<mcpwm::Mcpwm, B>,
    callbacks: Callbacks<Event, { Event::COUNT }>,
}

impl<B> Mcpwm<B>
where
    B: Bus,
{
    #[inline]
    pub fn new(regs: Block<mcpwm::Mcpwm, B>) -> Self {
        Self {
            regs,
            callbacks: Callbacks::new(),
        }
    }

    #[inline]
    pub fn free(self) -> Block<mcpwm::Mcpwm, B> {
        self.regs
    }

    #[inline]
    pub fn start(&mut self, counter: Counter) {
        self.set_running(counter, true)
    }

    #[inline]
    pub fn stop(&mut self, counter: Counter) {
        self.set_running(counter, false)
    }

    fn set_running(&mut self, counter: Counter, running: bool) {
        self.regs.modify::<Glbcr>(|r| match counter {
            Counter::Zero => r.with_cnt0_en(running),
            Counter::One => r.with_cnt1_en(running),
        })
    }

    #[inline]
    pub fn is_running(&self, counter: Counter) -> bool {
        let r = self.regs.read::<Glbcr>();
        match counter {
            Counter::Zero => r.cnt0_en(),
            Counter::One => r.cnt1_en(),
        }
    }

    write_protect_methods!();

    /// Set the period of `counter`.
    #[inline]
    pub fn set_modulo(&mut self, counter: Counter, value: u16) {
        self.regs
            .write_at(counter as usize, Mod::new().with_value(value))
    }

    #[inline]
    pub fn modulo(&self, counter: Counter) -> u16 {
        self.regs.read_at::<Mod>(counter as usize).value()
    }

    channel_methods!();

    interrupt_methods!();
}

impl_dispatch!(Mcpwm, "MCPWM");

#[cfg(test)]
mod test {
    use super::*;

    use quickcheck_macros::quickcheck;

    use crate::interrupt::test_support::Counters;
    use crate::interrupt::InterruptSource;
    use crate::pac::mcpwm::GLBCR_WP_EN;
    use crate::pac::memory_map;
    use crate::pac::mock::{Access, Mock, Model};
    use crate::pac::Register;

    const BASE: u32 = memory_map::MCPWM[0];
    const GLBCR: u32 = BASE + Glbcr::OFFSET;
    const IER: u32 = BASE + Ier::OFFSET;
    const STATUS: u32 = BASE + Status::OFFSET;

    fn mock() -> Mock {
        let mock = Mock::new();
        let protected = Model::plain().guarded_by(GLBCR, GLBCR_WP_EN);
        for counter in 0..2 {
            mock.model(BASE + Mod::OFFSET + 4 * counter, protected);
        }
        for channel in 0..CHANNELS as u32 {
            mock.model(BASE + ChValue::OFFSET + 4 * channel, protected);
        }
        mock.model(STATUS, Model::plain().w1c(0x3fff));
        mock
    }

    #[quickcheck]
    fn protected_writes_are_dropped(first: u16, second: u16, channel: u8) -> bool {
        let channel = channel as usize % CHANNELS;
        let mock = mock();
        let mut pwm = Mcpwm::new(mock.block(BASE));
        pwm.set_modulo(Counter::One, first);
        let staged = pwm.set_channel_value(channel, first);
        pwm.enable_write_protect();
        pwm.set_modulo(Counter::One, second);
        let dropped = pwm.set_channel_value(channel, second);

        let protected =
            pwm.modulo(Counter::One) == first && pwm.channel_value(channel) == Ok(first);
        pwm.disable_write_protect();
        let landed = pwm.set_channel_value(channel, second);
        staged.and(dropped).and(landed) == Ok(())
            && protected
            && pwm.channel_value(channel) == Ok(second)
            && pwm.modulo(Counter::Zero) == 0
            && pwm.set_channel_value(CHANNELS, second) == Err(Error::InvalidChannel)
    }

    #[test]
    fn counters_run_independently() {
        let mock = mock();
        let mut pwm = Mcpwm::new(mock.block(BASE));
        pwm.start(Counter::One);
        assert!(pwm.is_running(Counter::One));
        assert!(!pwm.is_running(Counter::Zero));
        pwm.start(Counter::Zero);
        pwm.stop(Counter::One);
        assert_eq!(mock.get(GLBCR), 0b01);
    }

    static HITS: Counters<1> = Counters::new();

    fn hit() {
        HITS.hit(0)
    }

    #[quickcheck]
    fn pwm_dispatch(status: u16, enabled: u16, installed: u16) -> bool {
        let (status, enabled) = (status as u32 & 0x3fff, enabled as u32 & 0x3fff);
        let mock = mock();
        mock.set(STATUS, status);
        mock.set(IER, enabled);
        let mut pwm = Mcpwm::new(mock.block(BASE));
        for event in Event::ALL {
            if installed as u32 & event.mask() != 0 {
                pwm.install_callback(*event, Some(hit));
            }
        }
        HITS.reset();

        pwm.handle();

        let active = status & enabled;
        let handled = active & installed as u32;
        HITS.get(0) == handled.count_ones() as usize
            && mock.get(STATUS) == status & !active
            && mock.get(IER) == enabled & !(active & !handled)
            && mock.journal().last() == Some(&Access::Barrier)
    }
}
