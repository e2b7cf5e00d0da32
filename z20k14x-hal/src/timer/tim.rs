use crate::interrupt::{kinds, Callbacks, Dispatch, Kind};
use crate::pac::tim::{self, ChValue, Cnt, Glbcr, Ier, Mod, Status};
use crate::pac::{Block, Bus, Mmio};

use super::{channel_methods, impl_dispatch, interrupt_methods, write_protect_methods, Error};

/// Number of compare channels.
pub const CHANNELS: usize = 8;

/// Highest counter clock source.
pub const MAX_SOURCE: u8 = 7;

/// Highest prescaler exponent.
pub const MAX_PRESCALER: u8 = 15;

kinds! {
    /// TIM interrupts.
    pub enum Event {
        Channel0 = 1 << 0,
        Channel1 = 1 << 1,
        Channel2 = 1 << 2,
        Channel3 = 1 << 3,
        Channel4 = 1 << 4,
        Channel5 = 1 << 5,
        Channel6 = 1 << 6,
        Channel7 = 1 << 7,
        Overflow = 1 << 8,
        Reload = 1 << 9,
        Fault = 1 << 10,
    }
}

/// A general purpose timer.
#[derive(Debug)]
pub struct Tim<B = Mmio> {
    regs: Block<tim::Tim, B>,
    callbacks: Callbacks<Event, { Event::COUNT }>,
}

impl<B> Tim<B>
where
    B: Bus,
{
    #[inline]
    pub fn new(regs: Block<tim::Tim, B>) -> Self {
        Self {
            regs,
            callbacks: Callbacks::new(),
        }
    }

    #[inline]
    pub fn free(self) -> Block<tim::Tim, B> {
        self.regs
    }

    /// Pick the counter clock source, and divide it by
    /// `2.pow(prescaler)`. The counter should be stopped.
    #[inline]
    pub fn configure(&mut self, source: u8, prescaler: u8) -> Result<(), Error> {
        if source > MAX_SOURCE || prescaler > MAX_PRESCALER {
            return Err(Error::OutOfRange);
        }
        self.regs
            .modify::<Glbcr>(|r| r.with_clk_src(source).with_prescaler(prescaler));
        Ok(())
    }

    #[inline]
    pub fn start(&mut self) {
        self.regs.modify::<Glbcr>(|r| r.with_cnt_en(true))
    }

    #[inline]
    pub fn stop(&mut self) {
        self.regs.modify::<Glbcr>(|r| r.with_cnt_en(false))
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.regs.read::<Glbcr>().cnt_en()
    }

    write_protect_methods!();

    /// Set the value the counter wraps at.
    #[inline]
    pub fn set_modulo(&mut self, value: u16) {
        self.regs.write(Mod::new().with_value(value))
    }

    #[inline]
    pub fn modulo(&self) -> u16 {
        self.regs.read::<Mod>().value()
    }

    #[inline]
    pub fn set_counter(&mut self, value: u16) {
        self.regs.write(Cnt::new().with_value(value))
    }

    #[inline]
    pub fn counter(&self) -> u16 {
        self.regs.read::<Cnt>().value()
    }

    channel_methods!();

    interrupt_methods!();
}

impl_dispatch!(Tim, "TIM");
