use crate::interrupt::{kinds, Callbacks, Dispatch, Kind};
use crate::lock::LockExt;
use crate::pac::scc::{self, Cfg, Source, SourceCs, SpllCfg, Status, SysSrc, SOURCE_LOC};
use crate::pac::{Block, Bus, Mmio};

use super::{wait_for, Config, Error};

kinds! {
    /// Loss of clock on a monitored source.
    pub enum Event {
        Firc = 1 << 0,
        Osc = 1 << 1,
        Sosc = 1 << 2,
        Spll = 1 << 3,
    }
}

impl Event {
    /// The source this monitor watches.
    #[inline]
    pub const fn source(self) -> Source {
        match self {
            Self::Firc => Source::Firc,
            Self::Osc => Source::Osc,
            Self::Sosc => Source::Sosc,
            Self::Spll => Source::Spll,
        }
    }
}

/// Largest divider or PLL field value, as divide-by-n minus one.
pub const MAX_DIVIDER: u8 = 15;

/// PLL settings. The output is `input / (prediv + 1) * mult / (postdiv + 1)`.
/// `prediv` and `postdiv` go up to [MAX_DIVIDER].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pll {
    pub prediv: u8,
    pub mult: u8,
    pub postdiv: u8,
}

/// Clock dividers below the system clock, each as divide-by-n minus
/// one, up to [MAX_DIVIDER].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dividers {
    pub core: u8,
    pub bus: u8,
    pub slow: u8,
}

/// The system clock controller.
///
/// Every SCC register is lock protected. Each setter unlocks the
/// register it changes, and locks it again before returning.
#[derive(Debug)]
pub struct Scc<B = Mmio> {
    regs: Block<scc::Scc, B>,
    config: Config,
    callbacks: Callbacks<Event, { Event::COUNT }>,
}

impl<B> Scc<B>
where
    B: Bus,
{
    /// Wrap the SCC registers.
    #[inline]
    pub fn new(regs: Block<scc::Scc, B>, config: Config) -> Self {
        Self {
            regs,
            config,
            callbacks: Callbacks::new(),
        }
    }

    /// Recover the SCC registers.
    #[inline]
    pub fn free(self) -> Block<scc::Scc, B> {
        self.regs
    }

    /// Turn on `source`, and wait until it is stable.
    pub fn enable_source(&mut self, source: Source) -> Result<(), Error> {
        let i = source as usize;
        self.regs.unlocked::<SourceCs, _>(i, |regs| {
            regs.modify_at::<SourceCs>(i, |r| r.with_en(true))
        });
        wait_for(self.config.get_ready_timeout(), || self.is_ready(source)).map_err(|e| {
            warn!("clock source {} never became ready", i);
            e
        })
    }

    /// Turn off `source`.
    #[inline]
    pub fn disable_source(&mut self, source: Source) {
        let i = source as usize;
        self.regs.unlocked::<SourceCs, _>(i, |regs| {
            regs.modify_at::<SourceCs>(i, |r| r.with_en(false))
        })
    }

    /// Keep `source` running in stop mode, or not.
    #[inline]
    pub fn set_stop_enable(&mut self, source: Source, enabled: bool) {
        let i = source as usize;
        self.regs.unlocked::<SourceCs, _>(i, |regs| {
            regs.modify_at::<SourceCs>(i, |r| r.with_stop_en(enabled))
        })
    }

    /// Is `source` stable?
    #[inline]
    pub fn is_ready(&self, source: Source) -> bool {
        self.regs.read_at::<SourceCs>(source as usize).ready()
    }

    /// Switch the system clock to `source`, and wait for the switch.
    pub fn set_system_source(&mut self, source: SysSrc) -> Result<(), Error> {
        self.regs.unlocked::<Cfg, _>(0, |regs| {
            regs.modify::<Cfg>(|r| r.with_sys_src(source as u8))
        });
        wait_for(self.config.get_ready_timeout(), || {
            self.system_source() == Some(source)
        })
        .map_err(|e| {
            warn!("system clock switch timed out");
            e
        })
    }

    /// Get the source the system clock is running from.
    #[inline]
    pub fn system_source(&self) -> Option<SysSrc> {
        SysSrc::from_bits(self.regs.read::<Status>().sys_src())
    }

    /// Set the core, bus and slow clock dividers.
    #[inline]
    pub fn set_dividers(&mut self, dividers: Dividers) -> Result<(), Error> {
        if [dividers.core, dividers.bus, dividers.slow]
            .iter()
            .any(|div| *div > MAX_DIVIDER)
        {
            return Err(Error::OutOfRange);
        }
        self.regs.unlocked::<Cfg, _>(0, |regs| {
            regs.modify::<Cfg>(|r| {
                r.with_sys_div(dividers.core)
                    .with_bus_div(dividers.bus)
                    .with_slow_div(dividers.slow)
            })
        });
        Ok(())
    }

    /// Get the core, bus and slow clock dividers.
    #[inline]
    pub fn dividers(&self) -> Dividers {
        let cfg = self.regs.read::<Cfg>();
        Dividers {
            core: cfg.sys_div(),
            bus: cfg.bus_div(),
            slow: cfg.slow_div(),
        }
    }

    /// Configure the PLL. It must be disabled.
    #[inline]
    pub fn configure_pll(&mut self, pll: Pll) -> Result<(), Error> {
        if pll.prediv > MAX_DIVIDER || pll.postdiv > MAX_DIVIDER {
            return Err(Error::OutOfRange);
        }
        self.regs.unlocked::<SpllCfg, _>(0, |regs| {
            regs.modify::<SpllCfg>(|r| {
                r.with_prediv(pll.prediv)
                    .with_mult(pll.mult)
                    .with_postdiv(pll.postdiv)
            })
        });
        Ok(())
    }

    /// Monitor `source` for loss of clock. On loss, the chip resets if
    /// `reset` is set, and otherwise raises [Event].
    #[inline]
    pub fn enable_monitor(&mut self, source: Source, reset: bool) {
        let i = source as usize;
        self.regs.unlocked::<SourceCs, _>(i, |regs| {
            regs.modify_at::<SourceCs>(i, |r| r.with_cm_en(true).with_cm_reset(reset))
        })
    }

    /// Stop monitoring `source`.
    #[inline]
    pub fn disable_monitor(&mut self, source: Source) {
        let i = source as usize;
        self.regs.unlocked::<SourceCs, _>(i, |regs| {
            regs.modify_at::<SourceCs>(i, |r| r.with_cm_en(false))
        })
    }

    /// Has `source` lost its clock?
    #[inline]
    pub fn clock_lost(&self, source: Source) -> bool {
        self.regs.read_at::<SourceCs>(source as usize).loc()
    }

    /// Set or remove the callback for `event`.
    #[inline]
    pub fn install_callback(&mut self, event: Event, callback: Option<fn()>) {
        self.callbacks.install(event, callback);
    }

    /// Raise an interrupt on loss of the clock `event` watches.
    #[inline]
    pub fn enable_interrupt(&mut self, event: Event) {
        self.enable_monitor(event.source(), false)
    }

    /// Stop monitoring the clock `event` watches.
    #[inline]
    pub fn disable_interrupt(&mut self, event: Event) {
        self.disable_monitor(event.source())
    }
}

impl<B> Dispatch for Scc<B>
where
    B: Bus,
{
    type Kind = Event;
    const NAME: &'static str = "SCC";

    fn pending(&self) -> u32 {
        Event::ALL
            .iter()
            .filter(|event| {
                let cs = self.regs.read_at::<SourceCs>(event.source() as usize);
                cs.loc() && cs.cm_en() && !cs.cm_reset()
            })
            .fold(0, |active, event| active | event.mask())
    }

    fn clear(&mut self, active: u32) {
        for event in Event::ALL {
            if active & event.mask() != 0 {
                let i = event.source() as usize;
                self.regs.unlocked::<SourceCs, _>(i, |regs| {
                    regs.clear_flags_at::<SourceCs>(i, SOURCE_LOC)
                });
            }
        }
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
