//! Per-module clock gating, reset and access control.

use crate::lock::LockExt;
use crate::pac::sysctrl::{self, Parcc, ResetStatus};
use crate::pac::{Block, Bus, Mmio};

/// Highest functional clock source.
pub const MAX_CLOCK_MUX: u8 = 7;

/// Largest functional clock divider.
pub const MAX_CLOCK_DIV: u8 = 16;

/// SYSCTRL error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A clock setting does not fit its register field.
    OutOfRange,
}

impl core::fmt::Display for Error {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "SYSCTRL Error {:?}", self)
    }
}

/// Control clocks, resets and register access of individual modules.
pub struct Sysctrl<B = Mmio> {
    regs: Block<sysctrl::Sysctrl, B>,
}

impl<B> core::fmt::Debug for Sysctrl<B>
where
    B: Bus,
{
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut tup = f.debug_tuple("Sysctrl");
        for module in Module::ALL {
            if self.is_enabled(*module) {
                tup.field(module);
            }
        }
        tup.finish()
    }
}

#[cfg(feature = "defmt")]
impl<B> defmt::Format for Sysctrl<B>
where
    B: Bus,
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Sysctrl(");
        let mut first = true;
        for module in Module::ALL {
            if self.is_enabled(*module) {
                if first {
                    defmt::write!(f, "{}", module);
                    first = false;
                } else {
                    defmt::write!(f, ", {}", module);
                }
            }
        }
        defmt::write!(f, ")");
    }
}

// one PARCC slot per module, plus named shorthands for each
macro_rules! modules {
    {$(($var:ident, $name:ident, $slot:expr)),+ $(,)?} => {
        /// Every module with a PARCC register.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum Module {
            $($var = $slot,)+
        }

        impl Module {
            /// Every module, in PARCC order.
            pub const ALL: &'static [Module] = &[$(Module::$var),+];

            /// Index of this module's PARCC register.
            #[inline(always)]
            pub const fn slot(self) -> usize {
                self as usize
            }
        }

        paste::paste! {
            impl<B> Sysctrl<B>
            where
                B: Bus,
            {
                $(
                    #[inline(always)]
                    #[doc = concat!("Enable ", stringify!($var), ".")]
                    pub fn [<enable_ $name>](&mut self) -> &mut Self {
                        self.enable_module(Module::$var)
                    }

                    #[inline(always)]
                    #[doc = concat!("Disable ", stringify!($var), ".")]
                    pub fn [<disable_ $name>](&mut self) -> &mut Self {
                        self.disable_module(Module::$var)
                    }

                    #[inline(always)]
                    #[doc = concat!("Get whether ", stringify!($var), " is enabled.")]
                    pub fn [<is_ $name _enabled>](&self) -> bool {
                        self.is_enabled(Module::$var)
                    }
                )+
            }
        }
    };
}

modules! {
    (PortA, porta, 0),
    (PortB, portb, 1),
    (PortC, portc, 2),
    (PortD, portd, 3),
    (PortE, porte, 4),
    (Gpio, gpio, 5),
    (Uart0, uart0, 6),
    (Uart1, uart1, 7),
    (Uart2, uart2, 8),
    (Uart3, uart3, 9),
    (Uart4, uart4, 10),
    (Uart5, uart5, 11),
    (Tim0, tim0, 12),
    (Tim1, tim1, 13),
    (Tim2, tim2, 14),
    (Tim3, tim3, 15),
    (Mcpwm0, mcpwm0, 16),
    (Mcpwm1, mcpwm1, 17),
    (Rtc, rtc, 18),
    (Cmu, cmu, 19),
    (Flash, flash, 20),
    (Scm, scm, 21),
    (Dma, dma, 22),
}

impl<B> Sysctrl<B>
where
    B: Bus,
{
    #[inline(always)]
    pub fn new(regs: Block<sysctrl::Sysctrl, B>) -> Self {
        Self { regs }
    }

    #[inline(always)]
    pub fn free(self) -> Block<sysctrl::Sysctrl, B> {
        self.regs
    }

    // change one PARCC register inside its lock bracket
    fn update(&mut self, module: Module, f: impl FnOnce(Parcc) -> Parcc) {
        let slot = module.slot();
        self.regs
            .unlocked::<Parcc, _>(slot, |regs| regs.modify_at::<Parcc>(slot, f))
    }

    /// Clock a module, and release it from reset.
    #[inline]
    pub fn enable_module(&mut self, module: Module) -> &mut Self {
        self.update(module, |r| r.with_clk_en(true).with_prstb(true));
        self
    }

    /// Stop a module's clock.
    #[inline]
    pub fn disable_module(&mut self, module: Module) -> &mut Self {
        self.update(module, |r| r.with_clk_en(false));
        self
    }

    #[inline]
    pub fn set_enabled(&mut self, module: Module, enabled: bool) -> &mut Self {
        if enabled {
            self.enable_module(module)
        } else {
            self.disable_module(module)
        }
    }

    /// Get whether a module is clocked.
    #[inline]
    pub fn is_enabled(&self, module: Module) -> bool {
        self.regs.read_at::<Parcc>(module.slot()).clk_en()
    }

    /// Pulse a module's reset.
    #[inline]
    pub fn reset_module(&mut self, module: Module) -> &mut Self {
        let slot = module.slot();
        self.regs.unlocked::<Parcc, _>(slot, |regs| {
            regs.modify_at::<Parcc>(slot, |r| r.with_prstb(false));
            regs.modify_at::<Parcc>(slot, |r| r.with_prstb(true));
        });
        self
    }

    /// Pick a module's functional clock source `mux`, up to
    /// [MAX_CLOCK_MUX], and divide it by `div`, from 1 to
    /// [MAX_CLOCK_DIV].
    #[inline]
    pub fn set_clock(&mut self, module: Module, mux: u8, div: u8) -> Result<&mut Self, Error> {
        if mux > MAX_CLOCK_MUX || !(1..=MAX_CLOCK_DIV).contains(&div) {
            return Err(Error::OutOfRange);
        }
        self.update(module, |r| r.with_clk_mux(mux).with_clk_div(div - 1));
        Ok(self)
    }

    /// Restrict register access to a module.
    ///
    /// `write_lock` makes the module's registers ignore writes, and
    /// `supervisor` limits access to privileged code. The flash write
    /// lock is left alone, since it would stop the flash driver from
    /// ever running a command again.
    pub fn set_write_control(
        &mut self,
        module: Module,
        write_lock: bool,
        supervisor: bool,
    ) -> &mut Self {
        if module == Module::Flash {
            if write_lock {
                debug!("flash write lock is never set");
            }
            self.update(module, |r| r.with_psup(supervisor));
        } else {
            self.update(module, |r| r.with_pwlk(write_lock).with_psup(supervisor));
        }
        self
    }

    /// Why the chip last came out of reset.
    #[inline]
    pub fn reset_status(&self) -> ResetStatus {
        self.regs.read()
    }
}
