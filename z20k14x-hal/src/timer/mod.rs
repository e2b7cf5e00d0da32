//! General purpose timers (TIM) and motor control PWM (MCPWM).
//!
//! Both keep their counter setup behind a write protect bit in GLBCR.
//! Unlike the keyed locks elsewhere, it is set and cleared directly:
//! while it is set, the hardware ignores writes to the counter, modulo
//! and channel registers.

pub mod mcpwm;
pub use mcpwm::Mcpwm;

pub mod tim;
pub use tim::Tim;

/// Timer error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The channel number is past the last channel.
    InvalidChannel,
    /// A setting does not fit its register field.
    OutOfRange,
}

impl core::fmt::Display for Error {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Timer Error {:?}", self)
    }
}

// channel accessors, identical on both timer kinds
macro_rules! channel_methods {
    () => {
        /// Set the compare value of `channel`, below [CHANNELS].
        #[inline]
        pub fn set_channel_value(&mut self, channel: usize, value: u16) -> Result<(), Error> {
            if channel >= CHANNELS {
                return Err(Error::InvalidChannel);
            }
            self.regs
                .write_at(channel, ChValue::new().with_value(value));
            Ok(())
        }

        #[inline]
        pub fn channel_value(&self, channel: usize) -> Result<u16, Error> {
            if channel >= CHANNELS {
                return Err(Error::InvalidChannel);
            }
            Ok(self.regs.read_at::<ChValue>(channel).value())
        }
    };
}

// GLBCR.WPEN handling, identical on both timer kinds
macro_rules! write_protect_methods {
    () => {
        /// Make the counter, modulo and channel registers ignore writes.
        #[inline(always)]
        pub fn enable_write_protect(&mut self) {
            self.regs.modify::<Glbcr>(|r| r.with_wp_en(true))
        }

        /// Allow writes to the counter, modulo and channel registers.
        #[inline(always)]
        pub fn disable_write_protect(&mut self) {
            self.regs.modify::<Glbcr>(|r| r.with_wp_en(false))
        }

        #[inline(always)]
        pub fn is_write_protected(&self) -> bool {
            self.regs.read::<Glbcr>().wp_en()
        }
    };
}

// IER bit handling and the W1C status readout, identical on both
macro_rules! interrupt_methods {
    () => {
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

        #[inline]
        pub fn status(&self) -> Status {
            self.regs.read()
        }

        /// Clear the status flags in `mask`, a combination of [Event]
        /// masks.
        #[inline]
        pub fn clear_status(&mut self, mask: u32) {
            self.regs.clear_flags::<Status>(mask)
        }
    };
}

// Dispatch over the W1C status word, masked by IER
macro_rules! impl_dispatch {
    ($timer:ident, $name:literal) => {
        impl<B> Dispatch for $timer<B>
        where
            B: Bus,
        {
            type Kind = Event;
            const NAME: &'static str = $name;

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
    };
}

use {channel_methods, impl_dispatch, interrupt_methods, write_protect_methods};
