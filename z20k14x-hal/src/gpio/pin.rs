use crate::pac::gpio::{Gpio, Pcor, Pdir, Pdor, Psor, Ptor};
use crate::pac::{Block, Bus, Mmio};

use super::{PinState, PortId};

/// One GPIO pin, borrowed from its [super::Port].
///
/// Pins only use the set, clear and toggle registers to change their
/// output, so several pins of one port can be driven independently.
pub struct Pin<'a, B = Mmio> {
    gpio: &'a Block<Gpio, B>,
    port: PortId,
    n: u8,
}

impl<B> core::fmt::Debug for Pin<'_, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "P{:?}{}", self.port, self.n)
    }
}

#[cfg(feature = "defmt")]
impl<B> defmt::Format for Pin<'_, B> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "P{}{}", self.port, self.n)
    }
}

impl<'a, B> Pin<'a, B>
where
    B: Bus,
{
    pub(super) fn new(gpio: &'a Block<Gpio, B>, port: PortId, n: u8) -> Self {
        Self { gpio, port, n }
    }

    #[inline(always)]
    fn mask(&self) -> u32 {
        1 << self.n
    }

    /// The port this pin belongs to.
    #[inline(always)]
    pub fn port(&self) -> PortId {
        self.port
    }

    /// The pin number within its port.
    #[inline(always)]
    pub fn number(&self) -> u8 {
        self.n
    }

    /// Read the pin input.
    #[inline(always)]
    pub fn read(&self) -> PinState {
        (self.gpio.read::<Pdir>().pins() & self.mask() != 0).into()
    }

    #[inline(always)]
    pub fn is_high(&self) -> bool {
        self.read().is_high()
    }

    #[inline(always)]
    pub fn is_low(&self) -> bool {
        self.read().is_low()
    }

    /// Get the state the output is driven to.
    #[inline(always)]
    pub fn get_state(&self) -> PinState {
        (self.gpio.read::<Pdor>().pins() & self.mask() != 0).into()
    }

    #[inline(always)]
    pub fn is_set_high(&self) -> bool {
        self.get_state().is_high()
    }

    #[inline(always)]
    pub fn is_set_low(&self) -> bool {
        self.get_state().is_low()
    }

    #[inline(always)]
    pub fn set_state(&mut self, state: PinState) {
        match state {
            PinState::High => self.gpio.write(Psor::new().with_pins(self.mask())),
            PinState::Low => self.gpio.write(Pcor::new().with_pins(self.mask())),
        }
    }

    #[inline(always)]
    pub fn set_high(&mut self) {
        self.set_state(PinState::High);
    }

    #[inline(always)]
    pub fn set_low(&mut self) {
        self.set_state(PinState::Low);
    }

    #[inline(always)]
    pub fn toggle(&mut self) {
        self.gpio.write(Ptor::new().with_pins(self.mask()))
    }
}
