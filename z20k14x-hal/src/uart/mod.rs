//! UART, with LIN master and slave framing.

mod config;
pub use config::*;

mod hal;

mod lin;
pub use lin::*;

use crate::interrupt::{kinds, Callbacks, Dispatch, Kind};
use crate::pac::uart::{self, Baud, Ctrl, Data, Ier, Isr, Lcr, Lsr, ISR_W1C};
use crate::pac::{Block, Bus, Mmio};
use crate::time::Hertz;

/// UART error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A baud rate or LIN frame setting is out of range.
    OutOfRange,
    /// A received byte was lost.
    Overrun,
    /// A received byte had bad parity.
    Parity,
    /// A received byte had no stop bit.
    Framing,
    /// A break was received.
    Break,
}

impl core::fmt::Display for Error {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "UART Error {:?}", self)
    }
}

kinds! {
    /// UART interrupts.
    pub enum Event {
        /// Received data is available. Cleared by reading it.
        RxData = 1 << 0,
        /// The transmitter can take more data. Cleared by writing it.
        TxEmpty = 1 << 1,
        /// A line error was flagged in LSR.
        LineStatus = 1 << 2,
        LinBreak = 1 << 8,
        SyncError = 1 << 9,
        PidError = 1 << 10,
        ChecksumError = 1 << 11,
        Timeout = 1 << 12,
        HeaderDone = 1 << 13,
        ResponseDone = 1 << 14,
    }
}

// LSR receive error flags
const LSR_ERRORS: u32 = 0x1e;

/// A configured UART.
#[derive(Debug)]
pub struct Uart<B = Mmio> {
    regs: Block<uart::Uart, B>,
    callbacks: Callbacks<Event, { Event::COUNT }>,
}

impl<B> Uart<B>
where
    B: Bus,
{
    /// Configure a UART whose functional clock runs at `clock`.
    /// Returns [Error::OutOfRange] if the baud rate is not achievable.
    pub fn new(regs: Block<uart::Uart, B>, clock: Hertz, config: Config) -> Result<Self, Error> {
        let divisor = config::divisor(clock, config.get_baud()).ok_or(Error::OutOfRange)?;

        regs.write(Ctrl::new());
        regs.write(Ier::new());
        regs.write(Baud::new().with_divisor(divisor));
        regs.write(
            Lcr::new()
                .with_word_len(config.get_word_length() as u8)
                .with_stop2(config.get_stop_bits() == StopBits::Two)
                .with_parity_en(config.get_parity() != Parity::None)
                .with_even(config.get_parity() == Parity::Even),
        );
        regs.write(
            Ctrl::new()
                .with_tx_en(true)
                .with_rx_en(true)
                .with_fifo_en(config.get_fifo()),
        );

        Ok(Self {
            regs,
            callbacks: Callbacks::new(),
        })
    }

    /// Disable the UART and recover its registers.
    #[inline]
    pub fn free(self) -> Block<uart::Uart, B> {
        self.regs.write(Ctrl::new());
        self.regs
    }

    /// Change the baud rate. Returns [Error::OutOfRange] if it is not
    /// achievable, leaving the old rate in place.
    #[inline]
    pub fn set_baud(&mut self, clock: Hertz, baud: Hertz) -> Result<(), Error> {
        let divisor = config::divisor(clock, baud).ok_or(Error::OutOfRange)?;
        self.regs.write(Baud::new().with_divisor(divisor));
        Ok(())
    }

    /// Get the baud rate.
    #[inline]
    pub fn baud(&self, clock: Hertz) -> Hertz {
        let divisor = (self.regs.read::<Baud>().divisor() as u32).max(1);
        clock / (16 * divisor)
    }

    /// Read one received byte.
    ///
    /// Line errors are reported, and cleared, before the data they
    /// belong to.
    pub fn read_byte(&mut self) -> nb::Result<u8, Error> {
        let lsr = self.regs.read::<Lsr>();
        if u32::from(lsr) & LSR_ERRORS != 0 {
            self.regs.clear_flags::<Lsr>(LSR_ERRORS);
            let error = if lsr.overrun() {
                Error::Overrun
            } else if lsr.parity() {
                Error::Parity
            } else if lsr.framing() {
                Error::Framing
            } else {
                Error::Break
            };
            debug!("UART receive error");
            return Err(nb::Error::Other(error));
        }
        if !lsr.data_ready() {
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.regs.read::<Data>().data())
    }

    /// Queue one byte for transmission.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) -> nb::Result<(), Error> {
        if !self.regs.read::<Lsr>().thr_empty() {
            return Err(nb::Error::WouldBlock);
        }
        self.regs.write(Data::new().with_data(byte));
        Ok(())
    }

    /// Wait for every queued byte to leave the transmitter.
    #[inline]
    pub fn flush(&mut self) -> nb::Result<(), Error> {
        if self.regs.read::<Lsr>().tx_idle() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Is a received byte waiting?
    #[inline]
    pub fn is_rx_ready(&self) -> bool {
        self.regs.read::<Lsr>().data_ready()
    }

    /// Can a byte be queued?
    #[inline]
    pub fn is_tx_ready(&self) -> bool {
        self.regs.read::<Lsr>().thr_empty()
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

impl<B> Dispatch for Uart<B>
where
    B: Bus,
{
    type Kind = Event;
    const NAME: &'static str = "UART";

    fn pending(&self) -> u32 {
        u32::from(self.regs.read::<Isr>()) & u32::from(self.regs.read::<Ier>())
    }

    fn clear(&mut self, active: u32) {
        // rx and tx clear through the data register
        if active & ISR_W1C != 0 {
            self.regs.clear_flags::<Isr>(active & ISR_W1C)
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
