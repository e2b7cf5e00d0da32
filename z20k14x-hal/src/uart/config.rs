use crate::time::{Hertz, RateExtU32};

/// Data bits per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WordLength {
    Five = 0,
    Six = 1,
    Seven = 2,
    Eight = 3,
}

/// Parity bit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

/// UART line configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    baud: Hertz,
    word_length: WordLength,
    parity: Parity,
    stop_bits: StopBits,
    fifo: bool,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            baud: 115_200.Hz(),
            word_length: WordLength::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            fifo: true,
        }
    }
}

impl Config {
    /// Set the baud rate.
    #[inline(always)]
    pub fn baud(self, baud: Hertz) -> Self {
        Self { baud, ..self }
    }

    /// Get the baud rate.
    #[inline(always)]
    pub fn get_baud(&self) -> Hertz {
        self.baud
    }

    #[inline(always)]
    pub fn word_length(self, word_length: WordLength) -> Self {
        Self {
            word_length,
            ..self
        }
    }

    #[inline(always)]
    pub fn get_word_length(&self) -> WordLength {
        self.word_length
    }

    #[inline(always)]
    pub fn parity(self, parity: Parity) -> Self {
        Self { parity, ..self }
    }

    #[inline(always)]
    pub fn get_parity(&self) -> Parity {
        self.parity
    }

    #[inline(always)]
    pub fn stop_bits(self, stop_bits: StopBits) -> Self {
        Self { stop_bits, ..self }
    }

    #[inline(always)]
    pub fn get_stop_bits(&self) -> StopBits {
        self.stop_bits
    }

    /// Enable or disable the 16 byte FIFOs.
    #[inline(always)]
    pub fn fifo(self, fifo: bool) -> Self {
        Self { fifo, ..self }
    }

    #[inline(always)]
    pub fn get_fifo(&self) -> bool {
        self.fifo
    }
}

/// Divisor for `baud` at 16x oversampling from `clock`, rounded to
/// nearest. Returns [None] if it does not fit the BAUD register.
pub(super) fn divisor(clock: Hertz, baud: Hertz) -> Option<u16> {
    let step = baud.raw().checked_mul(16)?;
    if step == 0 {
        return None;
    }
    let divisor = clock.raw().checked_add(step / 2)? / step;
    match u16::try_from(divisor) {
        Ok(0) | Err(_) => None,
        Ok(divisor) => Some(divisor),
    }
}
