use embedded_hal_nb::serial as hal1nb;
use embedded_io as hal1;

use crate::pac::Bus;

use super::{Error, Uart};

impl hal1nb::Error for Error {
    #[inline]
    fn kind(&self) -> hal1nb::ErrorKind {
        match self {
            Self::Overrun => hal1nb::ErrorKind::Overrun,
            Self::Parity => hal1nb::ErrorKind::Parity,
            Self::Framing => hal1nb::ErrorKind::FrameFormat,
            Self::OutOfRange | Self::Break => hal1nb::ErrorKind::Other,
        }
    }
}

impl hal1::Error for Error {
    #[inline]
    fn kind(&self) -> hal1::ErrorKind {
        hal1::ErrorKind::Other
    }
}

impl<B> hal1nb::ErrorType for Uart<B>
where
    B: Bus,
{
    type Error = Error;
}

impl<B> hal1::ErrorType for Uart<B>
where
    B: Bus,
{
    type Error = Error;
}

impl<B> hal1nb::Read<u8> for Uart<B>
where
    B: Bus,
{
    #[inline]
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.read_byte()
    }
}

impl<B> hal1nb::Write<u8> for Uart<B>
where
    B: Bus,
{
    #[inline]
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.write_byte(word)
    }

    #[inline]
    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Uart::flush(self)
    }
}

impl<B> hal1::Read for Uart<B>
where
    B: Bus,
{
    /// Block for the first byte, then take whatever else has arrived.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some((first, rest)) = buf.split_first_mut() else {
            return Ok(0);
        };
        *first = nb::block!(self.read_byte())?;

        let mut count = 1;
        for byte in rest {
            match self.read_byte() {
                Ok(b) => *byte = b,
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => return Err(e),
            }
            count += 1;
        }
        Ok(count)
    }
}

impl<B> hal1::ReadReady for Uart<B>
where
    B: Bus,
{
    #[inline]
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.is_rx_ready())
    }
}

impl<B> hal1::Write for Uart<B>
where
    B: Bus,
{
    /// Block for room for the first byte, then queue what fits.
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let Some((first, rest)) = buf.split_first() else {
            return Ok(0);
        };
        nb::block!(self.write_byte(*first))?;

        let mut count = 1;
        for byte in rest {
            match self.write_byte(*byte) {
                Ok(()) => count += 1,
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
        Ok(count)
    }

    #[inline]
    fn flush(&mut self) -> Result<(), Self::Error> {
        nb::block!(Uart::flush(self))
    }
}

impl<B> hal1::WriteReady for Uart<B>
where
    B: Bus,
{
    #[inline]
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.is_tx_ready())
    }
}
