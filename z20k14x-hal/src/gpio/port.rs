use crate::interrupt::{Dispatch, Kind};
use crate::lock::LockExt;
use crate::pac::gpio::{Gpio, Pddr, Pdir, Pdor, Pcor, Psor, Ptor};
use crate::pac::port::{self, IrqConfig, IrqFlg, Pcr};
use crate::pac::{Block, Bus, Mmio};

use super::{Direction, Error, Pin, PinConfig, PinState, PortId, Pull};

/// Number of pins on each port.
pub const PINS: u8 = 32;

/// Highest alternate function number.
pub const MAX_FUNCTION: u8 = 7;

#[inline(always)]
fn check(pin: u8) -> Result<usize, Error> {
    if pin < PINS {
        Ok(pin as usize)
    } else {
        Err(Error::InvalidPin)
    }
}

/// A pin interrupt line within one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Line(pub u8);

const LINES: [Line; PINS as usize] = {
    let mut lines = [Line(0); PINS as usize];
    let mut i = 0;
    while i < lines.len() {
        lines[i] = Line(i as u8);
        i += 1;
    }
    lines
};

impl Kind for Line {
    const ALL: &'static [Self] = &LINES;

    #[inline(always)]
    fn index(self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    fn mask(self) -> u32 {
        1 << self.0
    }
}

/// Pin interrupt callback, called with the port and pin number.
pub type PinCallback = fn(PortId, u8);

/// One pin port: the PORT configuration block and its GPIO data block.
#[derive(Debug)]
pub struct Port<B = Mmio> {
    id: PortId,
    port: Block<port::Port, B>,
    gpio: Block<Gpio, B>,
    callback: Option<PinCallback>,
}

impl<B> Port<B>
where
    B: Bus,
{
    #[inline]
    pub fn new(id: PortId, port: Block<port::Port, B>, gpio: Block<Gpio, B>) -> Self {
        Self {
            id,
            port,
            gpio,
            callback: None,
        }
    }

    #[inline]
    pub fn free(self) -> (Block<port::Port, B>, Block<Gpio, B>) {
        (self.port, self.gpio)
    }

    #[inline(always)]
    pub fn id(&self) -> PortId {
        self.id
    }

    // change one PCR inside its lock bracket
    fn update(&mut self, pin: u8, f: impl FnOnce(Pcr) -> Pcr) -> Result<(), Error> {
        let i = check(pin)?;
        self.port
            .unlocked::<Pcr, _>(i, |regs| regs.modify_at::<Pcr>(i, f));
        Ok(())
    }

    /// Set the electrical configuration of `pin`.
    pub fn set_pin_config(&mut self, pin: u8, config: PinConfig) -> Result<(), Error> {
        self.update(pin, |r| {
            r.with_pull_enable(config.pull != Pull::Floating)
                .with_pull_select(config.pull == Pull::Up)
                .with_slew_rate(config.slow_slew)
                .with_passive_filter(config.passive_filter)
                .with_open_drain(config.open_drain)
                .with_drive_strength(config.high_drive)
        })
    }

    /// Get the electrical configuration of `pin`.
    pub fn pin_config(&self, pin: u8) -> Result<PinConfig, Error> {
        let r = self.port.read_at::<Pcr>(check(pin)?);
        Ok(PinConfig {
            pull: match (r.pull_enable(), r.pull_select()) {
                (false, _) => Pull::Floating,
                (true, false) => Pull::Down,
                (true, true) => Pull::Up,
            },
            slow_slew: r.slew_rate(),
            passive_filter: r.passive_filter(),
            open_drain: r.open_drain(),
            high_drive: r.drive_strength(),
        })
    }

    /// Route `pin` to alternate function `mux`. 1 is GPIO.
    #[inline]
    pub fn set_pin_mux(&mut self, pin: u8, mux: u8) -> Result<(), Error> {
        if mux > MAX_FUNCTION {
            return Err(Error::InvalidFunction);
        }
        self.update(pin, |r| r.with_mux(mux))
    }

    /// Set the input or output direction of `pin`.
    #[inline]
    pub fn set_direction(&mut self, pin: u8, direction: Direction) -> Result<(), Error> {
        let mask = 1 << check(pin)?;
        self.gpio.modify::<Pddr>(|r| {
            r.with_pins(match direction {
                Direction::Input => r.pins() & !mask,
                Direction::Output => r.pins() | mask,
            })
        });
        Ok(())
    }

    #[inline]
    pub fn direction(&self, pin: u8) -> Result<Direction, Error> {
        let mask = 1 << check(pin)?;
        Ok(if self.gpio.read::<Pddr>().pins() & mask != 0 {
            Direction::Output
        } else {
            Direction::Input
        })
    }

    /// Drive every pin in `mask` high.
    #[inline(always)]
    pub fn set_pins(&mut self, mask: u32) {
        self.gpio.write(Psor::new().with_pins(mask))
    }

    /// Drive every pin in `mask` low.
    #[inline(always)]
    pub fn clear_pins(&mut self, mask: u32) {
        self.gpio.write(Pcor::new().with_pins(mask))
    }

    #[inline(always)]
    pub fn toggle_pins(&mut self, mask: u32) {
        self.gpio.write(Ptor::new().with_pins(mask))
    }

    /// Write the whole output word.
    #[inline(always)]
    pub fn write_pins(&mut self, pins: u32) {
        self.gpio.write(Pdor::new().with_pins(pins))
    }

    /// Read the input level of every pin.
    #[inline(always)]
    pub fn read_pins(&self) -> u32 {
        self.gpio.read::<Pdir>().pins()
    }

    /// Drive `pin` to `state`.
    #[inline]
    pub fn write_pin(&mut self, pin: u8, state: PinState) -> Result<(), Error> {
        let mask = 1 << check(pin)?;
        match state {
            PinState::High => self.set_pins(mask),
            PinState::Low => self.clear_pins(mask),
        }
        Ok(())
    }

    /// Borrow `pin` as an embedded-hal pin. Returns [None] past the
    /// last pin.
    #[inline]
    pub fn pin(&self, pin: u8) -> Option<Pin<'_, B>> {
        (pin < PINS).then(|| Pin::new(&self.gpio, self.id, pin))
    }

    /// Set or remove the callback for every pin of this port.
    #[inline]
    pub fn install_callback(&mut self, callback: Option<PinCallback>) {
        self.callback = callback;
    }

    /// Raise an interrupt from `pin` on `config`.
    #[inline]
    pub fn enable_interrupt(&mut self, pin: u8, config: IrqConfig) -> Result<(), Error> {
        self.update(pin, |r| r.with_irq_config(config as u8))
    }

    #[inline]
    pub fn disable_interrupt(&mut self, pin: u8) -> Result<(), Error> {
        self.update(pin, |r| r.with_irq_config(IrqConfig::Disabled as u8))
    }

    /// The interrupt and DMA trigger setting of `pin`.
    #[inline]
    pub fn interrupt_config(&self, pin: u8) -> Result<Option<IrqConfig>, Error> {
        let r = self.port.read_at::<Pcr>(check(pin)?);
        Ok(IrqConfig::from_bits(r.irq_config()))
    }

    /// Pins with a pending interrupt flag.
    #[inline(always)]
    pub fn pending_pins(&self) -> u32 {
        self.port.read::<IrqFlg>().pins()
    }

    /// Clear the interrupt flag of every pin in `mask`.
    ///
    /// A locked PCR also locks its flag, so every PCR named in `mask`
    /// is unlocked around a single flag write, and locked again after.
    #[inline]
    pub fn clear_pins_interrupt(&mut self, mask: u32) {
        self.port.unlocked_mask::<Pcr, _>(mask, |regs| {
            regs.write(IrqFlg::new().with_pins(mask))
        })
    }

    // pins whose PCR raises an interrupt rather than a DMA request
    fn interrupt_enabled(&self) -> u32 {
        (0..PINS)
            .filter(|pin| {
                let bits = self.port.read_at::<Pcr>(*pin as usize).irq_config();
                IrqConfig::from_bits(bits).is_some_and(IrqConfig::is_interrupt)
            })
            .fold(0, |enabled, pin| enabled | 1 << pin)
    }
}

impl<B> Dispatch for Port<B>
where
    B: Bus,
{
    type Kind = Line;
    const NAME: &'static str = "PORT";

    fn pending(&self) -> u32 {
        let flags = self.pending_pins();
        if flags == 0 {
            0
        } else {
            flags & self.interrupt_enabled()
        }
    }

    fn clear(&mut self, active: u32) {
        self.clear_pins_interrupt(active)
    }

    fn invoke(&mut self, line: Line) -> bool {
        match self.callback {
            Some(f) => {
                f(self.id, line.0);
                true
            }
            None => false,
        }
    }

    fn mask(&mut self, line: Line) {
        // lines only come from LINES
        let _ = self.disable_interrupt(line.0);
    }

    fn barrier(&self) {
        self.port.barrier()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use quickcheck_macros::quickcheck;
    use std::sync::Mutex;
    use std::vec::Vec;

    use crate::interrupt::InterruptSource;
    use crate::pac::mock::{Access, Mock, Model};
    use crate::pac::{Lockable, Register};

    const ID: PortId = PortId::A;
    const PORT: u32 = ID.bases().0;
    const GPIO: u32 = ID.bases().1;
    const IRQFLG: u32 = PORT + IrqFlg::OFFSET;
    const LOCK: u32 = Pcr::LOCK;

    fn pcr(pin: u32) -> u32 {
        PORT + Pcr::OFFSET + 4 * pin
    }

    fn mock() -> Mock {
        let mock = Mock::new();
        for pin in 0..PINS as u32 {
            mock.model(
                pcr(pin),
                Model::locked(LOCK, port::KEY).write_only(0xff00_0000),
            );
            mock.set(pcr(pin), LOCK);
        }
        // a locked PCR keeps its flag
        mock.on_write(IRQFLG, |memory, value| {
            let open = (0..PINS as u32)
                .filter(|pin| memory.get(pcr(*pin)) & LOCK == 0)
                .fold(0, |open, pin| open | 1 << pin);
            memory.update(IRQFLG, |flags| flags & !(value & open));
        });
        mock
    }

    fn port(mock: &Mock) -> Port<&Mock> {
        Port::new(ID, mock.block(PORT), mock.block(GPIO))
    }

    #[test]
    fn clear_brackets_named_pins_only() {
        let mock = mock();
        mock.set(IRQFLG, 0xff);
        let mut port = port(&mock);
        port.clear_pins_interrupt(0xf);

        let mut expected: Vec<(u32, u32)> = (0..4).map(|pin| (pcr(pin), port::KEY)).collect();
        expected.push((IRQFLG, 0xf));
        expected.extend((0..4).map(|pin| (pcr(pin), LOCK)));
        assert_eq!(mock.writes(), expected);

        assert_eq!(mock.get(IRQFLG), 0xf0);
        for pin in 0..PINS as u32 {
            assert_eq!(mock.get(pcr(pin)), LOCK);
        }
    }

    #[quickcheck]
    fn clear_any_mask(flags: u32, mask: u32) -> bool {
        let mock = mock();
        mock.set(IRQFLG, flags);
        let mut port = port(&mock);
        port.clear_pins_interrupt(mask);

        let touched = (0..PINS as u32).all(|pin| {
            let written = !mock.writes_to(pcr(pin)).is_empty();
            written == (mask & 1 << pin != 0) && mock.get(pcr(pin)) == LOCK
        });
        touched && mock.get(IRQFLG) == flags & !mask && mock.writes_to(IRQFLG) == [mask]
    }

    #[test]
    fn locked_flags_survive_plain_writes() {
        let mock = mock();
        mock.set(IRQFLG, 0x3);
        let port = port(&mock);
        let (regs, _) = port.free();
        regs.write(IrqFlg::new().with_pins(0x3));
        assert_eq!(mock.get(IRQFLG), 0x3);
    }

    #[test]
    fn pin_config_round_trip() {
        let mock = mock();
        let mut port = port(&mock);
        let config = PinConfig {
            pull: Pull::Up,
            open_drain: true,
            ..Default::default()
        };
        assert_eq!(port.set_pin_config(5, config), Ok(()));
        assert_eq!(port.set_pin_mux(5, 1), Ok(()));
        assert_eq!(port.pin_config(5), Ok(config));
        assert_eq!(Pcr::from(mock.get(pcr(5))).mux(), 1);
        assert!(Pcr::from(mock.get(pcr(5))).locked());
    }

    static CALLS: Mutex<Vec<(PortId, u8)>> = Mutex::new(Vec::new());

    fn record(port: PortId, pin: u8) {
        if let Ok(mut calls) = CALLS.lock() {
            calls.push((port, pin));
        }
    }

    #[quickcheck]
    fn pin_dispatch(flags: u32, enabled: u32, dma: u32, installed: bool) -> bool {
        let dma = dma & !enabled;
        let mock = mock();
        mock.set(IRQFLG, flags);
        for pin in 0..PINS as u32 {
            let config = if enabled & 1 << pin != 0 {
                IrqConfig::Rising
            } else if dma & 1 << pin != 0 {
                IrqConfig::DmaRising
            } else {
                IrqConfig::Disabled
            };
            mock.set(pcr(pin), LOCK | (config as u32) << 16);
        }
        let mut port = port(&mock);
        if installed {
            port.install_callback(Some(record));
        }
        if let Ok(mut calls) = CALLS.lock() {
            calls.clear();
        }

        port.handle();

        let active = flags & enabled;
        let expected: Vec<(PortId, u8)> = if installed {
            (0..PINS).filter(|pin| active & 1 << pin != 0).map(|pin| (ID, pin)).collect()
        } else {
            Vec::new()
        };
        let recorded = CALLS.lock().map(|c| c.clone()).unwrap_or_default();

        let masked = (0..PINS as u32).all(|pin| {
            let config = IrqConfig::from_bits(Pcr::from(mock.get(pcr(pin))).irq_config());
            let expect = if active & 1 << pin != 0 && !installed {
                Some(IrqConfig::Disabled)
            } else if enabled & 1 << pin != 0 {
                Some(IrqConfig::Rising)
            } else if dma & 1 << pin != 0 {
                Some(IrqConfig::DmaRising)
            } else {
                Some(IrqConfig::Disabled)
            };
            config == expect && mock.get(pcr(pin)) & LOCK != 0
        });

        recorded == expected
            && masked
            && mock.get(IRQFLG) == flags & !active
            && mock.journal().last() == Some(&Access::Barrier)
    }

    #[test]
    fn pins_drive_data_registers() {
        use embedded_hal_1::digital::{InputPin, OutputPin, StatefulOutputPin};

        let mock = mock();
        let mut port = port(&mock);
        assert_eq!(port.set_direction(3, Direction::Output), Ok(()));
        assert_eq!(port.direction(3), Ok(Direction::Output));
        mock.set(GPIO + Pdir::OFFSET, 1 << 7);

        let Some(mut pin) = port.pin(3) else {
            panic!("pin 3 exists");
        };
        OutputPin::set_high(&mut pin).unwrap();
        StatefulOutputPin::toggle(&mut pin).unwrap();
        mock.set(GPIO + Pdor::OFFSET, 1 << 3);
        assert!(StatefulOutputPin::is_set_high(&mut pin).unwrap());

        let Some(mut input) = port.pin(7) else {
            panic!("pin 7 exists");
        };
        assert!(InputPin::is_high(&mut input).unwrap());
        assert!(port.pin(32).is_none());

        assert_eq!(mock.writes_to(GPIO + Psor::OFFSET), [1 << 3]);
        assert_eq!(mock.writes_to(GPIO + Ptor::OFFSET), [1 << 3]);
    }

    #[test]
    fn out_of_range_pins_touch_nothing() {
        let mock = mock();
        mock.set(IRQFLG, 0xff);
        let mut port = port(&mock);

        assert_eq!(
            port.set_pin_config(PINS, PinConfig::default()),
            Err(Error::InvalidPin)
        );
        assert_eq!(port.set_pin_config(40, PinConfig::default()), Err(Error::InvalidPin));
        assert_eq!(port.set_pin_mux(5, 8), Err(Error::InvalidFunction));
        assert_eq!(port.set_pin_mux(32, 1), Err(Error::InvalidPin));
        assert_eq!(port.set_direction(32, Direction::Output), Err(Error::InvalidPin));
        assert_eq!(port.write_pin(33, PinState::High), Err(Error::InvalidPin));
        assert_eq!(
            port.enable_interrupt(255, IrqConfig::Rising),
            Err(Error::InvalidPin)
        );
        assert_eq!(port.pin_config(32), Err(Error::InvalidPin));
        assert_eq!(port.interrupt_config(32), Err(Error::InvalidPin));

        assert!(mock.writes().is_empty());
        assert_eq!(mock.get(IRQFLG), 0xff);
        assert_eq!(port.set_pin_mux(5, MAX_FUNCTION), Ok(()));
    }
}
