//! GPIO data registers, one bit per pin.

use crate::register::{peripheral, register, word_register};

peripheral!(
    /// The GPIO register block.
    Gpio
);

word_register!(
    /// 0x00 Output data.
    Pdor,
    pins
);
register!(Pdor: Gpio, 0x00);

word_register!(
    /// 0x04 Set output, write only.
    Psor,
    pins
);
register!(Psor: Gpio, 0x04);

word_register!(
    /// 0x08 Clear output, write only.
    Pcor,
    pins
);
register!(Pcor: Gpio, 0x08);

word_register!(
    /// 0x0C Toggle output, write only.
    Ptor,
    pins
);
register!(Ptor: Gpio, 0x0c);

word_register!(
    /// 0x10 Input data, read only.
    Pdir,
    pins
);
register!(Pdir: Gpio, 0x10);

word_register!(
    /// 0x14 Direction, 1 is output.
    Pddr,
    pins
);
register!(Pddr: Gpio, 0x14);
