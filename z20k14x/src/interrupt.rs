/// Device interrupt numbers, as seen by the NVIC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Interrupt {
    Scm = 2,
    Flash = 3,
    Scc = 7,
    Rtc = 8,
    Cmu0 = 10,
    Cmu1 = 11,
    Cmu2 = 12,
    Cmu3 = 13,
    PortA = 16,
    PortB = 17,
    PortC = 18,
    PortD = 19,
    PortE = 20,
    Uart0 = 24,
    Uart1 = 25,
    Uart2 = 26,
    Uart3 = 27,
    Uart4 = 28,
    Uart5 = 29,
    Tim0 = 32,
    Tim1 = 33,
    Tim2 = 34,
    Tim3 = 35,
    Mcpwm0 = 40,
    Mcpwm1 = 41,
}

/// Number of device interrupt lines.
pub const INTERRUPT_COUNT: usize = 48;

impl Interrupt {
    /// Every interrupt driven by this crate, in vector order.
    pub const ALL: [Interrupt; 25] = [
        Self::Scm,
        Self::Flash,
        Self::Scc,
        Self::Rtc,
        Self::Cmu0,
        Self::Cmu1,
        Self::Cmu2,
        Self::Cmu3,
        Self::PortA,
        Self::PortB,
        Self::PortC,
        Self::PortD,
        Self::PortE,
        Self::Uart0,
        Self::Uart1,
        Self::Uart2,
        Self::Uart3,
        Self::Uart4,
        Self::Uart5,
        Self::Tim0,
        Self::Tim1,
        Self::Tim2,
        Self::Tim3,
        Self::Mcpwm0,
        Self::Mcpwm1,
    ];

    /// Look up an interrupt by its vector number.
    #[inline]
    pub fn from_number(number: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|irq| *irq as u16 == number)
    }
}

// safety: every discriminant is a valid, unique NVIC line below
// INTERRUPT_COUNT
unsafe impl cortex_m::interrupt::InterruptNumber for Interrupt {
    #[inline(always)]
    fn number(self) -> u16 {
        self as u16
    }
}
