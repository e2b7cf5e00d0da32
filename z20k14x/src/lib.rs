#![no_std]

//! Register map for the Z20K14xM microcontroller family.
//!
//! Each peripheral module declares a marker type for the register
//! block and one [bitfield_struct] layout per register, carrying only
//! the fields the drivers use. Registers are reached through a
//! [Block], which combines a [Bus], a base address, and the marker
//! type, so a layout can only ever be read from the peripheral it
//! belongs to.

#[cfg(feature = "mock")]
extern crate std;

mod bus;
pub use bus::*;

mod register;
pub use register::*;

mod interrupt;
pub use interrupt::*;

pub mod memory_map;

#[cfg(feature = "mock")]
pub mod mock;

pub mod cmu;
pub mod flash;
pub mod gpio;
pub mod mcpwm;
pub mod pmu;
pub mod port;
pub mod rtc;
pub mod scc;
pub mod scm;
pub mod sysctrl;
pub mod tim;
pub mod uart;

use memory_map as map;

/// All register blocks on the device, each handed out exactly once.
#[allow(non_snake_case)]
#[derive(Debug)]
pub struct Peripherals {
    pub SCC: Block<scc::Scc>,
    pub PMU: Block<pmu::Pmu>,
    pub SYSCTRL: Block<sysctrl::Sysctrl>,
    pub SCM: Block<scm::Scm>,
    pub FLASH: Block<flash::Flash>,
    pub RTC: Block<rtc::Rtc>,
    pub CMU0: Block<cmu::Cmu>,
    pub CMU1: Block<cmu::Cmu>,
    pub CMU2: Block<cmu::Cmu>,
    pub CMU3: Block<cmu::Cmu>,
    pub PORTA: Block<port::Port>,
    pub PORTB: Block<port::Port>,
    pub PORTC: Block<port::Port>,
    pub PORTD: Block<port::Port>,
    pub PORTE: Block<port::Port>,
    pub GPIOA: Block<gpio::Gpio>,
    pub GPIOB: Block<gpio::Gpio>,
    pub GPIOC: Block<gpio::Gpio>,
    pub GPIOD: Block<gpio::Gpio>,
    pub GPIOE: Block<gpio::Gpio>,
    pub UART0: Block<uart::Uart>,
    pub UART1: Block<uart::Uart>,
    pub UART2: Block<uart::Uart>,
    pub UART3: Block<uart::Uart>,
    pub UART4: Block<uart::Uart>,
    pub UART5: Block<uart::Uart>,
    pub TIM0: Block<tim::Tim>,
    pub TIM1: Block<tim::Tim>,
    pub TIM2: Block<tim::Tim>,
    pub TIM3: Block<tim::Tim>,
    pub MCPWM0: Block<mcpwm::Mcpwm>,
    pub MCPWM1: Block<mcpwm::Mcpwm>,
}

#[cfg(feature = "critical-section")]
static TAKEN: core::sync::atomic::AtomicBool = core::sync::atomic::AtomicBool::new(false);

impl Peripherals {
    /// Take the peripherals, once. Returns [None] on later calls.
    #[cfg(feature = "critical-section")]
    #[inline]
    pub fn take() -> Option<Self> {
        use core::sync::atomic::Ordering;

        critical_section::with(|_| {
            if TAKEN.load(Ordering::Relaxed) {
                None
            } else {
                TAKEN.store(true, Ordering::Relaxed);
                // safety: we just marked the peripherals as taken
                Some(unsafe { Self::steal() })
            }
        })
    }

    /// Unconditionally create the peripherals.
    ///
    /// # Safety
    /// Every block is duplicated if [Peripherals::take()] or this
    /// function was already called. Two drivers on the same block
    /// break the single-writer rule the lock and interrupt handling
    /// depend on.
    #[inline]
    pub unsafe fn steal() -> Self {
        Self {
            SCC: Block::new(Mmio, map::SCC),
            PMU: Block::new(Mmio, map::PMU),
            SYSCTRL: Block::new(Mmio, map::SYSCTRL),
            SCM: Block::new(Mmio, map::SCM),
            FLASH: Block::new(Mmio, map::FLASH),
            RTC: Block::new(Mmio, map::RTC),
            CMU0: Block::new(Mmio, map::CMU[0]),
            CMU1: Block::new(Mmio, map::CMU[1]),
            CMU2: Block::new(Mmio, map::CMU[2]),
            CMU3: Block::new(Mmio, map::CMU[3]),
            PORTA: Block::new(Mmio, map::PORT[0]),
            PORTB: Block::new(Mmio, map::PORT[1]),
            PORTC: Block::new(Mmio, map::PORT[2]),
            PORTD: Block::new(Mmio, map::PORT[3]),
            PORTE: Block::new(Mmio, map::PORT[4]),
            GPIOA: Block::new(Mmio, map::GPIO[0]),
            GPIOB: Block::new(Mmio, map::GPIO[1]),
            GPIOC: Block::new(Mmio, map::GPIO[2]),
            GPIOD: Block::new(Mmio, map::GPIO[3]),
            GPIOE: Block::new(Mmio, map::GPIO[4]),
            UART0: Block::new(Mmio, map::UART[0]),
            UART1: Block::new(Mmio, map::UART[1]),
            UART2: Block::new(Mmio, map::UART[2]),
            UART3: Block::new(Mmio, map::UART[3]),
            UART4: Block::new(Mmio, map::UART[4]),
            UART5: Block::new(Mmio, map::UART[5]),
            TIM0: Block::new(Mmio, map::TIM[0]),
            TIM1: Block::new(Mmio, map::TIM[1]),
            TIM2: Block::new(Mmio, map::TIM[2]),
            TIM3: Block::new(Mmio, map::TIM[3]),
            MCPWM0: Block::new(Mmio, map::MCPWM[0]),
            MCPWM1: Block::new(Mmio, map::MCPWM[1]),
        }
    }
}
