use crate::lock::LockExt;
use crate::pac::pmu::{self, Csr, Lock};
use crate::pac::{Block, Bus, Mmio};

/// Low voltage supervisor settings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LowVoltage {
    /// Detect supply brown-out.
    pub detect: bool,
    /// Reset on brown-out, instead of only flagging it.
    pub reset: bool,
    /// Flag the early low voltage warning.
    pub warning: bool,
}

/// The power management unit.
///
/// PMU registers share the lock in [Lock], so every write here goes
/// through that bracket.
#[derive(Debug)]
pub struct Pmu<B = Mmio> {
    regs: Block<pmu::Pmu, B>,
}

impl<B> Pmu<B>
where
    B: Bus,
{
    #[inline]
    pub fn new(regs: Block<pmu::Pmu, B>) -> Self {
        Self { regs }
    }

    #[inline]
    pub fn free(self) -> Block<pmu::Pmu, B> {
        self.regs
    }

    /// Set up the low voltage supervisor.
    #[inline]
    pub fn set_low_voltage(&mut self, settings: LowVoltage) {
        self.regs.unlocked::<Lock, _>(0, |regs| {
            regs.modify::<Csr>(|r| {
                r.with_lvd_en(settings.detect)
                    .with_lvd_reset(settings.reset)
                    .with_lvw_en(settings.warning)
                    .with_iso_clr(false)
            })
        })
    }

    /// Get the low voltage supervisor setup.
    #[inline]
    pub fn low_voltage(&self) -> LowVoltage {
        let csr = self.regs.read::<Csr>();
        LowVoltage {
            detect: csr.lvd_en(),
            reset: csr.lvd_reset(),
            warning: csr.lvw_en(),
        }
    }

    /// Release pin isolation after waking from a low power mode.
    #[inline]
    pub fn release_isolation(&mut self) {
        debug!("releasing pin isolation");
        self.regs
            .unlocked::<Lock, _>(0, |regs| regs.modify::<Csr>(|r| r.with_iso_clr(true)))
    }

    /// Has a brown-out been detected?
    #[inline]
    pub fn low_voltage_detected(&self) -> bool {
        self.regs.read::<Csr>().lvd_flag()
    }

    /// Is the supply below the warning level?
    #[inline]
    pub fn low_voltage_warning(&self) -> bool {
        self.regs.read::<Csr>().lvw_flag()
    }
}
