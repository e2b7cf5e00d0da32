use crate::pac::flash::{Flash, Fstat, FSTAT_CCIF};
use crate::pac::{Block, Bus};
use crate::scm::CacheControl;

/// NOPs between launch and the first access that may hit flash.
#[cfg(all(target_arch = "arm", target_os = "none"))]
const SETTLE_NOPS: usize = 8;

#[inline(always)]
fn settle() {
    #[cfg(all(target_arch = "arm", target_os = "none"))]
    for _ in 0..SETTLE_NOPS {
        cortex_m::asm::nop();
    }
}

/// Launch the command staged in FCMD, FADDR and FDATA.
///
/// This runs with interrupts disabled and the cache off. The cache is
/// cleared before it is restored, since the command may change what
/// any line holds. Only `launch` has to stay off flash.
#[inline(never)]
pub(super) fn commit<B, C>(regs: &Block<Flash, B>, cache: &mut C)
where
    B: Bus,
    C: CacheControl,
{
    critical_section::with(|_| {
        let state = cache.disable();
        launch(regs.bus(), regs.address::<Fstat>(0));
        cache.clear();
        cache.restore(state);
    })
}

/// Write CCIF and wait out the settle delay.
///
/// On the device this lives in RAM, and everything it calls is
/// `#[inline(always)]`, so no instruction is fetched from flash between
/// the launch write and the end of the delay.
#[cfg_attr(all(target_arch = "arm", target_os = "none"), link_section = ".data.ramfunc")]
#[inline(never)]
fn launch<B>(bus: &B, fstat: u32)
where
    B: Bus,
{
    // write CCIF alone, the other flags were cleared at submit
    bus.write(fstat, FSTAT_CCIF);
    bus.barrier();
    settle();
}
