use vcell::VolatileCell;

/// Word access to memory-mapped registers.
///
/// Drivers never touch register memory directly. On the device this
/// is [Mmio]; host tests use [crate::mock::Mock], which simulates the
/// hardware side effects of each access.
pub trait Bus {
    /// Read the 32-bit register at `address`.
    fn read(&self, address: u32) -> u32;

    /// Write the 32-bit register at `address`.
    fn write(&self, address: u32, value: u32);

    /// Wait until every register write issued so far has completed.
    fn barrier(&self);
}

impl<T> Bus for &T
where
    T: Bus + ?Sized,
{
    #[inline(always)]
    fn read(&self, address: u32) -> u32 {
        T::read(self, address)
    }

    #[inline(always)]
    fn write(&self, address: u32, value: u32) {
        T::write(self, address, value)
    }

    #[inline(always)]
    fn barrier(&self) {
        T::barrier(self)
    }
}

/// Volatile access to the real register space.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mmio;

impl Mmio {
    #[inline(always)]
    fn cell(address: u32) -> &'static VolatileCell<u32> {
        // safety: blocks on this bus are only created from the
        // memory map, so every address is a device register
        unsafe { &*(address as usize as *const VolatileCell<u32>) }
    }
}

impl Bus for Mmio {
    #[inline(always)]
    fn read(&self, address: u32) -> u32 {
        Self::cell(address).get()
    }

    #[inline(always)]
    fn write(&self, address: u32, value: u32) {
        Self::cell(address).set(value)
    }

    #[inline(always)]
    fn barrier(&self) {
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        cortex_m::asm::dsb();

        #[cfg(not(all(target_arch = "arm", target_os = "none")))]
        core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
    }
}
