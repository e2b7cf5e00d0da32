use core::cell::RefCell;

use critical_section::Mutex;

use crate::pac::{Interrupt, INTERRUPT_COUNT};

use super::InterruptSource;

/// An entry in a [VectorTable].
pub trait Handler {
    /// Run the handler for one interrupt entry.
    fn handle(&self);
}

/// A driver shared between foreground code and its interrupt.
///
/// The foreground puts the driver in the cell, and takes a critical
/// section for every use. The handler does nothing while the cell is
/// empty.
impl<T> Handler for Mutex<RefCell<Option<T>>>
where
    T: InterruptSource,
{
    #[inline]
    fn handle(&self) {
        critical_section::with(|cs| {
            if let Some(source) = self.borrow_ref_mut(cs).as_mut() {
                source.handle();
            }
        })
    }
}

/// Map from interrupt number to handler, built explicitly at startup.
///
/// ```ignore
/// static FLASH: Mutex<RefCell<Option<Flash<Cache>>>> = Mutex::new(RefCell::new(None));
/// static VECTORS: VectorTable = VectorTable::new().with(Interrupt::Flash, &FLASH);
///
/// #[interrupt]
/// fn FLASH() {
///     VECTORS.dispatch(Interrupt::Flash);
/// }
/// ```
pub struct VectorTable<'a, H: ?Sized = dyn Handler + Sync> {
    entries: [Option<&'a H>; INTERRUPT_COUNT],
}

impl<'a, H> core::fmt::Debug for VectorTable<'a, H>
where
    H: ?Sized + Handler,
{
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut list = f.debug_list();
        for irq in Interrupt::ALL {
            if self.get(irq).is_some() {
                list.entry(&irq);
            }
        }
        list.finish()
    }
}

impl<'a, H> Default for VectorTable<'a, H>
where
    H: ?Sized + Handler,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, H> VectorTable<'a, H>
where
    H: ?Sized + Handler,
{
    /// A table with no handlers.
    pub const fn new() -> Self {
        Self {
            entries: [None; INTERRUPT_COUNT],
        }
    }

    /// Add `handler` for `irq`, replacing any previous one.
    pub const fn with(mut self, irq: Interrupt, handler: &'a H) -> Self {
        self.entries[irq as usize] = Some(handler);
        self
    }

    /// Set the handler for `irq`. Returns the previous one.
    #[inline]
    pub fn register(&mut self, irq: Interrupt, handler: &'a H) -> Option<&'a H> {
        self.entries
            .get_mut(irq as usize)
            .and_then(|entry| entry.replace(handler))
    }

    /// Remove the handler for `irq`. Returns it.
    #[inline]
    pub fn unregister(&mut self, irq: Interrupt) -> Option<&'a H> {
        self.entries
            .get_mut(irq as usize)
            .and_then(|entry| entry.take())
    }

    /// Get the handler for `irq`.
    #[inline]
    pub fn get(&self, irq: Interrupt) -> Option<&'a H> {
        self.entries.get(irq as usize).copied().flatten()
    }
}

impl<'a, H> VectorTable<'a, H>
where
    H: ?Sized + Handler,
{
    /// Run the handler for `irq`. Returns false if there is none.
    #[inline]
    pub fn dispatch(&self, irq: Interrupt) -> bool {
        match self.get(irq) {
            Some(handler) => {
                handler.handle();
                true
            }
            None => {
                debug!("no handler for interrupt {}", irq as u16);
                false
            }
        }
    }

    /// Run the handler for interrupt number `number`.
    #[inline]
    pub fn dispatch_number(&self, number: u16) -> bool {
        match Interrupt::from_number(number) {
            Some(irq) => self.dispatch(irq),
            None => false,
        }
    }

    /// Run the handler for the interrupt currently being serviced.
    ///
    /// This is meant to be called from a shared vector stub.
    #[cfg(all(target_arch = "arm", target_os = "none"))]
    #[inline]
    pub fn dispatch_active(&self) -> bool {
        use cortex_m::peripheral::scb::VectActive;

        match cortex_m::peripheral::SCB::vect_active() {
            VectActive::Interrupt { irqn } => self.dispatch_number(irqn as u16),
            _ => false,
        }
    }
}
