//! Per-peripheral interrupt dispatch.
//!
//! Each driver keeps an optional callback per interrupt [Kind], and
//! implements [Dispatch] to describe how its status is read, cleared
//! and masked. [service] is then the only interrupt routine: it clears
//! everything that is active, calls the callback for each active kind,
//! and masks any active kind that has no callback so an unserviced
//! source cannot storm.

use core::marker::PhantomData;

mod vector;
pub use vector::*;

/// One interrupt source within a peripheral.
pub trait Kind: Copy + 'static {
    /// Every kind, in the order they are serviced.
    const ALL: &'static [Self];

    /// Position of this kind in [Kind::ALL], and its callback slot.
    fn index(self) -> usize;

    /// Bit of this kind in the word returned by [Dispatch::pending].
    fn mask(self) -> u32;
}

/// Declare an enum of interrupt kinds and the bit each one uses in the
/// peripheral's pending word.
macro_rules! kinds {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $var:ident = $mask:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        $vis enum $name {
            $($(#[$vmeta])* $var,)+
        }

        impl $name {
            /// Number of kinds.
            pub const COUNT: usize = <Self as $crate::interrupt::Kind>::ALL.len();
        }

        impl $crate::interrupt::Kind for $name {
            const ALL: &'static [Self] = &[$(Self::$var),+];

            #[inline(always)]
            fn index(self) -> usize {
                self as usize
            }

            #[inline(always)]
            fn mask(self) -> u32 {
                match self {
                    $(Self::$var => $mask,)+
                }
            }
        }
    };
}

pub(crate) use kinds;

/// A table of optional callbacks, one slot per [Kind].
///
/// The table only stores the function pointers. It never calls
/// anything on install or removal.
pub struct Callbacks<K, const N: usize, F = fn()> {
    slots: [Option<F>; N],
    _kind: PhantomData<K>,
}

impl<K, const N: usize, F> core::fmt::Debug for Callbacks<K, N, F>
where
    F: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_list().entries(self.slots.iter()).finish()
    }
}

impl<K, const N: usize, F> Default for Callbacks<K, N, F>
where
    K: Kind,
    F: Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, const N: usize, F> Callbacks<K, N, F>
where
    K: Kind,
    F: Copy,
{
    /// An empty table.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            slots: [None; N],
            _kind: PhantomData,
        }
    }

    /// Set or remove the callback for `kind`. Returns the old one.
    #[inline]
    pub fn install(&mut self, kind: K, callback: Option<F>) -> Option<F> {
        match self.slots.get_mut(kind.index()) {
            Some(slot) => core::mem::replace(slot, callback),
            None => None,
        }
    }

    /// Get the callback for `kind`.
    #[inline]
    pub fn get(&self, kind: K) -> Option<F> {
        self.slots.get(kind.index()).copied().flatten()
    }
}

impl<K, const N: usize> Callbacks<K, N, fn()>
where
    K: Kind,
{
    /// Call the callback for `kind`. Returns whether there was one.
    #[inline]
    pub fn invoke(&self, kind: K) -> bool {
        match self.get(kind) {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

/// How one peripheral's interrupts are read, cleared and masked.
pub trait Dispatch {
    /// The interrupt kinds of this peripheral.
    type Kind: Kind;

    /// Peripheral name, for logging.
    const NAME: &'static str;

    /// Kinds that are both flagged and enabled, as [Kind::mask] bits.
    fn pending(&self) -> u32;

    /// Clear the flags of every kind in `active`.
    fn clear(&mut self, active: u32);

    /// Call the callback for `kind`. Returns false if there is none.
    fn invoke(&mut self, kind: Self::Kind) -> bool;

    /// Disable `kind`, and no other kind.
    fn mask(&mut self, kind: Self::Kind);

    /// Wait for every register write so far to complete.
    fn barrier(&self);
}

/// Service one interrupt entry of a peripheral.
///
/// Every kind active at entry is cleared, then visited once in
/// [Kind::ALL] order. The barrier is the last register access.
pub fn service<D>(peripheral: &mut D)
where
    D: Dispatch + ?Sized,
{
    let active = peripheral.pending();
    peripheral.clear(active);

    for &kind in <D::Kind as Kind>::ALL {
        if active & kind.mask() == 0 {
            continue;
        }
        if !peripheral.invoke(kind) {
            warn!(
                "{}: no callback for interrupt {}, masking",
                D::NAME,
                kind.index()
            );
            peripheral.mask(kind);
        }
    }

    peripheral.barrier();
}

/// Something that can be registered as an interrupt vector.
pub trait InterruptSource {
    /// Handle one interrupt entry.
    fn handle(&mut self);
}

impl<D> InterruptSource for D
where
    D: Dispatch,
{
    #[inline]
    fn handle(&mut self) {
        service(self)
    }
}
