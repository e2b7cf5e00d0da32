use core::marker::PhantomData;

use crate::{Bus, Mmio};

/// A marker type naming one kind of register block.
pub trait Peripheral {
    /// The name of the block, used in Debug instances.
    const NAME: &'static str;
}

/// A trait describing a register generically.
pub trait Register: Copy + From<u32> + Into<u32> {
    /// The block this register lives in.
    type Peripheral: Peripheral;

    /// Byte offset of the register (or first array element) from the
    /// block base.
    const OFFSET: u32;

    /// Byte distance between array elements.
    const STRIDE: u32 = 4;

    /// Number of array elements. Plain registers have one.
    const COUNT: usize = 1;

    /// Bits that are cleared by writing 1, and unaffected by writing 0.
    ///
    /// [Block::modify()] always writes these as 0, so that a
    /// read-modify-write never clears a pending flag by accident.
    const W1C: u32 = 0;
}

/// A register carrying a LOCK bit.
///
/// While LOCK reads 1, hardware drops writes to the register (and to
/// any registers it guards). Writing exactly [Lockable::KEY] to the
/// whole word clears LOCK and leaves every other field as it was.
pub trait Lockable: Register {
    /// The unlock key, written to the whole register word.
    const KEY: u32;

    /// Mask of the LOCK bit within the register word.
    const LOCK: u32;

    /// Is the LOCK bit set in this value?
    #[inline(always)]
    fn locked(self) -> bool {
        let bits: u32 = self.into();
        bits & Self::LOCK != 0
    }
}

/// A register block of peripheral `P`, reached over bus `B`.
pub struct Block<P, B = Mmio> {
    bus: B,
    base: u32,
    _peripheral: PhantomData<P>,
}

impl<P, B> core::fmt::Debug for Block<P, B>
where
    P: Peripheral,
{
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_tuple("Block")
            .field(&P::NAME)
            .field(&format_args!("{:#010x}", self.base))
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<P, B> defmt::Format for Block<P, B>
where
    P: Peripheral,
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Block({=str}, {=u32:#x})", P::NAME, self.base)
    }
}

impl<P, B> Block<P, B>
where
    P: Peripheral,
    B: Bus,
{
    /// Create a block at `base` on `bus`.
    ///
    /// # Safety
    /// `base` must be the base address of a `P` block on `bus`, and no
    /// other block may drive the same registers.
    #[inline(always)]
    pub const unsafe fn new(bus: B, base: u32) -> Self {
        Self {
            bus,
            base,
            _peripheral: PhantomData,
        }
    }

    /// Get the base address of this block.
    #[inline(always)]
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Get the bus this block is reached through.
    #[inline(always)]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Get the address of element `index` of register `R`.
    #[inline(always)]
    pub fn address<R>(&self, index: usize) -> u32
    where
        R: Register<Peripheral = P>,
    {
        debug_assert!(index < R::COUNT);
        self.base + R::OFFSET + R::STRIDE * index as u32
    }

    /// Read register `R`.
    #[inline(always)]
    pub fn read<R>(&self) -> R
    where
        R: Register<Peripheral = P>,
    {
        self.read_at(0)
    }

    /// Read element `index` of register array `R`.
    #[inline(always)]
    pub fn read_at<R>(&self, index: usize) -> R
    where
        R: Register<Peripheral = P>,
    {
        R::from(self.bus.read(self.address::<R>(index)))
    }

    /// Write register `R`.
    #[inline(always)]
    pub fn write<R>(&self, value: R)
    where
        R: Register<Peripheral = P>,
    {
        self.write_at(0, value)
    }

    /// Write element `index` of register array `R`.
    #[inline(always)]
    pub fn write_at<R>(&self, index: usize, value: R)
    where
        R: Register<Peripheral = P>,
    {
        self.bus.write(self.address::<R>(index), value.into())
    }

    /// Read, change, and write back register `R`.
    #[inline(always)]
    pub fn modify<R>(&self, f: impl FnOnce(R) -> R)
    where
        R: Register<Peripheral = P>,
    {
        self.modify_at(0, f)
    }

    /// Read, change, and write back element `index` of register array
    /// `R`. Write-1-to-clear bits are written as 0.
    #[inline(always)]
    pub fn modify_at<R>(&self, index: usize, f: impl FnOnce(R) -> R)
    where
        R: Register<Peripheral = P>,
    {
        let value: u32 = f(self.read_at(index)).into();
        self.bus.write(self.address::<R>(index), value & !R::W1C)
    }

    /// Clear the write-1-to-clear flags in `mask` in register `R`.
    #[inline(always)]
    pub fn clear_flags<R>(&self, mask: u32)
    where
        R: Register<Peripheral = P>,
    {
        self.clear_flags_at::<R>(0, mask)
    }

    /// Clear the write-1-to-clear flags in `mask` in element `index`
    /// of register array `R`. Other fields keep their current value.
    #[inline(always)]
    pub fn clear_flags_at<R>(&self, index: usize, mask: u32)
    where
        R: Register<Peripheral = P>,
    {
        let current: u32 = self.read_at::<R>(index).into();
        let value = (current & !R::W1C) | (mask & R::W1C);
        self.bus.write(self.address::<R>(index), value)
    }

    /// Wait until every register write so far has completed.
    #[inline(always)]
    pub fn barrier(&self) {
        self.bus.barrier()
    }
}

/// Declare where a register layout lives.
///
/// ```ignore
/// register!(Pcr: Port, 0x00, count = 32);
/// register!(IrqFlg: Port, 0xa0, w1c = 0xffff_ffff);
/// ```
macro_rules! register {
    (
        $reg:ident : $periph:ty, $offset:expr
        $(, count = $count:expr)?
        $(, stride = $stride:expr)?
        $(, w1c = $w1c:expr)?
        $(,)?
    ) => {
        impl $crate::Register for $reg {
            type Peripheral = $periph;
            const OFFSET: u32 = $offset;
            $(const COUNT: usize = $count;)?
            $(const STRIDE: u32 = $stride;)?
            $(const W1C: u32 = $w1c;)?
        }
    };
}

/// Declare a lockable register and its unlock key.
macro_rules! lockable {
    ($reg:ident, key = $key:expr, lock = $lock:expr) => {
        impl $crate::Lockable for $reg {
            const KEY: u32 = $key;
            const LOCK: u32 = $lock;
        }
    };
}

/// Declare a marker type for a register block.
macro_rules! peripheral {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub struct $name;

        impl $crate::Peripheral for $name {
            const NAME: &'static str = stringify!($name);
        }
    };
}

/// Declare a register holding one plain 32-bit word.
macro_rules! word_register {
    ($(#[$meta:meta])* $name:ident, $field:ident) => {
        $(#[$meta])*
        #[cfg_attr(not(feature = "defmt"), bitfield_struct::bitfield(u32))]
        #[cfg_attr(feature = "defmt", bitfield_struct::bitfield(u32, defmt = true))]
        #[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            pub $field: u32,
        }
    };
}

pub(crate) use {lockable, peripheral, register, word_register};
