//! A register simulator for host-side tests.
//!
//! [Mock] is a [Bus] backed by a sparse word memory. By default a
//! register stores whatever is written to it. Hardware behaviour is
//! layered on per address, either with a canned [Model] (locks,
//! write-1-to-clear flags, read-only bits, guard registers) or with
//! arbitrary read and write hooks. Every access is recorded in a
//! journal so tests can check ordering and side effects.

use core::cell::RefCell;
use std::boxed::Box;
use std::collections::BTreeMap;
use std::vec::Vec;

use crate::{Block, Bus, Peripheral};

/// One recorded bus access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Access {
    Read { address: u32, value: u32 },
    Write { address: u32, value: u32 },
    Barrier,
}

/// The simulated register contents.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Memory {
    words: BTreeMap<u32, u32>,
}

impl Memory {
    /// Get the word at `address`. Unwritten words read as 0.
    pub fn get(&self, address: u32) -> u32 {
        self.words.get(&address).copied().unwrap_or(0)
    }

    /// Set the word at `address`, bypassing any model.
    pub fn set(&mut self, address: u32, value: u32) {
        self.words.insert(address, value);
    }

    /// Change the word at `address`, bypassing any model.
    pub fn update(&mut self, address: u32, f: impl FnOnce(u32) -> u32) {
        let value = f(self.get(address));
        self.set(address, value);
    }
}

/// Canned write semantics for one register.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Model {
    lock: u32,
    key: u32,
    guard: Option<(u32, u32)>,
    w1c: u32,
    read_only: u32,
    write_only: u32,
}

impl Model {
    /// A register that stores what is written.
    pub const fn plain() -> Self {
        Self {
            lock: 0,
            key: 0,
            guard: None,
            w1c: 0,
            read_only: 0,
            write_only: 0,
        }
    }

    /// A register with its own LOCK bit (`lock` mask) and unlock key.
    ///
    /// Writing exactly `key` clears LOCK and keeps every other bit.
    /// Any other write while LOCK is set is dropped.
    pub const fn locked(lock: u32, key: u32) -> Self {
        Self {
            lock,
            key,
            ..Self::plain()
        }
    }

    /// Drop writes while `mask` is set in the word at `address`.
    pub const fn guarded_by(mut self, address: u32, mask: u32) -> Self {
        self.guard = Some((address, mask));
        self
    }

    /// Bits in `mask` clear when written with 1.
    pub const fn w1c(mut self, mask: u32) -> Self {
        self.w1c = mask;
        self
    }

    /// Bits in `mask` ignore writes.
    pub const fn read_only(mut self, mask: u32) -> Self {
        self.read_only = mask;
        self
    }

    /// Bits in `mask` are never stored, and read as 0.
    pub const fn write_only(mut self, mask: u32) -> Self {
        self.write_only = mask;
        self
    }

    /// Apply a write. Returns whether the hardware accepted it.
    pub fn write(&self, memory: &mut Memory, address: u32, value: u32) -> bool {
        let current = memory.get(address);

        if self.lock != 0 && value == self.key {
            memory.set(address, current & !self.lock);
            return true;
        }

        if let Some((guard, mask)) = self.guard {
            if memory.get(guard) & mask != 0 {
                return false;
            }
        }

        if current & self.lock != 0 {
            return false;
        }

        let kept = current & self.read_only;
        let flags = current & self.w1c & !value;
        let written = value & !(self.read_only | self.w1c | self.write_only);
        memory.set(address, kept | flags | written);
        true
    }
}

type WriteHook = Box<dyn FnMut(&mut Memory, u32)>;
type ReadHook = Box<dyn FnMut(&mut Memory) -> u32>;

#[derive(Default)]
struct State {
    memory: Memory,
    journal: Vec<Access>,
    on_write: BTreeMap<u32, WriteHook>,
    on_read: BTreeMap<u32, ReadHook>,
}

/// A simulated register bus.
#[derive(Default)]
pub struct Mock {
    state: RefCell<State>,
}

impl core::fmt::Debug for Mock {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Mock")
            .field("memory", &state.memory)
            .field("journal", &state.journal.len())
            .finish()
    }
}

impl Mock {
    /// Create an empty simulator. Every register reads as 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a block of peripheral `P` at `base` on this bus.
    pub fn block<P>(&self, base: u32) -> Block<P, &Self>
    where
        P: Peripheral,
    {
        // safety: simulated memory cannot alias real registers
        unsafe { Block::new(self, base) }
    }

    /// Peek at a register without recording an access.
    pub fn get(&self, address: u32) -> u32 {
        self.state.borrow().memory.get(address)
    }

    /// Poke a register without recording an access or applying hooks.
    pub fn set(&self, address: u32, value: u32) {
        self.state.borrow_mut().memory.set(address, value)
    }

    /// Give the register at `address` canned write semantics.
    pub fn model(&self, address: u32, model: Model) {
        self.on_write(address, move |memory, value| {
            model.write(memory, address, value);
        })
    }

    /// Replace the write behaviour of the register at `address`.
    pub fn on_write(&self, address: u32, hook: impl FnMut(&mut Memory, u32) + 'static) {
        self.state
            .borrow_mut()
            .on_write
            .insert(address, Box::new(hook));
    }

    /// Replace the read behaviour of the register at `address`.
    pub fn on_read(&self, address: u32, hook: impl FnMut(&mut Memory) -> u32 + 'static) {
        self.state
            .borrow_mut()
            .on_read
            .insert(address, Box::new(hook));
    }

    /// Every access so far, oldest first.
    pub fn journal(&self) -> Vec<Access> {
        self.state.borrow().journal.clone()
    }

    /// Every write so far, as `(address, value)`.
    pub fn writes(&self) -> Vec<(u32, u32)> {
        self.state
            .borrow()
            .journal
            .iter()
            .filter_map(|access| match access {
                Access::Write { address, value } => Some((*address, *value)),
                _ => None,
            })
            .collect()
    }

    /// Every value written to `address` so far.
    pub fn writes_to(&self, address: u32) -> Vec<u32> {
        self.writes()
            .into_iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, v)| v)
            .collect()
    }

    /// Forget the journal, keeping memory and hooks.
    pub fn clear_journal(&self) {
        self.state.borrow_mut().journal.clear()
    }
}

impl Bus for Mock {
    fn read(&self, address: u32) -> u32 {
        let mut state = self.state.borrow_mut();
        let State {
            memory,
            journal,
            on_read,
            ..
        } = &mut *state;

        let value = match on_read.get_mut(&address) {
            Some(hook) => hook(memory),
            None => memory.get(address),
        };
        journal.push(Access::Read { address, value });
        value
    }

    fn write(&self, address: u32, value: u32) {
        let mut state = self.state.borrow_mut();
        let State {
            memory,
            journal,
            on_write,
            ..
        } = &mut *state;

        journal.push(Access::Write { address, value });
        match on_write.get_mut(&address) {
            Some(hook) => hook(memory, value),
            None => memory.set(address, value),
        }
    }

    fn barrier(&self) {
        self.state.borrow_mut().journal.push(Access::Barrier)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const REG: u32 = 0x100;
    const GUARD: u32 = 0x200;

    #[test]
    fn locked_register_drops_writes() {
        let mock = Mock::new();
        mock.model(REG, Model::locked(1 << 23, 0x5b00_0000));
        mock.set(REG, (1 << 23) | 0x5);

        mock.write(REG, 0xf);
        assert_eq!(mock.get(REG), (1 << 23) | 0x5);

        mock.write(REG, 0x5b00_0000);
        assert_eq!(mock.get(REG), 0x5);

        mock.write(REG, (1 << 23) | 0xa);
        assert_eq!(mock.get(REG), (1 << 23) | 0xa);
    }

    #[test]
    fn w1c_and_guard() {
        let mock = Mock::new();
        mock.model(REG, Model::plain().w1c(0xf0).guarded_by(GUARD, 1));
        mock.set(REG, 0xf0);

        mock.set(GUARD, 1);
        mock.write(REG, 0x30);
        assert_eq!(mock.get(REG), 0xf0);

        mock.set(GUARD, 0);
        mock.write(REG, 0x31);
        assert_eq!(mock.get(REG), 0xc1);
    }

    #[test]
    fn journal_records_everything() {
        let mock = Mock::new();
        mock.on_read(REG, |_| 7);
        assert_eq!(mock.read(REG), 7);
        mock.write(GUARD, 3);
        mock.barrier();
        assert_eq!(
            mock.journal(),
            [
                Access::Read {
                    address: REG,
                    value: 7
                },
                Access::Write {
                    address: GUARD,
                    value: 3
                },
                Access::Barrier,
            ]
        );
    }
}
