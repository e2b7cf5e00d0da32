//! Interfaces for clock sources, clock monitors and power management.
//!
//! The SCC and the CMUs each have their own interrupt kinds, named
//! [scc::Event] and [cmu::Event].

pub mod cmu;
pub use cmu::{Cmu, Window};

pub mod pmu;
pub use pmu::{LowVoltage, Pmu};

pub mod scc;
pub use scc::{Dividers, Pll, Scc};

/// Clock configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A clock source or switch did not become ready in time.
    Timeout,
    /// A divider or PLL setting does not fit its register field.
    OutOfRange,
}

impl core::fmt::Display for Error {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Clock Error {:?}", self)
    }
}

/// Clock driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    ready_timeout: u32,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            ready_timeout: 0x0002_0000,
        }
    }
}

impl Config {
    /// Set how many status polls to wait for a source or switch.
    #[inline(always)]
    pub fn ready_timeout(self, polls: u32) -> Self {
        Self {
            ready_timeout: polls,
        }
    }

    /// Get how many status polls to wait for a source or switch.
    #[inline(always)]
    pub fn get_ready_timeout(&self) -> u32 {
        self.ready_timeout
    }
}

// poll `ready` up to `polls` times
fn wait_for(polls: u32, mut ready: impl FnMut() -> bool) -> Result<(), Error> {
    for _ in 0..polls {
        if ready() {
            return Ok(());
        }
    }
    Err(Error::Timeout)
}
