//! The flash command engine.
//!
//! The controller runs one command at a time. FSTAT.CCIF reads 1 while
//! it is idle, and [Flash::submit()] refuses to stage anything while it
//! reads 0. A submitted command completes either by polling, in
//! [Flash::wait_completion()], or by interrupt, in which case the
//! result is kept for [Flash::take_outcome()] and the
//! [Event::CommandComplete] callback runs.
//!
//! Poll callbacks run while the flash array is busy. They must not
//! live in, or read from, the region the running command modifies.

mod command;
pub use command::*;

mod commit;

use crate::interrupt::{kinds, Callbacks, Dispatch, Kind};
use crate::lock::LockExt;
use crate::pac::flash::{
    self as fc, Faddr, Fcmd, Fctrl, Fdata, Feia, Feic, Fstat, FSTAT_ACC_ERR, FSTAT_CMD_ABORT,
    FSTAT_DOUBLE_BIT_FAULT, FSTAT_FAIL, FSTAT_SINGLE_BIT_FAULT,
};
use crate::pac::{Block, Bus, Mmio};
use crate::scm::CacheControl;

/// Flash engine error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Another command is still running. Try again later.
    Busy,
    /// The command did not complete within its poll bound.
    Timeout,
    /// The command address is not aligned to its unit.
    Misaligned,
    /// The command completed, unsuccessfully.
    Failed(Failure),
}

impl core::fmt::Display for Error {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Flash Error {:?}", self)
    }
}

/// The error flags set when a command completed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Failure {
    /// FAIL: the command's verification failed.
    pub verify: bool,
    /// CMDABT: the command was aborted.
    pub aborted: bool,
    /// ACCERR: the command, or its address, was not allowed.
    pub access: bool,
}

impl Failure {
    /// Did anything fail?
    #[inline]
    pub fn any(&self) -> bool {
        self.verify || self.aborted || self.access
    }
}

impl From<Fstat> for Failure {
    #[inline]
    fn from(status: Fstat) -> Self {
        Self {
            verify: status.fail(),
            aborted: status.cmd_abort(),
            access: status.acc_err(),
        }
    }
}

/// Result of a completed command, from its status flags alone.
#[inline]
pub fn classify(status: Fstat) -> Result<(), Error> {
    let failure = Failure::from(status);
    if failure.any() {
        Err(Error::Failed(failure))
    } else {
        Ok(())
    }
}

/// Result of [Flash::request_abort()].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AbortOutcome {
    /// The running command was aborted.
    Aborted,
    /// There was nothing to abort, or the command finished first.
    AlreadyFinished,
    /// The controller never went idle.
    Timeout,
}

/// How to wait for a command to complete.
pub enum Completion<'a> {
    /// Poll until done, calling the closure on every poll that finds
    /// the controller still busy.
    Poll(Option<&'a mut dyn FnMut()>),
    /// Return right away, and finish in the interrupt handler.
    Interrupt,
}

impl<'a> core::fmt::Debug for Completion<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Poll(Some(_)) => f.write_str("Poll(Some(..))"),
            Self::Poll(None) => f.write_str("Poll(None)"),
            Self::Interrupt => f.write_str("Interrupt"),
        }
    }
}

/// Kind of error to inject into reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EccError {
    SingleBit = 0,
    DoubleBit = 1,
}

/// Flash engine configuration. Timeouts count status polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    command_timeout: u32,
    erase_all_timeout: u32,
    abort_timeout: u32,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            command_timeout: 0x0008_0000,
            erase_all_timeout: 0x0100_0000,
            abort_timeout: 0x0001_0000,
        }
    }
}

impl Config {
    /// Set the poll bound for every command but [Command::EraseAll].
    #[inline(always)]
    pub fn command_timeout(self, polls: u32) -> Self {
        Self {
            command_timeout: polls,
            ..self
        }
    }

    /// Get the poll bound for ordinary commands.
    #[inline(always)]
    pub fn get_command_timeout(&self) -> u32 {
        self.command_timeout
    }

    /// Set the poll bound for [Command::EraseAll].
    #[inline(always)]
    pub fn erase_all_timeout(self, polls: u32) -> Self {
        Self {
            erase_all_timeout: polls,
            ..self
        }
    }

    /// Get the poll bound for [Command::EraseAll].
    #[inline(always)]
    pub fn get_erase_all_timeout(&self) -> u32 {
        self.erase_all_timeout
    }

    /// Set the poll bound for an abort to land.
    #[inline(always)]
    pub fn abort_timeout(self, polls: u32) -> Self {
        Self {
            abort_timeout: polls,
            ..self
        }
    }

    /// Get the poll bound for an abort to land.
    #[inline(always)]
    pub fn get_abort_timeout(&self) -> u32 {
        self.abort_timeout
    }
}

kinds! {
    /// Flash interrupts.
    pub enum Event {
        /// The running command completed.
        CommandComplete = 1 << 0,
        /// A read corrected a single-bit ECC error.
        SingleBitFault = 1 << 1,
        /// A read hit an uncorrectable ECC error.
        DoubleBitFault = 1 << 2,
    }
}

// the command in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    code: u8,
    timeout: u32,
}

/// The flash controller.
///
/// `C` is the code cache, which is switched off around every launch.
#[derive(Debug)]
pub struct Flash<C, B = Mmio> {
    regs: Block<fc::Flash, B>,
    cache: C,
    config: Config,
    pending: Option<Pending>,
    outcome: Option<Result<(), Error>>,
    callbacks: Callbacks<Event, { Event::COUNT }>,
}

impl<C, B> Flash<C, B>
where
    C: CacheControl,
    B: Bus,
{
    /// Wrap the flash registers and the cache.
    #[inline]
    pub fn new(regs: Block<fc::Flash, B>, cache: C, config: Config) -> Self {
        Self {
            regs,
            cache,
            config,
            pending: None,
            outcome: None,
            callbacks: Callbacks::new(),
        }
    }

    /// Recover the flash registers and the cache.
    #[inline]
    pub fn free(self) -> (Block<fc::Flash, B>, C) {
        (self.regs, self.cache)
    }

    /// Get the configuration.
    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the raw status flags.
    #[inline(always)]
    pub fn status(&self) -> Fstat {
        self.regs.read()
    }

    /// Is the controller idle?
    #[inline(always)]
    pub fn is_idle(&self) -> bool {
        self.status().ccif()
    }

    /// Stage and launch `command`.
    ///
    /// Returns [Error::Busy] without writing any register if another
    /// command is running, and [Error::Misaligned] without writing any
    /// register if the address is not aligned.
    pub fn submit(&mut self, command: &Command) -> Result<(), Error> {
        if !command.is_aligned() {
            debug!("flash command {=u8:#x} misaligned", command.code());
            return Err(Error::Misaligned);
        }
        if !self.is_idle() {
            debug!("flash busy, refusing command {=u8:#x}", command.code());
            return Err(Error::Busy);
        }

        if let Some(address) = command.address() {
            self.regs.write(Faddr::new().with_address(address));
        }
        if let Some(data) = command.data() {
            for (i, word) in data.iter().enumerate() {
                self.regs.write_at(i, Fdata::new().with_data(*word));
            }
        }
        self.regs.write(Fcmd::new().with_code(command.code()));
        self.clear_stale_abort();
        self.regs
            .clear_flags::<Fstat>(FSTAT_FAIL | FSTAT_CMD_ABORT | FSTAT_ACC_ERR);

        self.outcome = None;
        commit::commit(&self.regs, &mut self.cache);

        let timeout = if command.is_long() {
            self.config.erase_all_timeout
        } else {
            self.config.command_timeout
        };
        self.pending = Some(Pending {
            code: command.code(),
            timeout,
        });
        trace!("flash command {=u8:#x} launched", command.code());
        Ok(())
    }

    /// Poll until the running command completes, and classify it.
    ///
    /// `poll` is called on every poll that finds the controller busy.
    /// With no command pending this uses the ordinary bound.
    pub fn wait_completion(&mut self, mut poll: Option<&mut dyn FnMut()>) -> Result<(), Error> {
        let timeout = self
            .pending
            .map_or(self.config.command_timeout, |pending| pending.timeout);

        for _ in 0..timeout {
            let status = self.status();
            if status.ccif() {
                if let Some(pending) = self.pending.take() {
                    trace!("flash command {=u8:#x} complete", pending.code);
                }
                self.clear_stale_abort();
                return classify(status);
            }
            if let Some(poll) = poll.as_deref_mut() {
                poll();
            }
        }

        warn!("flash command timed out after {=u32} polls", timeout);
        Err(Error::Timeout)
    }

    /// Submit `command` and complete it as `completion` says.
    pub fn execute(&mut self, command: &Command, completion: Completion) -> Result<(), Error> {
        self.submit(command)?;
        match completion {
            Completion::Poll(poll) => self.wait_completion(poll),
            Completion::Interrupt => {
                self.enable_interrupt(Event::CommandComplete);
                Ok(())
            }
        }
    }

    /// Ask the running command to stop.
    ///
    /// If the controller is already idle, this returns
    /// [AbortOutcome::AlreadyFinished] without touching FCTRL.
    pub fn request_abort(&mut self) -> AbortOutcome {
        if self.is_idle() {
            return AbortOutcome::AlreadyFinished;
        }

        self.regs.modify::<Fctrl>(|r| r.with_abort_req(true));
        for _ in 0..self.config.abort_timeout {
            let status = self.status();
            if !status.ccif() {
                continue;
            }

            self.regs.modify::<Fctrl>(|r| r.with_abort_req(false));
            self.pending = None;
            return if status.cmd_abort() {
                self.regs.clear_flags::<Fstat>(FSTAT_CMD_ABORT);
                debug!("flash command aborted");
                AbortOutcome::Aborted
            } else {
                AbortOutcome::AlreadyFinished
            };
        }

        warn!("flash abort timed out");
        AbortOutcome::Timeout
    }

    // an abort that timed out leaves ABTREQ set, and it must not reach
    // the next command
    fn clear_stale_abort(&mut self) {
        if self.regs.read::<Fctrl>().abort_req() {
            self.regs.modify::<Fctrl>(|r| r.with_abort_req(false));
        }
    }

    /// Take the result of the last command completed by interrupt.
    #[inline]
    pub fn take_outcome(&mut self) -> Option<Result<(), Error>> {
        self.outcome.take()
    }

    /// Erase the sector at `address`.
    #[inline]
    pub fn erase_sector(&mut self, address: u32, completion: Completion) -> Result<(), Error> {
        self.execute(&Command::EraseSector { address }, completion)
    }

    /// Erase the block at `address`.
    #[inline]
    pub fn erase_block(&mut self, address: u32, completion: Completion) -> Result<(), Error> {
        self.execute(&Command::EraseBlock { address }, completion)
    }

    /// Erase the whole array.
    #[inline]
    pub fn erase_all(&mut self, completion: Completion) -> Result<(), Error> {
        self.execute(&Command::EraseAll, completion)
    }

    /// Check that the sector at `address` is erased.
    #[inline]
    pub fn verify_erased_sector(&mut self, address: u32, completion: Completion) -> Result<(), Error> {
        self.execute(&Command::EraseVerifySector { address }, completion)
    }

    /// Check that the block at `address` is erased.
    #[inline]
    pub fn verify_erased_block(&mut self, address: u32, completion: Completion) -> Result<(), Error> {
        self.execute(&Command::EraseVerifyBlock { address }, completion)
    }

    /// Check that the whole array is erased.
    #[inline]
    pub fn verify_erased_all(&mut self, completion: Completion) -> Result<(), Error> {
        self.execute(&Command::EraseVerifyAll, completion)
    }

    /// Present the backdoor key.
    #[inline]
    pub fn verify_backdoor_key(&mut self, key: [u32; 4], completion: Completion) -> Result<(), Error> {
        self.execute(&Command::VerifyBackdoorKey { key }, completion)
    }

    /// Program one phrase at `address`.
    #[inline]
    pub fn program_phrase(
        &mut self,
        address: u32,
        bytes: &[u8; 16],
        completion: Completion,
    ) -> Result<(), Error> {
        self.execute(&Command::program_phrase(address, bytes), completion)
    }

    /// Program `data` at `address`, one phrase at a time, polling.
    ///
    /// `data` must be a whole number of phrases. Stops at the first
    /// phrase that fails.
    pub fn program(
        &mut self,
        address: u32,
        data: &[u8],
        mut poll: Option<&mut dyn FnMut()>,
    ) -> Result<(), Error> {
        let size = fc::PHRASE_SIZE as usize;
        if data.len() % size != 0 {
            return Err(Error::Misaligned);
        }

        for (i, chunk) in data.chunks_exact(size).enumerate() {
            let mut phrase = [0; 16];
            phrase.copy_from_slice(chunk);
            let target = address.wrapping_add((i * size) as u32);
            self.submit(&Command::program_phrase(target, &phrase))?;
            self.wait_completion(poll.as_mut().map(|p| &mut **p as &mut dyn FnMut()))?;
        }
        Ok(())
    }

    /// Make reads from `address` report `error`.
    #[inline]
    pub fn inject_ecc_error(&mut self, address: u32, error: EccError) {
        self.regs.unlocked::<Feic, _>(0, |regs| {
            regs.write(Feia::new().with_address(address));
            regs.modify::<Feic>(|r| r.with_enable(true).with_mode(error as u8));
        })
    }

    /// Stop injecting ECC errors.
    #[inline]
    pub fn stop_ecc_injection(&mut self) {
        self.regs
            .unlocked::<Feic, _>(0, |regs| regs.modify::<Feic>(|r| r.with_enable(false)))
    }

    /// Set or remove the callback for `event`.
    #[inline]
    pub fn install_callback(&mut self, event: Event, callback: Option<fn()>) {
        self.callbacks.install(event, callback);
    }

    /// Unmask `event`. [Event::CommandComplete] fires right away if
    /// the controller is idle.
    #[inline]
    pub fn enable_interrupt(&mut self, event: Event) {
        self.set_interrupt(event, true)
    }

    /// Mask `event`.
    #[inline]
    pub fn disable_interrupt(&mut self, event: Event) {
        self.set_interrupt(event, false)
    }

    fn set_interrupt(&mut self, event: Event, enabled: bool) {
        self.regs.modify::<Fctrl>(|r| match event {
            Event::CommandComplete => r.with_cc_ie(enabled),
            Event::SingleBitFault => r.with_sbf_ie(enabled),
            Event::DoubleBitFault => r.with_dbf_ie(enabled),
        })
    }
}

impl<C, B> Dispatch for Flash<C, B>
where
    C: CacheControl,
    B: Bus,
{
    type Kind = Event;
    const NAME: &'static str = "FLASH";

    fn pending(&self) -> u32 {
        let status = self.status();
        let ctrl = self.regs.read::<Fctrl>();
        let mut active = 0;
        if status.ccif() && ctrl.cc_ie() {
            active |= Event::CommandComplete.mask();
        }
        if status.single_bit_fault() && ctrl.sbf_ie() {
            active |= Event::SingleBitFault.mask();
        }
        if status.double_bit_fault() && ctrl.dbf_ie() {
            active |= Event::DoubleBitFault.mask();
        }
        active
    }

    fn clear(&mut self, active: u32) {
        if active & Event::CommandComplete.mask() != 0 {
            // CCIF stays set while idle, so the source is disabled
            self.regs.modify::<Fctrl>(|r| r.with_cc_ie(false));
            self.pending = None;
            self.outcome = Some(classify(self.status()));
        }

        let mut flags = 0;
        if active & Event::SingleBitFault.mask() != 0 {
            flags |= FSTAT_SINGLE_BIT_FAULT;
        }
        if active & Event::DoubleBitFault.mask() != 0 {
            flags |= FSTAT_DOUBLE_BIT_FAULT;
        }
        if flags != 0 {
            self.regs.clear_flags::<Fstat>(flags);
        }
    }

    fn invoke(&mut self, event: Event) -> bool {
        self.callbacks.invoke(event)
    }

    fn mask(&mut self, event: Event) {
        self.disable_interrupt(event)
    }

    fn barrier(&self) {
        self.regs.barrier()
    }
}

#[cfg(test)]
mod test;
