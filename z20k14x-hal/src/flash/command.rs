use crate::pac::flash::{command, BLOCK_SIZE, PHRASE_SIZE, SECTOR_SIZE};

/// A flash controller command.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Check that the whole array is erased.
    EraseVerifyAll,
    /// Check that the block at `address` is erased.
    EraseVerifyBlock { address: u32 },
    /// Check that the sector at `address` is erased.
    EraseVerifySector { address: u32 },
    /// Program one 16-byte phrase at a 16-byte aligned `address`.
    ProgramPhrase { address: u32, data: [u32; 4] },
    EraseSector { address: u32 },
    EraseBlock { address: u32 },
    /// Erase the whole array. This takes much longer than the others.
    EraseAll,
    /// Compare `key` with the backdoor key, and unsecure on a match.
    VerifyBackdoorKey { key: [u32; 4] },
}

impl Command {
    /// The code written to FCMD.
    #[inline]
    pub const fn code(&self) -> u8 {
        match self {
            Self::EraseVerifyAll => command::ERASE_VERIFY_ALL,
            Self::EraseVerifyBlock { .. } => command::ERASE_VERIFY_BLOCK,
            Self::EraseVerifySector { .. } => command::ERASE_VERIFY_SECTOR,
            Self::ProgramPhrase { .. } => command::PROGRAM_PHRASE,
            Self::EraseSector { .. } => command::ERASE_SECTOR,
            Self::EraseBlock { .. } => command::ERASE_BLOCK,
            Self::EraseAll => command::ERASE_ALL,
            Self::VerifyBackdoorKey { .. } => command::VERIFY_BACKDOOR_KEY,
        }
    }

    /// The address written to FADDR, if the command takes one.
    #[inline]
    pub const fn address(&self) -> Option<u32> {
        match self {
            Self::EraseVerifyBlock { address }
            | Self::EraseVerifySector { address }
            | Self::ProgramPhrase { address, .. }
            | Self::EraseSector { address }
            | Self::EraseBlock { address } => Some(*address),
            Self::EraseVerifyAll | Self::EraseAll | Self::VerifyBackdoorKey { .. } => None,
        }
    }

    /// The words written to FDATA, if the command takes them.
    #[inline]
    pub const fn data(&self) -> Option<&[u32; 4]> {
        match self {
            Self::ProgramPhrase { data, .. } => Some(data),
            Self::VerifyBackdoorKey { key } => Some(key),
            _ => None,
        }
    }

    /// The alignment the address must have.
    #[inline]
    pub const fn alignment(&self) -> u32 {
        match self {
            Self::ProgramPhrase { .. } => PHRASE_SIZE,
            Self::EraseVerifySector { .. } | Self::EraseSector { .. } => SECTOR_SIZE,
            Self::EraseVerifyBlock { .. } | Self::EraseBlock { .. } => BLOCK_SIZE,
            _ => 1,
        }
    }

    /// Is the address properly aligned?
    #[inline]
    pub const fn is_aligned(&self) -> bool {
        match self.address() {
            Some(address) => address % self.alignment() == 0,
            None => true,
        }
    }

    /// Does this command use the long completion bound?
    #[inline]
    pub const fn is_long(&self) -> bool {
        matches!(self, Self::EraseAll)
    }

    /// Build a [Command::ProgramPhrase] from little-endian bytes.
    #[inline]
    pub fn program_phrase(address: u32, bytes: &[u8; 16]) -> Self {
        let mut data = [0; 4];
        for (word, chunk) in data.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self::ProgramPhrase { address, data }
    }
}
