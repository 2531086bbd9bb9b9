// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std)]

// Core modules
pub mod errors;
pub mod stats;

// Backend modules
#[cfg(feature = "mem")]
mod mem;

#[cfg(feature = "std")]
mod stdio;

#[cfg(feature = "uefi")]
mod uefi;

// Prelude re-exports (central entrypoint)
pub mod prelude {
    pub use super::Sector;
    pub use super::SectorIO;
    pub use super::SectorIOStructExt;
    pub use super::SECTOR_SIZE;
    pub use super::errors::*;
    pub use super::stats::*;

    #[cfg(feature = "mem")]
    pub use super::mem::MemSectorIO;

    #[cfg(feature = "std")]
    pub use super::stdio::StdSectorIO;

    #[cfg(feature = "uefi")]
    pub use super::uefi::UefiSectorIO;
}

use errors::*;

/// Logical sector size. Partition tables are always addressed in 512-byte
/// units here; no sector size negotiation happens.
pub const SECTOR_SIZE: usize = 512;

/// One logical sector.
pub type Sector = [u8; SECTOR_SIZE];

/// Sector IO abstraction trait.
///
/// Implementations may target RAM, files, block devices, UEFI, etc.
/// Every call blocks until the transfer is complete.
pub trait SectorIO {
    /// Reads the sector at `lba`.
    fn read_sector(&mut self, lba: u64) -> SectorIOResult<Sector>;

    /// Writes `data` to the sector at `lba`.
    fn write_sector(&mut self, lba: u64, data: &Sector) -> SectorIOResult;

    /// Flushes any buffered data (may be a no-op).
    fn flush(&mut self) -> SectorIOResult;
}

impl<T: SectorIO + ?Sized> SectorIO for &mut T {
    #[inline]
    fn read_sector(&mut self, lba: u64) -> SectorIOResult<Sector> {
        (**self).read_sector(lba)
    }

    #[inline]
    fn write_sector(&mut self, lba: u64, data: &Sector) -> SectorIOResult {
        (**self).write_sector(lba, data)
    }

    #[inline]
    fn flush(&mut self) -> SectorIOResult {
        (**self).flush()
    }
}

/// Extension trait for reading and writing on-disk structs using zerocopy.
///
/// A struct is read from the start of a sector; writes require the struct
/// to be exactly one sector long.
pub trait SectorIOStructExt: SectorIO {
    /// Reads a struct of type `T` from the beginning of the sector at `lba`.
    fn read_struct<T: zerocopy::FromBytes + zerocopy::KnownLayout + zerocopy::Immutable>(
        &mut self,
        lba: u64,
    ) -> SectorIOResult<T> {
        let size = core::mem::size_of::<T>();
        if size > SECTOR_SIZE {
            return Err(SectorIOError::Other("read_struct: type larger than a sector"));
        }
        let sector = self.read_sector(lba)?;
        T::read_from_bytes(&sector[..size]).map_err(|_| SectorIOError::Other("read_struct failed"))
    }

    /// Writes a sector-sized struct of type `T` at `lba`.
    fn write_struct<T: zerocopy::IntoBytes + zerocopy::Immutable>(
        &mut self,
        lba: u64,
        val: &T,
    ) -> SectorIOResult {
        let sector: &Sector = val
            .as_bytes()
            .try_into()
            .map_err(|_| SectorIOError::Other("write_struct: type is not sector sized"))?;
        self.write_sector(lba, sector)
    }
}

impl<T: SectorIO + ?Sized> SectorIOStructExt for T {}
