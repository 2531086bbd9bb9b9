// SPDX-License-Identifier: MIT

use crate::{SECTOR_SIZE, Sector, SectorIO, SectorIOError, SectorIOResult};

/// In-memory implementation of `SectorIO`.
///
/// Useful for tests and disk images already loaded in RAM. A trailing
/// partial sector in the buffer is not addressable.
#[derive(Debug)]
pub struct MemSectorIO<'a> {
    buffer: &'a mut [u8],
}

impl<'a> MemSectorIO<'a> {
    #[inline]
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer }
    }

    /// Number of whole sectors in the buffer.
    #[inline]
    pub fn sector_count(&self) -> u64 {
        (self.buffer.len() / SECTOR_SIZE) as u64
    }

    #[inline]
    fn range(&self, lba: u64) -> SectorIOResult<core::ops::Range<usize>> {
        if lba >= self.sector_count() {
            return Err(SectorIOError::OutOfBounds { lba });
        }
        let start = lba as usize * SECTOR_SIZE;
        Ok(start..start + SECTOR_SIZE)
    }
}

impl<'a> SectorIO for MemSectorIO<'a> {
    #[inline(always)]
    fn read_sector(&mut self, lba: u64) -> SectorIOResult<Sector> {
        let range = self.range(lba)?;
        let mut sector = [0u8; SECTOR_SIZE];
        sector.copy_from_slice(&self.buffer[range]);
        Ok(sector)
    }

    #[inline(always)]
    fn write_sector(&mut self, lba: u64, data: &Sector) -> SectorIOResult {
        let range = self.range(lba)?;
        self.buffer[range].copy_from_slice(data);
        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> SectorIOResult {
        Ok(())
    }
}
