// SPDX-License-Identifier: MIT

use std::io::{Read, Seek, SeekFrom, Write};

use crate::{SECTOR_SIZE, Sector, SectorIO, SectorIOError, SectorIOResult};

/// `SectorIO` over anything seekable: regular image files, block device
/// nodes, cursors.
#[derive(Debug)]
pub struct StdSectorIO<'a, T: Read + Write + Seek> {
    io: &'a mut T,
}

impl<'a, T: Read + Write + Seek> StdSectorIO<'a, T> {
    #[inline]
    pub fn new(io: &'a mut T) -> Self {
        Self { io }
    }

    #[inline]
    fn seek_to(&mut self, lba: u64) -> SectorIOResult {
        let offset = lba
            .checked_mul(SECTOR_SIZE as u64)
            .ok_or(SectorIOError::OutOfBounds { lba })?;
        self.io.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
}

impl<'a, T: Read + Write + Seek> SectorIO for StdSectorIO<'a, T> {
    fn read_sector(&mut self, lba: u64) -> SectorIOResult<Sector> {
        self.seek_to(lba)?;
        let mut sector = [0u8; SECTOR_SIZE];
        self.io.read_exact(&mut sector)?;
        Ok(sector)
    }

    fn write_sector(&mut self, lba: u64, data: &Sector) -> SectorIOResult {
        self.seek_to(lba)?;
        self.io.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> SectorIOResult {
        self.io.flush()?;
        Ok(())
    }
}
