// SPDX-License-Identifier: MIT
use crate::{SECTOR_SIZE, Sector, SectorIO, SectorIOError, SectorIOResult};

use uefi::boot::ScopedProtocol;
use uefi::proto::media::block::{BlockIO as UefiBlockIo, BlockIOMedia};

/// UEFI Block I/O backend for `SectorIO`.
///
/// Only media with 512-byte blocks are accepted; 4Kn disks are rejected at
/// construction with `Unsupported`.
pub struct UefiSectorIO {
    blk: ScopedProtocol<UefiBlockIo>,
}

impl UefiSectorIO {
    #[inline]
    pub fn new(blk: ScopedProtocol<UefiBlockIo>) -> SectorIOResult<Self> {
        if blk.media().block_size() as usize != SECTOR_SIZE {
            return Err(SectorIOError::Unsupported);
        }
        Ok(Self { blk })
    }

    #[inline(always)]
    fn media(&self) -> &BlockIOMedia {
        self.blk.media()
    }

    #[inline]
    fn check_bounds(&self, lba: u64) -> SectorIOResult {
        // last_block is inclusive
        if lba > self.media().last_block() {
            return Err(SectorIOError::OutOfBounds { lba });
        }
        Ok(())
    }
}

impl SectorIO for UefiSectorIO {
    fn read_sector(&mut self, lba: u64) -> SectorIOResult<Sector> {
        self.check_bounds(lba)?;
        let media_id = self.media().media_id();
        let mut sector = [0u8; SECTOR_SIZE];
        self.blk
            .read_blocks(media_id, lba, &mut sector)
            .map_err(|_| SectorIOError::Other("UEFI read_blocks failed"))?;
        Ok(sector)
    }

    fn write_sector(&mut self, lba: u64, data: &Sector) -> SectorIOResult {
        self.check_bounds(lba)?;
        if self.media().is_read_only() {
            return Err(SectorIOError::Other("UEFI media is read-only"));
        }
        let media_id = self.media().media_id();
        self.blk
            .write_blocks(media_id, lba, data)
            .map_err(|_| SectorIOError::Other("UEFI write_blocks failed"))
    }

    fn flush(&mut self) -> SectorIOResult {
        self.blk
            .flush_blocks()
            .map_err(|_| SectorIOError::Other("UEFI flush_blocks failed"))
    }
}
