// SPDX-License-Identifier: MIT

use crate::{Sector, SectorIO, SectorIOResult};

/// Simple counters, no_std friendly.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct IoStats {
    pub reads: u64,
    pub writes: u64,
    pub flushes: u64,
}

impl IoStats {
    #[inline]
    pub fn reset(&mut self) {
        *self = IoStats::default();
    }
}

/// Transparent instrumentation wrapper.
///
/// Counts every sector transfer going through it, which makes "this path
/// never writes" easy to assert.
pub struct IOCounter<'a, IO: SectorIO + ?Sized> {
    inner: &'a mut IO,
    pub stats: IoStats,
}

impl<'a, IO: SectorIO + ?Sized> IOCounter<'a, IO> {
    #[inline]
    pub fn new(inner: &'a mut IO) -> Self {
        Self {
            inner,
            stats: IoStats::default(),
        }
    }

    #[inline]
    pub fn snapshot(&self) -> IoStats {
        self.stats
    }
}

impl<'a, IO: SectorIO + ?Sized> SectorIO for IOCounter<'a, IO> {
    #[inline]
    fn read_sector(&mut self, lba: u64) -> SectorIOResult<Sector> {
        self.stats.reads += 1;
        self.inner.read_sector(lba)
    }

    #[inline]
    fn write_sector(&mut self, lba: u64, data: &Sector) -> SectorIOResult {
        self.stats.writes += 1;
        self.inner.write_sector(lba, data)
    }

    #[inline]
    fn flush(&mut self) -> SectorIOResult {
        self.stats.flushes += 1;
        self.inner.flush()
    }
}
