// SPDX-License-Identifier: MIT

use log::{debug, warn};
use sectorio::prelude::*;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::entry::{MbrTable, PartitionEntry};
use crate::errors::*;

pub const MBR_SIGNATURE: [u8; 2] = [0x55, 0xAA];
pub const BOOT_FLAG_ACTIVE: u8 = 0x80;
pub const BOOT_FLAG_INACTIVE: u8 = 0x00;
/// "Use LBA" marker for both CHS fields.
pub const CHS_LBA_MARKER: [u8; 3] = [0xFE, 0xFF, 0xFF];
/// Bytes of boot code in front of the disk signature.
pub const BOOT_CODE_SIZE: usize = 440;

#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug, Default)]
#[repr(C, packed)]
pub struct MbrEntryPacked {
    pub boot_flag: u8,
    pub starting_chs: [u8; 3],
    pub part_type: u8,
    pub end_chs: [u8; 3],
    pub start_lba: u32,
    pub sectors: u32,
}

impl MbrEntryPacked {
    #[inline]
    pub fn is_used(&self) -> bool {
        let (start, sectors) = (self.start_lba, self.sectors);
        start != 0 && sectors != 0
    }

    /// Normalizes a used slot; `None` for an empty one.
    pub fn to_entry(self, slot: usize) -> Option<PartitionEntry> {
        if !self.is_used() {
            return None;
        }
        let start = u32::from_le(self.start_lba) as u64;
        let sectors = u32::from_le(self.sectors) as u64;
        Some(PartitionEntry::mbr(
            slot,
            start,
            start + sectors - 1,
            self.part_type,
            self.boot_flag == BOOT_FLAG_ACTIVE,
        ))
    }

    /// Encodes an entry for writing. CHS is always the LBA marker; values
    /// that do not fit 32 bits are clamped.
    pub fn from_entry(e: &PartitionEntry) -> Self {
        let start = clamp_u32(e.start_lba, "start", e.index);
        let sectors = clamp_u32(e.sectors(), "size", e.index);
        Self {
            boot_flag: if e.active {
                BOOT_FLAG_ACTIVE
            } else {
                BOOT_FLAG_INACTIVE
            },
            starting_chs: CHS_LBA_MARKER,
            part_type: e.mbr_type,
            end_chs: CHS_LBA_MARKER,
            start_lba: start.to_le(),
            sectors: sectors.to_le(),
        }
    }
}

/// Largest start and size an MBR slot can hold.
pub const MBR_LBA_LIMIT: u64 = u32::MAX as u64;

/// The range `start..=end` as it reads back from an MBR slot: the size is
/// capped at 32 bits. `None` when the start itself is out of reach.
pub fn fit_mbr_range(start: u64, end: u64) -> Option<(u64, u64)> {
    if start == 0 || start > MBR_LBA_LIMIT {
        return None;
    }
    let sectors = end.saturating_sub(start).saturating_add(1).min(MBR_LBA_LIMIT);
    Some((start, start + sectors - 1))
}

#[inline]
fn clamp_u32(v: u64, what: &str, index: usize) -> u32 {
    match u32::try_from(v) {
        Ok(v) => v,
        Err(_) => {
            warn!(
                "MBR partition {}: {what} {v} does not fit in 32 bits, clamped to {}",
                index + 1,
                u32::MAX
            );
            u32::MAX
        }
    }
}

#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug)]
#[repr(C, packed)]
pub struct Mbr {
    pub boot_code: [u8; BOOT_CODE_SIZE],
    pub disk_signature: [u8; 4],
    pub copy_protect: [u8; 2],
    pub entries: [MbrEntryPacked; 4],
    pub signature: [u8; 2],
}

impl Mbr {
    #[inline]
    pub fn has_valid_signature(&self) -> bool {
        self.signature == MBR_SIGNATURE
    }

    #[inline]
    pub fn has_boot_code(&self) -> bool {
        self.boot_code.iter().any(|&b| b != 0)
    }

    /// Converts the four physical slots, checking signature and boot flags.
    pub fn to_table(&self) -> SyncResult<MbrTable> {
        if !self.has_valid_signature() {
            return Err(SyncError::Malformed {
                table: Table::Mbr,
                reason: "missing 0xAA55 signature",
            });
        }
        let mut table = MbrTable::new();
        for (slot, raw) in self.entries.into_iter().enumerate() {
            if raw.boot_flag != BOOT_FLAG_ACTIVE && raw.boot_flag != BOOT_FLAG_INACTIVE {
                return Err(SyncError::Malformed {
                    table: Table::Mbr,
                    reason: "invalid boot flag",
                });
            }
            if let Some(e) = raw.to_entry(slot) {
                debug!(
                    "MBR slot {slot}: type {:02x} lba {}..{}{}",
                    e.mbr_type,
                    e.start_lba,
                    e.end_lba,
                    if e.active { " (active)" } else { "" }
                );
                table.set(e);
            }
        }
        Ok(table)
    }

    /// Overwrites all four slots with `table`, clearing unused ones.
    pub fn set_table(&mut self, table: &MbrTable) {
        let mut entries = [MbrEntryPacked::default(); 4];
        for (dst, src) in entries.iter_mut().zip(table.slots()) {
            if let Some(e) = src {
                *dst = MbrEntryPacked::from_entry(e);
            }
        }
        self.entries = entries;
        self.signature = MBR_SIGNATURE;
    }
}

/// Reads sector 0 as an MBR table.
pub fn read_mbr<IO: SectorIO + ?Sized>(io: &mut IO) -> SyncResult<MbrTable> {
    let mbr: Mbr = io.read_struct(0)?;
    mbr.to_table()
}
