// SPDX-License-Identifier: MIT

use alloc::vec::Vec;

use log::{debug, warn};
use sectorio::prelude::*;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::entry::PartitionEntry;
use crate::errors::*;
use crate::types::lookup_gpt_type;

pub const GPT_ENTRY_SIZE: usize = 128;
pub const GPT_PRIMARY_HEADER_LBA: u64 = 1;
pub const GPT_SIGNATURE: &[u8; 8] = b"EFI PART";
pub const GPT_REVISION: u32 = 0x00010000;
pub const GPT_MIN_HEADER_SIZE: u32 = 92;
pub const GPT_MAX_ENTRIES: u32 = 16_384;

/// Byte range of `header_crc32` inside the header.
const HEADER_CRC_RANGE: core::ops::Range<usize> = 16..20;

#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug)]
#[repr(C)]
pub struct GptEntry {
    pub type_guid: [u8; 16],
    pub unique_guid: [u8; 16],
    pub start_lba: u64,
    pub end_lba: u64,
    pub attributes: u64,
    pub name: [u16; 36],
}

impl GptEntry {
    #[inline]
    pub fn is_unused(&self) -> bool {
        self.type_guid.iter().all(|&b| b == 0)
    }
}

#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug)]
#[repr(C)]
pub struct GptHeader {
    pub signature: [u8; 8],
    pub revision: u32,
    pub header_size: u32,
    pub header_crc: u32,
    pub reserved: u32,
    pub current_lba: u64,
    pub backup_lba: u64,
    pub first_usable_lba: u64,
    pub last_usable_lba: u64,
    pub disk_guid: [u8; 16],
    pub entries_lba: u64,
    pub num_entries: u32,
    pub entry_size: u32,
    pub entries_crc: u32,
    pub reserved2: [u8; 420],
}

#[inline]
fn malformed(reason: &'static str) -> SyncError {
    SyncError::Malformed {
        table: Table::Gpt,
        reason,
    }
}

impl GptHeader {
    #[inline]
    pub fn has_signature(&self) -> bool {
        &self.signature == GPT_SIGNATURE
    }

    /// Structural checks on the header fields. The signature is checked by
    /// the caller since a missing one is not an error.
    pub fn validate(&self) -> SyncResult {
        let revision = u32::from_le(self.revision);
        if revision != GPT_REVISION {
            warn!("GPT: unknown revision {revision:#010x}, continuing");
        }
        let header_size = u32::from_le(self.header_size);
        if !(GPT_MIN_HEADER_SIZE..=SECTOR_SIZE as u32).contains(&header_size) {
            return Err(malformed("header size out of range"));
        }
        let entry_size = u32::from_le(self.entry_size) as usize;
        if entry_size < GPT_ENTRY_SIZE || entry_size > SECTOR_SIZE || SECTOR_SIZE % entry_size != 0
        {
            return Err(malformed("unsupported partition entry size"));
        }
        let num_entries = u32::from_le(self.num_entries);
        if num_entries == 0 || num_entries > GPT_MAX_ENTRIES {
            return Err(malformed("partition entry count out of range"));
        }
        Ok(())
    }

    /// CRC32 of the first `header_size` bytes of `raw`, with the CRC field
    /// taken as zero.
    pub fn compute_crc32(raw: &Sector, header_size: usize) -> u32 {
        let mut bytes = *raw;
        bytes[HEADER_CRC_RANGE].fill(0);
        crc32fast::hash(&bytes[..header_size])
    }
}

/// Reads the primary GPT.
///
/// Returns `Ok(None)` when LBA 1 carries no `EFI PART` signature. Used
/// entries are returned in entry-array order, with their descriptor and
/// equivalent MBR type resolved.
pub fn read_gpt<IO: SectorIO + ?Sized>(
    io: &mut IO,
    verify_crc: bool,
) -> SyncResult<Option<Vec<PartitionEntry>>> {
    let raw = io.read_sector(GPT_PRIMARY_HEADER_LBA)?;
    let hdr = GptHeader::read_from_bytes(&raw[..]).map_err(|_| malformed("unreadable header"))?;
    if !hdr.has_signature() {
        debug!("GPT: no signature at LBA {GPT_PRIMARY_HEADER_LBA}");
        return Ok(None);
    }
    hdr.validate()?;

    if verify_crc {
        let expected = u32::from_le(hdr.header_crc);
        let header_size = u32::from_le(hdr.header_size) as usize;
        if GptHeader::compute_crc32(&raw, header_size) != expected {
            return Err(malformed("header CRC32 mismatch"));
        }
    }

    let entry_size = u32::from_le(hdr.entry_size) as usize;
    let num_entries = u32::from_le(hdr.num_entries) as usize;
    let per_sector = SECTOR_SIZE / entry_size;
    let entries_lba = u64::from_le(hdr.entries_lba);

    let mut hasher = crc32fast::Hasher::new();
    let mut parts = Vec::new();
    let mut index = 0usize;
    let mut lba = entries_lba;
    while index < num_entries {
        let sector = io.read_sector(lba)?;
        let take = core::cmp::min(per_sector, num_entries - index);
        hasher.update(&sector[..take * entry_size]);

        for slot in sector.chunks_exact(entry_size).take(take) {
            let e = GptEntry::read_from_bytes(&slot[..GPT_ENTRY_SIZE])
                .map_err(|_| malformed("unreadable partition entry"))?;
            if !e.is_unused() {
                let descriptor = lookup_gpt_type(&e.type_guid);
                let part = PartitionEntry::gpt(
                    index,
                    u64::from_le(e.start_lba),
                    u64::from_le(e.end_lba),
                    e.type_guid,
                    descriptor,
                );
                debug!(
                    "GPT entry {index}: {} lba {}..{}",
                    descriptor.name, part.start_lba, part.end_lba
                );
                parts.push(part);
            }
            index += 1;
        }
        lba = lba
            .checked_add(1)
            .ok_or(malformed("partition entry array past end of LBA space"))?;
    }

    if verify_crc && hasher.finalize() != u32::from_le(hdr.entries_crc) {
        return Err(malformed("partition entry array CRC32 mismatch"));
    }

    Ok(Some(parts))
}
