// SPDX-License-Identifier: MIT

//! Guesses the legacy MBR type of a partition from its content.
//!
//! Only the first few sectors are inspected. Read errors abort the run like
//! any other sector I/O failure.

use log::debug;
use sectorio::prelude::*;

use crate::entry::PartitionEntry;
use crate::errors::*;
use crate::types::*;

const XFS_MAGIC: &[u8; 4] = b"XFSB";
const NTFS_OEM_ID: &[u8; 8] = b"NTFS    ";
const HFS_MAGIC: u16 = 0x4442;
const HFS_PLUS_MAGIC: u16 = 0x2B48;
const EXT_MAGIC: u16 = 0xEF53;
const EXT_MAGIC_OFFSET: usize = 56;
const JFS_MAGIC: &[u8; 4] = b"JFS1";
const REISER_MAGIC_OFFSET: usize = 52;
const REISER_MAGICS: [&[u8]; 3] = [b"ReIsErFS", b"ReIsEr2Fs", b"ReIsEr3Fs"];
const REISER4_MAGIC: &[u8; 7] = b"ReIsEr4";

const FAT12_MAX_CLUSTERS: u64 = 4085;
const FAT16_MAX_CLUSTERS: u64 = 65525;

#[inline]
fn le16(s: &Sector, off: usize) -> u16 {
    u16::from_le_bytes([s[off], s[off + 1]])
}

#[inline]
fn le32(s: &Sector, off: usize) -> u32 {
    u32::from_le_bytes([s[off], s[off + 1], s[off + 2], s[off + 3]])
}

/// FAT / NTFS boot sector. Both need a power-of-two sector size of at
/// least 512 and a power-of-two cluster size before anything else is
/// trusted.
fn detect_boot_sector(s: &Sector) -> Option<u8> {
    let bytes_per_sector = le16(s, 11) as u64;
    let sectors_per_cluster = s[13] as u64;
    if bytes_per_sector < 512
        || !bytes_per_sector.is_power_of_two()
        || !sectors_per_cluster.is_power_of_two()
    {
        return None;
    }

    if &s[3..11] == NTFS_OEM_ID {
        return Some(MBR_TYPE_NTFS);
    }

    let reserved = le16(s, 14) as u64;
    let fat_count = s[16] as u64;
    let media = s[21];
    let score = [
        s[0] == 0xEB || s[0] == 0xE9,
        s[510] == 0x55 && s[511] == 0xAA,
        reserved == 1 || reserved == 32,
        fat_count == 2,
        media == 0xF0 || media >= 0xF8,
    ]
    .into_iter()
    .filter(|&hit| hit)
    .count();
    if score < 3 {
        return None;
    }

    let root_entries = le16(s, 17) as u64;
    let mut total_sectors = le16(s, 19) as u64;
    if total_sectors == 0 {
        total_sectors = le32(s, 32) as u64;
    }
    let mut fat_size = le16(s, 22) as u64;
    if fat_size == 0 {
        fat_size = le32(s, 36) as u64;
    }
    let root_dir_sectors = (root_entries * 32).div_ceil(bytes_per_sector);
    let clusters = total_sectors
        .saturating_sub(reserved + fat_count * fat_size + root_dir_sectors)
        / sectors_per_cluster;

    Some(if clusters < FAT12_MAX_CLUSTERS {
        MBR_TYPE_FAT12
    } else if clusters < FAT16_MAX_CLUSTERS {
        if total_sectors >> 16 != 0 {
            MBR_TYPE_FAT16_LBA
        } else {
            MBR_TYPE_FAT16_SMALL
        }
    } else {
        MBR_TYPE_FAT32_LBA
    })
}

fn detect_at_start(s: &Sector) -> Option<u8> {
    if &s[..4] == XFS_MAGIC {
        return Some(MBR_TYPE_LINUX);
    }
    detect_boot_sector(s)
}

/// Superblocks living at byte offset 1024.
fn detect_at_1k(s: &Sector) -> Option<u8> {
    match le16(s, 0) {
        HFS_MAGIC | HFS_PLUS_MAGIC => return Some(MBR_TYPE_HFS_PLUS),
        _ => {}
    }
    (le16(s, EXT_MAGIC_OFFSET) == EXT_MAGIC).then_some(MBR_TYPE_LINUX)
}

fn has_reiser_magic(s: &Sector) -> bool {
    let at = &s[REISER_MAGIC_OFFSET..];
    REISER_MAGICS.iter().any(|m| at.starts_with(m))
}

/// Returns the MBR type matching the filesystem found at the start of
/// `part`, or `None` when nothing is recognized. Sectors past the end of
/// the partition are never read.
pub fn detect_mbr_type_fs<IO: SectorIO + ?Sized>(
    io: &mut IO,
    part: &PartitionEntry,
) -> SyncResult<Option<u8>> {
    let mut read = |offset: u64| -> SyncResult<Option<Sector>> {
        match part.start_lba.checked_add(offset) {
            Some(lba) if lba <= part.end_lba => Ok(Some(io.read_sector(lba)?)),
            _ => Ok(None),
        }
    };

    let found = 'probe: {
        if let Some(s) = read(0)? {
            if let Some(t) = detect_at_start(&s) {
                break 'probe Some(t);
            }
        }
        if let Some(s) = read(2)? {
            if let Some(t) = detect_at_1k(&s) {
                break 'probe Some(t);
            }
        }
        // ReiserFS 3.6 / ReiserFS 4 at 64 KiB
        if let Some(s) = read(128)? {
            if has_reiser_magic(&s) || s.starts_with(REISER4_MAGIC) {
                break 'probe Some(MBR_TYPE_LINUX);
            }
        }
        if let Some(s) = read(64)? {
            if s.starts_with(JFS_MAGIC) {
                break 'probe Some(MBR_TYPE_LINUX);
            }
        }
        // Old ReiserFS at 8 KiB
        if let Some(s) = read(16)? {
            if has_reiser_magic(&s) {
                break 'probe Some(MBR_TYPE_LINUX);
            }
        }
        None
    };

    if let Some(t) = found {
        debug!(
            "probe: partition {} looks like {}",
            part.index + 1,
            mbr_type_name(t)
        );
    }
    Ok(found)
}
