// SPDX-License-Identifier: MIT
//! Disk image builder shared by the integration tests.
#![allow(dead_code)]

use gptsync::gpt::{GPT_ENTRY_SIZE, GPT_REVISION, GPT_SIGNATURE, GptEntry, GptHeader};
use gptsync::mbr::BOOT_CODE_SIZE;
use sectorio::SECTOR_SIZE;
use zerocopy::IntoBytes;

/// 2 MiB, enough to cover every sector the probe touches for partitions
/// starting below LBA 3900.
pub const DISK_SECTORS: u64 = 4096;
pub const GPT_NUM_ENTRIES: u32 = 128;
pub const DISK_SIGNATURE: [u8; 4] = [0x78, 0x56, 0x34, 0x12];

/// One raw MBR slot as read back from an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSlot {
    pub boot_flag: u8,
    pub part_type: u8,
    pub start: u32,
    pub sectors: u32,
}

pub struct DiskBuilder {
    sectors: u64,
    gpt: Option<Vec<GptEntry>>,
    mbr: [Option<RawSlot>; 4],
    mbr_signature: bool,
    boot_code: Vec<u8>,
    patches: Vec<(u64, usize, Vec<u8>)>,
}

impl DiskBuilder {
    pub fn new() -> Self {
        Self {
            sectors: DISK_SECTORS,
            gpt: None,
            mbr: [None; 4],
            mbr_signature: true,
            boot_code: Vec::new(),
            patches: Vec::new(),
        }
    }

    /// Adds a GPT entry (inclusive range). The first call creates the GPT.
    pub fn gpt(mut self, type_guid: [u8; 16], start: u64, end: u64) -> Self {
        let n = self.gpt.as_ref().map_or(0, Vec::len) as u8;
        self.gpt.get_or_insert_with(Vec::new).push(GptEntry {
            type_guid,
            unique_guid: [n + 1; 16],
            start_lba: start,
            end_lba: end,
            attributes: 0,
            name: [0; 36],
        });
        self
    }

    /// A GPT header with an all-empty entry array.
    pub fn empty_gpt(mut self) -> Self {
        self.gpt.get_or_insert_with(Vec::new);
        self
    }

    /// Fills an MBR slot (inclusive range).
    pub fn mbr(mut self, slot: usize, part_type: u8, start: u32, end: u32, active: bool) -> Self {
        self.mbr[slot] = Some(RawSlot {
            boot_flag: if active { 0x80 } else { 0x00 },
            part_type,
            start,
            sectors: end - start + 1,
        });
        self
    }

    pub fn no_mbr_signature(mut self) -> Self {
        self.mbr_signature = false;
        self
    }

    pub fn boot_code(mut self, code: &[u8]) -> Self {
        self.boot_code = code.to_vec();
        self
    }

    /// Raw bytes at `offset` inside sector `lba`, e.g. a filesystem magic.
    pub fn patch(mut self, lba: u64, offset: usize, bytes: &[u8]) -> Self {
        self.patches.push((lba, offset, bytes.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut img = vec![0u8; self.sectors as usize * SECTOR_SIZE];

        // Sector 0
        img[..self.boot_code.len()].copy_from_slice(&self.boot_code);
        img[BOOT_CODE_SIZE..BOOT_CODE_SIZE + 4].copy_from_slice(&DISK_SIGNATURE);
        for (i, slot) in self.mbr.iter().enumerate() {
            let Some(s) = slot else { continue };
            let off = 446 + i * 16;
            img[off] = s.boot_flag;
            img[off + 4] = s.part_type;
            img[off + 8..off + 12].copy_from_slice(&s.start.to_le_bytes());
            img[off + 12..off + 16].copy_from_slice(&s.sectors.to_le_bytes());
        }
        if self.mbr_signature {
            img[510] = 0x55;
            img[511] = 0xAA;
        }

        if let Some(entries) = &self.gpt {
            let array_len = GPT_NUM_ENTRIES as usize * GPT_ENTRY_SIZE;
            let array = &mut img[2 * SECTOR_SIZE..2 * SECTOR_SIZE + array_len];
            for (i, e) in entries.iter().enumerate() {
                array[i * GPT_ENTRY_SIZE..(i + 1) * GPT_ENTRY_SIZE].copy_from_slice(e.as_bytes());
            }
            let entries_crc = crc32fast::hash(array);

            let entries_sectors = (array_len / SECTOR_SIZE) as u64;
            let mut hdr = GptHeader {
                signature: *GPT_SIGNATURE,
                revision: GPT_REVISION,
                header_size: 92,
                header_crc: 0,
                reserved: 0,
                current_lba: 1,
                backup_lba: self.sectors - 1,
                first_usable_lba: 2 + entries_sectors,
                last_usable_lba: self.sectors - 2 - entries_sectors,
                disk_guid: [0xD1; 16],
                entries_lba: 2,
                num_entries: GPT_NUM_ENTRIES,
                entry_size: GPT_ENTRY_SIZE as u32,
                entries_crc,
                reserved2: [0; 420],
            };
            hdr.header_crc = crc32fast::hash(&hdr.as_bytes()[..92]);
            img[SECTOR_SIZE..2 * SECTOR_SIZE].copy_from_slice(hdr.as_bytes());
        }

        for (lba, offset, bytes) in &self.patches {
            let at = *lba as usize * SECTOR_SIZE + offset;
            img[at..at + bytes.len()].copy_from_slice(bytes);
        }
        img
    }
}

/// The four MBR slots of an image, `None` for unused ones.
pub fn mbr_slots(img: &[u8]) -> [Option<RawSlot>; 4] {
    let mut out = [None; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let e = &img[446 + i * 16..446 + (i + 1) * 16];
        let start = u32::from_le_bytes([e[8], e[9], e[10], e[11]]);
        let sectors = u32::from_le_bytes([e[12], e[13], e[14], e[15]]);
        if start != 0 && sectors != 0 {
            *slot = Some(RawSlot {
                boot_flag: e[0],
                part_type: e[4],
                start,
                sectors,
            });
        }
    }
    out
}

/// `(type, start, end, active)` of the used slots, in slot order.
pub fn mbr_layout(img: &[u8]) -> Vec<(u8, u64, u64, bool)> {
    mbr_slots(img)
        .iter()
        .flatten()
        .map(|s| {
            (
                s.part_type,
                s.start as u64,
                s.start as u64 + s.sectors as u64 - 1,
                s.boot_flag == 0x80,
            )
        })
        .collect()
}

/// Minimal NTFS boot sector fields the probe looks at.
pub fn ntfs_boot_sector() -> Vec<u8> {
    let mut s = vec![0u8; 14];
    s[3..11].copy_from_slice(b"NTFS    ");
    s[11..13].copy_from_slice(&512u16.to_le_bytes());
    s[13] = 8;
    s
}
