// SPDX-License-Identifier: MIT

use alloc::vec::Vec;

use log::debug;
use sectorio::prelude::*;

use crate::entry::{MbrTable, PartitionEntry};
use crate::errors::*;
use crate::mbr::{MBR_LBA_LIMIT, fit_mbr_range};
use crate::probe::detect_mbr_type_fs;
use crate::types::*;
use crate::validate::check_synthesized;

/// Why a run ends before analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoSyncReason {
    NoGpt,
    /// The GPT header or entry array failed a structural check.
    MalformedGpt(&'static str),
    EmptyGpt,
    NoDataPartitions,
}

/// What the analyzer decided for the current MBR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    NothingToSync(NoSyncReason),
    /// The MBR already mirrors the GPT.
    InSync,
    /// The MBR does not follow a recognized pattern; it is left alone.
    Inconclusive,
    Rewrite,
}

/// Where the protective 0xEE entry ends and which GPT entry mirroring starts
/// from. Ends are given as they read back from a 32-bit MBR slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectiveLayout {
    pub end_lba: u64,
    pub first_mirrored: usize,
}

impl ProtectiveLayout {
    /// An ESP in first position is folded into the protective entry; anything
    /// else is mirrored and the protective entry stops right before it.
    pub fn for_gpt(gpt: &[PartitionEntry]) -> Self {
        let (end_lba, first_mirrored) = match gpt.first() {
            Some(first) if first.mbr_type == MBR_TYPE_EFI_SYSTEM => (first.end_lba, 1),
            _ => {
                let end = gpt
                    .iter()
                    .map(|e| e.start_lba)
                    .min()
                    .unwrap_or(1)
                    .saturating_sub(1);
                (end, 0)
            }
        };
        Self {
            end_lba: core::cmp::min(end_lba, MBR_LBA_LIMIT),
            first_mirrored,
        }
    }

    /// GPT entries an MBR slot can describe, with their ends fitted to the
    /// slot. Entries starting past the 32-bit limit are left out.
    pub fn mirrored(&self, gpt: &[PartitionEntry]) -> Vec<PartitionEntry> {
        gpt.get(self.first_mirrored..)
            .unwrap_or(&[])
            .iter()
            .filter_map(|g| {
                let Some((_, end_lba)) = fit_mbr_range(g.start_lba, g.end_lba) else {
                    debug!("GPT entry {}: starts beyond the MBR's reach", g.index);
                    return None;
                };
                Some(PartitionEntry { end_lba, ..*g })
            })
            .collect()
    }
}

/// Step 0: fills in each GPT entry's `mbr_type`.
///
/// Basic Data partitions take whatever the probe finds (0 otherwise). ESPs
/// stay 0xEF only once per table and only while they hold FAT or nothing
/// recognizable.
pub fn resolve_types<IO: SectorIO + ?Sized>(
    io: &mut IO,
    gpt: &mut [PartitionEntry],
    probe: bool,
) -> SyncResult {
    let mut have_esp = false;
    for part in gpt.iter_mut() {
        let Some(descriptor) = part.gpt_type else {
            continue;
        };
        part.mbr_type = descriptor.mbr_type;

        let is_basic = descriptor.kind == GptKind::BasicData;
        let is_esp = descriptor.mbr_type == MBR_TYPE_EFI_SYSTEM;
        if !is_basic && !is_esp {
            continue;
        }
        let detected = if probe {
            detect_mbr_type_fs(io, part)?
        } else {
            None
        };

        if is_basic {
            part.mbr_type = detected.unwrap_or(0);
        } else {
            part.mbr_type = match detected {
                None | Some(MBR_TYPE_FAT12 | MBR_TYPE_FAT16_LBA | MBR_TYPE_FAT32_LBA)
                    if !have_esp =>
                {
                    have_esp = true;
                    MBR_TYPE_EFI_SYSTEM
                }
                Some(other) => other,
                None => MBR_TYPE_LINUX,
            };
        }
        debug!(
            "GPT entry {}: {} mirrored as {:02x}",
            part.index, descriptor.name, part.mbr_type
        );
    }
    Ok(())
}

/// Step A: decides what to do with the current MBR.
pub fn classify(mbr: &MbrTable, gpt: &[PartitionEntry]) -> Plan {
    let current: Vec<&PartitionEntry> = mbr.iter().collect();
    let Some(first) = current.first() else {
        debug!("MBR: empty");
        return Plan::Rewrite;
    };
    let layout = ProtectiveLayout::for_gpt(gpt);
    let mirrored = layout.mirrored(gpt);
    let expected = core::cmp::min(MbrTable::SLOTS, 1 + mirrored.len());
    let hybrid = first.mbr_type == MBR_TYPE_EFI_PROTECTIVE
        && first.start_lba == 1
        && first.end_lba == layout.end_lba;

    // A lone protective entry is only final when nothing is within reach.
    let lone_protective = current.len() == 1 && first.mbr_type == MBR_TYPE_EFI_PROTECTIVE;
    if lone_protective && !(hybrid && expected == 1) {
        debug!("MBR: protective only");
        return Plan::Rewrite;
    }

    if hybrid {
        debug!("MBR: hybrid pattern");
        return classify_hybrid(&current, &mirrored, expected);
    }

    if first.mbr_type == MBR_TYPE_EFI_SYSTEM {
        debug!("MBR: full mirror pattern");
        let matches = current.iter().enumerate().all(|(i, e)| {
            gpt.get(i)
                .is_some_and(|g| e.same_range(g) && (g.mbr_type == 0 || g.mbr_type == e.mbr_type))
        });
        return if matches {
            Plan::InSync
        } else {
            Plan::Inconclusive
        };
    }

    Plan::Inconclusive
}

fn classify_hybrid(current: &[&PartitionEntry], mirrored: &[PartitionEntry], expected: usize) -> Plan {
    if current.len() != expected {
        debug!("hybrid: {} entries, expected {expected}", current.len());
        return Plan::Rewrite;
    }
    for (e, g) in current[1..].iter().zip(mirrored) {
        if !e.same_range(g) || (g.mbr_type != 0 && g.mbr_type != e.mbr_type) {
            debug!("hybrid: MBR slot {} differs from GPT entry {}", e.index, g.index);
            return Plan::Rewrite;
        }
    }
    let active = current.iter().filter(|e| e.active).count();
    if active != 1 && expected > 1 {
        debug!("hybrid: {active} active entries");
        return Plan::Rewrite;
    }
    Plan::InSync
}

/// Step B: builds the new hybrid MBR table.
///
/// The result is validated before it is returned.
pub fn synthesize(mbr: &MbrTable, gpt: &[PartitionEntry]) -> SyncResult<MbrTable> {
    let layout = ProtectiveLayout::for_gpt(gpt);
    let mut table = MbrTable::new();
    table.push(PartitionEntry::mbr(
        0,
        1,
        layout.end_lba,
        MBR_TYPE_EFI_PROTECTIVE,
        false,
    ));

    for g in &layout.mirrored(gpt) {
        let previous = mbr.iter().find(|e| e.start_lba == g.start_lba);
        let mbr_type = match g.mbr_type {
            0 => previous
                .map(|e| e.mbr_type)
                .filter(|&t| t != 0)
                .unwrap_or(MBR_TYPE_LINUX),
            t => t,
        };
        let entry = PartitionEntry::mbr(
            0,
            g.start_lba,
            g.end_lba,
            mbr_type,
            previous.is_some_and(|e| e.active),
        );
        if table.push(entry).is_none() {
            break;
        }
    }

    ensure_single_active(&mut table);
    check_synthesized(&table)?;
    Ok(table)
}

#[inline]
fn is_windows_type(t: u8) -> bool {
    matches!(t, MBR_TYPE_NTFS | MBR_TYPE_FAT32_CHS | MBR_TYPE_FAT32_LBA)
}

/// At most three passes. With no active entry: first Windows types, then
/// also Linux, then anything but the protective entry. With several:
/// first drop the flag from a protective/ESP entry 0, then keep only the
/// first one.
fn ensure_single_active(table: &mut MbrTable) {
    for pass in 0..3 {
        match table.active_count() {
            1 => return,
            0 => {
                let pick = table.iter_mut().find(|e| match pass {
                    0 => is_windows_type(e.mbr_type),
                    1 => is_windows_type(e.mbr_type) || e.mbr_type == MBR_TYPE_LINUX,
                    _ => e.index > 0,
                });
                if let Some(e) = pick {
                    e.active = true;
                }
            }
            _ if pass == 0 => {
                if let Some(e) = table.iter_mut().next() {
                    if e.index == 0
                        && matches!(e.mbr_type, MBR_TYPE_EFI_PROTECTIVE | MBR_TYPE_EFI_SYSTEM)
                    {
                        e.active = false;
                    }
                }
            }
            _ => {
                let mut seen = false;
                for e in table.iter_mut().filter(|e| e.active) {
                    e.active = !seen;
                    seen = true;
                }
            }
        }
    }
}
