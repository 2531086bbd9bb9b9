// SPDX-License-Identifier: MIT

use alloc::vec::Vec;

use log::debug;

use crate::analyze::NoSyncReason;
use crate::entry::{MbrTable, PartitionEntry};
use crate::errors::*;
use crate::types::{GptKind, is_extended_type};

/// Every entry must satisfy `start_lba <= end_lba`.
pub fn check_ranges<'a, I>(table: Table, entries: I) -> SyncResult
where
    I: IntoIterator<Item = &'a PartitionEntry>,
{
    for e in entries {
        if e.end_lba < e.start_lba {
            return Err(SyncError::InvertedRange {
                table,
                index: e.index,
                start_lba: e.start_lba,
                end_lba: e.end_lba,
            });
        }
    }
    Ok(())
}

/// Pairwise disjointness, reporting the first overlapping pair found.
pub fn check_overlaps<'a, I>(table: Table, entries: I) -> SyncResult
where
    I: IntoIterator<Item = &'a PartitionEntry>,
{
    let mut segs: Vec<&PartitionEntry> = entries.into_iter().collect();
    if segs.len() <= 1 {
        return Ok(());
    }
    segs.sort_unstable_by_key(|e| (e.start_lba, e.index));

    // Sorted by start, so any overlap shows up between the interval reaching
    // furthest so far and the next one.
    let mut reach = segs[0];
    for &curr in &segs[1..] {
        if curr.overlaps(reach) {
            let (first, second) = if reach.index <= curr.index {
                (*reach, *curr)
            } else {
                (*curr, *reach)
            };
            return Err(SyncError::Overlap {
                table,
                first,
                second,
            });
        }
        if curr.end_lba > reach.end_lba {
            reach = curr;
        }
    }
    Ok(())
}

/// GPT checks, in order. `Ok(Some(_))` means there is nothing to do.
pub fn check_gpt(gpt: &[PartitionEntry]) -> SyncResult<Option<NoSyncReason>> {
    if gpt.is_empty() {
        return Ok(Some(NoSyncReason::EmptyGpt));
    }
    check_ranges(Table::Gpt, gpt)?;
    check_overlaps(Table::Gpt, gpt)?;

    for e in gpt {
        let Some(d) = e.gpt_type else { continue };
        if d.kind == GptKind::Fatal {
            return Err(SyncError::UnsafeGptType {
                index: e.index,
                type_guid: e.gpt_type_guid,
                name: d.name,
            });
        }
    }

    if !gpt.iter().any(|e| e.kind().is_some_and(GptKind::is_data)) {
        debug!("GPT: only system partitions");
        return Ok(Some(NoSyncReason::NoDataPartitions));
    }
    Ok(None)
}

/// Overlap and extended-partition checks on the current MBR.
pub fn check_mbr(mbr: &MbrTable) -> SyncResult {
    check_overlaps(Table::Mbr, mbr.iter())?;
    for e in mbr.iter() {
        if is_extended_type(e.mbr_type) {
            return Err(SyncError::ExtendedPartition {
                index: e.index,
                mbr_type: e.mbr_type,
            });
        }
    }
    Ok(())
}

/// Last line of defense before anything is written.
pub fn check_synthesized(table: &MbrTable) -> SyncResult {
    check_ranges(Table::Synthesized, table.iter())?;
    check_overlaps(Table::Synthesized, table.iter())
}
