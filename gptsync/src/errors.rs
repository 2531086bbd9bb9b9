// SPDX-License-Identifier: MIT

use core::fmt;

use sectorio::errors::*;

use crate::entry::PartitionEntry;
use crate::types::guid_to_uuid;

/// Which partition table an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Mbr,
    Gpt,
    /// The MBR table built by the analyzer, before it is written.
    Synthesized,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Table::Mbr => "MBR",
            Table::Gpt => "GPT",
            Table::Synthesized => "synthesized MBR",
        })
    }
}

/// Unified error type for the reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    IO(SectorIOError),
    Malformed {
        table: Table,
        reason: &'static str,
    },
    InvertedRange {
        table: Table,
        index: usize,
        start_lba: u64,
        end_lba: u64,
    },
    Overlap {
        table: Table,
        first: PartitionEntry,
        second: PartitionEntry,
    },
    UnsafeGptType {
        index: usize,
        type_guid: [u8; 16],
        name: &'static str,
    },
    ExtendedPartition {
        index: usize,
        mbr_type: u8,
    },
    BootCodeTooLarge {
        len: usize,
    },
}

impl SyncError {
    pub fn msg(&self) -> &'static str {
        match self {
            SyncError::IO(e) => e.msg(),
            SyncError::Malformed { reason, .. } => *reason,
            SyncError::InvertedRange { .. } => "Partition ends before it starts",
            SyncError::Overlap { .. } => "Partitions overlap",
            SyncError::UnsafeGptType { .. } => "Unsafe GPT partition type",
            SyncError::ExtendedPartition { .. } => "Extended partition in MBR",
            SyncError::BootCodeTooLarge { .. } => "Boot code does not fit the MBR",
        }
    }

    /// `true` for the "refuse to touch this disk" family.
    pub fn is_unsafe_layout(&self) -> bool {
        matches!(
            self,
            SyncError::UnsafeGptType { .. } | SyncError::ExtendedPartition { .. }
        )
    }
}

impl From<SectorIOError> for SyncError {
    fn from(e: SectorIOError) -> Self {
        SyncError::IO(e)
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::IO(e) => write!(f, "I/O error: {e}"),
            SyncError::Malformed { table, reason } => {
                write!(f, "{table} table is malformed: {reason}")
            }
            SyncError::InvertedRange {
                table,
                index,
                start_lba,
                end_lba,
            } => write!(
                f,
                "{table} partition {} ends before it starts ({start_lba} > {end_lba})",
                index + 1
            ),
            SyncError::Overlap {
                table,
                first,
                second,
            } => write!(
                f,
                "{table} partitions {} ({}-{}) and {} ({}-{}) overlap",
                first.index + 1,
                first.start_lba,
                first.end_lba,
                second.index + 1,
                second.start_lba,
                second.end_lba
            ),
            SyncError::UnsafeGptType {
                index,
                type_guid,
                name,
            } => write!(
                f,
                "GPT partition {} has unsafe type {name} ({}), refusing to sync",
                index + 1,
                guid_to_uuid(type_guid)
            ),
            SyncError::ExtendedPartition { index, mbr_type } => write!(
                f,
                "MBR partition {} is an extended partition (type {mbr_type:02x}), refusing to sync",
                index + 1
            ),
            SyncError::BootCodeTooLarge { len } => write!(
                f,
                "boot code is {len} bytes, at most {} fit in the MBR",
                crate::mbr::BOOT_CODE_SIZE
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SyncError {}

pub type SyncResult<T = ()> = Result<T, SyncError>;
