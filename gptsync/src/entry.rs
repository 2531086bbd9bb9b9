// SPDX-License-Identifier: MIT

use core::fmt;

use crate::types::{GptKind, GptTypeDescriptor, mbr_type_name};

/// A partition from either table, normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionEntry {
    /// Slot in the table it came from (MBR 0-3, GPT entry array index).
    pub index: usize,
    pub start_lba: u64,
    /// Inclusive.
    pub end_lba: u64,
    /// Legacy type byte; for GPT entries the resolved equivalent, 0 if none.
    pub mbr_type: u8,
    /// All-zero for MBR entries.
    pub gpt_type_guid: [u8; 16],
    pub gpt_type: Option<&'static GptTypeDescriptor>,
    pub active: bool,
}

impl PartitionEntry {
    pub fn mbr(index: usize, start_lba: u64, end_lba: u64, mbr_type: u8, active: bool) -> Self {
        Self {
            index,
            start_lba,
            end_lba,
            mbr_type,
            gpt_type_guid: [0u8; 16],
            gpt_type: None,
            active,
        }
    }

    pub fn gpt(
        index: usize,
        start_lba: u64,
        end_lba: u64,
        type_guid: [u8; 16],
        descriptor: &'static GptTypeDescriptor,
    ) -> Self {
        Self {
            index,
            start_lba,
            end_lba,
            mbr_type: descriptor.mbr_type,
            gpt_type_guid: type_guid,
            gpt_type: Some(descriptor),
            active: false,
        }
    }

    #[inline]
    pub fn kind(&self) -> Option<GptKind> {
        self.gpt_type.map(|d| d.kind)
    }

    #[inline]
    pub fn sectors(&self) -> u64 {
        self.end_lba.saturating_sub(self.start_lba).saturating_add(1)
    }

    #[inline]
    pub fn same_range(&self, other: &PartitionEntry) -> bool {
        self.start_lba == other.start_lba && self.end_lba == other.end_lba
    }

    /// Inclusive ranges: overlap iff a.start <= b.end && b.start <= a.end.
    #[inline]
    pub fn overlaps(&self, other: &PartitionEntry) -> bool {
        self.start_lba <= other.end_lba && other.start_lba <= self.end_lba
    }
}

/// The four primary MBR slots. Empty slots are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MbrTable {
    slots: [Option<PartitionEntry>; 4],
}

impl MbrTable {
    pub const SLOTS: usize = 4;

    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn slots(&self) -> &[Option<PartitionEntry>; 4] {
        &self.slots
    }

    /// Stores `entry` in its physical slot (`entry.index`).
    pub fn set(&mut self, entry: PartitionEntry) {
        if let Some(slot) = self.slots.get_mut(entry.index) {
            *slot = Some(entry);
        }
    }

    /// Appends to the first free slot and rewrites `entry.index` to it.
    /// Returns `None` when all four slots are used.
    pub fn push(&mut self, mut entry: PartitionEntry) -> Option<usize> {
        let slot = self.slots.iter().position(Option::is_none)?;
        entry.index = slot;
        self.slots[slot] = Some(entry);
        Some(slot)
    }

    /// Used entries, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &PartitionEntry> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PartitionEntry> {
        self.slots.iter_mut().flatten()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    #[inline]
    pub fn first(&self) -> Option<&PartitionEntry> {
        self.iter().next()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.iter().filter(|e| e.active).count()
    }
}

impl fmt::Display for MbrTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " # A    Start LBA      End LBA  Type")?;
        for e in self.iter() {
            writeln!(
                f,
                "{:>2} {} {:>12} {:>12}  {:02x}  {}",
                e.index + 1,
                if e.active { '*' } else { ' ' },
                e.start_lba,
                e.end_lba,
                e.mbr_type,
                mbr_type_name(e.mbr_type)
            )?;
        }
        Ok(())
    }
}

/// `Display` adapter for a GPT partition list.
pub struct GptDisplay<'a>(pub &'a [PartitionEntry]);

impl fmt::Display for GptDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " #      Start LBA      End LBA  Type")?;
        for e in self.0 {
            let name = e.gpt_type.map_or("Unknown", |d| d.name);
            write!(
                f,
                "{:>2} {:>14} {:>14}  {}",
                e.index + 1,
                e.start_lba,
                e.end_lba,
                name
            )?;
            if e.mbr_type != 0 {
                write!(f, " ({})", mbr_type_name(e.mbr_type))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
