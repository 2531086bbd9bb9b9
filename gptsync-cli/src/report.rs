// SPDX-License-Identifier: MIT

use std::fmt::Write;

use colored::Colorize;
use gptsync::{GptDisplay, NoSyncReason, PartitionEntry, ReconciliationContext};

pub fn sep_u64(mut n: u64) -> String {
    // thousands separator: 12 345 678
    if n < 1_000 {
        return n.to_string();
    }
    let mut parts: Vec<String> = Vec::new();
    while n >= 1_000 {
        parts.push(format!("{:03}", n % 1_000));
        n /= 1_000;
    }
    parts.push(n.to_string());
    parts.reverse();
    parts.join(" ")
}

pub fn reason_text(reason: NoSyncReason) -> String {
    match reason {
        NoSyncReason::NoGpt => "No GPT partition table found".into(),
        NoSyncReason::MalformedGpt(why) => format!("GPT partition table is malformed ({why})"),
        NoSyncReason::EmptyGpt => "GPT partition table is empty".into(),
        NoSyncReason::NoDataPartitions => {
            "GPT partition table has no data partitions worth mirroring".into()
        }
    }
}

fn total_sectors(entries: &[PartitionEntry]) -> u64 {
    entries.iter().map(PartitionEntry::sectors).sum()
}

/// Current tables, followed by the proposed MBR when there is one.
pub fn render(ctx: &ReconciliationContext) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "\n{}", "Current GPT partition table:".bold());
    if ctx.gpt_table.is_empty() {
        let _ = writeln!(out, "  (none)");
    } else {
        let _ = write!(out, "{}", GptDisplay(&ctx.gpt_table));
        let _ = writeln!(
            out,
            "  {} partitions, {} sectors",
            ctx.gpt_table.len(),
            sep_u64(total_sectors(&ctx.gpt_table))
        );
    }

    let _ = writeln!(out, "\n{}", "Current MBR partition table:".bold());
    if ctx.mbr_table.is_empty() {
        let _ = writeln!(out, "  (empty)");
    } else {
        let _ = write!(out, "{}", ctx.mbr_table);
    }

    if let Some(proposed) = &ctx.synthesized_table {
        let _ = writeln!(out, "\n{}", "Proposed new MBR partition table:".bold());
        let _ = write!(out, "{proposed}");
    }
    out
}
