// SPDX-License-Identifier: MIT

use alloc::vec::Vec;

use log::{info, warn};
use sectorio::prelude::*;

use crate::analyze::{self, NoSyncReason, Plan};
use crate::entry::{MbrTable, PartitionEntry};
use crate::errors::*;
use crate::gpt::read_gpt;
use crate::mbr::read_mbr;
use crate::options::SyncOptions;
use crate::validate::{check_gpt, check_mbr};
use crate::writer::write_mbr;

/// Everything learned about the disk during one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationContext {
    pub mbr_table: MbrTable,
    pub gpt_table: Vec<PartitionEntry>,
    /// Only set when `plan` is `Rewrite`.
    pub synthesized_table: Option<MbrTable>,
    pub plan: Plan,
}

impl ReconciliationContext {
    fn finished(mbr_table: MbrTable, gpt_table: Vec<PartitionEntry>, plan: Plan) -> Self {
        Self {
            mbr_table,
            gpt_table,
            synthesized_table: None,
            plan,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    NothingToSync(NoSyncReason),
    InSync,
    Inconclusive,
    Rewritten,
    /// `Rewrite` was planned but `dry_run` was set.
    WouldRewrite,
}

/// Reads, validates and analyzes both tables. Never writes.
pub fn plan<IO: SectorIO + ?Sized>(
    io: &mut IO,
    opts: &SyncOptions<'_>,
) -> SyncResult<ReconciliationContext> {
    let gpt = match read_gpt(io, opts.verify_crc) {
        Ok(gpt) => gpt,
        Err(SyncError::Malformed {
            table: Table::Gpt,
            reason,
        }) => {
            warn!("GPT is malformed ({reason}), treating the disk as GPT-less");
            let mbr_table = read_mbr(io)?;
            return Ok(ReconciliationContext::finished(
                mbr_table,
                Vec::new(),
                Plan::NothingToSync(NoSyncReason::MalformedGpt(reason)),
            ));
        }
        Err(e) => return Err(e),
    };
    let mbr_table = read_mbr(io)?;

    let Some(mut gpt_table) = gpt else {
        info!("No GPT found, nothing to sync");
        return Ok(ReconciliationContext::finished(
            mbr_table,
            Vec::new(),
            Plan::NothingToSync(NoSyncReason::NoGpt),
        ));
    };

    if let Some(reason) = check_gpt(&gpt_table)? {
        info!("Nothing to sync ({reason:?})");
        return Ok(ReconciliationContext::finished(
            mbr_table,
            gpt_table,
            Plan::NothingToSync(reason),
        ));
    }
    check_mbr(&mbr_table)?;

    analyze::resolve_types(io, &mut gpt_table, opts.probe_filesystems)?;

    let plan = analyze::classify(&mbr_table, &gpt_table);
    let synthesized_table = match plan {
        Plan::Rewrite => {
            info!("MBR table must be updated");
            Some(analyze::synthesize(&mbr_table, &gpt_table)?)
        }
        Plan::InSync => {
            info!("Tables are synchronized, no need to sync");
            None
        }
        _ => {
            warn!("Current MBR layout is not recognized, leaving it alone");
            None
        }
    };

    Ok(ReconciliationContext {
        mbr_table,
        gpt_table,
        synthesized_table,
        plan,
    })
}

/// Writes the synthesized table. Any plan other than `Rewrite` is a no-op.
pub fn commit<IO: SectorIO + ?Sized>(
    io: &mut IO,
    ctx: &ReconciliationContext,
    opts: &SyncOptions<'_>,
) -> SyncResult {
    let (Plan::Rewrite, Some(table)) = (ctx.plan, ctx.synthesized_table.as_ref()) else {
        return Ok(());
    };
    write_mbr(io, table, opts.boot_code)?;
    info!("MBR updated successfully");
    Ok(())
}

/// `plan` followed by `commit` unless `opts.dry_run` is set.
pub fn sync<IO: SectorIO + ?Sized>(io: &mut IO, opts: &SyncOptions<'_>) -> SyncResult<SyncOutcome> {
    let ctx = plan(io, opts)?;
    Ok(match ctx.plan {
        Plan::NothingToSync(reason) => SyncOutcome::NothingToSync(reason),
        Plan::InSync => SyncOutcome::InSync,
        Plan::Inconclusive => SyncOutcome::Inconclusive,
        Plan::Rewrite if opts.dry_run => SyncOutcome::WouldRewrite,
        Plan::Rewrite => {
            commit(io, &ctx, opts)?;
            SyncOutcome::Rewritten
        }
    })
}
