// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[macro_use]
mod macros;

pub mod errors;
/// Partition type descriptors (GPT GUIDs and legacy MBR type bytes).
pub mod types;
/// Normalized partition entries and the fixed four-slot MBR table.
pub mod entry;
/// GUID Partition Table reader.
pub mod gpt;
/// Master Boot Record reader and on-disk layout.
pub mod mbr;
/// Table consistency checks.
pub mod validate;
/// Filesystem signature probing.
pub mod probe;
/// Scenario analysis and hybrid MBR synthesis.
pub mod analyze;
/// Fallback legacy boot code.
pub mod bootcode;
/// MBR writer.
pub mod writer;
pub mod options;
/// Plan / commit pipeline.
pub mod sync;

pub use analyze::{NoSyncReason, Plan};
pub use entry::{GptDisplay, MbrTable, PartitionEntry};
pub use errors::{SyncError, SyncResult, Table};
pub use options::SyncOptions;
pub use sync::{ReconciliationContext, SyncOutcome, commit, plan, sync};
