// SPDX-License-Identifier: MIT

use log::{debug, info};
use sectorio::prelude::*;

use crate::entry::MbrTable;
use crate::errors::*;
use crate::mbr::{BOOT_CODE_SIZE, Mbr};

/// Writes `table` into sector 0.
///
/// Sector 0 is re-read first so everything outside the four slots is kept:
/// the disk signature always, the boot code unless the region is all zero,
/// in which case `boot_code` is installed. There is no rollback if the write
/// fails halfway.
pub fn write_mbr<IO: SectorIO + ?Sized>(
    io: &mut IO,
    table: &MbrTable,
    boot_code: &[u8],
) -> SyncResult {
    if boot_code.len() > BOOT_CODE_SIZE {
        return Err(SyncError::BootCodeTooLarge {
            len: boot_code.len(),
        });
    }

    let mut mbr: Mbr = io.read_struct(0)?;
    if !mbr.has_boot_code() && !boot_code.is_empty() {
        info!("Installing fallback boot code ({} bytes)", boot_code.len());
        let mut code = [0u8; BOOT_CODE_SIZE];
        code[..boot_code.len()].copy_from_slice(boot_code);
        mbr.boot_code = code;
    }
    mbr.set_table(table);

    debug!("MBR: writing {} entries", table.len());
    io.write_struct(0, &mbr)?;
    io.flush()?;
    Ok(())
}
