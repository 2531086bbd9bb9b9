// SPDX-License-Identifier: MIT

use crate::bootcode::FALLBACK_BOOT_CODE;
use crate::errors::*;
use crate::mbr::BOOT_CODE_SIZE;

/// Options for a reconciliation run
#[derive(Clone, Copy, Debug)]
pub struct SyncOptions<'a> {
    /// Verify the GPT header and entry array CRC32
    pub verify_crc: bool,
    /// Look inside Basic Data partitions and ESPs to pick MBR types
    pub probe_filesystems: bool,
    /// Analyze only, never write
    pub dry_run: bool,
    /// Installed when the MBR boot code region is all zero
    pub boot_code: &'a [u8],
}

impl Default for SyncOptions<'_> {
    fn default() -> Self {
        Self {
            verify_crc: true,
            probe_filesystems: true,
            dry_run: false,
            boot_code: &FALLBACK_BOOT_CODE,
        }
    }
}

impl<'a> SyncOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_crc(mut self) -> Self {
        self.verify_crc = false;
        self
    }

    pub fn no_probe(mut self) -> Self {
        self.probe_filesystems = false;
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Replaces the fallback boot code. At most 440 bytes fit in front of
    /// the disk signature.
    pub fn with_boot_code(mut self, code: &'a [u8]) -> SyncResult<Self> {
        if code.len() > BOOT_CODE_SIZE {
            return Err(SyncError::BootCodeTooLarge { len: code.len() });
        }
        self.boot_code = code;
        Ok(self)
    }
}
