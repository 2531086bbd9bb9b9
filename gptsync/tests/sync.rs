// SPDX-License-Identifier: MIT
//! End-to-end runs over in-memory and file-backed disk images.

mod common;

use std::io::{Read, Seek, SeekFrom, Write};

use common::*;
use gptsync::bootcode::FALLBACK_BOOT_CODE;
use gptsync::types::*;
use gptsync::*;
use sectorio::prelude::*;

/// Runs `sync` and returns the outcome plus the number of sector writes.
fn run(img: &mut [u8], opts: &SyncOptions<'_>) -> (SyncResult<SyncOutcome>, u64) {
    let mut mem = MemSectorIO::new(img);
    let mut io = IOCounter::new(&mut mem);
    let res = sync(&mut io, opts);
    (res, io.snapshot().writes)
}

fn esp_linux_disk() -> DiskBuilder {
    DiskBuilder::new()
        .gpt(GPT_TYPE_EFI_SYSTEM, 34, 2081)
        .gpt(GPT_TYPE_LINUX_FS, 2082, 1_000_000)
}

#[test]
fn protective_mbr_is_turned_into_a_hybrid() {
    let mut img = esp_linux_disk().mbr(0, 0xEE, 1, 1_000_000, false).build();

    let (res, writes) = run(&mut img, &SyncOptions::new());
    assert_eq!(res, Ok(SyncOutcome::Rewritten));
    assert_eq!(writes, 1);
    assert_eq!(
        mbr_layout(&img),
        [(0xEE, 1, 2081, false), (0x83, 2082, 1_000_000, true)]
    );
    assert_eq!(&img[..FALLBACK_BOOT_CODE.len()], &FALLBACK_BOOT_CODE[..]);
    assert_eq!(&img[440..444], &DISK_SIGNATURE);
}

#[test]
fn rewritten_disk_is_in_sync() {
    let mut img = esp_linux_disk().mbr(0, 0xEE, 1, 1_000_000, false).build();
    assert_eq!(run(&mut img, &SyncOptions::new()).0, Ok(SyncOutcome::Rewritten));

    let (res, writes) = run(&mut img, &SyncOptions::new());
    assert_eq!(res, Ok(SyncOutcome::InSync));
    assert_eq!(writes, 0);
}

#[test]
fn non_esp_first_layout_is_idempotent() {
    let mut img = DiskBuilder::new()
        .gpt(GPT_TYPE_BIOS_BOOT, 34, 2047)
        .gpt(GPT_TYPE_LINUX_FS, 2048, 3000)
        .gpt(GPT_TYPE_LINUX_SWAP, 3001, 4000)
        .build();

    assert_eq!(run(&mut img, &SyncOptions::new()).0, Ok(SyncOutcome::Rewritten));
    assert_eq!(
        mbr_layout(&img),
        [
            (0xEE, 1, 33, false),
            (0x83, 34, 2047, true),
            (0x83, 2048, 3000, false),
            (0x82, 3001, 4000, false),
        ]
    );

    let (res, writes) = run(&mut img, &SyncOptions::new());
    assert_eq!(res, Ok(SyncOutcome::InSync));
    assert_eq!(writes, 0);
}

#[test]
fn correct_hybrid_is_left_alone() {
    let mut img = esp_linux_disk()
        .mbr(0, 0xEE, 1, 2081, false)
        .mbr(1, 0x83, 2082, 1_000_000, true)
        .build();
    let before = img.clone();

    let (res, writes) = run(&mut img, &SyncOptions::new());
    assert_eq!(res, Ok(SyncOutcome::InSync));
    assert_eq!(writes, 0);
    assert_eq!(img, before);
}

#[test]
fn overlapping_mbr_aborts_before_analysis() {
    let mut img = esp_linux_disk()
        .mbr(0, 0xEE, 1, 2081, false)
        .mbr(1, 0x83, 2000, 1_000_000, true)
        .build();

    let (res, writes) = run(&mut img, &SyncOptions::new());
    match res {
        Err(SyncError::Overlap {
            table: Table::Mbr,
            first,
            second,
        }) => {
            assert_eq!((first.index, second.index), (0, 1));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(writes, 0);
}

#[test]
fn fatal_gpt_type_never_writes() {
    let mut img = DiskBuilder::new()
        .gpt(GPT_TYPE_LINUX_FS, 34, 2047)
        .gpt(GPT_TYPE_LDM_METADATA, 2048, 4095)
        .mbr(0, 0xEE, 1, 4095, false)
        .build();

    let (res, writes) = run(&mut img, &SyncOptions::new());
    assert!(matches!(res, Err(e) if e.is_unsafe_layout()));
    assert_eq!(writes, 0);
}

#[test]
fn extended_partition_never_writes() {
    let mut img = esp_linux_disk()
        .mbr(0, 0x83, 2082, 3000, true)
        .mbr(1, 0x05, 3001, 4000, false)
        .build();

    let (res, writes) = run(&mut img, &SyncOptions::new());
    assert_eq!(
        res,
        Err(SyncError::ExtendedPartition {
            index: 1,
            mbr_type: 0x05,
        })
    );
    assert_eq!(writes, 0);
}

#[test]
fn existing_boot_code_is_preserved() {
    let code = [0xEBu8, 0x63, 0x90, 0x10, 0x8E, 0xD0];
    let mut img = esp_linux_disk()
        .mbr(0, 0xEE, 1, 1_000_000, false)
        .boot_code(&code)
        .build();

    assert_eq!(run(&mut img, &SyncOptions::new()).0, Ok(SyncOutcome::Rewritten));
    assert_eq!(&img[..code.len()], &code);
    assert!(img[code.len()..440].iter().all(|&b| b == 0));
    assert_eq!(&img[440..444], &DISK_SIGNATURE);
}

#[test]
fn custom_boot_code_is_installed() {
    let code = [0xF4u8; 32];
    let mut img = esp_linux_disk().mbr(0, 0xEE, 1, 1_000_000, false).build();
    let opts = SyncOptions::new().with_boot_code(&code).unwrap();

    assert_eq!(run(&mut img, &opts).0, Ok(SyncOutcome::Rewritten));
    assert_eq!(&img[..32], &code);
    assert_eq!(img[32], 0);
}

#[test]
fn only_the_first_three_gpt_partitions_are_mirrored() {
    let mut img = DiskBuilder::new()
        .gpt(GPT_TYPE_EFI_SYSTEM, 34, 199)
        .gpt(GPT_TYPE_LINUX_FS, 200, 299)
        .gpt(GPT_TYPE_LINUX_SWAP, 300, 399)
        .gpt(GPT_TYPE_LINUX_LVM, 400, 499)
        .gpt(GPT_TYPE_LINUX_FS, 500, 599)
        .gpt(GPT_TYPE_LINUX_FS, 600, 699)
        .build();

    assert_eq!(
        run(&mut img, &SyncOptions::new().no_probe()).0,
        Ok(SyncOutcome::Rewritten)
    );
    let layout = mbr_layout(&img);
    assert_eq!(
        layout,
        [
            (0xEE, 1, 199, false),
            (0x83, 200, 299, true),
            (0x82, 300, 399, false),
            (0x8E, 400, 499, false),
        ]
    );
    assert_eq!(layout.iter().filter(|e| e.3).count(), 1);
}

#[test]
fn full_mirror_layouts() {
    let mut img = esp_linux_disk()
        .mbr(0, 0xEF, 34, 2081, false)
        .mbr(1, 0x83, 2082, 1_000_000, true)
        .build();
    let (res, writes) = run(&mut img, &SyncOptions::new());
    assert_eq!(res, Ok(SyncOutcome::InSync));
    assert_eq!(writes, 0);

    let mut img = esp_linux_disk()
        .mbr(0, 0xEF, 34, 2081, false)
        .mbr(1, 0x83, 4096, 1_000_000, true)
        .build();
    let (res, writes) = run(&mut img, &SyncOptions::new());
    assert_eq!(res, Ok(SyncOutcome::Inconclusive));
    assert_eq!(writes, 0);
}

#[test]
fn full_mirror_type_change_is_left_alone() {
    let mut img = esp_linux_disk()
        .mbr(0, 0xEF, 34, 2081, false)
        .mbr(1, 0x07, 2082, 1_000_000, true)
        .build();
    let before = img.clone();
    let (res, writes) = run(&mut img, &SyncOptions::new());
    assert_eq!(res, Ok(SyncOutcome::Inconclusive));
    assert_eq!(writes, 0);
    assert_eq!(img, before);

    // Unformatted Basic Data has no MBR type of its own to disagree with.
    let mut img = DiskBuilder::new()
        .gpt(GPT_TYPE_EFI_SYSTEM, 34, 2081)
        .gpt(GPT_TYPE_BASIC_DATA, 2082, 8191)
        .mbr(0, 0xEF, 34, 2081, false)
        .mbr(1, 0x07, 2082, 8191, true)
        .build();
    let (res, writes) = run(&mut img, &SyncOptions::new());
    assert_eq!(res, Ok(SyncOutcome::InSync));
    assert_eq!(writes, 0);
}

#[test]
fn unrelated_mbr_is_inconclusive() {
    let mut img = esp_linux_disk().mbr(0, 0x07, 2048, 4095, true).build();
    let (res, writes) = run(&mut img, &SyncOptions::new());
    assert_eq!(res, Ok(SyncOutcome::Inconclusive));
    assert_eq!(writes, 0);
}

#[test]
fn dry_run_only_plans() {
    let mut img = esp_linux_disk().mbr(0, 0xEE, 1, 1_000_000, false).build();
    let before = img.clone();

    let (res, writes) = run(&mut img, &SyncOptions::new().dry_run());
    assert_eq!(res, Ok(SyncOutcome::WouldRewrite));
    assert_eq!(writes, 0);
    assert_eq!(img, before);
}

#[test]
fn plan_then_commit() {
    let mut img = esp_linux_disk().mbr(0, 0xEE, 1, 1_000_000, false).build();
    let opts = SyncOptions::new();
    let mut io = MemSectorIO::new(&mut img);

    let ctx = plan(&mut io, &opts).unwrap();
    assert_eq!(ctx.plan, Plan::Rewrite);
    assert_eq!(ctx.gpt_table.len(), 2);
    assert_eq!(ctx.mbr_table.len(), 1);
    let proposed = ctx.synthesized_table.unwrap();
    assert_eq!(proposed.len(), 2);
    assert!(format!("{proposed}").contains("EFI Protective"));
    assert!(format!("{}", GptDisplay(&ctx.gpt_table)).contains("EFI System"));

    commit(&mut io, &ctx, &opts).unwrap();
    assert_eq!(plan(&mut io, &opts).unwrap().plan, Plan::InSync);
}

#[test]
fn commit_ignores_other_plans() {
    let mut img = esp_linux_disk().mbr(0, 0x07, 2048, 4095, true).build();
    let opts = SyncOptions::new();
    let mut mem = MemSectorIO::new(&mut img);
    let mut io = IOCounter::new(&mut mem);

    let ctx = plan(&mut io, &opts).unwrap();
    assert_eq!(ctx.plan, Plan::Inconclusive);
    assert_eq!(ctx.synthesized_table, None);
    commit(&mut io, &ctx, &opts).unwrap();
    assert_eq!(io.snapshot().writes, 0);
}

#[test]
fn nothing_to_sync_cases() {
    let mut img = DiskBuilder::new().mbr(0, 0x83, 2048, 4095, true).build();
    assert_eq!(
        run(&mut img, &SyncOptions::new()).0,
        Ok(SyncOutcome::NothingToSync(NoSyncReason::NoGpt))
    );

    let mut img = DiskBuilder::new().empty_gpt().build();
    assert_eq!(
        run(&mut img, &SyncOptions::new()).0,
        Ok(SyncOutcome::NothingToSync(NoSyncReason::EmptyGpt))
    );

    let mut img = DiskBuilder::new()
        .gpt(GPT_TYPE_EFI_SYSTEM, 34, 2081)
        .gpt(GPT_TYPE_LINUX_SWAP, 2082, 4000)
        .build();
    let (res, writes) = run(&mut img, &SyncOptions::new());
    assert_eq!(
        res,
        Ok(SyncOutcome::NothingToSync(NoSyncReason::NoDataPartitions))
    );
    assert_eq!(writes, 0);
}

#[test]
fn corrupt_gpt_is_treated_as_absent() {
    let mut img = esp_linux_disk()
        .mbr(0, 0xEE, 1, 1_000_000, false)
        // Touch the first entry's name behind the CRC's back.
        .patch(2, 56, b"E")
        .build();

    let (res, writes) = run(&mut img, &SyncOptions::new());
    assert_eq!(
        res,
        Ok(SyncOutcome::NothingToSync(NoSyncReason::MalformedGpt(
            "partition entry array CRC32 mismatch"
        )))
    );
    assert_eq!(writes, 0);

    let (res, _) = run(&mut img, &SyncOptions::new().no_crc());
    assert_eq!(res, Ok(SyncOutcome::Rewritten));
    assert_eq!(mbr_layout(&img)[0], (0xEE, 1, 2081, false));
}

#[test]
fn missing_mbr_signature_aborts() {
    let mut img = esp_linux_disk().no_mbr_signature().build();
    let (res, writes) = run(&mut img, &SyncOptions::new());
    assert!(matches!(
        res,
        Err(SyncError::Malformed {
            table: Table::Mbr,
            ..
        })
    ));
    assert_eq!(writes, 0);
}

#[test]
fn basic_data_type_comes_from_the_filesystem() {
    let mut img = DiskBuilder::new()
        .gpt(GPT_TYPE_EFI_SYSTEM, 34, 2081)
        .gpt(GPT_TYPE_BASIC_DATA, 2082, 4095)
        .mbr(0, 0xEE, 1, 4095, false)
        .patch(2082, 0, &ntfs_boot_sector())
        .build();

    assert_eq!(run(&mut img, &SyncOptions::new()).0, Ok(SyncOutcome::Rewritten));
    assert_eq!(
        mbr_layout(&img),
        [(0xEE, 1, 2081, false), (0x07, 2082, 4095, true)]
    );
    assert_eq!(run(&mut img, &SyncOptions::new()).0, Ok(SyncOutcome::InSync));
}

#[test]
fn unprobed_basic_data_falls_back_to_linux() {
    let mut img = DiskBuilder::new()
        .gpt(GPT_TYPE_EFI_SYSTEM, 34, 2081)
        .gpt(GPT_TYPE_BASIC_DATA, 2082, 4095)
        .mbr(0, 0xEE, 1, 4095, false)
        .patch(2082, 0, &ntfs_boot_sector())
        .build();

    let opts = SyncOptions::new().no_probe();
    assert_eq!(run(&mut img, &opts).0, Ok(SyncOutcome::Rewritten));
    assert_eq!(
        mbr_layout(&img),
        [(0xEE, 1, 2081, false), (0x83, 2082, 4095, true)]
    );
}

#[test]
fn file_backed_device() {
    let img = esp_linux_disk().mbr(0, 0xEE, 1, 1_000_000, false).build();
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(&img).unwrap();

    {
        let mut io = StdSectorIO::new(&mut file);
        assert_eq!(sync(&mut io, &SyncOptions::new()), Ok(SyncOutcome::Rewritten));
    }

    let mut sector0 = vec![0u8; SECTOR_SIZE];
    file.seek(SeekFrom::Start(0)).unwrap();
    file.read_exact(&mut sector0).unwrap();
    assert_eq!(
        mbr_layout(&sector0),
        [(0xEE, 1, 2081, false), (0x83, 2082, 1_000_000, true)]
    );
}
