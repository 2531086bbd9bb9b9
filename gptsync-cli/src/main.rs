// SPDX-License-Identifier: MIT

mod logger;
mod prompt;
mod report;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use gptsync::bootcode::FALLBACK_BOOT_CODE;
use gptsync::{Plan, SyncOptions, commit, plan};
use log::{error, info, warn};
use sectorio::prelude::*;

use crate::logger::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "gptsync",
    version,
    about = "Synchronize the MBR partition table with the GPT",
    long_about = "Rewrites a protective or hybrid MBR so that it mirrors the first GPT \
                  partitions, letting BIOS-style bootloaders see them. Layouts that are not \
                  recognized are never touched."
)]
struct Cli {
    /// Target disk or image (e.g., /dev/sdX, disk.img)
    device: PathBuf,

    /// Only print what would be done, don't write the MBR
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Do not ask for confirmation before writing
    #[arg(short = 'y', long)]
    yes: bool,

    /// Do not look at filesystem signatures to pick MBR types
    #[arg(long)]
    no_probe: bool,

    /// Do not verify the GPT header and partition array CRC32
    #[arg(long)]
    no_crc: bool,

    /// Boot code installed when the MBR has none (at most 440 bytes)
    #[arg(long, value_name = "FILE")]
    boot_code: Option<PathBuf>,

    /// Print parsing details
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> LogLevel {
        if self.quiet {
            LogLevel::Quiet
        } else if self.verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        }
    }

    fn sync_options<'a>(&self, boot_code: &'a [u8]) -> anyhow::Result<SyncOptions<'a>> {
        let mut opts = SyncOptions::new().with_boot_code(boot_code)?;
        if self.no_crc {
            opts = opts.no_crc();
        }
        if self.no_probe {
            opts = opts.no_probe();
        }
        if self.dry_run {
            opts = opts.dry_run();
        }
        Ok(opts)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.log_level());

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns the process exit code: 0 when nothing is left to do, 1 when the
/// MBR layout is not recognized.
fn run(cli: &Cli) -> anyhow::Result<u8> {
    let boot_code = match &cli.boot_code {
        Some(path) => fs::read(path)
            .with_context(|| format!("Cannot read boot code from {}", path.display()))?,
        None => FALLBACK_BOOT_CODE.to_vec(),
    };
    let opts = cli.sync_options(&boot_code)?;

    let mut file = OpenOptions::new()
        .read(true)
        .write(!cli.dry_run)
        .open(&cli.device)
        .with_context(|| format!("Cannot open {}", cli.device.display()))?;
    let mut disk = StdSectorIO::new(&mut file);

    let ctx = plan(&mut disk, &opts)
        .with_context(|| format!("Cannot sync {}", cli.device.display()))?;
    print!("{}", report::render(&ctx));

    match ctx.plan {
        Plan::NothingToSync(reason) => {
            info!("{}, nothing to sync", report::reason_text(reason));
            Ok(0)
        }
        Plan::InSync => {
            info!("No action needed");
            Ok(0)
        }
        Plan::Inconclusive => {
            warn!("Unrecognized MBR layout, refusing to touch it");
            Ok(1)
        }
        Plan::Rewrite if cli.dry_run => {
            info!("Dry run mode: the MBR was not written");
            Ok(0)
        }
        Plan::Rewrite => {
            if !cli.yes {
                let stdin = io::stdin();
                let yes = prompt::confirm(
                    &mut stdin.lock(),
                    &mut io::stdout(),
                    prompt::UPDATE_QUESTION,
                )?;
                if !yes {
                    info!("Aborted, the MBR was not written");
                    return Ok(0);
                }
            }
            commit(&mut disk, &ctx, &opts)
                .with_context(|| format!("Cannot write the MBR of {}", cli.device.display()))?;
            Ok(0)
        }
    }
}
