// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use mklists::{
    config::Config,
    init::{
        write_minimal_rulefiles, write_starter_configfile, write_starter_datafile,
        write_starter_rulefiles,
    },
    path::{datadirs_below, find_rootdir, is_datadir, CONFIGFILE_NAME},
    sync::{sync_datadir, SyncOptions},
};

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::{env::current_dir, fs::read_to_string, path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "mklists [options] <mklists-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        match self.command {
            Command::Init(opts) => run_init(opts),
            Command::Sync(opts) => run_sync(opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Initialize new list repository.
    #[command(override_usage = "mklists init [options] [directory]")]
    Init(InitOptions),

    /// Rebuild lists of data directories by their rules.
    #[command(override_usage = "mklists sync [options]")]
    Sync(SyncCliOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InitOptions {
    /// Directory to initialize, current directory by default.
    #[arg(value_name = "directory")]
    pub directory: Option<PathBuf>,

    /// Write minimal rule files without starter list.
    #[arg(short, long)]
    pub bare: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SyncCliOptions {
    /// Show what would change without touching any file.
    #[arg(short, long)]
    pub dryrun: bool,

    #[command(flatten)]
    pub scope: SyncScope,
}

#[derive(Args, Clone, Debug)]
#[group(multiple = false)]
struct SyncScope {
    /// Sync current directory and every data directory below it.
    #[arg(short = 'b', long)]
    pub here_below: bool,

    /// Sync current directory only.
    #[arg(short = 'o', long)]
    pub here_only: bool,

    /// Sync every data directory of the repository.
    #[arg(short, long)]
    pub everywhere: bool,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = Cli::parse().run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run_init(opts: InitOptions) -> Result<()> {
    let rootdir = match opts.directory {
        Some(directory) => directory,
        None => current_dir()?,
    };
    mkdirp::mkdirp(&rootdir)?;

    write_starter_configfile(&rootdir)?;
    if opts.bare {
        write_minimal_rulefiles(&rootdir)?;
    } else {
        write_starter_rulefiles(&rootdir)?;
        write_starter_datafile(&rootdir)?;
    }
    info!("initialized list repository at {:?}", rootdir.display());

    Ok(())
}

fn run_sync(opts: SyncCliOptions) -> Result<()> {
    let here = current_dir()?;
    let rootdir = find_rootdir(&here)?;
    let config: Config = read_to_string(rootdir.join(CONFIGFILE_NAME))?.parse()?;

    let datadirs = if opts.scope.everywhere {
        datadirs_below(&rootdir)
    } else if opts.scope.here_only {
        if !is_datadir(&here) {
            bail!("{:?} is not a data directory", here.display());
        }
        vec![here.clone()]
    } else {
        datadirs_below(&here)
    };

    if datadirs.is_empty() {
        bail!("no data directories to sync below {:?}", here.display());
    }

    let options = SyncOptions {
        dryrun: opts.dryrun,
    };

    if datadirs.len() == 1 {
        sync_datadir(&datadirs[0], &rootdir, &config, options)?;
        return Ok(());
    }

    let bar = ProgressBar::new(datadirs.len() as u64);
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}] {pos}/{len}",
    )?
    .progress_chars("-Cco.");
    bar.set_style(style);

    for datadir in &datadirs {
        bar.set_message(datadir.display().to_string());
        bar.suspend(|| sync_datadir(datadir, &rootdir, &config, options))?;
        bar.inc(1);
    }
    bar.finish_and_clear();

    Ok(())
}
