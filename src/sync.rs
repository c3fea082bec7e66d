// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Data directory synchronization.
//!
//! Syncing a data directory rebuilds its lists from scratch: rules are
//! loaded, every line of every list is read, the rules route those lines into
//! containers, and the containers replace the old lists on disk. Old lists are
//! kept as backups unless the repository asks for none.

use crate::{
    apply::{apply_rules_to_datalines, Containers},
    backup::{delete_older_backupdirs, move_datafiles_to_backupdir, timestamp},
    config::Config,
    data::{delete_datafiles, get_datalines, move_datafiles_to_dirs, write_datafiles},
    linkify::write_htmlfiles,
    path::absolute_path,
    rules::get_rules,
};

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Options for a single sync.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Compute and report new lists without touching anything on disk.
    pub dryrun: bool,
}

/// Outcome of syncing one data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Data directory that was synced.
    pub datadir: PathBuf,

    /// Lists as computed by the rules.
    pub containers: Containers,

    /// Backup directory that old lists were moved into.
    pub backupdir: Option<PathBuf>,

    /// Lists written to disk.
    pub written: Vec<PathBuf>,
}

/// Sync one data directory.
///
/// # Errors
///
/// - Return [`SyncError`] if any step fails. Steps already taken are not
///   rolled back.
#[instrument(skip(datadir, rootdir, config), level = "debug")]
pub fn sync_datadir(
    datadir: impl AsRef<Path>,
    rootdir: impl AsRef<Path>,
    config: &Config,
    options: SyncOptions,
) -> Result<SyncReport> {
    // INVARIANT: Backup and HTML paths are formed relative to an absolute root.
    let (datadir, rootdir) = (absolute_path(datadir)?, absolute_path(rootdir)?);
    let (datadir, rootdir) = (datadir.as_path(), rootdir.as_path());
    let report = |message: String| {
        if config.verbose {
            info!("{message}");
        } else {
            debug!("{message}");
        }
    };

    let rules = get_rules(datadir)?;
    let datalines = get_datalines(datadir, &config.invalid_filename_regexes()?)?;
    let containers = apply_rules_to_datalines(&rules, &datalines)?;
    report(format!(
        "sync {:?}: {} rules route {} lines into {} lists",
        datadir.display(),
        rules.len(),
        datalines.len(),
        containers.len()
    ));

    if options.dryrun {
        for (name, lines) in containers.iter() {
            info!("would write {} lines to {name:?}", lines.len());
        }

        return Ok(SyncReport {
            datadir: datadir.to_path_buf(),
            containers,
            backupdir: None,
            written: Vec::new(),
        });
    }

    let backupdir = if config.backup_depth > 0 {
        let backupdir = move_datafiles_to_backupdir(datadir, rootdir, timestamp())?;
        report(format!("back up old lists to {:?}", backupdir.display()));
        delete_older_backupdirs(rootdir, config.backup_depth)?;
        Some(backupdir)
    } else {
        delete_datafiles(datadir)?;
        None
    };

    let written = write_datafiles(datadir, &containers)?;
    for path in &written {
        report(format!("write {:?}", path.display()));
    }

    if config.linkify {
        for path in write_htmlfiles(&containers, datadir, rootdir)? {
            report(format!("write {:?}", path.display()));
        }
    }

    if let Some(files2dirs) = &config.files2dirs {
        move_datafiles_to_dirs(datadir, rootdir, files2dirs)?;
    }

    Ok(SyncReport {
        datadir: datadir.to_path_buf(),
        containers,
        backupdir,
        written,
    })
}

/// Sync error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Rules cannot be loaded.
    #[error(transparent)]
    Rules(#[from] crate::rules::RulesError),

    /// Rules cannot be applied.
    #[error(transparent)]
    Apply(#[from] crate::apply::ApplyError),

    /// Data files cannot be read, written, or moved.
    #[error(transparent)]
    Data(#[from] crate::data::DataError),

    /// Backups cannot be made or pruned.
    #[error(transparent)]
    Backup(#[from] crate::backup::BackupError),

    /// HTML files cannot be written.
    #[error(transparent)]
    Linkify(#[from] crate::linkify::LinkifyError),

    /// Configuration is unusable.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Data directory or repository root cannot be resolved.
    #[error(transparent)]
    Path(#[from] crate::path::PathError),
}

/// Friendly result alias :3
type Result<T, E = SyncError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{CONFIGFILE_NAME, DATADIR_RULEFILE_NAME, ROOTDIR_RULEFILE_NAME};
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::{
        env::{current_dir, set_current_dir},
        fs::{create_dir_all, read_to_string, write},
    };

    fn layout_repository() -> anyhow::Result<PathBuf> {
        let root = current_dir()?;
        create_dir_all("a")?;
        write(CONFIGFILE_NAME, "")?;
        write(ROOTDIR_RULEFILE_NAME, "0|.|x|lines||\n")?;
        write(
            root.join("a").join(DATADIR_RULEFILE_NAME),
            "1|NOW|lines|now.txt|0|\n1|LATER|lines|later.txt||\n",
        )?;
        write("a/lines", "NOW b\nLATER z\nNOW a\nLATER y\nsomeday\n")?;

        Ok(root)
    }

    #[sealed_test]
    fn dryrun_leaves_disk_alone() -> anyhow::Result<()> {
        let root = layout_repository()?;
        let report = sync_datadir(
            root.join("a"),
            &root,
            &Config::default(),
            SyncOptions { dryrun: true },
        )?;

        let expect = vec!["NOW a\n".to_string(), "NOW b\n".to_string()];
        assert_eq!(report.containers.get("now.txt"), Some(expect.as_slice()));
        assert_eq!(report.written, Vec::<PathBuf>::new());
        assert!(!root.join("a/now.txt").exists());
        assert!(!root.join("_backups").exists());

        Ok(())
    }

    #[sealed_test]
    fn sync_without_backups_replaces_lists() -> anyhow::Result<()> {
        let root = layout_repository()?;
        let config = Config {
            backup_depth: 0,
            linkify: false,
            ..Default::default()
        };
        let report = sync_datadir(root.join("a"), &root, &config, SyncOptions::default())?;

        assert_eq!(report.backupdir, None);
        assert_eq!(read_to_string("a/now.txt")?, "NOW a\nNOW b\n");
        assert_eq!(read_to_string("a/later.txt")?, "LATER z\nLATER y\n");
        assert_eq!(read_to_string("a/lines")?, "someday\n");
        assert!(!root.join("_backups").exists());
        assert!(!root.join("_html").exists());

        Ok(())
    }

    #[sealed_test]
    fn sync_relative_datadir_against_absolute_root() -> anyhow::Result<()> {
        let root = layout_repository()?;
        let report = sync_datadir("a", &root, &Config::default(), SyncOptions::default())?;

        assert_eq!(report.datadir, root.join("a"));
        let backupdir = report.backupdir.unwrap_or_default();
        assert!(backupdir.starts_with(root.join("_backups/a")));
        assert_eq!(read_to_string(root.join("_html/a/now.txt.html"))?, "NOW a\nNOW b\n");
        assert!(!root.join("_html/now.txt.html").exists());

        Ok(())
    }

    #[sealed_test]
    fn sync_from_inside_datadir() -> anyhow::Result<()> {
        let root = layout_repository()?;
        set_current_dir("a")?;
        let report = sync_datadir(".", &root, &Config::default(), SyncOptions::default())?;

        assert_eq!(report.datadir, root.join("a"));
        assert_eq!(read_to_string(root.join("a/now.txt"))?, "NOW a\nNOW b\n");
        assert!(root.join("_html/a/later.txt.html").is_file());

        Ok(())
    }
}
