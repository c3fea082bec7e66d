// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Backups of data directories.
//!
//! Before a data directory gets rewritten, its current files are moved into
//! a timestamped backup directory under the repository root:
//!
//! ```text
//! <root>/_backups/<data directory relative to root, '/' as '_'>/<timestamp>/
//! ```
//!
//! Only a limited number of backups is kept per data directory. Timestamps
//! sort chronologically by name, so the oldest backups are always the first
//! ones in name order.

use crate::{
    data::{move_file, visible_files, DataError},
    path::{flattened_relative_name, PathError, BACKUPDIR_NAME},
};

use chrono::Local;
use std::{
    fs::{read_dir, remove_dir, remove_dir_all},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Format of backup directory timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M_%S%6f";

/// Current local time formatted as backup timestamp.
pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Form path to backup directory of a data directory at a given time.
///
/// # Errors
///
/// - Return [`BackupError::Path`] if `datadir` is not below `rootdir`.
pub fn backupdir_path(
    datadir: impl AsRef<Path>,
    rootdir: impl AsRef<Path>,
    timestamp: impl AsRef<str>,
) -> Result<PathBuf> {
    let name = flattened_relative_name(datadir, rootdir.as_ref())?;

    Ok(rootdir
        .as_ref()
        .join(BACKUPDIR_NAME)
        .join(name)
        .join(timestamp.as_ref()))
}

/// Move visible files of a data directory into a new backup directory.
///
/// Returns path to backup directory.
///
/// # Errors
///
/// - Return [`BackupError::Path`] if `datadir` is not below `rootdir`.
/// - Return [`BackupError::CreateDir`] if backup directory cannot be made.
/// - Return [`BackupError::Data`] if a data file cannot be moved.
#[instrument(skip(datadir, rootdir, timestamp), level = "debug")]
pub fn move_datafiles_to_backupdir(
    datadir: impl AsRef<Path>,
    rootdir: impl AsRef<Path>,
    timestamp: impl AsRef<str>,
) -> Result<PathBuf> {
    let backupdir = backupdir_path(datadir.as_ref(), rootdir, timestamp)?;
    mkdirp::mkdirp(&backupdir).map_err(|err| BackupError::CreateDir {
        source: err,
        path: backupdir.clone(),
    })?;

    for datafile in visible_files(datadir.as_ref())? {
        if let Some(filename) = datafile.file_name() {
            move_file(&datafile, backupdir.join(filename))?;
        }
    }
    debug!("backed up {:?} to {:?}", datadir.as_ref().display(), backupdir.display());

    Ok(backupdir)
}

/// Delete all but the newest `depth` backups of every data directory.
///
/// Backup subdirectories left empty are removed as well. Returns paths of
/// deleted backups.
///
/// # Errors
///
/// - Return [`BackupError::ReadDir`] if backup directory cannot be listed.
/// - Return [`BackupError::RemoveDir`] if a backup cannot be deleted.
#[instrument(skip(rootdir), level = "debug")]
pub fn delete_older_backupdirs(rootdir: impl AsRef<Path>, depth: usize) -> Result<Vec<PathBuf>> {
    let backup_path = rootdir.as_ref().join(BACKUPDIR_NAME);
    if !backup_path.is_dir() {
        return Ok(Vec::new());
    }

    let mut deleted = Vec::new();
    for subdir in sorted_subdirs(&backup_path)? {
        let mut backups = sorted_subdirs(&subdir)?;
        let excess = backups.len().saturating_sub(depth);
        for backup in backups.drain(..excess) {
            remove_dir_all(&backup).map_err(|err| BackupError::RemoveDir {
                source: err,
                path: backup.clone(),
            })?;
            info!("delete old backup {:?}", backup.display());
            deleted.push(backup);
        }

        // INVARIANT: Only empty subdirectories go, anything else stays.
        if backups.is_empty() && remove_dir(&subdir).is_ok() {
            debug!("delete empty backup directory {:?}", subdir.display());
        }
    }

    Ok(deleted)
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir_err = |err| BackupError::ReadDir {
        source: err,
        path: dir.to_path_buf(),
    };

    let mut subdirs = Vec::new();
    for entry in read_dir(dir).map_err(read_dir_err)? {
        let path = entry.map_err(read_dir_err)?.path();
        if path.is_dir() {
            subdirs.push(path);
        }
    }
    subdirs.sort();

    Ok(subdirs)
}

/// Backup error types.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// Backup directory cannot be created.
    #[error("failed to create backup directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Backup directory cannot be listed.
    #[error("failed to read backup directory {:?}", path.display())]
    ReadDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Old backup cannot be deleted.
    #[error("failed to delete backup {:?}", path.display())]
    RemoveDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Data file cannot be moved into backup.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Data directory cannot be placed relative to repository root.
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Friendly result alias :3
type Result<T, E = BackupError> = std::result::Result<T, E>;
