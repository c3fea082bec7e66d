// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Data file input and output.
//!
//! The lists of a data directory are its visible files, i.e., every regular
//! file whose name does not start with a dot. Reading a data directory yields
//! one flat batch of lines that the rule engine can route. Writing it back
//! turns each non-empty container into a file of the same name.

use crate::{apply::Containers, config::Destination};

use regex::Regex;
use std::{
    collections::BTreeMap,
    fs::{copy, read, read_dir, remove_file, rename, write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// List visible files of a directory, sorted by path.
///
/// # Errors
///
/// - Return [`DataError::ReadDir`] if directory cannot be listed.
pub fn visible_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let read_dir_err = |err| DataError::ReadDir {
        source: err,
        path: dir.as_ref().to_path_buf(),
    };

    let mut files = Vec::new();
    for entry in read_dir(dir.as_ref()).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let is_hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !is_hidden && entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    Ok(files)
}

/// Read all lines of all visible files in a data directory.
///
/// Lines keep their terminators. The last line of a file that lacks one is
/// given a `\n`, so lines never run into each other once re-sorted.
///
/// # Errors
///
/// - Return [`DataError::BadFilename`] if a file name matches one of
///   `invalid_filename_patterns`.
/// - Return [`DataError::NotUtf8`] if a file is not UTF-8 encoded.
/// - Return [`DataError::BlankLine`] if a file contains a blank line.
/// - Return [`DataError::NoData`] if there are no lines at all.
#[instrument(skip(datadir, invalid_filename_patterns), level = "debug")]
pub fn get_datalines(
    datadir: impl AsRef<Path>,
    invalid_filename_patterns: &[Regex],
) -> Result<Vec<String>> {
    let mut datalines = Vec::new();
    for datafile in visible_files(datadir.as_ref())? {
        let filename = datafile
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(pattern) = invalid_filename_patterns
            .iter()
            .find(|pattern| pattern.is_match(&filename))
        {
            return Err(DataError::BadFilename {
                path: datafile,
                pattern: pattern.as_str().into(),
            });
        }

        let bytes = read(&datafile).map_err(|err| DataError::ReadFile {
            source: err,
            path: datafile.clone(),
        })?;
        let content = String::from_utf8(bytes).map_err(|_| DataError::NotUtf8 {
            path: datafile.clone(),
        })?;

        for line in content.split_inclusive('\n') {
            if line.trim().is_empty() {
                return Err(DataError::BlankLine { path: datafile });
            }

            let mut line = line.to_owned();
            if !line.ends_with('\n') {
                line.push('\n');
            }
            datalines.push(line);
        }
        debug!("read {:?}", datafile.display());
    }

    if datalines.is_empty() {
        return Err(DataError::NoData {
            path: datadir.as_ref().to_path_buf(),
        });
    }

    Ok(datalines)
}

/// Write every non-empty container to a file in the data directory.
///
/// Returns paths of written files in container order.
///
/// # Errors
///
/// - Return [`DataError::WriteFile`] if a file cannot be written.
#[instrument(skip(datadir, containers), level = "debug")]
pub fn write_datafiles(
    datadir: impl AsRef<Path>,
    containers: &Containers,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (name, lines) in containers.iter().filter(|(_, lines)| !lines.is_empty()) {
        let path = datadir.as_ref().join(name);
        write(&path, lines.concat()).map_err(|err| DataError::WriteFile {
            source: err,
            path: path.clone(),
        })?;
        written.push(path);
    }

    Ok(written)
}

/// Delete every visible file of a data directory.
///
/// # Errors
///
/// - Return [`DataError::RemoveFile`] if a file cannot be deleted.
pub fn delete_datafiles(datadir: impl AsRef<Path>) -> Result<()> {
    for datafile in visible_files(datadir.as_ref())? {
        remove_file(&datafile).map_err(|err| DataError::RemoveFile {
            source: err,
            path: datafile.clone(),
        })?;
    }

    Ok(())
}

/// Move named data files into their destination directories.
///
/// Files that do not exist, and destinations that do not exist, are skipped.
/// Relative destinations are resolved against the repository root. Returns
/// the new paths of moved files.
///
/// # Errors
///
/// - Return [`DataError::DestinationTaken`] if destination already holds a
///   file of the same name.
/// - Return [`DataError::MoveFile`] if a file cannot be moved.
#[instrument(skip(datadir, rootdir, files2dirs), level = "debug")]
pub fn move_datafiles_to_dirs(
    datadir: impl AsRef<Path>,
    rootdir: impl AsRef<Path>,
    files2dirs: &BTreeMap<String, Destination>,
) -> Result<Vec<PathBuf>> {
    let mut moved = Vec::new();
    for (filename, destination) in files2dirs {
        let from = datadir.as_ref().join(filename);
        let destination = destination.resolve(rootdir.as_ref());
        if !from.is_file() {
            continue;
        }

        if !destination.is_dir() {
            warn!(
                "skip moving {filename:?}: {:?} is not a directory",
                destination.display()
            );
            continue;
        }

        let to = destination.join(filename);
        if to.exists() {
            return Err(DataError::DestinationTaken { path: to });
        }

        move_file(&from, &to)?;
        info!("move {:?} to {:?}", from.display(), to.display());
        moved.push(to);
    }

    Ok(moved)
}

/// Move file, falling back to copy and delete across file systems.
///
/// # Errors
///
/// - Return [`DataError::MoveFile`] if file cannot be moved.
pub fn move_file(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let (from, to) = (from.as_ref(), to.as_ref());
    let move_err = |err| DataError::MoveFile {
        source: err,
        from: from.to_path_buf(),
        to: to.to_path_buf(),
    };

    if rename(from, to).is_err() {
        copy(from, to).map_err(move_err)?;
        remove_file(from).map_err(move_err)?;
    }

    Ok(())
}

/// Data file error types.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Directory cannot be listed.
    #[error("failed to read directory {:?}", path.display())]
    ReadDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Data file cannot be read.
    #[error("failed to read data file {:?}", path.display())]
    ReadFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Data file cannot be written.
    #[error("failed to write data file {:?}", path.display())]
    WriteFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Data file cannot be deleted.
    #[error("failed to delete data file {:?}", path.display())]
    RemoveFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File cannot be moved.
    #[error("failed to move {:?} to {:?}", from.display(), to.display())]
    MoveFile {
        #[source]
        source: std::io::Error,
        from: PathBuf,
        to: PathBuf,
    },

    /// Name of data file matches an invalid filename pattern.
    #[error("{:?} matches invalid filename pattern {pattern:?}", path.display())]
    BadFilename { path: PathBuf, pattern: String },

    /// Data file is not UTF-8 encoded.
    #[error("{:?} is not UTF-8 encoded", path.display())]
    NotUtf8 { path: PathBuf },

    /// Data file contains a blank line.
    #[error("{:?} must have no blank lines", path.display())]
    BlankLine { path: PathBuf },

    /// Data directory has nothing to process.
    #[error("no data to process in {:?}", path.display())]
    NoData { path: PathBuf },

    /// Destination already has a file of the same name.
    #[error("{:?} already exists", path.display())]
    DestinationTaken { path: PathBuf },
}

/// Friendly result alias :3
type Result<T, E = DataError> = std::result::Result<T, E>;
