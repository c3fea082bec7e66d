// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for the files and directories that
//! make up a list repository.
//!
//! # Repository Layout
//!
//! A __repository__ is any directory that contains the configuration file
//! `mklists.toml`. The presence of that file is what marks the directory as
//! the repository root. Next to it sits the global rule file `rules.cfg`.
//!
//! Every subdirectory that carries a local rule file named `.rules`, and that
//! is not itself a repository root, is a __data directory__. The visible files
//! of a data directory are its lists. Hidden entries are never treated as
//! data, and neither are the `_backups` and `_html` directories that mklists
//! maintains under the repository root.

use ignore::WalkBuilder;
use std::path::{absolute, Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Name of configuration file that marks repository root.
pub const CONFIGFILE_NAME: &str = "mklists.toml";

/// Name of global rule file at repository root.
pub const ROOTDIR_RULEFILE_NAME: &str = "rules.cfg";

/// Name of local rule file in each data directory.
pub const DATADIR_RULEFILE_NAME: &str = ".rules";

/// Name of directory under repository root that holds backups.
pub const BACKUPDIR_NAME: &str = "_backups";

/// Name of directory under repository root that holds linkified lists.
pub const HTMLDIR_NAME: &str = "_html";

/// Resolve path against current working directory.
///
/// Nothing is looked up on the file system, so the path need not exist.
///
/// # Errors
///
/// - Return [`PathError::Resolve`] if path is empty or current working
///   directory cannot be determined.
pub fn absolute_path(path: impl AsRef<Path>) -> Result<PathBuf> {
    absolute(path.as_ref()).map_err(|err| PathError::Resolve {
        source: err,
        path: path.as_ref().to_path_buf(),
    })
}

/// Determine absolute path to repository root.
///
/// Searches the starting directory and then each of its parents for the
/// configuration file. The first directory that has it is the root.
///
/// # Errors
///
/// - Return [`PathError::Resolve`] if `start` cannot be made absolute.
/// - Return [`PathError::NotARepository`] if no directory on the way up to
///   the file system root carries the configuration file.
pub fn find_rootdir(start: impl AsRef<Path>) -> Result<PathBuf> {
    // INVARIANT: Walk absolute paths only, relative ones run out of parents.
    let start = absolute_path(start)?;
    let rootdir = start
        .ancestors()
        .find(|dir| dir.join(CONFIGFILE_NAME).is_file())
        .map(Path::to_path_buf);

    rootdir.ok_or(PathError::NotARepository { start })
}

/// Check if directory is a data directory.
///
/// A data directory has a local rule file, but no configuration file.
pub fn is_datadir(dir: impl AsRef<Path>) -> bool {
    let dir = dir.as_ref();
    dir.join(DATADIR_RULEFILE_NAME).is_file() && !dir.join(CONFIGFILE_NAME).is_file()
}

/// List data directories at and below target directory.
///
/// Hidden directories are skipped along with everything beneath them. Result
/// is ordered by path so that parents come before their children.
#[instrument(skip(dir), level = "debug")]
pub fn datadirs_below(dir: impl AsRef<Path>) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(dir.as_ref())
        .standard_filters(false)
        .hidden(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let datadirs = walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skip unreadable entry below {:?}: {err}", dir.as_ref().display());
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|kind| kind.is_dir()))
        .map(|entry| entry.into_path())
        .filter(|path| is_datadir(path))
        .collect::<Vec<_>>();
    debug!("found {} data directories below {:?}", datadirs.len(), dir.as_ref().display());

    datadirs
}

/// Determine path of directory relative to repository root.
///
/// # Errors
///
/// - Return [`PathError::OutsideRoot`] if `dir` does not lie at or below
///   `rootdir`.
pub fn relative_to_root(dir: impl AsRef<Path>, rootdir: impl AsRef<Path>) -> Result<PathBuf> {
    dir.as_ref()
        .strip_prefix(rootdir.as_ref())
        .map(Path::to_path_buf)
        .map_err(|_| PathError::OutsideRoot {
            dir: dir.as_ref().to_path_buf(),
            rootdir: rootdir.as_ref().to_path_buf(),
        })
}

/// Form name that stands for a data directory relative to repository root.
///
/// Path separators are replaced with underscores, so "a/b/c" becomes "a_b_c".
/// The repository root itself has an empty relative name.
///
/// # Errors
///
/// - Return [`PathError::OutsideRoot`] if `dir` does not lie at or below
///   `rootdir`.
pub fn flattened_relative_name(dir: impl AsRef<Path>, rootdir: impl AsRef<Path>) -> Result<String> {
    let name = relative_to_root(dir, rootdir)?
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("_");

    Ok(name)
}

/// Path resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Path cannot be made absolute.
    #[error("failed to resolve {:?}", path.display())]
    Resolve {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Starting directory is not part of any repository.
    #[error("{:?} is not inside a repository: no {CONFIGFILE_NAME} found", start.display())]
    NotARepository { start: PathBuf },

    /// Directory lies outside of repository root.
    #[error("{:?} is not below repository root {:?}", dir.display(), rootdir.display())]
    OutsideRoot { dir: PathBuf, rootdir: PathBuf },
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;
