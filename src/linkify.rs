// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Linkified HTML copies of lists.
//!
//! Every synced data directory can be mirrored under `<root>/_html/` with one
//! `<name>.html` file per container, where URLs have been made clickable.

use crate::{
    apply::Containers,
    data::{delete_datafiles, DataError},
    path::{relative_to_root, PathError, HTMLDIR_NAME},
};

use regex::Regex;
use std::{
    fs::write,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use tracing::instrument;

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"((?:git://|http://|https://|file:///)[^ <>'"{}(),|\\^`\[\]]*)"#)
        .expect("URL pattern is valid")
});

/// Wrap URLs of a line in anchor tags.
///
/// Lines that already hold an anchor tag are left alone. Every other line is
/// stripped of trailing whitespace and given exactly one `\n`.
pub fn linkify_line(line: &str) -> String {
    if line.contains("<a href=") || line.contains("<A HREF=") {
        return line.to_owned();
    }

    let mut linkified = URL_REGEX
        .replace_all(line.trim_end(), r#"<a href="${1}">${1}</a>"#)
        .into_owned();
    linkified.push('\n');

    linkified
}

/// Form path to HTML directory of a data directory.
///
/// # Errors
///
/// - Return [`LinkifyError::Path`] if `datadir` is not below `rootdir`.
pub fn htmldir_path(datadir: impl AsRef<Path>, rootdir: impl AsRef<Path>) -> Result<PathBuf> {
    let relative = relative_to_root(datadir, rootdir.as_ref())?;

    Ok(rootdir.as_ref().join(HTMLDIR_NAME).join(relative))
}

/// Write linkified copy of every container into HTML directory.
///
/// Visible files left over in the HTML directory from an earlier sync are
/// deleted first. Returns paths of written files.
///
/// # Errors
///
/// - Return [`LinkifyError::Path`] if `datadir` is not below `rootdir`.
/// - Return [`LinkifyError::CreateDir`] if HTML directory cannot be made.
/// - Return [`LinkifyError::Data`] if stale HTML files cannot be deleted.
/// - Return [`LinkifyError::WriteFile`] if an HTML file cannot be written.
#[instrument(skip(containers, datadir, rootdir), level = "debug")]
pub fn write_htmlfiles(
    containers: &Containers,
    datadir: impl AsRef<Path>,
    rootdir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>> {
    let htmldir = htmldir_path(datadir, rootdir)?;
    mkdirp::mkdirp(&htmldir).map_err(|err| LinkifyError::CreateDir {
        source: err,
        path: htmldir.clone(),
    })?;
    delete_datafiles(&htmldir)?;

    let mut written = Vec::new();
    for (name, lines) in containers.iter() {
        let path = htmldir.join(format!("{name}.html"));
        let content = lines.iter().map(|line| linkify_line(line)).collect::<String>();
        write(&path, content).map_err(|err| LinkifyError::WriteFile {
            source: err,
            path: path.clone(),
        })?;
        written.push(path);
    }

    Ok(written)
}

/// HTML output error types.
#[derive(Debug, thiserror::Error)]
pub enum LinkifyError {
    /// HTML directory cannot be created.
    #[error("failed to create HTML directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// HTML file cannot be written.
    #[error("failed to write HTML file {:?}", path.display())]
    WriteFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Stale HTML files cannot be cleared.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Data directory cannot be placed relative to repository root.
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Friendly result alias :3
type Result<T, E = LinkifyError> = std::result::Result<T, E>;
