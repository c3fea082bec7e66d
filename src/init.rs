// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository initialization.
//!
//! Lay down the configuration file, the rule files, and a first data
//! directory with a starter list that explains itself.

use crate::{
    config::Config,
    path::{CONFIGFILE_NAME, DATADIR_RULEFILE_NAME, ROOTDIR_RULEFILE_NAME},
};

use std::{
    fs::write,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

/// Name of starter data directory.
pub const DATADIR_NAME: &str = "lists";

/// Name of starter data file.
pub const DATADIR_DATAFILE_NAME: &str = "README.txt";

/// Content of starter data file.
pub const DATADIR_DATAFILE_CONTENT: &str = "\
NOW Examine '.rules' file in this directory; edit as needed.
NOW Hint: Examine 'rules.cfg' file in root directory; leave unchanged for now.
NOW Hint: Change beginning of this line to today's date (eg, 2020-01-17).
NOW Hint: Then run 'mklists sync' to see what happens to these lines.
NOW Change the name of this directory, as needed.
NOW If you already understand 'mklists', replace these lines with your own.
LATER Check out 'mklists.toml' in the root directory.
LATER Hint: Create 'log' directory in root as a destination for 'log.txt'.
";

/// Content of starter root rule file.
pub const ROOTDIR_RULEFILE_CONTENT: &str = "\
# Global rules.
in field|match |in source  |move to    |sort by|
0       |.     |lines.tmp  |lines      |1      |Comments here.
";

/// Content of minimal data directory rule file.
pub const DATADIR_RULEFILE_MINIMAL_CONTENT: &str = "0|.|lines|todo.txt|0|Comments...\n";

/// Content of starter data directory rule file.
pub const DATADIR_RULEFILE_CONTENT: &str = "\
# First five fields in lines that start with integers are parsed as rules.
# Everything else - empty lines, comments, extra fields - is ignored.
# For readability, fields may contain whitespace on the left or right.
# 1. Field in source line to be matched.
#    Value '0' means 'match anywhere in line'.
# 2. Regex matched against the source field or line.
#    Regex may contain spaces: '|   ^2020 ..  |' = regex '^2020 ..'.
# 3. Source: in-memory set of lines _from_ which lines matching regex are moved.
# 4. Target: in-memory set of lines _to_ which lines matching regex are moved.
# 5. Field by which target is to be sorted.
#    Value '0' means 'sort on entire line'.
#    Absence of a value (blank field) means 'do not sort'.
# At the end, non-empty sources and targets are written to files.

in field|match |in source  |move to    |sort by|
0       |.     |lines      |todo.txt   |1      |Comments here.
1       |NOW   |todo.txt   |now.txt    |1      |Pipe delimiters need not align.
1       |LATER |todo.txt   |later.txt  |       |'later.txt' will not be sorted.
1       |^2020 |todo.txt   |log.txt    |0      |
";

/// Write starter configuration file to repository root.
///
/// # Errors
///
/// - Return [`InitError::AlreadyInitialized`] if configuration file exists.
/// - Return [`InitError::Write`] if configuration file cannot be written.
#[instrument(skip(rootdir), level = "debug")]
pub fn write_starter_configfile(rootdir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = rootdir.as_ref().join(CONFIGFILE_NAME);
    if path.exists() {
        return Err(InitError::AlreadyInitialized { path });
    }

    write_file(&path, Config::default().to_string())?;

    Ok(path)
}

/// Write commented starter rule files to root and starter data directory.
///
/// Existing rule files are kept as they are.
///
/// # Errors
///
/// - Return [`InitError::CreateDir`] if data directory cannot be made.
/// - Return [`InitError::Write`] if a rule file cannot be written.
pub fn write_starter_rulefiles(rootdir: impl AsRef<Path>) -> Result<()> {
    write_rulefiles(rootdir.as_ref(), DATADIR_RULEFILE_CONTENT)
}

/// Write minimal rule files to root and starter data directory.
///
/// Existing rule files are kept as they are.
///
/// # Errors
///
/// - Return [`InitError::CreateDir`] if data directory cannot be made.
/// - Return [`InitError::Write`] if a rule file cannot be written.
pub fn write_minimal_rulefiles(rootdir: impl AsRef<Path>) -> Result<()> {
    write_rulefiles(rootdir.as_ref(), DATADIR_RULEFILE_MINIMAL_CONTENT)
}

/// Write starter data file into starter data directory.
///
/// # Errors
///
/// - Return [`InitError::CreateDir`] if data directory cannot be made.
/// - Return [`InitError::Write`] if data file cannot be written.
pub fn write_starter_datafile(rootdir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = create_datadir(rootdir.as_ref())?.join(DATADIR_DATAFILE_NAME);
    write_file(&path, DATADIR_DATAFILE_CONTENT)?;

    Ok(path)
}

fn write_rulefiles(rootdir: &Path, datadir_rulefile_content: &str) -> Result<()> {
    let datadir = create_datadir(rootdir)?;
    let rulefiles = [
        (rootdir.join(ROOTDIR_RULEFILE_NAME), ROOTDIR_RULEFILE_CONTENT),
        (datadir.join(DATADIR_RULEFILE_NAME), datadir_rulefile_content),
    ];

    for (path, content) in rulefiles {
        if path.exists() {
            warn!("will use existing rule file {:?}", path.display());
            continue;
        }

        write_file(&path, content)?;
    }

    Ok(())
}

fn create_datadir(rootdir: &Path) -> Result<PathBuf> {
    let datadir = rootdir.join(DATADIR_NAME);
    mkdirp::mkdirp(&datadir).map_err(|err| InitError::CreateDir {
        source: err,
        path: datadir.clone(),
    })?;

    Ok(datadir)
}

fn write_file(path: &Path, content: impl AsRef<[u8]>) -> Result<()> {
    write(path, content).map_err(|err| InitError::Write {
        source: err,
        path: path.to_path_buf(),
    })?;
    info!("write {:?}", path.display());

    Ok(())
}

/// Repository initialization error types.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// Repository already has a configuration file.
    #[error("repository already initialized at {:?}", path.display())]
    AlreadyInitialized { path: PathBuf },

    /// Directory cannot be created.
    #[error("failed to create directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File cannot be written.
    #[error("failed to write {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
type Result<T, E = InitError> = std::result::Result<T, E>;
