// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the repository configuration file `mklists.toml` to
//! simplify the process of serialization and deserialization. File I/O is
//! left to the caller to figure out.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Repository configuration layout.
///
/// # General Layout
///
/// All settings live at the top level of the file. The optional `files2dirs`
/// table maps names of output files to directories they should be moved into
/// once a data directory has been synced. Relative destinations are taken
/// relative to the repository root.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Report every file touched while syncing.
    pub verbose: bool,

    /// Number of backups to keep per data directory.
    pub backup_depth: usize,

    /// Write linkified HTML copies of each list.
    pub linkify: bool,

    /// Regular expressions that data file names must not match.
    pub invalid_filename_patterns: Vec<String>,

    /// Output files to move elsewhere after syncing.
    pub files2dirs: Option<BTreeMap<String, Destination>>,
}

impl Config {
    /// Compile invalid filename patterns.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::BadPattern`] if a pattern does not compile.
    pub fn invalid_filename_regexes(&self) -> Result<Vec<Regex>> {
        self.invalid_filename_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|err| ConfigError::BadPattern {
                    pattern: pattern.clone(),
                    source: err,
                })
            })
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: true,
            backup_depth: 3,
            linkify: true,
            invalid_filename_patterns: vec![r"\.swp$".into(), r"\.tmp$".into(), "~$".into()],
            files2dirs: None,
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: Config = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on every destination.
        if let Some(files2dirs) = config.files2dirs.as_mut() {
            for destination in files2dirs.values_mut() {
                *destination = Destination::new(
                    shellexpand::full(destination.to_string().as_str())
                        .map_err(ConfigError::ShellExpansion)?
                        .into_owned(),
                );
            }
        }

        // INVARIANT: Patterns must compile before anything else runs.
        config.invalid_filename_regexes()?;

        Ok(config)
    }
}

impl Display for Config {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Directory that an output file is moved into.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Destination(PathBuf);

impl Destination {
    /// Construct new destination.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Treat destination as [`Path`] slice.
    pub fn as_path(&self) -> &Path {
        self.0.as_path()
    }

    /// Resolve destination against repository root.
    ///
    /// Absolute destinations are returned as they are.
    pub fn resolve(&self, rootdir: impl AsRef<Path>) -> PathBuf {
        rootdir.as_ref().join(self.as_path())
    }
}

impl Display for Destination {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_path().to_string_lossy().as_ref())
    }
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Invalid filename pattern does not compile.
    #[error("invalid filename pattern {pattern:?} is not a valid regular expression")]
    BadPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
