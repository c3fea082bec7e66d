// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

mod integration;

use anyhow::Result;
use mklists::{
    config::Config,
    path::{CONFIGFILE_NAME, DATADIR_RULEFILE_NAME, ROOTDIR_RULEFILE_NAME},
    sync::{sync_datadir, SyncError, SyncOptions, SyncReport},
};
use std::{
    fs::{create_dir_all, read_to_string, write},
    path::{Path, PathBuf},
};

/// List repository laid out on disk for a test.
pub(crate) struct RepoFixture {
    root: PathBuf,
}

impl RepoFixture {
    pub(crate) fn new(root: impl AsRef<Path>, config: &str, rules: &str) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        // INVARIANT: Configuration file must exist for root to count as repository.
        create_dir_all(&root)?;
        write(root.join(CONFIGFILE_NAME), config)?;
        write(root.join(ROOTDIR_RULEFILE_NAME), rules)?;

        Ok(Self { root })
    }

    pub(crate) fn with_datadir(
        self,
        name: impl AsRef<Path>,
        rules: &str,
        files: &[(&str, &str)],
    ) -> Result<Self> {
        let datadir = self.root.join(name);
        create_dir_all(&datadir)?;
        write(datadir.join(DATADIR_RULEFILE_NAME), rules)?;
        for (filename, contents) in files {
            write(datadir.join(filename), contents)?;
        }

        Ok(self)
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn datadir(&self, name: impl AsRef<Path>) -> PathBuf {
        self.root.join(name)
    }

    pub(crate) fn sync(
        &self,
        name: impl AsRef<Path>,
        config: &Config,
    ) -> Result<SyncReport, SyncError> {
        sync_datadir(self.datadir(name), &self.root, config, SyncOptions::default())
    }

    pub(crate) fn read(&self, path: impl AsRef<Path>) -> Result<String> {
        Ok(read_to_string(self.root.join(path))?)
    }
}
