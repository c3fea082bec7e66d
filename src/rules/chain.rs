// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Rule file chain resolution.
//!
//! Determine which rule files apply to a data directory, and in which order
//! their rules must be concatenated. Walking upward from the data directory,
//! each level contributes its local rule file. The walk ends at the first
//! level without one: if that level is the repository root, its global rule
//! file is put at the front of the chain, otherwise nothing more is added.

use crate::{
    path::{
        absolute_path, find_rootdir, CONFIGFILE_NAME, DATADIR_RULEFILE_NAME,
        ROOTDIR_RULEFILE_NAME,
    },
    rules::RulesError,
};

use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Find rule files from repository root down to target directory.
///
/// # Errors
///
/// - Return [`RulesError::Path`] if `datadir` cannot be made absolute or is
///   not inside a repository at all.
#[instrument(skip(datadir), level = "debug")]
pub fn find_rulefile_chain(datadir: impl AsRef<Path>) -> Result<Vec<PathBuf>, RulesError> {
    let datadir = absolute_path(datadir)?;

    // INVARIANT: Refuse to resolve anything outside of a repository.
    find_rootdir(&datadir)?;

    let mut chain = Vec::new();
    for dir in datadir.ancestors() {
        let local = dir.join(DATADIR_RULEFILE_NAME);
        if local.is_file() {
            chain.insert(0, local);
            continue;
        }

        if dir.join(CONFIGFILE_NAME).is_file() {
            chain.insert(0, dir.join(ROOTDIR_RULEFILE_NAME));
        }

        break;
    }
    debug!("rule file chain of {:?}: {chain:?}", datadir.display());

    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathError;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::{
        env::{current_dir, set_current_dir},
        fs::{create_dir_all, write},
    };

    fn layout_repository(local_rules: &[&str]) -> anyhow::Result<PathBuf> {
        let root = current_dir()?;
        create_dir_all("a/b/c")?;
        create_dir_all("d")?;
        write(CONFIGFILE_NAME, "config stuff")?;
        write(ROOTDIR_RULEFILE_NAME, "rule stuff")?;
        for dir in local_rules {
            write(root.join(dir).join(DATADIR_RULEFILE_NAME), "rule stuff")?;
        }

        Ok(root)
    }

    #[sealed_test]
    fn find_rulefile_chain_typical() -> anyhow::Result<()> {
        let root = layout_repository(&["a", "a/b", "a/b/c"])?;
        let result = find_rulefile_chain(root.join("a/b/c"))?;
        let expect = vec![
            root.join(ROOTDIR_RULEFILE_NAME),
            root.join("a").join(DATADIR_RULEFILE_NAME),
            root.join("a/b").join(DATADIR_RULEFILE_NAME),
            root.join("a/b/c").join(DATADIR_RULEFILE_NAME),
        ];
        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test]
    fn find_rulefile_chain_ends_before_repository_root() -> anyhow::Result<()> {
        let root = layout_repository(&["a/b", "a/b/c"])?;
        let result = find_rulefile_chain(root.join("a/b/c"))?;
        let expect = vec![
            root.join("a/b").join(DATADIR_RULEFILE_NAME),
            root.join("a/b/c").join(DATADIR_RULEFILE_NAME),
        ];
        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test]
    fn find_rulefile_chain_empty_in_non_datadir() -> anyhow::Result<()> {
        let root = layout_repository(&["a", "a/b", "a/b/c"])?;
        let result = find_rulefile_chain(root.join("d"))?;
        assert_eq!(result, Vec::<PathBuf>::new());

        Ok(())
    }

    #[sealed_test]
    fn find_rulefile_chain_from_repository_root() -> anyhow::Result<()> {
        let root = layout_repository(&["a", "a/b", "a/b/c"])?;
        let result = find_rulefile_chain(&root)?;
        assert_eq!(result, vec![root.join(ROOTDIR_RULEFILE_NAME)]);

        Ok(())
    }

    #[sealed_test]
    fn find_rulefile_chain_outside_repository() -> anyhow::Result<()> {
        create_dir_all("a/b")?;
        write(format!("a/b/{DATADIR_RULEFILE_NAME}"), "rule stuff")?;
        let result = find_rulefile_chain(current_dir()?.join("a/b"));
        assert!(matches!(
            result,
            Err(RulesError::Path(PathError::NotARepository { .. }))
        ));

        Ok(())
    }

    #[sealed_test]
    fn find_rulefile_chain_from_relative_datadir() -> anyhow::Result<()> {
        let root = layout_repository(&["a", "a/b"])?;
        set_current_dir("a/b")?;

        let result = find_rulefile_chain(".")?;
        let expect = vec![
            root.join(ROOTDIR_RULEFILE_NAME),
            root.join("a").join(DATADIR_RULEFILE_NAME),
            root.join("a/b").join(DATADIR_RULEFILE_NAME),
        ];
        assert_eq!(result, expect);

        Ok(())
    }
}
