// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::RepoFixture;

use anyhow::Result;
use indoc::indoc;
use mklists::{
    config::Config,
    data::DataError,
    get_rules,
    init::{
        write_starter_configfile, write_starter_datafile, write_starter_rulefiles,
        DATADIR_DATAFILE_CONTENT, DATADIR_NAME,
    },
    path::{datadirs_below, BACKUPDIR_NAME},
    rules::RulesError,
    sync::{sync_datadir, SyncError, SyncOptions},
};
use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::{
    env::current_dir,
    fs::{create_dir_all, read_dir, read_to_string},
    path::{Path, PathBuf},
};

fn load_config(root: impl AsRef<Path>) -> Result<Config> {
    Ok(read_to_string(root.as_ref().join("mklists.toml"))?.parse()?)
}

fn count_entries(dir: impl AsRef<Path>) -> Result<usize> {
    Ok(read_dir(dir)?.count())
}

fn read_lists(fixture: &RepoFixture) -> Result<[String; 3]> {
    Ok([
        fixture.read("a/now")?,
        fixture.read("a/later")?,
        fixture.read("a/lines")?,
    ])
}

#[sealed_test]
fn sync_starter_repository() -> Result<()> {
    let root = current_dir()?;
    write_starter_configfile(&root)?;
    write_starter_rulefiles(&root)?;
    write_starter_datafile(&root)?;

    let datadir = root.join(DATADIR_NAME);
    let config = load_config(&root)?;
    assert_eq!(get_rules(&datadir)?.len(), 5);

    let report = sync_datadir(&datadir, &root, &config, SyncOptions::default())?;
    assert_eq!(
        report.written,
        vec![datadir.join("now.txt"), datadir.join("later.txt")]
    );

    let expect_now = DATADIR_DATAFILE_CONTENT
        .lines()
        .filter(|line| line.starts_with("NOW"))
        .map(|line| format!("{line}\n"))
        .collect::<String>();
    assert_eq!(read_to_string(datadir.join("now.txt"))?, expect_now);
    assert!(!datadir.join("README.txt").exists());

    let backupdir = report.backupdir.expect("backups are on by default");
    assert_eq!(
        read_to_string(backupdir.join("README.txt"))?,
        DATADIR_DATAFILE_CONTENT
    );
    assert!(root.join("_html/lists/now.txt.html").is_file());
    assert!(root.join("_html/lists/log.txt.html").is_file());

    Ok(())
}

#[sealed_test]
fn resync_is_stable_and_prunes_backups() -> Result<()> {
    let fixture = RepoFixture::new(
        current_dir()?,
        "backup_depth = 2\nlinkify = false\n",
        "0|.|all|lines|1|\n",
    )?
    .with_datadir(
        "a",
        "1|NOW|lines|now|0|\n1|LATER|lines|later||\n",
        &[("x", "NOW b\nLATER z\nsomeday\n"), ("y", "LATER y\nNOW a")],
    )?;
    let config = load_config(fixture.root())?;

    fixture.sync("a", &config)?;
    let first = read_lists(&fixture)?;
    assert_eq!(first, ["NOW a\nNOW b\n", "LATER z\nLATER y\n", "someday\n"]);

    for _ in 0..3 {
        fixture.sync("a", &config)?;
    }
    assert_eq!(read_lists(&fixture)?, first);

    let backups = fixture.root().join(BACKUPDIR_NAME).join("a");
    assert_eq!(count_entries(backups)?, 2);

    Ok(())
}

#[sealed_test]
fn nested_datadirs_inherit_rules_of_parents() -> Result<()> {
    let fixture = RepoFixture::new(
        current_dir()?,
        "backup_depth = 0\nlinkify = false\n",
        "0|.|all|lines||\n",
    )?
    .with_datadir("a", "1|NOW|lines|now||\n", &[("lines", "NOW in a\n")])?
    .with_datadir(
        "a/b",
        "1|LATER|lines|later||\n",
        &[("stuff", "LATER in b\nNOW in b\nmaybe in b\n")],
    )?;
    let config = load_config(fixture.root())?;

    assert_eq!(get_rules(fixture.datadir("a"))?.len(), 2);
    assert_eq!(get_rules(fixture.datadir("a/b"))?.len(), 3);

    fixture.sync("a/b", &config)?;
    assert_eq!(fixture.read("a/b/now")?, "NOW in b\n");
    assert_eq!(fixture.read("a/b/later")?, "LATER in b\n");
    assert_eq!(fixture.read("a/b/lines")?, "maybe in b\n");
    assert!(!fixture.datadir("a/b/stuff").exists());
    assert_eq!(fixture.read("a/lines")?, "NOW in a\n");

    Ok(())
}

#[sealed_test]
fn files2dirs_moves_file_once() -> Result<()> {
    let config = indoc! {r#"
        backup_depth = 0
        linkify = false

        [files2dirs]
        "log.txt" = "log"
    "#};
    let fixture = RepoFixture::new(current_dir()?, config, "0|.|all|lines||\n")?
        .with_datadir(
            "a",
            "0|^2020|lines|log.txt||\n",
            &[("lines", "2020-01-17 did things\nto do\n")],
        )?;
    create_dir_all(fixture.root().join("log"))?;
    let config = load_config(fixture.root())?;

    fixture.sync("a", &config)?;
    assert_eq!(fixture.read("log/log.txt")?, "2020-01-17 did things\n");
    assert!(!fixture.datadir("a/log.txt").exists());

    std::fs::write(fixture.datadir("a/more"), "2020-01-18 did more\n")?;
    let result = fixture.sync("a", &config);
    assert!(matches!(
        result,
        Err(SyncError::Data(DataError::DestinationTaken { .. }))
    ));

    Ok(())
}

#[sealed_test]
fn bad_rules_leave_datadir_untouched() -> Result<()> {
    let fixture = RepoFixture::new(current_dir()?, "", "0|.|all|lines||\n")?
        .with_datadir("a", "1|NOW|lines|lines||\n", &[("x", "NOW a\n")])?;
    let config = load_config(fixture.root())?;

    let result = fixture.sync("a", &config);
    assert!(matches!(
        result,
        Err(SyncError::Rules(RulesError::BadRule { .. }))
    ));
    assert_eq!(fixture.read("a/x")?, "NOW a\n");
    assert!(!fixture.root().join(BACKUPDIR_NAME).exists());

    Ok(())
}

#[sealed_test]
fn invalid_filename_leaves_datadir_untouched() -> Result<()> {
    let fixture = RepoFixture::new(current_dir()?, "", "0|.|all|lines||\n")?
        .with_datadir(
            "a",
            "1|NOW|lines|now||\n",
            &[("x", "NOW a\n"), ("x.swp", "junk\n")],
        )?;
    let config = load_config(fixture.root())?;

    let result = fixture.sync("a", &config);
    assert!(matches!(
        result,
        Err(SyncError::Data(DataError::BadFilename { .. }))
    ));
    assert_eq!(fixture.read("a/x")?, "NOW a\n");

    Ok(())
}

#[sealed_test]
fn datadirs_below_skips_root_and_bookkeeping() -> Result<()> {
    let fixture = RepoFixture::new(current_dir()?, "", "0|.|all|lines||\n")?
        .with_datadir("a", "1|NOW|lines|now||\n", &[("x", "NOW a\n")])?
        .with_datadir("a/b", "1|NOW|lines|now||\n", &[("x", "NOW b\n")])?
        .with_datadir("c", "1|NOW|lines|now||\n", &[("x", "NOW c\n")])?;
    let config = load_config(fixture.root())?;

    let datadirs = datadirs_below(fixture.root());
    assert_eq!(
        datadirs,
        vec![
            fixture.datadir("a"),
            fixture.datadir("a/b"),
            fixture.datadir("c"),
        ]
    );

    for datadir in &datadirs {
        sync_datadir(datadir, fixture.root(), &config, SyncOptions::default())?;
    }
    assert_eq!(datadirs_below(fixture.root()), datadirs);
    assert_eq!(
        datadirs_below(fixture.datadir("a")),
        vec![fixture.datadir("a"), fixture.datadir("a/b")]
    );

    Ok(())
}

#[sealed_test]
fn dryrun_reports_without_writing() -> Result<()> {
    let fixture = RepoFixture::new(current_dir()?, "", "0|.|all|lines||\n")?
        .with_datadir("a", "1|NOW|lines|now||\n", &[("x", "NOW a\nlater\n")])?;
    let config = load_config(fixture.root())?;

    let report = sync_datadir(
        fixture.datadir("a"),
        fixture.root(),
        &config,
        SyncOptions { dryrun: true },
    )?;
    assert_eq!(report.containers.line_count(), 2);
    assert_eq!(report.backupdir, None::<PathBuf>);
    assert_eq!(fixture.read("a/x")?, "NOW a\nlater\n");
    assert!(!fixture.datadir("a/now").exists());

    Ok(())
}
