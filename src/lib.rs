// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Rule-driven plain-text list manager.
//!
//! A __mklists repository__ is a directory tree marked by a `mklists.toml`
//! configuration file at its root. Any directory below the root holding a
//! `.rules` file is a __data directory__, whose visible files are plain-text
//! lists with one item per line.
//!
//! Syncing a data directory gathers every line of every list, routes those
//! lines through an ordered chain of rules, and writes the resulting lists back
//! in place of the old ones. Each rule moves lines matching a regex from one
//! named list into another, optionally sorting the target by a field.
//!
//! # Rule Files
//!
//! Rules are read from the `rules.cfg` file at the repository root followed by
//! the `.rules` files of every data directory on the way down to the data
//! directory being synced. A rule is any line of five or more `|`-separated
//! fields whose first field, once trimmed, is made of ASCII digits only:
//!
//! ```text
//! match field | regex | source | target | sort field
//! 0           | .     | lines  | todo   | 1
//! 1           | NOW   | todo   | now    |
//! ```

pub mod apply;
pub mod backup;
pub mod config;
pub mod data;
pub mod init;
pub mod linkify;
pub mod path;
pub mod rules;
pub mod sync;

pub use apply::{apply_rules_to_datalines, Containers};
pub use config::Config;
pub use rules::{get_rules, Rule, RuleGraph};
pub use sync::{sync_datadir, SyncOptions, SyncReport};
