// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Rule file parsing.
//!
//! Rule files are pipe-delimited tables:
//!
//! ```text
//! # Comments, headers, and blank lines are ignored.
//! in field|match |in source  |move to    |sort by|
//! 0       |.     |lines      |todo.txt   |1      |Comments here.
//! 1       |NOW   |todo.txt   |now.txt    |1      |
//! 1       |LATER |todo.txt   |later.txt  |       |Not sorted.
//! ```
//!
//! Every field is stripped of surrounding whitespace. A row counts as a rule
//! only if it has more than four fields and its first field is made of
//! digits. Only the first five fields of a rule row are kept, so anything
//! after the fifth pipe is free to be used as a comment.

use crate::rules::RulesError;

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::read_to_string,
    path::Path,
};

/// Raw components of one rule row, stripped but not yet coerced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuleRow {
    pub matchfield: String,
    pub matchpattern: String,
    pub source: String,
    pub target: String,
    pub sortorder: String,
}

impl Display for RuleRow {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(
            fmt,
            "{}|{}|{}|{}|{}",
            self.matchfield, self.matchpattern, self.source, self.target, self.sortorder
        )
    }
}

/// Classified line of a rule file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Line holds a rule.
    Rule(RuleRow),

    /// Line is a comment, header, blank, or otherwise not a rule.
    Ignored,
}

impl From<&str> for Row {
    fn from(line: &str) -> Self {
        let fields = line.split('|').map(str::trim).collect::<Vec<_>>();
        if fields.len() <= 4 {
            return Row::Ignored;
        }

        let first = fields[0];
        if first.is_empty() || !first.chars().all(|c| c.is_ascii_digit()) {
            return Row::Ignored;
        }

        Row::Rule(RuleRow {
            matchfield: fields[0].into(),
            matchpattern: fields[1].into(),
            source: fields[2].into(),
            target: fields[3].into(),
            sortorder: fields[4].into(),
        })
    }
}

/// Extract rule rows from rule file content, in order.
pub fn parse_rules(content: &str) -> Vec<RuleRow> {
    content
        .lines()
        .filter_map(|line| match Row::from(line) {
            Row::Rule(row) => Some(row),
            Row::Ignored => None,
        })
        .collect()
}

/// Read rule rows from rule file.
///
/// # Errors
///
/// - Return [`RulesError::ReadRuleFile`] if rule file cannot be read.
pub fn read_rulefile(path: impl AsRef<Path>) -> Result<Vec<RuleRow>, RulesError> {
    let content = read_to_string(path.as_ref()).map_err(|err| RulesError::ReadRuleFile {
        source: err,
        path: path.as_ref().to_path_buf(),
    })?;

    Ok(parse_rules(&content))
}
