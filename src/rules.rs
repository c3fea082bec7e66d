// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Rule representation and loading.
//!
//! A __rule__ is a single match-and-route instruction: lines in container A
//! whose field N matches pattern P are moved to container B, which may then
//! be sorted by some field. Containers are named after the files they will
//! eventually be written to.
//!
//! # Rule Chains
//!
//! Rules live in plain-text rule files. The repository root holds a global
//! rule file, and each data directory can hold a local one. The rules that
//! apply to a data directory are the concatenation of every rule file on the
//! way down from the repository root to that directory. See [`chain`] for the
//! resolution logic and [`parse`] for the rule file format.
//!
//! # Rule Graph
//!
//! Rules form edges of a directed graph over container names. The first rule
//! reads from a container that is seeded with all input lines, and every
//! later rule may only read from a container that some earlier rule wrote to.
//! A rule set is loaded as a whole. If any one row fails to validate, nothing
//! is loaded at all.

pub mod chain;
pub mod parse;

use crate::{
    path::absolute_path,
    rules::{chain::find_rulefile_chain, parse::RuleRow},
};

use regex::Regex;
use std::{
    collections::HashSet,
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// A single validated rule.
///
/// # Invariant
///
/// - Source and target never name the same container.
/// - Source and target are always valid filenames.
#[derive(Clone)]
pub struct Rule {
    source_matchfield: usize,
    source_matchpattern: Regex,
    source: String,
    target: String,
    target_sortorder: Option<usize>,
}

impl Rule {
    /// Construct new rule from typed components.
    ///
    /// Filenames are checked against directories in the current working
    /// directory.
    ///
    /// # Errors
    ///
    /// - Return [`RuleError::BadRegex`] if pattern does not compile.
    /// - Return [`RuleError::BadFilename`] if source or target is not a valid
    ///   filename.
    /// - Return [`RuleError::SourceEqualsTarget`] if source and target match.
    pub fn new(
        source_matchfield: usize,
        source_matchpattern: impl AsRef<str>,
        source: impl Into<String>,
        target: impl Into<String>,
        target_sortorder: Option<usize>,
    ) -> Result<Self, RuleError> {
        Self::coerce(
            source_matchfield,
            source_matchpattern.as_ref(),
            source.into(),
            target.into(),
            target_sortorder,
            Path::new("."),
        )
    }

    /// Coerce raw rule row into typed rule.
    ///
    /// Numeric fields become their absolute value. An empty sort order field
    /// means the target is not sorted.
    ///
    /// # Errors
    ///
    /// - Return [`RuleError::NotAnInteger`] if a numeric field does not parse.
    /// - Return any error of [`Rule::new`].
    pub fn from_row(row: &RuleRow, base_dir: impl AsRef<Path>) -> Result<Self, RuleError> {
        let source_matchfield = coerce_integer(&row.matchfield)?;
        let target_sortorder = match row.sortorder.as_str() {
            "" => None,
            sortorder => Some(coerce_integer(sortorder)?),
        };

        Self::coerce(
            source_matchfield,
            &row.matchpattern,
            row.source.clone(),
            row.target.clone(),
            target_sortorder,
            base_dir.as_ref(),
        )
    }

    fn coerce(
        source_matchfield: usize,
        source_matchpattern: &str,
        source: String,
        target: String,
        target_sortorder: Option<usize>,
        base_dir: &Path,
    ) -> Result<Self, RuleError> {
        let source_matchpattern =
            Regex::new(source_matchpattern).map_err(|err| RuleError::BadRegex {
                pattern: source_matchpattern.into(),
                source: err,
            })?;
        let source = validated_filename(source, base_dir)?;
        let target = validated_filename(target, base_dir)?;

        let rule = Self {
            source_matchfield,
            source_matchpattern,
            source,
            target,
            target_sortorder,
        };
        rule.check_source_not_target()?;

        Ok(rule)
    }

    /// Validate rule against rule graph.
    ///
    /// The first rule to pass through a fresh graph seeds it with its source.
    /// Any later rule must read from a container that is already known. The
    /// target of a valid rule is registered as a known source, so this check
    /// mutates the graph.
    ///
    /// # Errors
    ///
    /// - Return [`RuleError::SourceEqualsTarget`] if source and target match.
    /// - Return [`RuleError::UninitializedSource`] if source is unknown.
    pub fn is_valid(&self, graph: &mut RuleGraph) -> Result<(), RuleError> {
        self.check_source_not_target()?;
        graph.admit(&self.source, &self.target)
    }

    fn check_source_not_target(&self) -> Result<(), RuleError> {
        if self.source == self.target {
            return Err(RuleError::SourceEqualsTarget {
                name: self.source.clone(),
            });
        }

        Ok(())
    }

    /// Check if line matches rule.
    ///
    /// A match field of zero searches the whole line. Otherwise only the
    /// given whitespace-delimited field is searched, and lines that are too
    /// short to have that field never match.
    pub fn matches(&self, line: &str) -> bool {
        match self.source_matchfield {
            0 => self.source_matchpattern.is_match(line),
            nth => line
                .split_whitespace()
                .nth(nth - 1)
                .is_some_and(|field| self.source_matchpattern.is_match(field)),
        }
    }

    pub fn source_matchfield(&self) -> usize {
        self.source_matchfield
    }

    pub fn source_matchpattern(&self) -> &Regex {
        &self.source_matchpattern
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn target_sortorder(&self) -> Option<usize> {
        self.target_sortorder
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.source_matchfield == other.source_matchfield
            && self.source_matchpattern.as_str() == other.source_matchpattern.as_str()
            && self.source == other.source
            && self.target == other.target
            && self.target_sortorder == other.target_sortorder
    }
}

impl Eq for Rule {}

impl Debug for Rule {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.debug_struct("Rule")
            .field("source_matchfield", &self.source_matchfield)
            .field("source_matchpattern", &self.source_matchpattern.as_str())
            .field("source", &self.source)
            .field("target", &self.target)
            .field("target_sortorder", &self.target_sortorder)
            .finish()
    }
}

/// Known valid sources of one rule loading pass.
///
/// Always start every loading pass with a fresh graph. Reusing a graph across
/// passes lets containers from an earlier rule set leak into the next one.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuleGraph {
    base_dir: PathBuf,
    sources: HashSet<String>,
}

impl RuleGraph {
    /// Construct new empty rule graph.
    ///
    /// Filenames of rules loaded through this graph must not name existing
    /// directories inside `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            sources: HashSet::new(),
        }
    }

    /// Directory that filenames are checked against.
    pub fn base_dir(&self) -> &Path {
        self.base_dir.as_path()
    }

    /// Check if container is a known source.
    pub fn is_source(&self, name: impl AsRef<str>) -> bool {
        self.sources.contains(name.as_ref())
    }

    fn admit(&mut self, source: &str, target: &str) -> Result<(), RuleError> {
        // INVARIANT: The very first source is trusted as is.
        if self.sources.is_empty() {
            self.sources.insert(source.to_owned());
        }

        if !self.sources.contains(source) {
            return Err(RuleError::UninitializedSource {
                name: source.to_owned(),
            });
        }

        self.sources.insert(target.to_owned());

        Ok(())
    }
}

/// Load rules that apply to a data directory.
///
/// Resolves the rule file chain of `datadir`, reads each rule file from the
/// root downward, and validates every row through a fresh [`RuleGraph`].
///
/// # Errors
///
/// - Return [`RulesError::Path`] if `datadir` cannot be made absolute or is
///   not inside a repository.
/// - Return [`RulesError::ReadRuleFile`] if a rule file cannot be read.
/// - Return [`RulesError::NoRules`] if the chain holds no rule rows.
/// - Return [`RulesError::BadRule`] if any rule row is invalid.
#[instrument(skip(datadir), level = "debug")]
pub fn get_rules(datadir: impl AsRef<Path>) -> Result<Vec<Rule>> {
    let datadir = absolute_path(datadir)?;
    let mut rows = Vec::new();
    for rulefile in find_rulefile_chain(&datadir)? {
        debug!("read rules from {:?}", rulefile.display());
        rows.extend(parse::read_rulefile(&rulefile)?);
    }

    load_rules(&rows, &mut RuleGraph::new(datadir))
}

/// Turn raw rule rows into validated rules.
///
/// # Errors
///
/// - Return [`RulesError::NoRules`] if `rows` is empty.
/// - Return [`RulesError::BadRule`] on the first row that fails coercion or
///   validation.
pub fn load_rules(rows: &[RuleRow], graph: &mut RuleGraph) -> Result<Vec<Rule>> {
    if rows.is_empty() {
        return Err(RulesError::NoRules);
    }

    let mut rules = Vec::with_capacity(rows.len());
    for row in rows {
        let rule = Rule::from_row(row, graph.base_dir())
            .and_then(|rule| rule.is_valid(graph).map(|_| rule))
            .map_err(|err| RulesError::BadRule {
                row: row.to_string(),
                source: err,
            })?;
        rules.push(rule);
    }
    debug!("loaded {} rules", rules.len());

    Ok(rules)
}

/// Validate name of a container as a filename.
///
/// # Errors
///
/// - Return [`FilenameError`] if name is empty, starts with a dot, uses a
///   character outside of `[A-Za-z0-9-_=.,@:]`, or names an existing
///   directory inside `base_dir`.
pub fn validated_filename(
    name: impl Into<String>,
    base_dir: impl AsRef<Path>,
) -> Result<String, FilenameError> {
    let name = name.into();
    if name.is_empty() {
        return Err(FilenameError::Empty);
    }

    if name.starts_with('.') {
        return Err(FilenameError::StartsWithDot { name });
    }

    if let Some(character) = name.chars().find(|c| !is_valid_filename_char(*c)) {
        return Err(FilenameError::IllegalCharacter { name, character });
    }

    if base_dir.as_ref().join(&name).is_dir() {
        return Err(FilenameError::ExistingDirectory { name });
    }

    Ok(name)
}

fn is_valid_filename_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=' | '.' | ',' | '@' | ':')
}

fn coerce_integer(value: &str) -> Result<usize, RuleError> {
    value
        .parse::<i64>()
        .ok()
        .and_then(|number| usize::try_from(number.unsigned_abs()).ok())
        .ok_or_else(|| RuleError::NotAnInteger {
            value: value.into(),
        })
}

/// Single rule error types.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Numeric rule field is not an integer.
    #[error("{value:?} is not an integer")]
    NotAnInteger { value: String },

    /// Match pattern does not compile as regular expression.
    #[error("{pattern:?} is not a valid regular expression")]
    BadRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Source or target is not a valid filename.
    #[error(transparent)]
    BadFilename(#[from] FilenameError),

    /// Source and target name the same container.
    #[error("source must not equal target, both are {name:?}")]
    SourceEqualsTarget { name: String },

    /// Source was never established by an earlier rule.
    #[error("{name:?} not initialized as a source by any earlier rule")]
    UninitializedSource { name: String },
}

/// Filename validation error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FilenameError {
    /// Filename is empty.
    #[error("filename must not be empty")]
    Empty,

    /// Filename would be hidden.
    #[error("filename {name:?} must not start with a dot")]
    StartsWithDot { name: String },

    /// Filename uses a character outside of the allowed set.
    #[error("filename {name:?} uses illegal character {character:?}")]
    IllegalCharacter { name: String, character: char },

    /// Filename is already taken by a directory.
    #[error("filename {name:?} is the name of an existing directory")]
    ExistingDirectory { name: String },
}

/// Rule set error types.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// Rule chain cannot be resolved, or starts outside of a repository.
    #[error(transparent)]
    Path(#[from] crate::path::PathError),

    /// Rule file cannot be read.
    #[error("failed to read rule file at {:?}", path.display())]
    ReadRuleFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// No rules to apply.
    #[error("no rules specified")]
    NoRules,

    /// A rule row failed coercion or validation.
    #[error("rule {row:?} is badly formed")]
    BadRule {
        row: String,
        #[source]
        source: RuleError,
    },
}

/// Friendly result alias :3
type Result<T, E = RulesError> = std::result::Result<T, E>;
