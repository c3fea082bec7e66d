// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Line routing.
//!
//! Apply an ordered list of rules to a batch of data lines. Lines live in
//! named __containers__ while rules are applied. All input lines start out in
//! the source container of the first rule. Each rule then moves the lines of
//! its source that match its pattern over to its target, and optionally sorts
//! the target afterwards. Once every rule has run, each container holds the
//! lines of one output file.
//!
//! Every rule runs exactly once, in declared order. Which container a line
//! ends up in is therefore decided entirely by how rules redirect each other's
//! targets, and the [`RuleGraph`](crate::rules::RuleGraph) makes sure that
//! chain is well formed before any line is touched.

pub mod sort;

use crate::{apply::sort::sort_lines, rules::Rule};

use tracing::{debug, instrument};

/// Named batches of lines, in order of first appearance.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Containers {
    entries: Vec<(String, Vec<String>)>,
}

impl Containers {
    /// Construct new empty set of containers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines of named container, if it exists.
    pub fn get(&self, name: impl AsRef<str>) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(key, _)| key == name.as_ref())
            .map(|(_, lines)| lines.as_slice())
    }

    /// Iterate over containers in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, lines)| (name.as_str(), lines.as_slice()))
    }

    /// Iterate over names of containers.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of containers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no containers at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of lines over all containers.
    pub fn line_count(&self) -> usize {
        self.entries.iter().map(|(_, lines)| lines.len()).sum()
    }

    fn entry(&mut self, name: &str) -> &mut Vec<String> {
        let index = match self.entries.iter().position(|(key, _)| key == name) {
            Some(index) => index,
            None => {
                self.entries.push((name.to_owned(), Vec::new()));
                self.entries.len() - 1
            }
        };

        &mut self.entries[index].1
    }
}

impl<N, L> FromIterator<(N, L)> for Containers
where
    N: Into<String>,
    L: IntoIterator,
    L::Item: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, L)>>(iter: I) -> Self {
        let mut containers = Containers::new();
        for (name, lines) in iter {
            let name = name.into();
            containers
                .entry(&name)
                .extend(lines.into_iter().map(Into::into));
        }

        containers
    }
}

/// Apply rules to data lines.
///
/// # Errors
///
/// - Return [`ApplyError::NoRules`] if `rules` is empty.
/// - Return [`ApplyError::NoData`] if `datalines` is empty.
#[instrument(skip(rules, datalines), level = "debug")]
pub fn apply_rules_to_datalines(
    rules: &[Rule],
    datalines: &[String],
) -> Result<Containers, ApplyError> {
    let Some(first) = rules.first() else {
        return Err(ApplyError::NoRules);
    };

    if datalines.is_empty() {
        return Err(ApplyError::NoData);
    }

    let mut containers = Containers::new();
    containers.entry(first.source()).extend_from_slice(datalines);

    for rule in rules {
        // INVARIANT: Partition a snapshot of the source, never the live source.
        let snapshot = std::mem::take(containers.entry(rule.source()));
        let (matched, remained): (Vec<_>, Vec<_>) =
            snapshot.into_iter().partition(|line| rule.matches(line));
        debug!(
            "move {} lines from {:?} to {:?}",
            matched.len(),
            rule.source(),
            rule.target()
        );
        *containers.entry(rule.source()) = remained;

        let target = containers.entry(rule.target());
        target.extend(matched);
        if rule.target_sortorder().is_some() {
            *target = sort_lines(std::mem::take(target), rule.target_sortorder());
        }
    }

    Ok(containers)
}

/// Line routing error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// No rules to apply.
    #[error("no rules specified")]
    NoRules,

    /// No data lines to apply rules to.
    #[error("no data specified")]
    NoData,
}
