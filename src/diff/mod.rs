//! Name-list comparison.
//!
//! Fetched lists come back sorted by the server's collation. [`compare_names`]
//! does not rely on that: both sides are re-sorted by byte order and
//! deduplicated before comparing, which turns the check into a true set
//! comparison. The raw [`names_equal`] and [`difference`] helpers keep the
//! plain list semantics for callers that already hold normalized input.

use serde::Serialize;
use std::collections::HashSet;

use crate::model::NameList;

/// Outcome of comparing one category on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub equal: bool,
    pub only_in_left: NameList,
    pub only_in_right: NameList,
}

impl ComparisonResult {
    /// Number of names present on exactly one side.
    pub fn difference_count(&self) -> usize {
        self.only_in_left.len() + self.only_in_right.len()
    }

    /// Left-only names followed by right-only names, without side attribution.
    pub fn combined(&self) -> NameList {
        self.only_in_left
            .iter()
            .chain(&self.only_in_right)
            .cloned()
            .collect()
    }
}

/// Ordered equality: same length and the same name at every index.
pub fn names_equal(a: &[String], b: &[String]) -> bool {
    a == b
}

/// Names present in exactly one list: those only in `a`, then those only in `b`.
pub fn difference(a: &[String], b: &[String]) -> NameList {
    let (only_a, only_b) = split_difference(a, b);
    only_a.into_iter().chain(only_b).collect()
}

fn split_difference(a: &[String], b: &[String]) -> (NameList, NameList) {
    let in_a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let common: HashSet<&str> = b
        .iter()
        .map(String::as_str)
        .filter(|name| in_a.contains(name))
        .collect();

    let only_a = a
        .iter()
        .filter(|name| !common.contains(name.as_str()))
        .cloned()
        .collect();
    let only_b = b
        .iter()
        .filter(|name| !common.contains(name.as_str()))
        .cloned()
        .collect();
    (only_a, only_b)
}

/// Sorts by byte order and drops repeated names.
///
/// Names are compared verbatim; no case folding is applied.
pub fn normalize_names(mut names: NameList) -> NameList {
    names.sort();
    names.dedup();
    names
}

/// Set comparison of two fetched lists, keeping track of which side each extra name came from.
pub fn compare_names(left: NameList, right: NameList) -> ComparisonResult {
    let left = normalize_names(left);
    let right = normalize_names(right);

    if names_equal(&left, &right) {
        return ComparisonResult {
            equal: true,
            only_in_left: Vec::new(),
            only_in_right: Vec::new(),
        };
    }

    let (only_in_left, only_in_right) = split_difference(&left, &right);
    ComparisonResult {
        equal: false,
        only_in_left,
        only_in_right,
    }
}
