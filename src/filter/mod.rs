use glob::Pattern;
use std::collections::BTreeSet;

use crate::model::{MetadataCategory, NameList};

/// Narrows what a comparison run looks at.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    skip: BTreeSet<MetadataCategory>,
}

impl Filter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, glob::PatternError> {
        let include_patterns = include
            .iter()
            .map(|s| Pattern::new(s))
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_patterns = exclude
            .iter()
            .map(|s| Pattern::new(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Filter {
            include: include_patterns,
            exclude: exclude_patterns,
            skip: BTreeSet::new(),
        })
    }

    pub fn with_skipped(mut self, categories: impl IntoIterator<Item = MetadataCategory>) -> Self {
        self.skip.extend(categories);
        self
    }

    /// Exclude patterns win over include patterns; no include patterns means everything.
    pub fn should_include(&self, name: &str) -> bool {
        if self.exclude.iter().any(|pattern| pattern.matches(name)) {
            return false;
        }

        if !self.include.is_empty() {
            return self.include.iter().any(|pattern| pattern.matches(name));
        }

        true
    }

    /// Whether `category` is compared at all.
    ///
    /// Columns and indexes hang off the table comparison, so skipping tables skips them too.
    pub fn compares(&self, category: MetadataCategory) -> bool {
        if self.skip.contains(&category) {
            return false;
        }
        if category.is_table_scoped() {
            return !self.skip.contains(&MetadataCategory::Table);
        }
        true
    }

    pub fn apply(&self, names: NameList) -> NameList {
        if self.include.is_empty() && self.exclude.is_empty() {
            return names;
        }
        names
            .into_iter()
            .filter(|name| self.should_include(name))
            .collect()
    }
}
