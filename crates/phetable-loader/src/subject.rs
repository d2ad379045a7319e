//! Per-subject occurrence counts.

use std::collections::HashMap;

use phetable_types::{PheIndex, Sex};

/// Sparse phecode occurrence counts for one subject.
///
/// Indices never recorded have an implicit count of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectAccumulator {
    sex: Option<Sex>,
    counts: HashMap<PheIndex, u32>,
}

impl SubjectAccumulator {
    /// Creates an accumulator for a subject without demographics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an accumulator for a subject of known sex.
    pub fn with_sex(sex: Sex) -> Self {
        Self {
            sex: Some(sex),
            counts: HashMap::new(),
        }
    }

    /// Returns the subject's sex, if demographics were loaded for it.
    pub fn sex(&self) -> Option<Sex> {
        self.sex
    }

    /// Sets the subject's sex.
    pub fn set_sex(&mut self, sex: Sex) {
        self.sex = Some(sex);
    }

    /// Counts one occurrence of a phecode.
    pub fn record(&mut self, index: PheIndex) {
        let count = self.counts.entry(index).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Returns the count for a phecode, zero if never recorded.
    pub fn count_for(&self, index: PheIndex) -> u32 {
        self.counts.get(&index).copied().unwrap_or(0)
    }

    /// Iterates recorded `(index, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (PheIndex, u32)> + '_ {
        self.counts.iter().map(|(&index, &count)| (index, count))
    }

    /// Returns the number of distinct phecodes recorded.
    pub fn distinct_phecodes(&self) -> usize {
        self.counts.len()
    }

    /// Returns the total number of recorded occurrences.
    pub fn total_occurrences(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_count() {
        let mut subject = SubjectAccumulator::new();
        assert_eq!(subject.count_for(3), 0);
        assert!(subject.is_empty());

        subject.record(3);
        subject.record(3);
        subject.record(7);

        assert_eq!(subject.count_for(3), 2);
        assert_eq!(subject.count_for(7), 1);
        assert_eq!(subject.count_for(8), 0);
        assert_eq!(subject.distinct_phecodes(), 2);
        assert_eq!(subject.total_occurrences(), 3);
    }

    #[test]
    fn test_sex() {
        let mut subject = SubjectAccumulator::new();
        assert_eq!(subject.sex(), None);
        subject.set_sex(Sex::Male);
        assert_eq!(subject.sex(), Some(Sex::Male));
        assert_eq!(SubjectAccumulator::with_sex(Sex::Female).sex(), Some(Sex::Female));
    }
}
