//! Case/control classification.
//!
//! For a subject and a phecode:
//!
//! 1. A sex restriction on the phecode that excludes the subject yields NA
//!    without computing a count.
//! 2. Otherwise the effective count is the phecode's own count plus the
//!    counts of its direct rollup children.
//! 3. An effective count of zero becomes [`EffectiveCount::NotApplicable`]
//!    when any phecode that rolls up into a parent has a nonzero count for
//!    the subject.
//! 4. The count is classified against the minimum case count.

use phetable_types::{Classification, EffectiveCount, PheIndex};

use crate::reference::ReferenceTables;
use crate::subject::SubjectAccumulator;

/// Classifies subjects against read-only reference tables.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    tables: &'a ReferenceTables,
    min_count: u32,
}

impl<'a> Classifier<'a> {
    /// Creates a classifier with the given minimum case count.
    pub fn new(tables: &'a ReferenceTables, min_count: u32) -> Self {
        Self { tables, min_count }
    }

    /// Returns the minimum case count.
    pub fn min_count(&self) -> u32 {
        self.min_count
    }

    /// Computes the rollup-aware count of a phecode for a subject.
    pub fn effective_count(&self, index: PheIndex, subject: &SubjectAccumulator) -> EffectiveCount {
        self.effective_count_with(index, subject, || self.has_rollup_signal(subject))
    }

    /// Returns true if any phecode that rolls up into a parent has a
    /// nonzero count for the subject.
    ///
    /// The answer does not depend on the phecode being classified, so
    /// [`classify_row`](Self::classify_row) computes it once per subject.
    pub fn has_rollup_signal(&self, subject: &SubjectAccumulator) -> bool {
        let graph = self.tables.graph();
        subject
            .iter()
            .any(|(index, count)| count > 0 && graph.has_parents(index))
    }

    /// Classifies one phecode for a subject.
    pub fn classify(&self, index: PheIndex, subject: &SubjectAccumulator) -> Classification {
        self.classify_with(index, subject, || self.has_rollup_signal(subject))
    }

    /// Classifies a subject for every phecode in `columns`, in order.
    pub fn classify_row(
        &self,
        subject: &SubjectAccumulator,
        columns: &[PheIndex],
    ) -> Vec<Classification> {
        let rollup_signal = self.has_rollup_signal(subject);
        columns
            .iter()
            .map(|&index| self.classify_with(index, subject, || rollup_signal))
            .collect()
    }

    /// Returns true if the subject's sex excludes the phecode.
    pub fn is_restricted(&self, index: PheIndex, subject: &SubjectAccumulator) -> bool {
        self.tables
            .vocabulary()
            .phecode(index)
            .map_or(false, |phecode| {
                self.tables.restrictions().is_restricted(phecode, subject.sex())
            })
    }

    fn classify_with<F>(
        &self,
        index: PheIndex,
        subject: &SubjectAccumulator,
        rollup_signal: F,
    ) -> Classification
    where
        F: FnOnce() -> bool,
    {
        if self.is_restricted(index, subject) {
            return Classification::NotApplicable;
        }
        let count = self.effective_count_with(index, subject, rollup_signal);
        Classification::from_count(count, self.min_count)
    }

    fn effective_count_with<F>(
        &self,
        index: PheIndex,
        subject: &SubjectAccumulator,
        rollup_signal: F,
    ) -> EffectiveCount
    where
        F: FnOnce() -> bool,
    {
        let total = self
            .tables
            .graph()
            .children_of(index)
            .iter()
            .fold(subject.count_for(index), |sum, &child| {
                sum.saturating_add(subject.count_for(child))
            });

        if total == 0 && rollup_signal() {
            EffectiveCount::NotApplicable
        } else {
            EffectiveCount::Count(total)
        }
    }
}
