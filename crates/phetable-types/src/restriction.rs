//! Gender restriction row.

use crate::Phecode;

/// A row of the gender restriction table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RestrictionRow {
    /// The restricted phecode.
    pub phecode: Phecode,
    /// Phecode only applies to male subjects.
    pub male_only: bool,
    /// Phecode only applies to female subjects.
    pub female_only: bool,
}
