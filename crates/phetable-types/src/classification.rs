//! Case/control outcome types.

use std::fmt;

/// Rollup-aware occurrence count for one subject and one phecode.
///
/// `NotApplicable` marks a subject whose own and child counts for the
/// phecode are zero while some rolled-up phecode elsewhere carries a
/// signal. Such a subject cannot serve as a clean control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectiveCount {
    /// Own count plus the counts of direct rollup children.
    Count(u32),
    /// Ambiguous zero; suppresses case/control classification.
    NotApplicable,
}

impl EffectiveCount {
    /// Returns the count, or `None` for `NotApplicable`.
    pub fn count(self) -> Option<u32> {
        match self {
            Self::Count(n) => Some(n),
            Self::NotApplicable => None,
        }
    }
}

/// Final classification of a subject for one phecode.
///
/// # Examples
///
/// ```
/// use phetable_types::{Classification, EffectiveCount};
///
/// assert_eq!(Classification::from_count(EffectiveCount::Count(2), 2), Classification::Case);
/// assert_eq!(Classification::from_count(EffectiveCount::Count(0), 2), Classification::Control);
/// assert_eq!(Classification::from_count(EffectiveCount::Count(1), 2), Classification::NotApplicable);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Classification {
    /// Count reached the case threshold.
    Case,
    /// Confirmed absence.
    Control,
    /// Insufficient or inapplicable evidence.
    NotApplicable,
}

impl Classification {
    /// Classifies an effective count against the minimum case count.
    pub fn from_count(count: EffectiveCount, min_count: u32) -> Self {
        match count {
            EffectiveCount::NotApplicable => Self::NotApplicable,
            EffectiveCount::Count(n) if n >= min_count => Self::Case,
            EffectiveCount::Count(0) => Self::Control,
            EffectiveCount::Count(_) => Self::NotApplicable,
        }
    }

    /// Returns the table cell value (`TRUE`, `FALSE` or `NA`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Case => "TRUE",
            Self::Control => "FALSE",
            Self::NotApplicable => "NA",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_count_threshold() {
        assert_eq!(
            Classification::from_count(EffectiveCount::Count(5), 2),
            Classification::Case
        );
        assert_eq!(
            Classification::from_count(EffectiveCount::Count(2), 2),
            Classification::Case
        );
        assert_eq!(
            Classification::from_count(EffectiveCount::Count(1), 2),
            Classification::NotApplicable
        );
        assert_eq!(
            Classification::from_count(EffectiveCount::Count(0), 2),
            Classification::Control
        );
    }

    #[test]
    fn test_not_applicable_count() {
        assert_eq!(
            Classification::from_count(EffectiveCount::NotApplicable, 1),
            Classification::NotApplicable
        );
        assert_eq!(EffectiveCount::NotApplicable.count(), None);
        assert_eq!(EffectiveCount::Count(4).count(), Some(4));
    }

    #[test]
    fn test_cell_values() {
        assert_eq!(Classification::Case.to_string(), "TRUE");
        assert_eq!(Classification::Control.to_string(), "FALSE");
        assert_eq!(Classification::NotApplicable.to_string(), "NA");
    }
}
