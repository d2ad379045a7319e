//! ICD to phecode translation row.

use crate::{IcdEra, Phecode};

/// A row of the ICD to phecode translation table.
///
/// The era is not a column of its own; it is embedded in `vocabulary_id`
/// (`ICD9CM`, `ICD10CM`, `9`, `10`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TranslationRow {
    /// Raw ICD code.
    pub code: String,
    /// Vocabulary identifier carrying the era token.
    pub vocabulary_id: String,
    /// Target phecode.
    pub phecode: Phecode,
}

impl TranslationRow {
    /// Returns the era named by `vocabulary_id`, if any.
    pub fn era(&self) -> Option<IcdEra> {
        IcdEra::search(&self.vocabulary_id)
    }

    /// Returns true if the row names a phecode at all.
    pub fn has_phecode(&self) -> bool {
        !self.phecode.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(vocabulary_id: &str, phecode: &str) -> TranslationRow {
        TranslationRow {
            code: "250.00".to_string(),
            vocabulary_id: vocabulary_id.to_string(),
            phecode: phecode.to_string(),
        }
    }

    #[test]
    fn test_translation_row_era() {
        assert_eq!(make_row("ICD9CM", "250").era(), Some(IcdEra::Icd9));
        assert_eq!(make_row("ICD10CM", "250").era(), Some(IcdEra::Icd10));
        assert_eq!(make_row("READ", "250").era(), None);
    }

    #[test]
    fn test_translation_row_blank_phecode() {
        assert!(make_row("ICD9CM", "250").has_phecode());
        assert!(!make_row("ICD9CM", "  ").has_phecode());
    }
}
